pub mod bootstrap;
pub mod error;
pub mod lifecycle;
pub mod settings;
pub mod workdir;
pub mod workload;

pub use error::LauncherError;
pub use settings::Settings;
pub use workdir::WorkDir;
pub use workload::Workload;
