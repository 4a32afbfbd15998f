use thiserror::Error;

#[derive(Debug, Error)]
pub enum LauncherError {
    #[error("Missing required environment variable {0}")]
    MissingEnv(&'static str),

    #[error("Invalid value for {name}: {value:?}")]
    InvalidEnv { name: &'static str, value: String },

    #[error(transparent)]
    Krb(#[from] krb_client::KrbError),

    #[error("Failed to run workload {program}: {source}")]
    Workload {
        program: String,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
