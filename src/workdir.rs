//! The private per-process directory holding everything credential-related:
//! fetched configs, the derived keytab, and the default ticket cache.

use std::fs;
use std::path::{Path, PathBuf};

pub struct WorkDir {
    root: PathBuf,
}

impl WorkDir {
    /// Create (or reuse) the directory with owner-only permissions.
    pub fn create(root: PathBuf) -> Result<Self, std::io::Error> {
        fs::create_dir_all(&root)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&root, fs::Permissions::from_mode(0o700))?;
        }
        Ok(Self { root })
    }

    pub fn default_root() -> PathBuf {
        std::env::temp_dir().join("zeus-launcher")
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn krb5_conf(&self) -> PathBuf {
        self.root.join("krb5.conf")
    }

    pub fn pbs_conf(&self) -> PathBuf {
        self.root.join("pbs.conf")
    }

    pub fn keytab(&self) -> PathBuf {
        self.root.join("client.keytab")
    }

    pub fn ticket_cache(&self) -> PathBuf {
        self.root.join("krb5cc")
    }
}
