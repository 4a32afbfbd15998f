//! Password-authenticated retrieval of remote configuration files.

use std::fs;
use std::io::Read;
use std::net::TcpStream;
use std::path::Path;

use async_trait::async_trait;

use crate::KrbError;

/// Retrieves a remote file's contents over an authenticated channel.
#[async_trait]
pub trait FileTransfer: Send + Sync {
    async fn fetch(&self, host: &str, remote_path: &str) -> Result<Vec<u8>, KrbError>;
}

/// SCP over libssh2, authenticating with the principal's password.
pub struct ScpTransfer {
    user: String,
    password: String,
    port: u16,
}

impl ScpTransfer {
    pub fn new(user: String, password: String) -> Self {
        Self {
            user,
            password,
            port: 22,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
}

#[async_trait]
impl FileTransfer for ScpTransfer {
    async fn fetch(&self, host: &str, remote_path: &str) -> Result<Vec<u8>, KrbError> {
        let addr = format!("{}:{}", host, self.port);
        let user = self.user.clone();
        let password = self.password.clone();
        let host = host.to_string();
        let remote_path = remote_path.to_string();

        // libssh2 sessions are blocking; keep them off the runtime threads.
        let task = tokio::task::spawn_blocking({
            let remote_path = remote_path.clone();
            move || scp_recv_all(&addr, &user, &password, &remote_path)
        });

        let result = task.await.map_err(|e| KrbError::Transfer {
            host: host.clone(),
            path: remote_path.clone(),
            message: e.to_string(),
        })?;

        result.map_err(|message| KrbError::Transfer {
            host,
            path: remote_path,
            message,
        })
    }
}

fn scp_recv_all(addr: &str, user: &str, password: &str, remote_path: &str) -> Result<Vec<u8>, String> {
    let tcp = TcpStream::connect(addr).map_err(|e| format!("connect failed: {}", e))?;

    let mut session = ssh2::Session::new().map_err(|e| format!("session setup failed: {}", e))?;
    session.set_tcp_stream(tcp);
    session
        .handshake()
        .map_err(|e| format!("handshake failed: {}", e))?;
    session
        .userauth_password(user, password)
        .map_err(|e| format!("authentication rejected: {}", e))?;

    let (mut channel, _stat) = session
        .scp_recv(Path::new(remote_path))
        .map_err(|e| format!("remote path not readable: {}", e))?;

    let mut contents = Vec::new();
    channel
        .read_to_end(&mut contents)
        .map_err(|e| format!("read failed: {}", e))?;

    let _ = channel.send_eof();
    let _ = channel.wait_eof();
    let _ = channel.close();
    let _ = channel.wait_close();

    Ok(contents)
}

/// Fetch `remote_path` from `host` and write it to `dest`, readable by the
/// owner only.
pub async fn fetch_to(
    transfer: &dyn FileTransfer,
    host: &str,
    remote_path: &str,
    dest: &Path,
) -> Result<(), KrbError> {
    let contents = transfer.fetch(host, remote_path).await?;
    write_private(dest, &contents)?;
    tracing::info!(
        host,
        remote_path,
        dest = %dest.display(),
        bytes = contents.len(),
        "Fetched remote config"
    );
    Ok(())
}

/// Write `contents` to `path` with mode 0600. Overwrites.
pub fn write_private(path: &Path, contents: &[u8]) -> Result<(), KrbError> {
    fs::write(path, contents)?;
    restrict_to_owner(path)?;
    Ok(())
}

/// Drop group/other permission bits from an existing file.
pub fn restrict_to_owner(path: &Path) -> Result<(), KrbError> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }
    Ok(())
}
