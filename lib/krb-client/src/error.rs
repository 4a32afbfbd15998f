use thiserror::Error;

#[derive(Debug, Error)]
pub enum KrbError {
    #[error("Transfer from {host}:{path} failed: {message}")]
    Transfer {
        host: String,
        path: String,
        message: String,
    },

    #[error("Failed to run {tool}: {source}")]
    ToolSpawn {
        tool: &'static str,
        source: std::io::Error,
    },

    #[error("{tool} failed for {principal}: {stderr}")]
    AuthFailed {
        tool: &'static str,
        principal: String,
        stderr: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
