use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("environment variable {0} must be set")]
    MissingEnv(String),

    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),

    #[error("trust store error: {}: {reason}", path.display())]
    TrustStore { path: PathBuf, reason: String },
}

/// Every way a run can fail. There is no degraded mode: each variant is
/// fatal and reaches the single handler in the binary.
#[derive(Debug, thiserror::Error)]
pub enum GigaError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("auth error: {0}")]
    Auth(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("run cancelled")]
    Cancelled,
}

impl GigaError {
    /// Process exit code for this failure category.
    pub fn exit_code(&self) -> u8 {
        match self {
            GigaError::Io(_) => 1,
            GigaError::Config(_) => 2,
            GigaError::Auth(_) => 3,
            GigaError::Transport(_) => 4,
            GigaError::Protocol(_) => 5,
            GigaError::Cancelled => 130,
        }
    }
}
