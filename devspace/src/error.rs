use thiserror::Error;

#[derive(Error, Debug)]
pub enum DevspaceError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Logging error: {0}")]
    Logging(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<Box<dyn std::error::Error + Send + Sync>> for DevspaceError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        DevspaceError::Internal(err.to_string())
    }
}

impl From<String> for DevspaceError {
    fn from(err: String) -> Self {
        DevspaceError::Internal(err)
    }
}

pub type Result<T> = std::result::Result<T, DevspaceError>;
