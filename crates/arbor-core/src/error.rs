use thiserror::Error;

/// Top-level error type for the Arbor platform.
#[derive(Error, Debug)]
pub enum ArborError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Object layer error: {0}")]
    Object(String),

    #[error("Sync error: {0}")]
    Sync(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<config::ConfigError> for ArborError {
    fn from(e: config::ConfigError) -> Self {
        ArborError::Config(e.to_string())
    }
}
