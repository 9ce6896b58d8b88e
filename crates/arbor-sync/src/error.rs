//! Error types for the arbor-sync crate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    /// Client-class error: a maintenance request was malformed.
    /// Raised before any graph access.
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Bundle integrity check failed: stored hash does not match content")]
    IntegrityViolation,

    #[error("Store error: {0}")]
    Store(#[from] arbor_store::StoreError),

    #[error("Object layer error: {0}")]
    Object(#[from] arbor_object::ObjectError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SyncError>;
