//! Error types for the arbor-object crate.

use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum ObjectError {
    #[error("Store error: {0}")]
    Store(#[from] arbor_store::StoreError),

    #[error("Offset cursor not found: {cursor}")]
    CursorNotFound { cursor: Uuid },

    /// Reserved for multiplicity checks beyond delete-and-replace;
    /// the engine currently self-heals violations instead of raising.
    #[error("Cardinality constraint violated: {0}")]
    ConstraintViolation(String),
}

pub type Result<T> = std::result::Result<T, ObjectError>;
