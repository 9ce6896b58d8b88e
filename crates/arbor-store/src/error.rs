//! Error types for the arbor-store crate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Transaction failure: {0}")]
    TransactionFailure(String),

    #[error("Transaction already closed")]
    TransactionClosed,
}

impl StoreError {
    pub fn node_not_found(id: impl ToString) -> Self {
        StoreError::NotFound {
            kind: "node",
            id: id.to_string(),
        }
    }

    pub fn edge_not_found(id: impl ToString) -> Self {
        StoreError::NotFound {
            kind: "edge",
            id: id.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
