//! Error types for the arbor-schema crate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Invalid property descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("Invalid range format {format:?}: {reason}")]
    InvalidRange { format: String, reason: String },

    #[error("Unknown property type tag: {0}")]
    UnknownTypeTag(String),

    #[error("Unknown storage data type: {0}")]
    UnknownDataType(String),
}

pub type Result<T> = std::result::Result<T, SchemaError>;
