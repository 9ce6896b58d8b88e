//! The maintenance operation surface.
//!
//! External callers drive export and import through a raw parameter
//! map. Validation happens here, before any graph access: a missing
//! mode or file parameter is rejected with a client-class error.

use std::path::PathBuf;

use serde_json::{Map, Value};

use crate::engine::{SyncEngine, SyncReport};
use crate::error::{Result, SyncError};

/// A validated maintenance request.
#[derive(Debug, Clone, PartialEq)]
pub enum MaintenanceRequest {
    Export { file: PathBuf },
    Import { file: PathBuf },
}

impl MaintenanceRequest {
    /// Parse and validate a raw parameter map.
    pub fn from_params(params: &Map<String, Value>) -> Result<Self> {
        let Some(mode) = params.get("mode").and_then(Value::as_str) else {
            return Err(SyncError::BadRequest(
                "Please specify mode, must be one of (import|export)".to_string(),
            ));
        };
        let Some(file) = params.get("file").and_then(Value::as_str) else {
            return Err(SyncError::BadRequest(
                "Please specify file name using the file parameter".to_string(),
            ));
        };

        match mode {
            "export" => Ok(MaintenanceRequest::Export { file: file.into() }),
            "import" => Ok(MaintenanceRequest::Import { file: file.into() }),
            other => Err(SyncError::BadRequest(format!(
                "Unknown mode {other:?}, must be one of (import|export)"
            ))),
        }
    }

    pub async fn execute(&self, engine: &SyncEngine) -> Result<SyncReport> {
        match self {
            MaintenanceRequest::Export { file } => engine.export(file).await,
            MaintenanceRequest::Import { file } => engine.import(file).await,
        }
    }
}
