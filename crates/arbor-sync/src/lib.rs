//! arbor-sync: Graph closure walking and bulk export/import.
//!
//! Computes the transitive closure of graph objects reachable from a
//! set of export roots (cycle-safe, identity-deduplicated), seals it
//! into a hash-verified bundle file, and restores bundles
//! transactionally, including the post-import merge repair of
//! duplicate singleton documents. The maintenance surface validates
//! caller parameters before any graph access.

pub mod bundle;
pub mod engine;
pub mod error;
pub mod maintenance;
pub mod walker;

pub use bundle::ExportBundle;
pub use engine::{SyncEngine, SyncReport};
pub use error::{Result, SyncError};
pub use maintenance::MaintenanceRequest;
pub use walker::{ClosureSet, GraphClosureWalker, RelatedObjects, StoreRelations};
