//! The export bundle: an ordered container of nodes, relationships,
//! and file identifiers, persisted as a JSON file.
//!
//! Each bundle carries a BLAKE3 content hash over the three sets so
//! that a tampered or truncated file is rejected before import touches
//! the store.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use arbor_core::types::{RawEdge, RawNode};

use crate::error::{Result, SyncError};
use crate::walker::ClosureSet;

/// An exported graph closure, ready for (de)serialization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportBundle {
    pub nodes: Vec<RawNode>,
    pub relationships: Vec<RawEdge>,
    pub files: Vec<Uuid>,
    /// BLAKE3 content hash (hex) over the three sets.
    pub content_hash: String,
}

/// Hashable representation of a bundle (excludes content_hash).
#[derive(Serialize)]
struct HashableBundle<'a> {
    nodes: &'a [RawNode],
    relationships: &'a [RawEdge],
    files: &'a [Uuid],
}

fn compute_bundle_hash(nodes: &[RawNode], relationships: &[RawEdge], files: &[Uuid]) -> String {
    let hashable = HashableBundle {
        nodes,
        relationships,
        files,
    };
    let json = serde_json::to_vec(&hashable).expect("Bundle serialization should not fail");
    blake3::hash(&json).to_hex().to_string()
}

impl ExportBundle {
    /// Seal a computed closure into a bundle, stamping the content
    /// hash.
    pub fn from_closure(closure: ClosureSet) -> Self {
        let files: Vec<Uuid> = closure.files.into_iter().collect();
        let content_hash = compute_bundle_hash(&closure.nodes, &closure.relationships, &files);
        Self {
            nodes: closure.nodes,
            relationships: closure.relationships,
            files,
            content_hash,
        }
    }

    /// Verify that the stored content hash matches a freshly computed
    /// one.
    pub fn verify_integrity(&self) -> bool {
        self.content_hash == compute_bundle_hash(&self.nodes, &self.relationships, &self.files)
    }

    /// Write the bundle to a file.
    pub fn write_to(&self, path: &Path, pretty: bool) -> Result<()> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, json)?;

        tracing::debug!(
            path = %path.display(),
            nodes = self.nodes.len(),
            relationships = self.relationships.len(),
            files = self.files.len(),
            "Bundle written"
        );
        Ok(())
    }

    /// Read a bundle from a file and verify its integrity.
    pub fn read_from(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        let bundle: ExportBundle = serde_json::from_str(&json)?;
        if !bundle.verify_integrity() {
            return Err(SyncError::IntegrityViolation);
        }
        Ok(bundle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_core::types::{NodeKey, PropertyMap, RecordFlags};
    use chrono::Utc;

    fn sample_closure() -> ClosureSet {
        let mut closure = ClosureSet::default();
        closure.nodes.push(RawNode {
            key: NodeKey(1),
            uuid: Uuid::new_v4(),
            type_name: "Document".to_string(),
            flags: RecordFlags::default(),
            props: PropertyMap::new(),
            created_at: Utc::now(),
            modified_at: Utc::now(),
        });
        closure.files.insert(Uuid::new_v4());
        closure
    }

    #[test]
    fn bundle_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");

        let bundle = ExportBundle::from_closure(sample_closure());
        bundle.write_to(&path, true).unwrap();

        let back = ExportBundle::read_from(&path).unwrap();
        assert_eq!(back, bundle);
        assert!(back.verify_integrity());
    }

    #[test]
    fn tampered_bundle_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");

        let bundle = ExportBundle::from_closure(sample_closure());
        bundle.write_to(&path, false).unwrap();

        // Tamper: change the node type in the file.
        let mut tampered: ExportBundle =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        tampered.nodes[0].type_name = "Folder".to_string();
        fs::write(&path, serde_json::to_string(&tampered).unwrap()).unwrap();

        let result = ExportBundle::read_from(&path);
        assert!(matches!(result, Err(SyncError::IntegrityViolation)));
    }
}
