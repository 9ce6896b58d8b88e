//! The export/import engine.
//!
//! Export computes the closure of the export roots and seals it into
//! a bundle file. Import restores the bundle in one bulk transaction
//! (remapping record keys) and then runs the singleton merge repair in
//! its own follow-up transaction.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use arbor_core::config::SyncConfig;
use arbor_core::security::SystemContext;
use arbor_core::types::{props, EntityKind, NodeKey, PropertyValue, RawEdge};
use arbor_object::{EntityMaterializer, GraphObject, TypeRegistry};
use arbor_store::{GraphStore, RecordStream, ScanFilter};

use crate::bundle::ExportBundle;
use crate::error::Result;
use crate::walker::{GraphClosureWalker, StoreRelations};

/// Summary of one export or import run.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub nodes: usize,
    pub relationships: usize,
    pub files: usize,
}

/// Drives graph export and import against one store.
pub struct SyncEngine {
    store: Arc<dyn GraphStore>,
    materializer: Arc<EntityMaterializer>,
    config: SyncConfig,
}

impl SyncEngine {
    pub fn new(
        store: Arc<dyn GraphStore>,
        registry: Arc<TypeRegistry>,
        config: SyncConfig,
    ) -> Self {
        Self {
            store,
            materializer: Arc::new(EntityMaterializer::new(registry)),
            config,
        }
    }

    /// Relative bundle paths live under the configured bundle
    /// directory; absolute paths are taken as given.
    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            Path::new(&self.config.bundle_dir).join(path)
        }
    }

    /// Export roots: folders opted in via the export flag, plus every
    /// document and the singleton root document.
    async fn collect_roots(&self) -> Result<Vec<GraphObject>> {
        let mut roots = Vec::new();

        let folder_filter = ScanFilter::by_type(EntityKind::Folder.type_name())
            .with_property(props::INCLUDE_IN_EXPORT, PropertyValue::Bool(true));
        let mut stream = self.store.scan(folder_filter).await?;
        while let Some(record) = stream.next().await? {
            if let Some(entity) =
                self.materializer
                    .materialize(&SystemContext, record, None, true, false)
            {
                roots.push(GraphObject::Node(entity));
            }
        }

        for kind in [EntityKind::Document, EntityKind::RootDocument] {
            let mut stream = self
                .store
                .scan(ScanFilter::by_type(kind.type_name()))
                .await?;
            while let Some(record) = stream.next().await? {
                if let Some(entity) =
                    self.materializer
                        .materialize(&SystemContext, record, None, true, false)
                {
                    roots.push(GraphObject::Node(entity));
                }
            }
        }

        Ok(roots)
    }

    /// Export the closure of the export roots to a bundle file.
    pub async fn export(&self, path: &Path) -> Result<SyncReport> {
        let path = self.resolve_path(path);
        let roots = self.collect_roots().await?;
        let walker = GraphClosureWalker::new(StoreRelations::new(
            Arc::clone(&self.store),
            Arc::clone(&self.materializer),
        ));
        let closure = walker.compute_closure(roots).await?;

        let report = SyncReport {
            nodes: closure.node_count(),
            relationships: closure.relationship_count(),
            files: closure.files.len(),
        };

        let bundle = ExportBundle::from_closure(closure);
        bundle.write_to(&path, self.config.pretty)?;

        tracing::info!(
            path = %path.display(),
            nodes = report.nodes,
            relationships = report.relationships,
            files = report.files,
            "Graph exported"
        );
        Ok(report)
    }

    /// Import a bundle file: verify integrity, restore all records in
    /// one bulk transaction, then merge-repair duplicate singletons.
    pub async fn import(&self, path: &Path) -> Result<SyncReport> {
        let path = self.resolve_path(path);
        let bundle = ExportBundle::read_from(&path)?;
        let report = SyncReport {
            nodes: bundle.nodes.len(),
            relationships: bundle.relationships.len(),
            files: bundle.files.len(),
        };

        // Restore in ascending original-key order so relative creation
        // recency survives the key remap.
        let mut nodes = bundle.nodes;
        nodes.sort_by_key(|n| n.key);

        let mut txn = self.store.begin().await?;
        let mut key_map: HashMap<u64, NodeKey> = HashMap::new();
        for record in nodes {
            let original = record.key.0;
            let restored = txn.restore_node(record).await?;
            key_map.insert(original, restored);
        }
        for record in bundle.relationships {
            let (Some(&source), Some(&target)) = (
                key_map.get(&record.source.0),
                key_map.get(&record.target.0),
            ) else {
                tracing::warn!(
                    edge = %record.key,
                    "Skipping relationship with endpoints outside the bundle"
                );
                continue;
            };
            txn.restore_edge(RawEdge {
                source,
                target,
                ..record
            })
            .await?;
        }
        txn.commit().await?;

        // Import done; duplicate singletons need special care, in
        // their own transaction.
        let merged = self.repair_singletons().await?;

        tracing::info!(
            path = %path.display(),
            nodes = report.nodes,
            relationships = report.relationships,
            merged_singletons = merged,
            "Graph imported"
        );
        Ok(report)
    }

    /// Merge-repair declared singletons: if more than one instance of
    /// a singleton kind exists, keep the one with the highest key (the
    /// most recently created), give it the concatenation of all child
    /// lists in ascending key order (older first, newest appended),
    /// and delete the superseded instances. Returns how many instances
    /// were removed.
    pub async fn repair_singletons(&self) -> Result<usize> {
        let mut removed = 0;

        for kind in EntityKind::ALL.into_iter().filter(|k| k.is_singleton()) {
            let mut stream = self
                .store
                .scan(ScanFilter::by_type(kind.type_name()))
                .await?;

            // The repair query must see hidden and deleted instances.
            let mut instances = Vec::new();
            while let Some(record) = stream.next().await? {
                if let Some(entity) =
                    self.materializer
                        .materialize(&SystemContext, record, None, true, false)
                {
                    instances.push(entity);
                }
            }

            if instances.len() < 2 {
                continue;
            }

            instances.sort_by_key(|e| e.key());
            let Some(keeper) = instances.last() else {
                continue;
            };
            let merged: Vec<String> = instances.iter().flat_map(|e| e.elements()).collect();

            let mut txn = self.store.begin().await?;
            for superseded in &instances[..instances.len() - 1] {
                txn.delete_node(superseded.key()).await?;
            }
            txn.set_property(keeper.key(), props::ELEMENTS, PropertyValue::List(merged))
                .await?;
            txn.commit().await?;

            removed += instances.len() - 1;
            tracing::info!(
                kind = %kind,
                keeper = %keeper.key(),
                removed = instances.len() - 1,
                "Merged duplicate singleton instances"
            );
        }

        Ok(removed)
    }
}
