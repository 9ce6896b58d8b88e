//! The graph store contract.
//!
//! The underlying storage engine is consumed as an opaque service
//! through these traits. The object layer never owns record
//! persistence; it reads records, buffers mutations into a
//! [`StoreTransaction`], and relies on the store's transaction
//! isolation for atomicity.

use async_trait::async_trait;
use uuid::Uuid;

use arbor_core::types::{
    Direction, EdgeKey, NodeKey, PropertyMap, PropertyValue, Propagation, RawEdge, RawNode,
    RecordFlags,
};

use crate::error::Result;

/// Filter for node scans.
#[derive(Debug, Clone, Default)]
pub struct ScanFilter {
    /// Restrict to records with this type attribute.
    pub type_name: Option<String>,
    /// Restrict to records whose property equals the given value.
    pub property: Option<(String, PropertyValue)>,
}

impl ScanFilter {
    pub fn by_type(type_name: &str) -> Self {
        Self {
            type_name: Some(type_name.to_string()),
            property: None,
        }
    }

    pub fn with_property(mut self, name: &str, value: PropertyValue) -> Self {
        self.property = Some((name.to_string(), value));
        self
    }
}

/// A lazy sequence of raw records produced by an index scan.
#[async_trait]
pub trait RecordStream: Send {
    /// Advisory result count. Index-backed scans may overcount because
    /// stale entries are only skipped during iteration; treat this as
    /// an estimate unless an exact count was explicitly forced.
    fn advisory_size(&self) -> usize;

    /// The next live record, or `None` when the scan is exhausted.
    /// Stale index entries are skipped silently.
    async fn next(&mut self) -> Result<Option<RawNode>>;
}

/// Read surface plus transaction entry point of the graph store.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Index scan over node records.
    async fn scan(&self, filter: ScanFilter) -> Result<Box<dyn RecordStream>>;

    /// Scan the proximity (secondary) index for a region. The yielded
    /// records are index hits, not graph records: each carries the
    /// backing node key in its `node_key` property and must be
    /// resolved through [`GraphStore::get`].
    async fn scan_proximity(&self, region: &str) -> Result<Box<dyn RecordStream>>;

    async fn get(&self, key: NodeKey) -> Result<RawNode>;

    async fn get_by_uuid(&self, uuid: Uuid) -> Result<RawNode>;

    async fn get_edge(&self, key: EdgeKey) -> Result<RawEdge>;

    /// Edges of one relation type incident to a node. `Outgoing`
    /// selects edges whose source is the node, `Incoming` edges whose
    /// target is, `Both` the union.
    async fn incident_edges(
        &self,
        node: NodeKey,
        relation: &str,
        direction: Direction,
    ) -> Result<Vec<RawEdge>>;

    /// All edges incident to a node regardless of relation type.
    async fn edges_of(&self, node: NodeKey, direction: Direction) -> Result<Vec<RawEdge>>;

    /// Begin a transaction. Nothing buffered in it is observable until
    /// `commit`; dropping the transaction discards it.
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>>;
}

/// A buffered store transaction. All mutations are staged and applied
/// atomically on commit; a failed commit applies nothing.
#[async_trait]
pub trait StoreTransaction: Send {
    /// Stage creation of a node and return the record it will become.
    /// The key is allocated eagerly (and burned on rollback).
    async fn create_node(
        &mut self,
        type_name: &str,
        props: PropertyMap,
        flags: RecordFlags,
    ) -> Result<RawNode>;

    /// Stage creation of an edge between two nodes.
    async fn create_edge(
        &mut self,
        type_name: &str,
        source: NodeKey,
        target: NodeKey,
        props: PropertyMap,
    ) -> Result<RawEdge>;

    /// Stage re-creation of an exported record under a fresh key,
    /// preserving uuid, properties, flags, and timestamps. Returns the
    /// new key.
    async fn restore_node(&mut self, record: RawNode) -> Result<NodeKey>;

    /// Stage re-creation of an exported edge. `source` and `target`
    /// must already be remapped to live keys by the caller.
    async fn restore_edge(&mut self, record: RawEdge) -> Result<EdgeKey>;

    async fn set_property(
        &mut self,
        node: NodeKey,
        name: &str,
        value: PropertyValue,
    ) -> Result<()>;

    /// Stage deletion of a node together with its incident edges.
    async fn delete_node(&mut self, key: NodeKey) -> Result<()>;

    /// Stage deletion of an edge. The relation's cascading-delete flag
    /// is honored by the store: `SourceToTarget` also deletes the
    /// target node, `TargetToSource` the source, `Both` both.
    async fn delete_edge(&mut self, key: EdgeKey, cascade: Propagation) -> Result<()>;

    /// Apply all staged mutations atomically.
    async fn commit(self: Box<Self>) -> Result<()>;

    /// Discard all staged mutations.
    async fn rollback(self: Box<Self>) -> Result<()>;
}
