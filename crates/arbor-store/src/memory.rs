//! In-process reference implementation of the graph store.
//!
//! Node and edge tables live behind one `RwLock`; a transaction
//! buffers its mutations and applies them under a single write-lock
//! acquisition, so readers never observe a half-applied transaction.
//!
//! The by-type index is append-only between compactions: deleting a
//! record leaves its index entry behind until `compact_indexes` runs.
//! Scans skip stale entries while iterating, which is exactly why
//! `advisory_size` may overcount.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use uuid::Uuid;

use arbor_core::config::StoreConfig;
use arbor_core::types::{
    props, Direction, EdgeKey, NodeKey, PropertyMap, PropertyValue, Propagation, RawEdge, RawNode,
    RecordFlags,
};

use crate::error::{Result, StoreError};
use crate::store::{GraphStore, RecordStream, ScanFilter, StoreTransaction};

// ── Graph data ───────────────────────────────────────────────────

#[derive(Default)]
struct GraphData {
    nodes: HashMap<u64, RawNode>,
    edges: HashMap<u64, RawEdge>,
    out_edges: HashMap<u64, Vec<u64>>,
    in_edges: HashMap<u64, Vec<u64>>,
    /// By-type index buckets in creation order. Stale entries persist
    /// until compaction.
    type_index: HashMap<String, Vec<u64>>,
    /// Proximity index: region → place node keys. Entries are not
    /// removed when a place is deleted; callers must resolve hits.
    proximity_index: HashMap<String, Vec<u64>>,
}

impl GraphData {
    fn insert_node(&mut self, node: RawNode) {
        let key = node.key.0;
        self.type_index
            .entry(node.type_name.clone())
            .or_default()
            .push(key);
        self.nodes.insert(key, node);
    }

    fn insert_edge(&mut self, edge: RawEdge) {
        let key = edge.key.0;
        self.out_edges.entry(edge.source.0).or_default().push(key);
        self.in_edges.entry(edge.target.0).or_default().push(key);
        self.edges.insert(key, edge);
    }

    fn remove_edge(&mut self, key: u64) -> Option<RawEdge> {
        let edge = self.edges.remove(&key)?;
        if let Some(bucket) = self.out_edges.get_mut(&edge.source.0) {
            bucket.retain(|k| *k != key);
        }
        if let Some(bucket) = self.in_edges.get_mut(&edge.target.0) {
            bucket.retain(|k| *k != key);
        }
        Some(edge)
    }

    /// Detach-delete: the node and all incident edges go together.
    /// The type-index entry is intentionally left stale.
    fn remove_node(&mut self, key: u64) -> Option<RawNode> {
        let node = self.nodes.remove(&key)?;
        let mut incident: Vec<u64> = self.out_edges.remove(&key).unwrap_or_default();
        incident.extend(self.in_edges.remove(&key).unwrap_or_default());
        for edge_key in incident {
            self.remove_edge(edge_key);
        }
        Some(node)
    }

    fn apply_delete_edge(&mut self, key: u64, cascade: Propagation) {
        if let Some(edge) = self.remove_edge(key) {
            match cascade {
                Propagation::None => {}
                Propagation::SourceToTarget => {
                    self.remove_node(edge.target.0);
                }
                Propagation::TargetToSource => {
                    self.remove_node(edge.source.0);
                }
                Propagation::Both => {
                    self.remove_node(edge.source.0);
                    self.remove_node(edge.target.0);
                }
            }
        }
    }
}

// ── Store ────────────────────────────────────────────────────────

/// Thread-safe in-process graph store. Clone is cheap (inner Arc).
#[derive(Clone)]
pub struct MemoryStore {
    data: Arc<RwLock<GraphData>>,
    next_node_key: Arc<AtomicU64>,
    next_edge_key: Arc<AtomicU64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_config(&StoreConfig::default())
    }

    pub fn with_config(config: &StoreConfig) -> Self {
        let data = GraphData {
            nodes: HashMap::with_capacity(config.initial_node_capacity),
            edges: HashMap::with_capacity(config.initial_edge_capacity),
            ..Default::default()
        };
        Self {
            data: Arc::new(RwLock::new(data)),
            next_node_key: Arc::new(AtomicU64::new(1)),
            next_edge_key: Arc::new(AtomicU64::new(1)),
        }
    }

    fn alloc_node_key(&self) -> NodeKey {
        NodeKey(self.next_node_key.fetch_add(1, Ordering::SeqCst))
    }

    fn alloc_edge_key(&self) -> EdgeKey {
        EdgeKey(self.next_edge_key.fetch_add(1, Ordering::SeqCst))
    }

    /// Create and commit a single node (auto-commit shortcut).
    pub async fn put_node(
        &self,
        type_name: &str,
        props: PropertyMap,
        flags: RecordFlags,
    ) -> Result<RawNode> {
        let now = Utc::now();
        let node = RawNode {
            key: self.alloc_node_key(),
            uuid: Uuid::new_v4(),
            type_name: type_name.to_string(),
            flags,
            props,
            created_at: now,
            modified_at: now,
        };
        self.data.write().insert_node(node.clone());
        Ok(node)
    }

    /// Create and commit a single edge (auto-commit shortcut).
    pub async fn put_edge(
        &self,
        type_name: &str,
        source: NodeKey,
        target: NodeKey,
    ) -> Result<RawEdge> {
        let edge = {
            let mut data = self.data.write();
            if !data.nodes.contains_key(&source.0) {
                return Err(StoreError::node_not_found(source));
            }
            if !data.nodes.contains_key(&target.0) {
                return Err(StoreError::node_not_found(target));
            }
            let edge = RawEdge {
                key: self.alloc_edge_key(),
                uuid: Uuid::new_v4(),
                type_name: type_name.to_string(),
                source,
                target,
                props: PropertyMap::new(),
                created_at: Utc::now(),
            };
            data.insert_edge(edge.clone());
            edge
        };
        Ok(edge)
    }

    /// Register a place node under a region in the proximity index.
    pub fn index_place(&self, region: &str, place: NodeKey) {
        self.data
            .write()
            .proximity_index
            .entry(region.to_string())
            .or_default()
            .push(place.0);
    }

    /// Drop stale by-type index entries. Until this runs, advisory
    /// scan sizes overcount deleted records.
    pub fn compact_indexes(&self) {
        let mut data = self.data.write();
        let live: HashSet<u64> = data.nodes.keys().copied().collect();
        for bucket in data.type_index.values_mut() {
            bucket.retain(|k| live.contains(k));
        }
    }

    /// Number of live node records.
    pub fn node_count(&self) -> usize {
        self.data.read().nodes.len()
    }

    /// Number of live edge records.
    pub fn edge_count(&self) -> usize {
        self.data.read().edges.len()
    }

    fn collect_edges(
        &self,
        node: NodeKey,
        relation: Option<&str>,
        direction: Direction,
    ) -> Vec<RawEdge> {
        let data = self.data.read();
        let mut seen = HashSet::new();
        let mut result = Vec::new();

        let buckets: Vec<&Vec<u64>> = match direction {
            Direction::Outgoing => data.out_edges.get(&node.0).into_iter().collect(),
            Direction::Incoming => data.in_edges.get(&node.0).into_iter().collect(),
            Direction::Both => data
                .out_edges
                .get(&node.0)
                .into_iter()
                .chain(data.in_edges.get(&node.0))
                .collect(),
        };

        for bucket in buckets {
            for key in bucket {
                if !seen.insert(*key) {
                    continue;
                }
                if let Some(edge) = data.edges.get(key) {
                    if relation.map_or(true, |r| edge.type_name == r) {
                        result.push(edge.clone());
                    }
                }
            }
        }

        result
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GraphStore for MemoryStore {
    async fn scan(&self, filter: ScanFilter) -> Result<Box<dyn RecordStream>> {
        let (keys, advisory) = {
            let data = self.data.read();
            match &filter.type_name {
                Some(type_name) => {
                    let bucket = data
                        .type_index
                        .get(type_name)
                        .cloned()
                        .unwrap_or_default();
                    let advisory = bucket.len();
                    (bucket, advisory)
                }
                None => {
                    let mut keys: Vec<u64> = data.nodes.keys().copied().collect();
                    keys.sort_unstable();
                    let advisory = keys.len();
                    (keys, advisory)
                }
            }
        };

        Ok(Box::new(MemRecordStream {
            data: Arc::clone(&self.data),
            keys: keys.into_iter(),
            advisory,
            filter,
        }))
    }

    async fn scan_proximity(&self, region: &str) -> Result<Box<dyn RecordStream>> {
        let hits = {
            let data = self.data.read();
            data.proximity_index
                .get(region)
                .cloned()
                .unwrap_or_default()
        };
        let advisory = hits.len();
        Ok(Box::new(ProximityStream {
            hits: hits.into_iter(),
            advisory,
        }))
    }

    async fn get(&self, key: NodeKey) -> Result<RawNode> {
        self.data
            .read()
            .nodes
            .get(&key.0)
            .cloned()
            .ok_or_else(|| StoreError::node_not_found(key))
    }

    async fn get_by_uuid(&self, uuid: Uuid) -> Result<RawNode> {
        self.data
            .read()
            .nodes
            .values()
            .find(|n| n.uuid == uuid)
            .cloned()
            .ok_or_else(|| StoreError::node_not_found(uuid))
    }

    async fn get_edge(&self, key: EdgeKey) -> Result<RawEdge> {
        self.data
            .read()
            .edges
            .get(&key.0)
            .cloned()
            .ok_or_else(|| StoreError::edge_not_found(key))
    }

    async fn incident_edges(
        &self,
        node: NodeKey,
        relation: &str,
        direction: Direction,
    ) -> Result<Vec<RawEdge>> {
        Ok(self.collect_edges(node, Some(relation), direction))
    }

    async fn edges_of(&self, node: NodeKey, direction: Direction) -> Result<Vec<RawEdge>> {
        Ok(self.collect_edges(node, None, direction))
    }

    async fn begin(&self) -> Result<Box<dyn StoreTransaction>> {
        Ok(Box::new(MemTransaction {
            store: self.clone(),
            ops: Vec::new(),
        }))
    }
}

// ── Streams ──────────────────────────────────────────────────────

struct MemRecordStream {
    data: Arc<RwLock<GraphData>>,
    keys: std::vec::IntoIter<u64>,
    advisory: usize,
    filter: ScanFilter,
}

#[async_trait]
impl RecordStream for MemRecordStream {
    fn advisory_size(&self) -> usize {
        self.advisory
    }

    async fn next(&mut self) -> Result<Option<RawNode>> {
        loop {
            let Some(key) = self.keys.next() else {
                return Ok(None);
            };
            let data = self.data.read();
            let Some(node) = data.nodes.get(&key) else {
                // Stale index entry.
                continue;
            };
            if let Some(type_name) = &self.filter.type_name {
                if &node.type_name != type_name {
                    continue;
                }
            }
            if let Some((prop, value)) = &self.filter.property {
                if node.property(prop) != Some(value) {
                    continue;
                }
            }
            return Ok(Some(node.clone()));
        }
    }
}

/// Stream of synthetic proximity-index hit records. A hit is an index
/// entry, not a graph record: only its `node_key` property is
/// meaningful, and it may reference a record that no longer exists.
struct ProximityStream {
    hits: std::vec::IntoIter<u64>,
    advisory: usize,
}

#[async_trait]
impl RecordStream for ProximityStream {
    fn advisory_size(&self) -> usize {
        self.advisory
    }

    async fn next(&mut self) -> Result<Option<RawNode>> {
        let Some(key) = self.hits.next() else {
            return Ok(None);
        };
        let now = Utc::now();
        let mut hit_props = PropertyMap::new();
        hit_props.insert(props::NODE_KEY.to_string(), PropertyValue::Int(key as i64));
        Ok(Some(RawNode {
            key: NodeKey(key),
            uuid: Uuid::new_v4(),
            type_name: "ProximityHit".to_string(),
            flags: RecordFlags::default(),
            props: hit_props,
            created_at: now,
            modified_at: now,
        }))
    }
}

// ── Transaction ──────────────────────────────────────────────────

enum TxOp {
    CreateNode(RawNode),
    CreateEdge(RawEdge),
    SetProperty {
        node: NodeKey,
        name: String,
        value: PropertyValue,
    },
    DeleteNode(NodeKey),
    DeleteEdge {
        key: EdgeKey,
        cascade: Propagation,
    },
}

/// Buffered transaction over a [`MemoryStore`]. Commit validates the
/// whole batch against current state plus staged effects, then applies
/// it under one write-lock acquisition; a validation failure applies
/// nothing.
struct MemTransaction {
    store: MemoryStore,
    ops: Vec<TxOp>,
}

#[async_trait]
impl StoreTransaction for MemTransaction {
    async fn create_node(
        &mut self,
        type_name: &str,
        props: PropertyMap,
        flags: RecordFlags,
    ) -> Result<RawNode> {
        let now = Utc::now();
        let node = RawNode {
            key: self.store.alloc_node_key(),
            uuid: Uuid::new_v4(),
            type_name: type_name.to_string(),
            flags,
            props,
            created_at: now,
            modified_at: now,
        };
        self.ops.push(TxOp::CreateNode(node.clone()));
        Ok(node)
    }

    async fn create_edge(
        &mut self,
        type_name: &str,
        source: NodeKey,
        target: NodeKey,
        props: PropertyMap,
    ) -> Result<RawEdge> {
        let edge = RawEdge {
            key: self.store.alloc_edge_key(),
            uuid: Uuid::new_v4(),
            type_name: type_name.to_string(),
            source,
            target,
            props,
            created_at: Utc::now(),
        };
        self.ops.push(TxOp::CreateEdge(edge.clone()));
        Ok(edge)
    }

    async fn restore_node(&mut self, record: RawNode) -> Result<NodeKey> {
        let key = self.store.alloc_node_key();
        self.ops.push(TxOp::CreateNode(RawNode { key, ..record }));
        Ok(key)
    }

    async fn restore_edge(&mut self, record: RawEdge) -> Result<EdgeKey> {
        let key = self.store.alloc_edge_key();
        self.ops.push(TxOp::CreateEdge(RawEdge { key, ..record }));
        Ok(key)
    }

    async fn set_property(
        &mut self,
        node: NodeKey,
        name: &str,
        value: PropertyValue,
    ) -> Result<()> {
        self.ops.push(TxOp::SetProperty {
            node,
            name: name.to_string(),
            value,
        });
        Ok(())
    }

    async fn delete_node(&mut self, key: NodeKey) -> Result<()> {
        self.ops.push(TxOp::DeleteNode(key));
        Ok(())
    }

    async fn delete_edge(&mut self, key: EdgeKey, cascade: Propagation) -> Result<()> {
        self.ops.push(TxOp::DeleteEdge { key, cascade });
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let data_lock = Arc::clone(&self.store.data);
        let mut data = data_lock.write();

        // Validation pass: simulate the batch against committed state.
        let mut live_nodes: HashSet<u64> = data.nodes.keys().copied().collect();
        let mut staged_edges: HashMap<u64, (u64, u64)> = HashMap::new();
        for op in &self.ops {
            match op {
                TxOp::CreateNode(node) => {
                    live_nodes.insert(node.key.0);
                }
                TxOp::CreateEdge(edge) => {
                    if !live_nodes.contains(&edge.source.0) {
                        return Err(StoreError::TransactionFailure(format!(
                            "edge source {} does not exist",
                            edge.source
                        )));
                    }
                    if !live_nodes.contains(&edge.target.0) {
                        return Err(StoreError::TransactionFailure(format!(
                            "edge target {} does not exist",
                            edge.target
                        )));
                    }
                    staged_edges.insert(edge.key.0, (edge.source.0, edge.target.0));
                }
                TxOp::SetProperty { node, .. } => {
                    if !live_nodes.contains(&node.0) {
                        return Err(StoreError::TransactionFailure(format!(
                            "node {node} does not exist"
                        )));
                    }
                }
                TxOp::DeleteNode(key) => {
                    live_nodes.remove(&key.0);
                }
                TxOp::DeleteEdge { key, cascade } => {
                    let endpoints = staged_edges
                        .remove(&key.0)
                        .or_else(|| data.edges.get(&key.0).map(|e| (e.source.0, e.target.0)));
                    if let Some((source, target)) = endpoints {
                        match cascade {
                            Propagation::None => {}
                            Propagation::SourceToTarget => {
                                live_nodes.remove(&target);
                            }
                            Propagation::TargetToSource => {
                                live_nodes.remove(&source);
                            }
                            Propagation::Both => {
                                live_nodes.remove(&source);
                                live_nodes.remove(&target);
                            }
                        }
                    }
                }
            }
        }

        // Apply pass: all or nothing from here on.
        for op in self.ops {
            match op {
                TxOp::CreateNode(node) => data.insert_node(node),
                TxOp::CreateEdge(edge) => data.insert_edge(edge),
                TxOp::SetProperty { node, name, value } => {
                    if let Some(record) = data.nodes.get_mut(&node.0) {
                        record.props.insert(name, value);
                        record.modified_at = Utc::now();
                    }
                }
                TxOp::DeleteNode(key) => {
                    data.remove_node(key.0);
                }
                TxOp::DeleteEdge { key, cascade } => {
                    data.apply_delete_edge(key.0, cascade);
                }
            }
        }

        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        tracing::debug!(ops = self.ops.len(), "Transaction rolled back");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props_with(name: &str, value: PropertyValue) -> PropertyMap {
        let mut props = PropertyMap::new();
        props.insert(name.to_string(), value);
        props
    }

    #[tokio::test]
    async fn put_and_get_roundtrip() {
        let store = MemoryStore::new();
        let node = store
            .put_node("Document", props_with("name", "a".into()), RecordFlags::default())
            .await
            .unwrap();

        let fetched = store.get(node.key).await.unwrap();
        assert_eq!(fetched, node);

        let by_uuid = store.get_by_uuid(node.uuid).await.unwrap();
        assert_eq!(by_uuid.key, node.key);

        let missing = store.get(NodeKey(999)).await;
        assert!(matches!(missing, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn transaction_commit_makes_changes_visible() {
        let store = MemoryStore::new();
        let mut txn = store.begin().await.unwrap();
        let node = txn
            .create_node("Document", PropertyMap::new(), RecordFlags::default())
            .await
            .unwrap();

        // Buffered, not yet visible.
        assert!(store.get(node.key).await.is_err());

        txn.commit().await.unwrap();
        assert!(store.get(node.key).await.is_ok());
    }

    #[tokio::test]
    async fn transaction_rollback_discards_everything() {
        let store = MemoryStore::new();
        let mut txn = store.begin().await.unwrap();
        let node = txn
            .create_node("Document", PropertyMap::new(), RecordFlags::default())
            .await
            .unwrap();
        txn.rollback().await.unwrap();

        assert!(store.get(node.key).await.is_err());
        assert_eq!(store.node_count(), 0);
    }

    #[tokio::test]
    async fn failed_commit_applies_nothing() {
        let store = MemoryStore::new();
        let mut txn = store.begin().await.unwrap();
        let node = txn
            .create_node("Document", PropertyMap::new(), RecordFlags::default())
            .await
            .unwrap();
        // Edge to a node that does not exist anywhere.
        txn.create_edge("REFERS_TO", node.key, NodeKey(4711), PropertyMap::new())
            .await
            .unwrap();

        let result = txn.commit().await;
        assert!(matches!(result, Err(StoreError::TransactionFailure(_))));
        // The valid node creation was not applied either.
        assert_eq!(store.node_count(), 0);
    }

    #[tokio::test]
    async fn delete_node_detaches_incident_edges() {
        let store = MemoryStore::new();
        let a = store
            .put_node("Document", PropertyMap::new(), RecordFlags::default())
            .await
            .unwrap();
        let b = store
            .put_node("Document", PropertyMap::new(), RecordFlags::default())
            .await
            .unwrap();
        let edge = store.put_edge("REFERS_TO", a.key, b.key).await.unwrap();

        let mut txn = store.begin().await.unwrap();
        txn.delete_node(b.key).await.unwrap();
        txn.commit().await.unwrap();

        assert!(store.get_edge(edge.key).await.is_err());
        assert!(store.get(a.key).await.is_ok());
    }

    #[tokio::test]
    async fn cascading_edge_delete_removes_target() {
        let store = MemoryStore::new();
        let folder = store
            .put_node("Folder", PropertyMap::new(), RecordFlags::default())
            .await
            .unwrap();
        let file = store
            .put_node("File", PropertyMap::new(), RecordFlags::default())
            .await
            .unwrap();
        let edge = store.put_edge("CONTAINS", folder.key, file.key).await.unwrap();

        let mut txn = store.begin().await.unwrap();
        txn.delete_edge(edge.key, Propagation::SourceToTarget)
            .await
            .unwrap();
        txn.commit().await.unwrap();

        assert!(store.get(file.key).await.is_err());
        assert!(store.get(folder.key).await.is_ok());
    }

    #[tokio::test]
    async fn advisory_size_overcounts_until_compaction() {
        let store = MemoryStore::new();
        for _ in 0..5 {
            store
                .put_node("Document", PropertyMap::new(), RecordFlags::default())
                .await
                .unwrap();
        }
        let victim = store
            .put_node("Document", PropertyMap::new(), RecordFlags::default())
            .await
            .unwrap();
        let mut txn = store.begin().await.unwrap();
        txn.delete_node(victim.key).await.unwrap();
        txn.commit().await.unwrap();

        // The index still counts the deleted record...
        let mut stream = store.scan(ScanFilter::by_type("Document")).await.unwrap();
        assert_eq!(stream.advisory_size(), 6);

        // ...but iteration skips it.
        let mut live = 0;
        while stream.next().await.unwrap().is_some() {
            live += 1;
        }
        assert_eq!(live, 5);

        store.compact_indexes();
        let stream = store.scan(ScanFilter::by_type("Document")).await.unwrap();
        assert_eq!(stream.advisory_size(), 5);
    }

    #[tokio::test]
    async fn property_filter_scan() {
        let store = MemoryStore::new();
        store
            .put_node("Folder", props_with("color", "red".into()), RecordFlags::default())
            .await
            .unwrap();
        let blue = store
            .put_node("Folder", props_with("color", "blue".into()), RecordFlags::default())
            .await
            .unwrap();

        let filter = ScanFilter::by_type("Folder").with_property("color", "blue".into());
        let mut stream = store.scan(filter).await.unwrap();
        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.key, blue.key);
        assert!(stream.next().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn incident_edges_filter_by_direction_and_relation() {
        let store = MemoryStore::new();
        let person = store
            .put_node("Person", PropertyMap::new(), RecordFlags::default())
            .await
            .unwrap();
        let doc = store
            .put_node("Document", PropertyMap::new(), RecordFlags::default())
            .await
            .unwrap();
        store.put_edge("OWNS", person.key, doc.key).await.unwrap();
        store.put_edge("REFERS_TO", doc.key, doc.key).await.unwrap();

        let outgoing = store
            .incident_edges(person.key, "OWNS", Direction::Outgoing)
            .await
            .unwrap();
        assert_eq!(outgoing.len(), 1);

        let incoming = store
            .incident_edges(doc.key, "OWNS", Direction::Incoming)
            .await
            .unwrap();
        assert_eq!(incoming.len(), 1);

        let none = store
            .incident_edges(person.key, "OWNS", Direction::Incoming)
            .await
            .unwrap();
        assert!(none.is_empty());

        // A self-loop shows up once under Both.
        let both = store
            .incident_edges(doc.key, "REFERS_TO", Direction::Both)
            .await
            .unwrap();
        assert_eq!(both.len(), 1);
    }

    #[tokio::test]
    async fn proximity_hits_reference_backing_records() {
        let store = MemoryStore::new();
        let place = store
            .put_node("Place", PropertyMap::new(), RecordFlags::default())
            .await
            .unwrap();
        store.index_place("harbor", place.key);

        let mut stream = store.scan_proximity("harbor").await.unwrap();
        assert_eq!(stream.advisory_size(), 1);
        let hit = stream.next().await.unwrap().unwrap();
        let backing = hit.property(props::NODE_KEY).and_then(|v| v.as_i64());
        assert_eq!(backing, Some(place.key.0 as i64));

        // Deleting the place leaves the index entry behind.
        let mut txn = store.begin().await.unwrap();
        txn.delete_node(place.key).await.unwrap();
        txn.commit().await.unwrap();

        let mut stream = store.scan_proximity("harbor").await.unwrap();
        assert_eq!(stream.advisory_size(), 1);
        let stale = stream.next().await.unwrap().unwrap();
        let stale_key = stale.property(props::NODE_KEY).and_then(|v| v.as_i64()).unwrap();
        assert!(store.get(NodeKey(stale_key as u64)).await.is_err());
    }
}
