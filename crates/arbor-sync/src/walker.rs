//! Cycle-safe graph closure computation.
//!
//! The walker computes the transitive closure of graph objects
//! reachable from a set of roots through the related-objects
//! capability. Dedup is identity-based over store keys: an object is
//! added to the visited set *before* its related objects are explored,
//! and an "already present" add stops the descent. That is the sole
//! cycle-breaking mechanism.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use arbor_core::security::SystemContext;
use arbor_core::types::{Direction, RawEdge, RawNode};
use arbor_object::{Entity, EntityMaterializer, GraphObject, Relationship};
use arbor_store::GraphStore;

use crate::error::Result;

/// The three disjoint collections accumulated during one walk.
/// Scoped to a single export/import operation.
#[derive(Debug, Default)]
pub struct ClosureSet {
    visited_nodes: HashSet<u64>,
    visited_edges: HashSet<u64>,
    /// Node records in discovery order.
    pub nodes: Vec<RawNode>,
    /// Edge records in discovery order.
    pub relationships: Vec<RawEdge>,
    /// Stable identifiers of file content carried by visited entities.
    pub files: BTreeSet<Uuid>,
}

impl ClosureSet {
    /// Identity-based add; `false` means the node was already present.
    fn add_node(&mut self, record: RawNode) -> bool {
        if !self.visited_nodes.insert(record.key.0) {
            return false;
        }
        self.nodes.push(record);
        true
    }

    /// Identity-based add; `false` means the edge was already present.
    fn add_relationship(&mut self, record: RawEdge) -> bool {
        if !self.visited_edges.insert(record.key.0) {
            return false;
        }
        self.relationships.push(record);
        true
    }

    pub fn contains_node(&self, key: u64) -> bool {
        self.visited_nodes.contains(&key)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn relationship_count(&self) -> usize {
        self.relationships.len()
    }
}

/// Capability of a graph object to name further objects that belong
/// into its closure.
///
/// An outer `None` means the object reported no sync data at all,
/// a data-quality signal that is logged but does not abort the walk.
/// `None` entries *inside* the sequence are skipped.
#[async_trait]
pub trait RelatedObjects: Send + Sync {
    async fn related_objects(
        &self,
        object: &GraphObject,
    ) -> Result<Option<Vec<Option<GraphObject>>>>;
}

/// Store-backed related-objects capability: a node relates to all of
/// its outgoing edges, a relationship to its two endpoint nodes.
pub struct StoreRelations {
    store: Arc<dyn GraphStore>,
    materializer: Arc<EntityMaterializer>,
}

impl StoreRelations {
    pub fn new(store: Arc<dyn GraphStore>, materializer: Arc<EntityMaterializer>) -> Self {
        Self {
            store,
            materializer,
        }
    }

    fn entity(&self, record: RawNode) -> Option<Entity> {
        // The walk runs in the system context: visibility filtering is
        // a listing concern, not a closure concern.
        self.materializer
            .materialize(&SystemContext, record, None, true, false)
    }
}

#[async_trait]
impl RelatedObjects for StoreRelations {
    async fn related_objects(
        &self,
        object: &GraphObject,
    ) -> Result<Option<Vec<Option<GraphObject>>>> {
        match object {
            GraphObject::Node(entity) => {
                let edges = self
                    .store
                    .edges_of(entity.key(), Direction::Outgoing)
                    .await?;
                let related = edges
                    .into_iter()
                    .map(|edge| Some(GraphObject::Relationship(Relationship::new(edge))))
                    .collect();
                Ok(Some(related))
            }
            GraphObject::Relationship(rel) => {
                let mut related = Vec::with_capacity(2);
                for key in [rel.source(), rel.target()] {
                    match self.store.get(key).await {
                        Ok(record) => {
                            related.push(self.entity(record).map(GraphObject::Node));
                        }
                        Err(_) => related.push(None),
                    }
                }
                Ok(Some(related))
            }
        }
    }
}

/// Depth-first closure walker over the related-objects capability.
pub struct GraphClosureWalker<R: RelatedObjects> {
    relations: R,
}

impl<R: RelatedObjects> GraphClosureWalker<R> {
    pub fn new(relations: R) -> Self {
        Self { relations }
    }

    /// Compute the closure of all graph objects reachable from the
    /// roots. Terminates on cyclic graphs; every node and relationship
    /// appears exactly once.
    pub async fn compute_closure(&self, roots: Vec<GraphObject>) -> Result<ClosureSet> {
        let mut closure = ClosureSet::default();
        let mut stack: Vec<GraphObject> = roots;

        while let Some(object) = stack.pop() {
            let added = match &object {
                GraphObject::Node(entity) => {
                    if let Some(content_id) = entity.content_id() {
                        closure.files.insert(content_id);
                    }
                    closure.add_node(entity.record().clone())
                }
                GraphObject::Relationship(rel) => closure.add_relationship(rel.record().clone()),
            };

            if !added {
                continue;
            }

            match self.relations.related_objects(&object).await? {
                Some(related) => {
                    for item in related {
                        // The sequence can contain null entries.
                        if let Some(next) = item {
                            stack.push(next);
                        }
                    }
                }
                None => {
                    let id = match &object {
                        GraphObject::Node(entity) => entity.key().to_string(),
                        GraphObject::Relationship(rel) => rel.key().to_string(),
                    };
                    tracing::warn!(id, "Graph object returned no related objects");
                }
            }
        }

        Ok(closure)
    }
}
