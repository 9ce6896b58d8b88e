//! Relationship cardinality enforcement.
//!
//! Declared "at most one" multiplicities are not rejected but
//! self-healed: before a new edge of a relation type is committed, any
//! conflicting existing edge is deleted inside the same transaction.
//! Either the old edge is gone and the new one exists, or the whole
//! attempt rolls back; no transient state with both edges is ever
//! observable outside the transaction.

use std::sync::Arc;

use arbor_core::security::SecurityContext;
use arbor_core::types::{
    Direction, EntityKind, Multiplicity, PropertyMap, RawEdge, RelationType,
};
use arbor_store::{GraphStore, StoreTransaction};

use crate::entity::Entity;
use crate::error::Result;
use crate::registry::TypeRegistry;

/// Enforces declared relation multiplicities around edge creation.
pub struct RelationCardinalityEngine {
    registry: Arc<TypeRegistry>,
}

impl RelationCardinalityEngine {
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self { registry }
    }

    /// The actual current kind of a record, resolved through the
    /// registry. Compatibility tests run against this, not against the
    /// kind an entity was created as. Stale schema relationships must
    /// not mask a conflict.
    fn live_kind(&self, type_name: &str) -> EntityKind {
        self.registry.resolve_or_generic(type_name).kind
    }

    /// Stage deletion of every edge that would violate the relation's
    /// declared multiplicity once the new edge exists.
    ///
    /// Must run inside the same transaction that creates the new edge.
    pub async fn ensure_cardinality(
        &self,
        _ctx: &dyn SecurityContext,
        store: &dyn GraphStore,
        txn: &mut dyn StoreTransaction,
        relation: &RelationType,
        source: Option<&Entity>,
        target: Option<&Entity>,
    ) -> Result<()> {
        if relation.source_multiplicity == Multiplicity::One {
            if let Some(source) = source {
                let outgoing = store
                    .incident_edges(source.key(), &relation.name, Direction::Outgoing)
                    .await?;
                for edge in outgoing {
                    let Ok(other) = store.get(edge.target).await else {
                        continue;
                    };
                    if relation.accepts_target(self.live_kind(&other.type_name)) {
                        tracing::debug!(
                            edge = %edge.key,
                            relation = %relation.name,
                            "Deleting outgoing edge to satisfy source multiplicity"
                        );
                        txn.delete_edge(edge.key, relation.cascade_delete).await?;
                    }
                }
            }
        }

        if relation.target_multiplicity == Multiplicity::One {
            if let Some(target) = target {
                let incoming = store
                    .incident_edges(target.key(), &relation.name, Direction::Incoming)
                    .await?;
                for edge in incoming {
                    let Ok(other) = store.get(edge.source).await else {
                        continue;
                    };
                    if relation.accepts_source(self.live_kind(&other.type_name)) {
                        tracing::debug!(
                            edge = %edge.key,
                            relation = %relation.name,
                            "Deleting incoming edge to satisfy target multiplicity"
                        );
                        txn.delete_edge(edge.key, relation.cascade_delete).await?;
                    }
                }
            }
        }

        Ok(())
    }

    /// Create an edge of `relation` between two entities, enforcing
    /// cardinality in the same transaction. The whole attempt commits
    /// or rolls back as one unit.
    pub async fn create_relationship(
        &self,
        ctx: &dyn SecurityContext,
        store: &dyn GraphStore,
        relation: &RelationType,
        source: &Entity,
        target: &Entity,
    ) -> Result<RawEdge> {
        let mut txn = store.begin().await?;

        if let Err(e) = self
            .ensure_cardinality(ctx, store, txn.as_mut(), relation, Some(source), Some(target))
            .await
        {
            let _ = txn.rollback().await;
            return Err(e);
        }

        let edge = match txn
            .create_edge(&relation.name, source.key(), target.key(), PropertyMap::new())
            .await
        {
            Ok(edge) => edge,
            Err(e) => {
                let _ = txn.rollback().await;
                return Err(e.into());
            }
        };

        txn.commit().await?;
        Ok(edge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_core::security::Principal;
    use arbor_core::types::{NodeKey, PropertyMap, Propagation, RecordFlags};
    use arbor_store::MemoryStore;

    use crate::materializer::EntityMaterializer;

    struct Fixture {
        store: MemoryStore,
        engine: RelationCardinalityEngine,
        materializer: EntityMaterializer,
        ctx: Principal,
    }

    impl Fixture {
        fn new() -> Self {
            let registry = Arc::new(TypeRegistry::new());
            Self {
                store: MemoryStore::new(),
                engine: RelationCardinalityEngine::new(Arc::clone(&registry)),
                materializer: EntityMaterializer::new(registry),
                ctx: Principal::new("alice"),
            }
        }

        async fn entity(&self, type_name: &str) -> Entity {
            let node = self
                .store
                .put_node(type_name, PropertyMap::new(), RecordFlags::default())
                .await
                .unwrap();
            self.materializer
                .materialize(&self.ctx, node, None, false, false)
                .unwrap()
        }

        async fn outgoing(&self, node: NodeKey, relation: &str) -> Vec<RawEdge> {
            self.store
                .incident_edges(node, relation, Direction::Outgoing)
                .await
                .unwrap()
        }
    }

    fn one_to_many(name: &str) -> RelationType {
        RelationType::new(
            name,
            EntityKind::Person,
            Multiplicity::One,
            EntityKind::Document,
            Multiplicity::Many,
        )
    }

    #[tokio::test]
    async fn source_multiplicity_one_replaces_existing_edge() {
        let f = Fixture::new();
        let relation = one_to_many("DRAFTS");
        let a = f.entity("Person").await;
        let b = f.entity("Document").await;
        let c = f.entity("Document").await;

        f.engine
            .create_relationship(&f.ctx, &f.store, &relation, &a, &b)
            .await
            .unwrap();
        f.engine
            .create_relationship(&f.ctx, &f.store, &relation, &a, &c)
            .await
            .unwrap();

        let edges = f.outgoing(a.key(), "DRAFTS").await;
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].target, c.key());
    }

    #[tokio::test]
    async fn target_multiplicity_one_replaces_incoming_edge() {
        let f = Fixture::new();
        let relation = RelationType::new(
            "OWNS",
            EntityKind::Person,
            Multiplicity::Many,
            EntityKind::Document,
            Multiplicity::One,
        );
        let alice = f.entity("Person").await;
        let bob = f.entity("Person").await;
        let doc = f.entity("Document").await;

        f.engine
            .create_relationship(&f.ctx, &f.store, &relation, &alice, &doc)
            .await
            .unwrap();
        f.engine
            .create_relationship(&f.ctx, &f.store, &relation, &bob, &doc)
            .await
            .unwrap();

        let incoming = f
            .store
            .incident_edges(doc.key(), "OWNS", Direction::Incoming)
            .await
            .unwrap();
        assert_eq!(incoming.len(), 1);
        assert_eq!(incoming[0].source, bob.key());
    }

    #[tokio::test]
    async fn incompatible_live_kind_is_left_alone() {
        let f = Fixture::new();
        let relation = one_to_many("DRAFTS");
        let a = f.entity("Person").await;
        let folder = f.entity("Folder").await;
        let doc = f.entity("Document").await;

        // A pre-existing DRAFTS edge to a Folder: not a valid target of
        // the declared relation, so the engine must not touch it.
        f.store
            .put_edge("DRAFTS", a.key(), folder.key())
            .await
            .unwrap();

        f.engine
            .create_relationship(&f.ctx, &f.store, &relation, &a, &doc)
            .await
            .unwrap();

        let edges = f.outgoing(a.key(), "DRAFTS").await;
        assert_eq!(edges.len(), 2);
    }

    #[tokio::test]
    async fn failed_attempt_leaves_old_edge_intact() {
        let f = Fixture::new();
        let relation = one_to_many("DRAFTS");
        let a = f.entity("Person").await;
        let b = f.entity("Document").await;
        let c = f.entity("Document").await;

        f.engine
            .create_relationship(&f.ctx, &f.store, &relation, &a, &b)
            .await
            .unwrap();

        // Delete c underneath the attempt: commit must fail and the
        // staged cardinality fix-up must not stick.
        let mut txn = f.store.begin().await.unwrap();
        txn.delete_node(c.key()).await.unwrap();
        txn.commit().await.unwrap();

        let result = f
            .engine
            .create_relationship(&f.ctx, &f.store, &relation, &a, &c)
            .await;
        assert!(result.is_err());

        let edges = f.outgoing(a.key(), "DRAFTS").await;
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].target, b.key());
    }

    #[tokio::test]
    async fn cascade_flag_is_delegated_to_the_store() {
        let f = Fixture::new();
        let relation = one_to_many("DRAFTS").with_cascade_delete(Propagation::SourceToTarget);
        let a = f.entity("Person").await;
        let b = f.entity("Document").await;
        let c = f.entity("Document").await;

        f.engine
            .create_relationship(&f.ctx, &f.store, &relation, &a, &b)
            .await
            .unwrap();
        f.engine
            .create_relationship(&f.ctx, &f.store, &relation, &a, &c)
            .await
            .unwrap();

        // Replacing the edge cascaded the delete to its old target.
        assert!(f.store.get(b.key()).await.is_err());
        assert!(f.store.get(c.key()).await.is_ok());
    }

    #[tokio::test]
    async fn many_to_many_never_deletes() {
        let f = Fixture::new();
        let relation = RelationType::new(
            "REFERS_TO",
            EntityKind::Document,
            Multiplicity::Many,
            EntityKind::Document,
            Multiplicity::Many,
        );
        let a = f.entity("Document").await;
        let b = f.entity("Document").await;
        let c = f.entity("Document").await;

        f.engine
            .create_relationship(&f.ctx, &f.store, &relation, &a, &b)
            .await
            .unwrap();
        f.engine
            .create_relationship(&f.ctx, &f.store, &relation, &a, &c)
            .await
            .unwrap();

        assert_eq!(f.outgoing(a.key(), "REFERS_TO").await.len(), 2);
    }
}
