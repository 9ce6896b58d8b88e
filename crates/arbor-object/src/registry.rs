//! Type resolution: mapping type names to constructible descriptors.
//!
//! The registry is a static table over the closed [`EntityKind`] set
//! plus a dynamic table for schema-registered type names (aliases onto
//! a kind). Successful resolutions populate a concurrency-safe
//! read-through cache; failed resolutions are never cached and succeed
//! on a later call once the name is registered. A schema reload
//! replaces the dynamic table and drops the whole cache so a committed
//! schema change can never serve a stale descriptor.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;

use arbor_core::types::{EntityKind, RawNode};

use crate::entity::Entity;

type Constructor = fn(EntityKind, RawNode) -> Entity;
type PostConstruct = fn(&mut Entity);

/// A constructible descriptor for one entity type. Immutable once
/// cached.
pub struct EntityDescriptor {
    pub type_name: String,
    pub kind: EntityKind,
    constructor: Constructor,
    post_construct: PostConstruct,
}

impl EntityDescriptor {
    fn for_kind(type_name: &str, kind: EntityKind) -> Self {
        Self {
            type_name: type_name.to_string(),
            kind,
            constructor: Entity::new,
            post_construct: post_construct_for(kind),
        }
    }

    /// Build an entity from a raw record and run the kind's
    /// post-construction hook.
    pub fn construct(&self, record: RawNode) -> Entity {
        let mut entity = (self.constructor)(self.kind, record);
        (self.post_construct)(&mut entity);
        entity
    }
}

fn post_construct_for(kind: EntityKind) -> PostConstruct {
    if kind.carries_file_content() {
        file_post_construct
    } else {
        noop_post_construct
    }
}

fn noop_post_construct(_entity: &mut Entity) {}

/// File-bearing entities without a content identifier are a
/// data-quality signal: the record exists but its bytes are orphaned.
fn file_post_construct(entity: &mut Entity) {
    if entity.content_id().is_none() {
        tracing::warn!(
            key = %entity.key(),
            type_name = %entity.type_name(),
            "File-bearing entity has no content identifier"
        );
    }
}

/// Process-wide type registry with a read-through constructor cache.
pub struct TypeRegistry {
    /// Schema-registered names aliasing onto a kind, replaced wholesale
    /// on reload.
    dynamic: RwLock<HashMap<String, EntityKind>>,
    cache: DashMap<String, Arc<EntityDescriptor>>,
    generic: Arc<EntityDescriptor>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self {
            dynamic: RwLock::new(HashMap::new()),
            cache: DashMap::new(),
            generic: Arc::new(EntityDescriptor::for_kind(
                EntityKind::Generic.type_name(),
                EntityKind::Generic,
            )),
        }
    }

    /// Resolve a type name to a descriptor. Idempotent; the first
    /// successful resolution is cached. Unknown names return `None`
    /// and stay uncached, so a later registration makes them
    /// resolvable.
    pub fn resolve(&self, type_name: &str) -> Option<Arc<EntityDescriptor>> {
        if let Some(hit) = self.cache.get(type_name) {
            return Some(hit.value().clone());
        }

        let kind = EntityKind::from_type_name(type_name)
            .or_else(|| self.dynamic.read().get(type_name).copied())?;

        let descriptor = Arc::new(EntityDescriptor::for_kind(type_name, kind));
        // Concurrent population races are benign: descriptors for the
        // same name are behaviorally identical, last write wins.
        self.cache
            .insert(type_name.to_string(), Arc::clone(&descriptor));
        Some(descriptor)
    }

    /// Resolve with the generic fallback: unknown or empty names yield
    /// the `Generic` descriptor instead of an error, so one broken
    /// type mapping never aborts a whole result set.
    pub fn resolve_or_generic(&self, type_name: &str) -> Arc<EntityDescriptor> {
        if type_name.is_empty() {
            return Arc::clone(&self.generic);
        }
        match self.resolve(type_name) {
            Some(descriptor) => descriptor,
            None => {
                tracing::warn!(type_name, "Type name resolves to nothing, using generic entity");
                Arc::clone(&self.generic)
            }
        }
    }

    /// Register a schema-defined type name as an alias of a kind.
    /// Any cached descriptor for that name is dropped.
    pub fn register_alias(&self, type_name: &str, kind: EntityKind) {
        self.dynamic.write().insert(type_name.to_string(), kind);
        self.cache.remove(type_name);
    }

    /// Replace the dynamic table after a schema reload. The cache is
    /// invalidated wholesale.
    pub fn reload<I>(&self, aliases: I)
    where
        I: IntoIterator<Item = (String, EntityKind)>,
    {
        let mut dynamic = self.dynamic.write();
        *dynamic = aliases.into_iter().collect();
        self.cache.clear();
        tracing::info!(types = dynamic.len(), "Type registry reloaded");
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
