//! Typed wrappers over raw graph records.
//!
//! An [`Entity`] is a view of one node record, created per
//! materialization and discarded with its scope; the store record
//! stays authoritative. Entities are never written back.

use uuid::Uuid;

use arbor_core::types::{
    props, EdgeKey, EntityKind, NodeKey, PropertyValue, RawEdge, RawNode,
};

/// A typed entity wrapping one underlying node record.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    kind: EntityKind,
    record: RawNode,
}

impl Entity {
    pub(crate) fn new(kind: EntityKind, record: RawNode) -> Self {
        Self { kind, record }
    }

    pub fn key(&self) -> NodeKey {
        self.record.key
    }

    pub fn uuid(&self) -> Uuid {
        self.record.uuid
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// The stored type attribute; falls back to the kind's canonical
    /// name on untyped records.
    pub fn type_name(&self) -> &str {
        if self.record.type_name.is_empty() {
            self.kind.type_name()
        } else {
            &self.record.type_name
        }
    }

    /// The wrapped record. Property reads go through this snapshot.
    pub fn record(&self) -> &RawNode {
        &self.record
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.record.property(name)
    }

    pub fn name(&self) -> Option<&str> {
        self.property(props::NAME).and_then(PropertyValue::as_str)
    }

    /// Stable identifier of the file content this entity carries, if
    /// its kind is file-bearing and the record has one.
    pub fn content_id(&self) -> Option<Uuid> {
        if !self.kind.carries_file_content() {
            return None;
        }
        self.property(props::CONTENT_ID)
            .and_then(PropertyValue::as_str)
            .and_then(|s| Uuid::parse_str(s).ok())
    }

    /// The ordered child-uuid list, empty when absent.
    pub fn elements(&self) -> Vec<String> {
        self.property(props::ELEMENTS)
            .and_then(PropertyValue::as_list)
            .map(<[String]>::to_vec)
            .unwrap_or_default()
    }
}

/// A typed view of one edge record.
#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    record: RawEdge,
}

impl Relationship {
    pub fn new(record: RawEdge) -> Self {
        Self { record }
    }

    pub fn key(&self) -> EdgeKey {
        self.record.key
    }

    pub fn uuid(&self) -> Uuid {
        self.record.uuid
    }

    pub fn type_name(&self) -> &str {
        &self.record.type_name
    }

    pub fn source(&self) -> NodeKey {
        self.record.source
    }

    pub fn target(&self) -> NodeKey {
        self.record.target
    }

    pub fn record(&self) -> &RawEdge {
        &self.record
    }
}

/// Tagged variant over the two graph object shapes. The closure
/// walker treats both uniformly through this type instead of runtime
/// type tests.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphObject {
    Node(Entity),
    Relationship(Relationship),
}

impl GraphObject {
    pub fn as_node(&self) -> Option<&Entity> {
        match self {
            GraphObject::Node(entity) => Some(entity),
            GraphObject::Relationship(_) => None,
        }
    }

    pub fn as_relationship(&self) -> Option<&Relationship> {
        match self {
            GraphObject::Node(_) => None,
            GraphObject::Relationship(rel) => Some(rel),
        }
    }
}

impl From<Entity> for GraphObject {
    fn from(entity: Entity) -> Self {
        GraphObject::Node(entity)
    }
}

impl From<Relationship> for GraphObject {
    fn from(rel: Relationship) -> Self {
        GraphObject::Relationship(rel)
    }
}
