//! Core domain types for the Arbor object layer.
//!
//! These types are shared between the store, the materializer, the
//! cardinality engine, and the sync walker: raw records as the store
//! hands them out, the closed set of entity kinds, and schema-level
//! relation declarations.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ── Identities ────────────────────────────────────────────────────

/// Store-assigned key of a node record.
///
/// Keys are monotonically increasing; a higher key identifies a more
/// recently created record, which the import merge repair relies on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey(pub u64);

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Store-assigned key of an edge record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey(pub u64);

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Property values ───────────────────────────────────────────────

/// A single property value on a node or edge record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PropertyValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// Ordered list of strings; also used for ordered child-uuid lists.
    List(Vec<String>),
}

impl PropertyValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            PropertyValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropertyValue::Float(f) => Some(*f),
            PropertyValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            PropertyValue::List(items) => Some(items),
            _ => None,
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        PropertyValue::Bool(v)
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        PropertyValue::Int(v)
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        PropertyValue::Float(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        PropertyValue::Text(v.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        PropertyValue::Text(v)
    }
}

impl From<Vec<String>> for PropertyValue {
    fn from(v: Vec<String>) -> Self {
        PropertyValue::List(v)
    }
}

/// Property bag of a record. A `BTreeMap` keeps serialization order
/// stable, which the export bundle's content hash depends on.
pub type PropertyMap = BTreeMap<String, PropertyValue>;

// ── Raw records ───────────────────────────────────────────────────

/// System flags every record carries, evaluated by visibility checks.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecordFlags {
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub visible_to_public: bool,
}

/// A raw node record as the graph store hands it out.
///
/// The store owns the record's persistence lifecycle; the object layer
/// only wraps snapshots of it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawNode {
    pub key: NodeKey,
    pub uuid: Uuid,
    /// Stored type attribute. Empty on records that predate typing;
    /// resolves to the generic fallback kind.
    #[serde(default)]
    pub type_name: String,
    #[serde(default)]
    pub flags: RecordFlags,
    #[serde(default)]
    pub props: PropertyMap,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl RawNode {
    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.props.get(name)
    }
}

/// A raw edge record: one concrete relationship instance between two
/// node records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawEdge {
    pub key: EdgeKey,
    pub uuid: Uuid,
    /// Relation type name, e.g. `"CONTAINS"`.
    pub type_name: String,
    pub source: NodeKey,
    pub target: NodeKey,
    #[serde(default)]
    pub props: PropertyMap,
    pub created_at: DateTime<Utc>,
}

impl RawEdge {
    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.props.get(name)
    }
}

// ── Entity kinds ──────────────────────────────────────────────────

/// The closed set of entity kinds the object layer can materialize.
///
/// `Generic` is the designated fallback for unknown or empty type
/// names, and doubles as the "any kind" wildcard in relation
/// declarations.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Document,
    Folder,
    File,
    Image,
    Person,
    Place,
    /// Declared singleton: at most one logical instance should exist.
    /// Duplicates arising from import are merge-repaired.
    RootDocument,
    Generic,
}

impl EntityKind {
    pub const ALL: [EntityKind; 8] = [
        EntityKind::Document,
        EntityKind::Folder,
        EntityKind::File,
        EntityKind::Image,
        EntityKind::Person,
        EntityKind::Place,
        EntityKind::RootDocument,
        EntityKind::Generic,
    ];

    /// Canonical type name stored in the record's type attribute.
    pub fn type_name(&self) -> &'static str {
        match self {
            EntityKind::Document => "Document",
            EntityKind::Folder => "Folder",
            EntityKind::File => "File",
            EntityKind::Image => "Image",
            EntityKind::Person => "Person",
            EntityKind::Place => "Place",
            EntityKind::RootDocument => "RootDocument",
            EntityKind::Generic => "Generic",
        }
    }

    pub fn from_type_name(name: &str) -> Option<EntityKind> {
        EntityKind::ALL.iter().copied().find(|k| k.type_name() == name)
    }

    /// Whether nodes of this kind carry file content referenced by a
    /// stable identifier (collected into the export file set).
    pub fn carries_file_content(&self) -> bool {
        matches!(self, EntityKind::File | EntityKind::Image)
    }

    /// Whether at most one logical instance of this kind should exist.
    pub fn is_singleton(&self) -> bool {
        matches!(self, EntityKind::RootDocument)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

// ── Relations ─────────────────────────────────────────────────────

/// Maximum number of edges of a relation type permitted per endpoint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Multiplicity {
    One,
    Many,
}

/// Propagation behavior, used for both the cascading-delete and the
/// autocreation flags of a relation declaration.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Propagation {
    #[default]
    None,
    SourceToTarget,
    TargetToSource,
    Both,
}

/// Logical direction of a relation as seen from one endpoint kind.
///
/// `Both` is the explicit "don't know" tie-break: the kind matches both
/// declared endpoints, or neither. Callers must handle it rather than
/// assume a direction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Direction {
    Outgoing,
    Incoming,
    Both,
}

/// Schema-level declaration of a relation type.
///
/// One value exists per relation type; it describes structural rules
/// (endpoint kinds, multiplicity, cascade behavior), never a concrete
/// edge instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RelationType {
    pub name: String,
    pub source_kind: EntityKind,
    pub target_kind: EntityKind,
    /// `One` limits a source node to at most one outgoing edge of this
    /// relation type.
    pub source_multiplicity: Multiplicity,
    /// `One` limits a target node to at most one incoming edge of this
    /// relation type.
    pub target_multiplicity: Multiplicity,
    #[serde(default)]
    pub cascade_delete: Propagation,
    #[serde(default)]
    pub autocreate: Propagation,
}

impl RelationType {
    pub fn new(
        name: &str,
        source_kind: EntityKind,
        source_multiplicity: Multiplicity,
        target_kind: EntityKind,
        target_multiplicity: Multiplicity,
    ) -> Self {
        Self {
            name: name.to_string(),
            source_kind,
            target_kind,
            source_multiplicity,
            target_multiplicity,
            cascade_delete: Propagation::None,
            autocreate: Propagation::None,
        }
    }

    pub fn with_cascade_delete(mut self, cascade: Propagation) -> Self {
        self.cascade_delete = cascade;
        self
    }

    pub fn with_autocreate(mut self, autocreate: Propagation) -> Self {
        self.autocreate = autocreate;
        self
    }

    /// Whether a node of `kind` is acceptable at the source endpoint.
    /// A declared `Generic` endpoint accepts any kind.
    pub fn accepts_source(&self, kind: EntityKind) -> bool {
        self.source_kind == EntityKind::Generic || self.source_kind == kind
    }

    /// Whether a node of `kind` is acceptable at the target endpoint.
    pub fn accepts_target(&self, kind: EntityKind) -> bool {
        self.target_kind == EntityKind::Generic || self.target_kind == kind
    }

    /// Resolve the logical direction of this relation for a concrete
    /// endpoint kind. Matching only the declared source is `Outgoing`,
    /// only the declared target `Incoming`; both or neither yields the
    /// ambiguous `Both`.
    pub fn direction_for_kind(&self, kind: EntityKind) -> Direction {
        let is_source = self.source_kind == kind;
        let is_target = self.target_kind == kind;
        match (is_source, is_target) {
            (true, false) => Direction::Outgoing,
            (false, true) => Direction::Incoming,
            _ => Direction::Both,
        }
    }

    /// The declared kind of the opposite endpoint for a concrete kind.
    /// On the ambiguous tie-break this answers the source kind; callers
    /// that care must check `direction_for_kind` first.
    pub fn other_kind(&self, kind: EntityKind) -> EntityKind {
        match self.direction_for_kind(kind) {
            Direction::Outgoing => self.target_kind,
            Direction::Incoming => self.source_kind,
            Direction::Both => self.source_kind, // don't know
        }
    }
}

/// Built-in relation declarations.
pub mod relations {
    use super::{EntityKind, Multiplicity, Propagation, RelationType};

    pub const CONTAINS: &str = "CONTAINS";
    pub const LOCATED_AT: &str = "LOCATED_AT";
    pub const OWNS: &str = "OWNS";
    pub const REFERS_TO: &str = "REFERS_TO";

    /// Folder containment. A child lives in at most one folder;
    /// deleting the containment cascades to the contained child.
    pub fn contains() -> RelationType {
        RelationType::new(
            CONTAINS,
            EntityKind::Folder,
            Multiplicity::Many,
            EntityKind::Generic,
            Multiplicity::One,
        )
        .with_cascade_delete(Propagation::SourceToTarget)
    }

    /// Physical placement. Entities of any kind can be located at a
    /// place; the proximity expansion traverses this relation one hop
    /// incoming from the place.
    pub fn located_at() -> RelationType {
        RelationType::new(
            LOCATED_AT,
            EntityKind::Generic,
            Multiplicity::Many,
            EntityKind::Place,
            Multiplicity::Many,
        )
    }

    /// Ownership. A document has at most one owner.
    pub fn owns() -> RelationType {
        RelationType::new(
            OWNS,
            EntityKind::Person,
            Multiplicity::Many,
            EntityKind::Document,
            Multiplicity::One,
        )
    }

    /// Cross-references between documents, unconstrained.
    pub fn refers_to() -> RelationType {
        RelationType::new(
            REFERS_TO,
            EntityKind::Document,
            Multiplicity::Many,
            EntityKind::Document,
            Multiplicity::Many,
        )
    }
}

/// Well-known property names used across the object layer.
pub mod props {
    /// Ordered child-uuid list on documents; merged during import repair.
    pub const ELEMENTS: &str = "elements";
    /// Stable identifier of file content carried by file-bearing kinds.
    pub const CONTENT_ID: &str = "content_id";
    /// Export opt-in flag on folders.
    pub const INCLUDE_IN_EXPORT: &str = "include_in_export";
    /// Backing node key stored on proximity index hit records.
    pub const NODE_KEY: &str = "node_key";
    pub const NAME: &str = "name";
}
