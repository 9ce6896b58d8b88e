//! arbor-object: Typed entity layer over raw graph records.
//!
//! Materializes typed entities from store records through a static
//! type registry with a read-through constructor cache, provides
//! paginated/cursor-based listing over index scans (including the
//! proximity dual-index expansion), and enforces declared relation
//! multiplicities transactionally before edge creation.

pub mod cardinality;
pub mod entity;
pub mod error;
pub mod materializer;
pub mod registry;

pub use cardinality::RelationCardinalityEngine;
pub use entity::{Entity, GraphObject, Relationship};
pub use error::{ObjectError, Result};
pub use materializer::{EntityMaterializer, Page};
pub use registry::{EntityDescriptor, TypeRegistry};
