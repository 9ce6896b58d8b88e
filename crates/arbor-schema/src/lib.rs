//! arbor-schema: Typed, constrained property kinds for Arbor entities.
//!
//! Every schema-defined property has a kind from this catalog. A kind
//! round-trips between three shapes:
//! - the in-memory definition (e.g. [`NumberProperty`]),
//! - the schema descriptor map exchanged with schema import/export,
//! - the persisted storage definition ([`StorageProperty`]), whose
//!   numeric bounds use a legacy interval notation preserved
//!   byte-for-byte (see [`range`]).

pub mod catalog;
pub mod error;
pub mod number;
pub mod range;

pub use catalog::{BooleanProperty, PropertyKind, StorageProperty, StringProperty};
pub use error::{Result, SchemaError};
pub use number::NumberProperty;
pub use range::RangeFormat;
