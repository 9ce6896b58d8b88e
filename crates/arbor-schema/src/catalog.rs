//! The property-kind catalog: descriptor keys, the persisted storage
//! shape, the remaining scalar kinds, and tag dispatch.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, SchemaError};
use crate::number::NumberProperty;

/// Schema descriptor map keys.
pub mod keys {
    pub const TYPE: &str = "type";
    pub const MINIMUM: &str = "minimum";
    pub const MAXIMUM: &str = "maximum";
    pub const EXCLUSIVE_MINIMUM: &str = "exclusiveMinimum";
    pub const EXCLUSIVE_MAXIMUM: &str = "exclusiveMaximum";
    pub const FORMAT: &str = "format";
}

pub const DATA_TYPE_DOUBLE: &str = "Double";
pub const DATA_TYPE_STRING: &str = "String";
pub const DATA_TYPE_BOOLEAN: &str = "Boolean";

/// A property definition in the persisted storage format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageProperty {
    pub name: String,
    pub data_type: String,
    /// Constraint encoding: interval notation for numerics, a pattern
    /// for strings. Absent when unconstrained.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

/// A string property, optionally constrained by a pattern hint.
#[derive(Debug, Clone, PartialEq)]
pub struct StringProperty {
    name: String,
    format: Option<String>,
}

impl StringProperty {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            format: None,
        }
    }

    pub fn with_format(mut self, format: &str) -> Self {
        self.format = Some(format.to_string());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }

    pub fn serialize(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert(keys::TYPE.to_string(), Value::from("string"));
        if let Some(format) = &self.format {
            map.insert(keys::FORMAT.to_string(), Value::from(format.clone()));
        }
        map
    }

    pub fn deserialize(name: &str, source: &Map<String, Value>) -> Self {
        let mut property = StringProperty::new(name);
        if let Some(format) = source.get(keys::FORMAT).and_then(Value::as_str) {
            property.format = Some(format.to_string());
        }
        property
    }

    pub fn to_storage(&self) -> StorageProperty {
        StorageProperty {
            name: self.name.clone(),
            data_type: DATA_TYPE_STRING.to_string(),
            format: self.format.clone(),
        }
    }
}

/// A boolean property. Unconstrained by construction.
#[derive(Debug, Clone, PartialEq)]
pub struct BooleanProperty {
    name: String,
}

impl BooleanProperty {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn serialize(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert(keys::TYPE.to_string(), Value::from("boolean"));
        map
    }

    pub fn to_storage(&self) -> StorageProperty {
        StorageProperty {
            name: self.name.clone(),
            data_type: DATA_TYPE_BOOLEAN.to_string(),
            format: None,
        }
    }
}

/// A property definition of any cataloged kind.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKind {
    Number(NumberProperty),
    Text(StringProperty),
    Flag(BooleanProperty),
}

impl PropertyKind {
    pub fn name(&self) -> &str {
        match self {
            PropertyKind::Number(p) => p.name(),
            PropertyKind::Text(p) => p.name(),
            PropertyKind::Flag(p) => p.name(),
        }
    }

    pub fn serialize(&self) -> Map<String, Value> {
        match self {
            PropertyKind::Number(p) => p.serialize(),
            PropertyKind::Text(p) => p.serialize(),
            PropertyKind::Flag(p) => p.serialize(),
        }
    }

    pub fn to_storage(&self) -> StorageProperty {
        match self {
            PropertyKind::Number(p) => p.to_storage(),
            PropertyKind::Text(p) => p.to_storage(),
            PropertyKind::Flag(p) => p.to_storage(),
        }
    }

    /// Deserialize a descriptor map, dispatching on its `type` tag.
    pub fn from_descriptor(name: &str, source: &Map<String, Value>) -> Result<Self> {
        let tag = source
            .get(keys::TYPE)
            .and_then(Value::as_str)
            .ok_or_else(|| {
                SchemaError::InvalidDescriptor(format!("property {name} has no type tag"))
            })?;

        match tag {
            "number" => Ok(PropertyKind::Number(NumberProperty::deserialize(
                name, source,
            ))),
            "string" => Ok(PropertyKind::Text(StringProperty::deserialize(
                name, source,
            ))),
            "boolean" => Ok(PropertyKind::Flag(BooleanProperty::new(name))),
            other => Err(SchemaError::UnknownTypeTag(other.to_string())),
        }
    }

    /// Deserialize a persisted storage definition, dispatching on its
    /// data type.
    pub fn from_storage(definition: &StorageProperty) -> Result<Self> {
        match definition.data_type.as_str() {
            DATA_TYPE_DOUBLE => Ok(PropertyKind::Number(NumberProperty::from_storage(
                definition,
            )?)),
            DATA_TYPE_STRING => {
                let mut property = StringProperty::new(&definition.name);
                property.format = definition.format.clone();
                Ok(PropertyKind::Text(property))
            }
            DATA_TYPE_BOOLEAN => Ok(PropertyKind::Flag(BooleanProperty::new(&definition.name))),
            other => Err(SchemaError::UnknownDataType(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_dispatch_by_type_tag() {
        let number = NumberProperty::new("score").with_maximum(5.0, false);
        let map = number.serialize();
        let kind = PropertyKind::from_descriptor("score", &map).unwrap();
        assert_eq!(kind, PropertyKind::Number(number));

        let text = StringProperty::new("label").with_format("[a-z]+");
        let kind = PropertyKind::from_descriptor("label", &text.serialize()).unwrap();
        assert_eq!(kind, PropertyKind::Text(text));

        let flag = BooleanProperty::new("enabled");
        let kind = PropertyKind::from_descriptor("enabled", &flag.serialize()).unwrap();
        assert_eq!(kind, PropertyKind::Flag(flag));
    }

    #[test]
    fn unknown_tags_are_rejected() {
        let mut map = Map::new();
        map.insert(keys::TYPE.to_string(), Value::from("matrix"));
        assert!(matches!(
            PropertyKind::from_descriptor("m", &map),
            Err(SchemaError::UnknownTypeTag(_))
        ));

        let map = Map::new();
        assert!(matches!(
            PropertyKind::from_descriptor("m", &map),
            Err(SchemaError::InvalidDescriptor(_))
        ));
    }

    #[test]
    fn storage_dispatch_roundtrip() {
        let number = PropertyKind::Number(
            NumberProperty::new("score")
                .with_minimum(0.0, false)
                .with_maximum(10.0, true),
        );
        let back = PropertyKind::from_storage(&number.to_storage()).unwrap();
        assert_eq!(back, number);

        let text = PropertyKind::Text(StringProperty::new("label").with_format("[a-z]+"));
        let back = PropertyKind::from_storage(&text.to_storage()).unwrap();
        assert_eq!(back, text);

        let unknown = StorageProperty {
            name: "m".to_string(),
            data_type: "Matrix".to_string(),
            format: None,
        };
        assert!(PropertyKind::from_storage(&unknown).is_err());
    }
}
