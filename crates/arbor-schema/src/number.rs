//! The bounded numeric property kind.

use serde_json::{Map, Value};

use crate::catalog::{keys, StorageProperty, DATA_TYPE_DOUBLE};
use crate::error::{Result, SchemaError};
use crate::range::RangeFormat;

/// A numeric property with optional bounds, each with an independent
/// exclusivity flag. Absent bounds mean unbounded; absent exclusivity
/// means inclusive. If both bounds are set, minimum ≤ maximum is the
/// caller's responsibility.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberProperty {
    name: String,
    minimum: Option<f64>,
    maximum: Option<f64>,
    exclusive_minimum: bool,
    exclusive_maximum: bool,
}

impl NumberProperty {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            minimum: None,
            maximum: None,
            exclusive_minimum: false,
            exclusive_maximum: false,
        }
    }

    pub fn with_minimum(mut self, minimum: f64, exclusive: bool) -> Self {
        self.minimum = Some(minimum);
        self.exclusive_minimum = exclusive;
        self
    }

    pub fn with_maximum(mut self, maximum: f64, exclusive: bool) -> Self {
        self.maximum = Some(maximum);
        self.exclusive_maximum = exclusive;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn minimum(&self) -> Option<f64> {
        self.minimum
    }

    pub fn maximum(&self) -> Option<f64> {
        self.maximum
    }

    pub fn is_exclusive_minimum(&self) -> bool {
        self.exclusive_minimum
    }

    pub fn is_exclusive_maximum(&self) -> bool {
        self.exclusive_maximum
    }

    /// Serialize to a schema descriptor map. Only non-default fields
    /// are emitted: an absent key means unbounded / inclusive.
    pub fn serialize(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert(keys::TYPE.to_string(), Value::from("number"));

        if self.exclusive_minimum {
            map.insert(keys::EXCLUSIVE_MINIMUM.to_string(), Value::from(true));
        }
        if self.exclusive_maximum {
            map.insert(keys::EXCLUSIVE_MAXIMUM.to_string(), Value::from(true));
        }
        if let Some(minimum) = self.minimum {
            map.insert(keys::MINIMUM.to_string(), Value::from(minimum));
        }
        if let Some(maximum) = self.maximum {
            map.insert(keys::MAXIMUM.to_string(), Value::from(maximum));
        }

        map
    }

    /// Deserialize from a schema descriptor map.
    pub fn deserialize(name: &str, source: &Map<String, Value>) -> Self {
        let mut property = NumberProperty::new(name);

        if let Some(Value::Bool(true)) = source.get(keys::EXCLUSIVE_MINIMUM) {
            property.exclusive_minimum = true;
        }
        if let Some(Value::Bool(true)) = source.get(keys::EXCLUSIVE_MAXIMUM) {
            property.exclusive_maximum = true;
        }
        if let Some(minimum) = source.get(keys::MINIMUM).and_then(Value::as_f64) {
            property.minimum = Some(minimum);
        }
        if let Some(maximum) = source.get(keys::MAXIMUM).and_then(Value::as_f64) {
            property.maximum = Some(maximum);
        }

        property
    }

    /// Deserialize from a persisted legacy storage definition, reading
    /// bounds and exclusivity out of the interval-notation format.
    pub fn from_storage(definition: &StorageProperty) -> Result<Self> {
        if definition.data_type != DATA_TYPE_DOUBLE {
            return Err(SchemaError::UnknownDataType(definition.data_type.clone()));
        }

        let mut property = NumberProperty::new(&definition.name);
        if let Some(format) = &definition.format {
            let range = RangeFormat::parse(format)?;
            property.minimum = range.lower;
            property.maximum = range.upper;
            property.exclusive_minimum = range.lower_exclusive;
            property.exclusive_maximum = range.upper_exclusive;
        }

        Ok(property)
    }

    /// Materialize the persisted storage definition. The interval
    /// format is only encoded when both bounds are present.
    pub fn to_storage(&self) -> StorageProperty {
        let range = RangeFormat {
            lower: self.minimum,
            upper: self.maximum,
            lower_exclusive: self.exclusive_minimum,
            upper_exclusive: self.exclusive_maximum,
        };

        StorageProperty {
            name: self.name.clone(),
            data_type: DATA_TYPE_DOUBLE.to_string(),
            format: range.render(),
        }
    }
}
