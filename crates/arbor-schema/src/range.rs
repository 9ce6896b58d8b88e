//! The persisted interval-notation format for numeric bounds.
//!
//! The storage format encodes both bounds of a numeric property into
//! one string. The bracket choice is inherited from the persisted
//! legacy format and deliberately kept byte-for-byte: an exclusive
//! minimum renders as `]` and an exclusive maximum as `[`, which puts
//! the *inclusive* characters in the conventionally-exclusive
//! positions.
//! `[0,10[` therefore means 0 inclusive, 10 exclusive. Round-trip
//! compatibility with existing persisted schemas wins over notational
//! hygiene here.

use crate::error::{Result, SchemaError};

/// Parsed form of the interval notation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RangeFormat {
    pub lower: Option<f64>,
    pub upper: Option<f64>,
    pub lower_exclusive: bool,
    pub upper_exclusive: bool,
}

impl RangeFormat {
    /// Render the storage string. Only emitted when both bounds are
    /// present; a single bound has no storage encoding.
    pub fn render(&self) -> Option<String> {
        let (lower, upper) = (self.lower?, self.upper?);
        let mut range = String::new();
        range.push(if self.lower_exclusive { ']' } else { '[' });
        range.push_str(&format_bound(lower));
        range.push(',');
        range.push_str(&format_bound(upper));
        range.push(if self.upper_exclusive { '[' } else { ']' });
        Some(range)
    }

    /// Parse a storage string produced by [`RangeFormat::render`].
    pub fn parse(format: &str) -> Result<Self> {
        let invalid = |reason: &str| SchemaError::InvalidRange {
            format: format.to_string(),
            reason: reason.to_string(),
        };

        let first = format.chars().next().ok_or_else(|| invalid("empty"))?;
        let last = format.chars().last().ok_or_else(|| invalid("empty"))?;
        if format.len() < 2 {
            return Err(invalid("too short"));
        }

        let lower_exclusive = match first {
            ']' => true,
            '[' => false,
            _ => return Err(invalid("missing opening bracket")),
        };
        let upper_exclusive = match last {
            '[' => true,
            ']' => false,
            _ => return Err(invalid("missing closing bracket")),
        };

        let inner = &format[1..format.len() - 1];
        let (lower, upper) = inner
            .split_once(',')
            .ok_or_else(|| invalid("missing bound separator"))?;
        let lower: f64 = lower
            .trim()
            .parse()
            .map_err(|_| invalid("lower bound is not a number"))?;
        let upper: f64 = upper
            .trim()
            .parse()
            .map_err(|_| invalid("upper bound is not a number"))?;

        Ok(Self {
            lower: Some(lower),
            upper: Some(upper),
            lower_exclusive,
            upper_exclusive,
        })
    }
}

fn format_bound(value: f64) -> String {
    value.to_string()
}
