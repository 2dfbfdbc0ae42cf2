//! Dynamically typed column values.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use uuid::Uuid;

/// Declared semantic type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Bool,
    Int,
    Float,
    Text,
    Uuid,
    Timestamp,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Bool => "bool",
            ColumnType::Int => "int",
            ColumnType::Float => "float",
            ColumnType::Text => "text",
            ColumnType::Uuid => "uuid",
            ColumnType::Timestamp => "timestamp",
        };
        f.write_str(name)
    }
}

/// Value held by (or destined for) a single column
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
}

impl FieldValue {
    /// Type of the value itself (`None` for null)
    pub fn column_type(&self) -> Option<ColumnType> {
        match self {
            FieldValue::Null => None,
            FieldValue::Bool(_) => Some(ColumnType::Bool),
            FieldValue::Int(_) => Some(ColumnType::Int),
            FieldValue::Float(_) => Some(ColumnType::Float),
            FieldValue::Text(_) => Some(ColumnType::Text),
            FieldValue::Uuid(_) => Some(ColumnType::Uuid),
            FieldValue::Timestamp(_) => Some(ColumnType::Timestamp),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Name of the value's type, as shown in mismatch errors
    pub fn type_name(&self) -> String {
        self.column_type()
            .map(|t| t.to_string())
            .unwrap_or_else(|| "null".to_string())
    }

    /// Convert into a value of the given column type.
    ///
    /// Same-typed values pass through. Text is accepted for uuid and
    /// timestamp columns when it parses, since JSON payloads carry those as
    /// strings. Everything else, null included, is handed back as `Err`.
    pub fn conform(self, expected: ColumnType) -> Result<FieldValue, FieldValue> {
        if self.column_type() == Some(expected) {
            return Ok(self);
        }

        match (expected, self) {
            (ColumnType::Uuid, FieldValue::Text(text)) => match Uuid::parse_str(&text) {
                Ok(id) => Ok(FieldValue::Uuid(id)),
                Err(_) => Err(FieldValue::Text(text)),
            },
            (ColumnType::Timestamp, FieldValue::Text(text)) => {
                match DateTime::parse_from_rfc3339(&text) {
                    Ok(ts) => Ok(FieldValue::Timestamp(ts.with_timezone(&Utc))),
                    Err(_) => Err(FieldValue::Text(text)),
                }
            }
            (_, other) => Err(other),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            FieldValue::Uuid(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            FieldValue::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => f.write_str("None"),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Uuid(id) => write!(f, "{}", id),
            FieldValue::Timestamp(ts) => write!(f, "{}", ts.to_rfc3339()),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Null => serializer.serialize_none(),
            FieldValue::Bool(b) => serializer.serialize_bool(*b),
            FieldValue::Int(i) => serializer.serialize_i64(*i),
            FieldValue::Float(v) => serializer.serialize_f64(*v),
            FieldValue::Text(s) => serializer.serialize_str(s),
            FieldValue::Uuid(id) => id.serialize(serializer),
            FieldValue::Timestamp(ts) => ts.serialize(serializer),
        }
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Int(value.into())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Int(value.into())
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<&String> for FieldValue {
    fn from(value: &String) -> Self {
        FieldValue::Text(value.clone())
    }
}

impl From<Uuid> for FieldValue {
    fn from(value: Uuid) -> Self {
        FieldValue::Uuid(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_conforms_to_uuid_when_it_parses() {
        let id = Uuid::new_v4();
        let value = FieldValue::Text(id.to_string());
        assert_eq!(value.conform(ColumnType::Uuid), Ok(FieldValue::Uuid(id)));

        let bad = FieldValue::Text("not-a-uuid".into());
        assert_eq!(bad.clone().conform(ColumnType::Uuid), Err(bad));
    }

    #[test]
    fn int_does_not_conform_to_float_or_text() {
        assert!(FieldValue::Int(3).conform(ColumnType::Float).is_err());
        assert!(FieldValue::Int(3).conform(ColumnType::Text).is_err());
        assert!(FieldValue::Null.conform(ColumnType::Text).is_err());
    }

    #[test]
    fn option_maps_none_to_null() {
        let none: Option<String> = None;
        assert_eq!(FieldValue::from(none), FieldValue::Null);
        assert_eq!(FieldValue::from(Some(5_i64)), FieldValue::Int(5));
    }

    #[test]
    fn display_matches_plain_value() {
        assert_eq!(FieldValue::from("alice").to_string(), "alice");
        assert_eq!(FieldValue::Null.to_string(), "None");
        assert_eq!(FieldValue::Int(42).to_string(), "42");
    }
}
