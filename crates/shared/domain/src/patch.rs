//! Update payloads and their decoding into column values.
//!
//! `update` accepts either a typed model or an untyped key/value mapping.
//! Both are decoded into a [`Patch`]: an ordered list of column names and
//! values, with later keys replacing earlier ones.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{DomainError, DomainResult};
use crate::value::FieldValue;

/// Ordered column name to value mapping
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch {
    entries: Vec<(String, FieldValue)>,
}

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn set(mut self, column: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<FieldValue>) {
        let column = column.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(name, _)| *name == column) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    pub fn remove(&mut self, column: &str) -> Option<FieldValue> {
        let index = self.entries.iter().position(|(name, _)| name == column)?;
        Some(self.entries.remove(index).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for Patch {
    type Item = (String, FieldValue);
    type IntoIter = std::vec::IntoIter<(String, FieldValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K, V> FromIterator<(K, V)> for Patch
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut patch = Patch::new();
        for (k, v) in iter {
            patch.insert(k, v);
        }
        patch
    }
}

// =============================================================================
// Decoding
// =============================================================================

/// Anything `update` can take as its payload
pub trait IntoPatch {
    fn into_patch(self) -> DomainResult<Patch>;
}

impl IntoPatch for Patch {
    fn into_patch(self) -> DomainResult<Patch> {
        Ok(self)
    }
}

impl IntoPatch for Map<String, Value> {
    fn into_patch(self) -> DomainResult<Patch> {
        let mut patch = Patch::new();
        for (key, value) in self {
            let value = decode_value(&key, value)?;
            patch.insert(key, value);
        }
        Ok(patch)
    }
}

impl IntoPatch for Value {
    fn into_patch(self) -> DomainResult<Patch> {
        match self {
            Value::Object(map) => map.into_patch(),
            other => Err(DomainError::decode(format!(
                "expected an object, got {}",
                json_kind(&other)
            ))),
        }
    }
}

/// Typed model payload. Every serialized field becomes a patch entry,
/// including fields serialized as null.
#[derive(Debug, Clone)]
pub struct Typed<T>(pub T);

impl<T: Serialize> IntoPatch for Typed<T> {
    fn into_patch(self) -> DomainResult<Patch> {
        serde_json::to_value(&self.0)
            .map_err(|e| DomainError::decode(e.to_string()))?
            .into_patch()
    }
}

fn decode_value(key: &str, value: Value) -> DomainResult<FieldValue> {
    match value {
        Value::Null => Ok(FieldValue::Null),
        Value::Bool(b) => Ok(FieldValue::Bool(b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Ok(FieldValue::Int(i)),
            None => n
                .as_f64()
                .map(FieldValue::Float)
                .ok_or_else(|| DomainError::decode(format!("'{}' is not representable", key))),
        },
        Value::String(s) => Ok(FieldValue::Text(s)),
        other => Err(DomainError::decode(format!(
            "'{}' holds an unsupported {} value",
            key,
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Rename {
        name: String,
        nickname: Option<String>,
    }

    #[test]
    fn typed_models_keep_null_fields() {
        let patch = Typed(Rename {
            name: "b".into(),
            nickname: None,
        })
        .into_patch()
        .unwrap();

        assert_eq!(patch.get("name"), Some(&FieldValue::from("b")));
        assert_eq!(patch.get("nickname"), Some(&FieldValue::Null));
    }

    #[test]
    fn json_numbers_decode_to_int_or_float() {
        let patch = json!({"age": 30, "score": 1.5}).into_patch().unwrap();
        assert_eq!(patch.get("age"), Some(&FieldValue::Int(30)));
        assert_eq!(patch.get("score"), Some(&FieldValue::Float(1.5)));
    }

    #[test]
    fn non_object_payloads_are_rejected() {
        let err = json!([1, 2]).into_patch().unwrap_err();
        assert!(matches!(err, DomainError::Decode(_)));

        let err = json!({"tags": ["a"]}).into_patch().unwrap_err();
        assert!(matches!(err, DomainError::Decode(_)));
    }

    #[test]
    fn remove_reports_presence() {
        let mut patch = Patch::new().set("a", 1).set("b", 2);
        assert_eq!(patch.remove("a"), Some(FieldValue::Int(1)));
        assert_eq!(patch.remove("a"), None);
        assert_eq!(patch.len(), 1);
    }
}
