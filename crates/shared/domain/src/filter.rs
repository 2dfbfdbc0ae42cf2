//! Equality filter sets.

use std::fmt;

use crate::value::FieldValue;

/// Column name to expected value, matched by equality
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters {
    terms: Vec<(String, FieldValue)>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) an equality term
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        let column = column.into();
        let value = value.into();
        match self.terms.iter_mut().find(|(name, _)| *name == column) {
            Some(term) => term.1 = value,
            None => self.terms.push((column, value)),
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.terms.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Filters
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Filters::new(), |filters, (k, v)| filters.eq(k, v))
    }
}

impl fmt::Display for Filters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, value)) in self.terms.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", name, value)?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_terms_replace_earlier_ones() {
        let filters = Filters::new().eq("name", "a").eq("age", 3).eq("name", "b");
        assert_eq!(filters.len(), 2);
        assert_eq!(filters.to_string(), "{name=b, age=3}");
    }
}
