//! The persistent entity contract.
//!
//! An entity is a record type with an identifier column `id` and a
//! statically declared column table. Column access goes through `get` and
//! `set`, which lets generic code read and patch rows without reflection.

use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};
use crate::record::Record;
use crate::schema::{find_column, ColumnDef};
use crate::value::{ColumnType, FieldValue};

/// A persistent record with identity and typed columns
pub trait Entity: Clone + fmt::Debug + Send + Sync + 'static {
    /// Identifier type stored in the `id` column
    type Id: Clone + PartialEq + fmt::Debug + fmt::Display + Into<FieldValue> + Send + Sync + 'static;

    /// Type name used in log lines and error details
    const NAME: &'static str;

    /// Column table, in declaration order
    fn columns() -> &'static [ColumnDef];

    fn id(&self) -> Self::Id;

    /// Current value of a column (`None` if the column does not exist)
    fn get(&self, column: &str) -> Option<FieldValue>;

    /// Assign a column. The value is expected to already conform to the
    /// column's declared type.
    fn set(&mut self, column: &str, value: FieldValue) -> DomainResult<()>;

    fn column(name: &str) -> Option<&'static ColumnDef> {
        find_column(Self::columns(), name)
    }

    /// Snapshot of every declared column
    fn to_dict(&self) -> Record {
        Self::columns()
            .iter()
            .map(|c| (c.name, self.get(c.name).unwrap_or(FieldValue::Null)))
            .collect()
    }

    /// Attributes shown by [`Entity::display`].
    ///
    /// Defaults to the persisted columns; override to include in-memory
    /// state that never reaches storage.
    fn attributes(&self) -> Vec<(&'static str, FieldValue)> {
        self.to_dict()
            .iter()
            .map(|(name, value)| (name, value.clone()))
            .collect()
    }

    /// `Name(field=value, ...)` rendering for logs
    fn display(&self) -> EntityDisplay<'_, Self> {
        EntityDisplay(self)
    }
}

/// Log-friendly rendering of an entity. Not a stable format.
pub struct EntityDisplay<'a, E: Entity>(&'a E);

impl<E: Entity> fmt::Display for EntityDisplay<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", E::NAME)?;
        for (i, (name, value)) in self.0.attributes().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", name, value)?;
        }
        f.write_str(")")
    }
}

// =============================================================================
// Typed extraction for `Entity::set` implementations
// =============================================================================

/// Rust types a column value can be extracted into
pub trait FromField: Sized {
    const COLUMN_TYPE: ColumnType;

    fn from_field(value: FieldValue) -> Result<Self, FieldValue>;
}

macro_rules! from_field {
    ($ty:ty, $column_type:expr, $variant:ident) => {
        impl FromField for $ty {
            const COLUMN_TYPE: ColumnType = $column_type;

            fn from_field(value: FieldValue) -> Result<Self, FieldValue> {
                match value {
                    FieldValue::$variant(inner) => Ok(inner),
                    other => Err(other),
                }
            }
        }
    };
}

from_field!(bool, ColumnType::Bool, Bool);
from_field!(i64, ColumnType::Int, Int);
from_field!(f64, ColumnType::Float, Float);
from_field!(String, ColumnType::Text, Text);
from_field!(Uuid, ColumnType::Uuid, Uuid);
from_field!(DateTime<Utc>, ColumnType::Timestamp, Timestamp);

impl FieldValue {
    /// Extract a required column value, reporting a type mismatch against
    /// `entity.column` on failure
    pub fn extract<T: FromField>(self, entity: &'static str, column: &str) -> DomainResult<T> {
        T::from_field(self).map_err(|other| DomainError::TypeMismatch {
            entity,
            column: column.to_string(),
            expected: T::COLUMN_TYPE.to_string(),
            actual: other.type_name(),
        })
    }

    /// Extract a nullable column value
    pub fn extract_opt<T: FromField>(
        self,
        entity: &'static str,
        column: &str,
    ) -> DomainResult<Option<T>> {
        if self.is_null() {
            return Ok(None);
        }
        self.extract(entity, column).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct Tag {
        id: i64,
        label: String,
        color: Option<String>,
        uses: i64,
    }

    const TAG_COLUMNS: &[ColumnDef] = &[
        ColumnDef::required("id", ColumnType::Int),
        ColumnDef::required("label", ColumnType::Text),
        ColumnDef::nullable("color", ColumnType::Text),
    ];

    impl Entity for Tag {
        type Id = i64;

        const NAME: &'static str = "Tag";

        fn columns() -> &'static [ColumnDef] {
            TAG_COLUMNS
        }

        fn id(&self) -> i64 {
            self.id
        }

        fn get(&self, column: &str) -> Option<FieldValue> {
            match column {
                "id" => Some(self.id.into()),
                "label" => Some(self.label.clone().into()),
                "color" => Some(self.color.clone().into()),
                _ => None,
            }
        }

        fn set(&mut self, column: &str, value: FieldValue) -> DomainResult<()> {
            match column {
                "id" => self.id = value.extract(Self::NAME, column)?,
                "label" => self.label = value.extract(Self::NAME, column)?,
                "color" => self.color = value.extract_opt(Self::NAME, column)?,
                other => return Err(DomainError::unknown_column(Self::NAME, other)),
            }
            Ok(())
        }

        // `uses` is in-memory only
        fn attributes(&self) -> Vec<(&'static str, FieldValue)> {
            let mut attributes: Vec<_> = self
                .to_dict()
                .iter()
                .map(|(name, value)| (name, value.clone()))
                .collect();
            attributes.push(("uses", self.uses.into()));
            attributes
        }
    }

    fn tag() -> Tag {
        Tag {
            id: 7,
            label: "rust".into(),
            color: None,
            uses: 3,
        }
    }

    #[test]
    fn to_dict_covers_declared_columns_only() {
        let dict = tag().to_dict();
        let columns: Vec<_> = dict.columns().collect();
        assert_eq!(columns, vec!["id", "label", "color"]);
        assert_eq!(dict.get("color"), Some(&FieldValue::Null));
    }

    #[test]
    fn display_includes_in_memory_attributes() {
        assert_eq!(
            tag().display().to_string(),
            "Tag(id=7, label=rust, color=None, uses=3)"
        );
    }

    #[test]
    fn set_rejects_unknown_columns_and_wrong_types() {
        let mut t = tag();
        t.set("color", FieldValue::from("red")).unwrap();
        assert_eq!(t.color.as_deref(), Some("red"));

        let err = t.set("size", FieldValue::Int(1)).unwrap_err();
        assert_eq!(err.to_string(), "Tag does not have field 'size'");

        let err = t.set("label", FieldValue::Null).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid type for field 'Tag.label': expected text, got null"
        );
        assert_eq!(Tag::column("color").map(|c| c.nullable), Some(true));
    }
}
