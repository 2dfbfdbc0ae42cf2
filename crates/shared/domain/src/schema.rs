//! Static column descriptors.

use crate::value::ColumnType;

/// Name, semantic type and nullability of a single column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub column_type: ColumnType,
    pub nullable: bool,
}

impl ColumnDef {
    /// Column that must always hold a value
    pub const fn required(name: &'static str, column_type: ColumnType) -> Self {
        Self {
            name,
            column_type,
            nullable: false,
        }
    }

    /// Column that accepts null
    pub const fn nullable(name: &'static str, column_type: ColumnType) -> Self {
        Self {
            name,
            column_type,
            nullable: true,
        }
    }
}

/// Look a column up by name
pub fn find_column<'a>(columns: &'a [ColumnDef], name: &str) -> Option<&'a ColumnDef> {
    columns.iter().find(|c| c.name == name)
}
