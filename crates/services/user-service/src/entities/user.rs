//! User database entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::{DomainError, DomainResult, FieldValue};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    pub name: String,
    pub role: String,
    pub bio: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

// Qualified paths: the SeaORM prelude has its own `ColumnDef`/`ColumnType`
const COLUMNS: &[domain::ColumnDef] = &[
    domain::ColumnDef::required("id", domain::ColumnType::Uuid),
    domain::ColumnDef::required("email", domain::ColumnType::Text),
    domain::ColumnDef::required("name", domain::ColumnType::Text),
    domain::ColumnDef::required("role", domain::ColumnType::Text),
    domain::ColumnDef::nullable("bio", domain::ColumnType::Text),
    domain::ColumnDef::required("created_at", domain::ColumnType::Timestamp),
    domain::ColumnDef::required("updated_at", domain::ColumnType::Timestamp),
];

impl domain::Entity for Model {
    type Id = Uuid;

    const NAME: &'static str = "User";

    fn columns() -> &'static [domain::ColumnDef] {
        COLUMNS
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn get(&self, column: &str) -> Option<FieldValue> {
        let value = match column {
            "id" => self.id.into(),
            "email" => self.email.clone().into(),
            "name" => self.name.clone().into(),
            "role" => self.role.clone().into(),
            "bio" => self.bio.clone().into(),
            "created_at" => self.created_at.into(),
            "updated_at" => self.updated_at.into(),
            _ => return None,
        };
        Some(value)
    }

    fn set(&mut self, column: &str, value: FieldValue) -> DomainResult<()> {
        let entity = <Self as domain::Entity>::NAME;
        match column {
            "id" => self.id = value.extract(entity, column)?,
            "email" => self.email = value.extract(entity, column)?,
            "name" => self.name = value.extract(entity, column)?,
            "role" => self.role = value.extract(entity, column)?,
            "bio" => self.bio = value.extract_opt(entity, column)?,
            "created_at" => self.created_at = value.extract(entity, column)?,
            "updated_at" => self.updated_at = value.extract(entity, column)?,
            other => return Err(DomainError::unknown_column(entity, other)),
        }
        Ok(())
    }
}
