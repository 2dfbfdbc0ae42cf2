//! Test entity shared by the repository integration tests.

#![allow(dead_code)]

use domain::{ColumnDef, ColumnType, DomainError, DomainResult, Entity, FieldValue};
use repository::{InMemorySession, InMemoryStore};

#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub nickname: Option<String>,
    pub age: i64,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::required("id", ColumnType::Int),
    ColumnDef::required("name", ColumnType::Text),
    ColumnDef::required("email", ColumnType::Text),
    ColumnDef::nullable("nickname", ColumnType::Text),
    ColumnDef::required("age", ColumnType::Int),
];

impl Entity for Member {
    type Id = i64;

    const NAME: &'static str = "Member";

    fn columns() -> &'static [ColumnDef] {
        COLUMNS
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn get(&self, column: &str) -> Option<FieldValue> {
        match column {
            "id" => Some(self.id.into()),
            "name" => Some(self.name.clone().into()),
            "email" => Some(self.email.clone().into()),
            "nickname" => Some(self.nickname.clone().into()),
            "age" => Some(self.age.into()),
            _ => None,
        }
    }

    fn set(&mut self, column: &str, value: FieldValue) -> DomainResult<()> {
        match column {
            "id" => self.id = value.extract(Self::NAME, column)?,
            "name" => self.name = value.extract(Self::NAME, column)?,
            "email" => self.email = value.extract(Self::NAME, column)?,
            "nickname" => self.nickname = value.extract_opt(Self::NAME, column)?,
            "age" => self.age = value.extract(Self::NAME, column)?,
            other => return Err(DomainError::unknown_column(Self::NAME, other)),
        }
        Ok(())
    }
}

pub fn member(id: i64, name: &str) -> Member {
    Member {
        id,
        name: name.to_string(),
        email: format!("{}@example.com", name),
        nickname: None,
        age: 30,
    }
}

/// Store holding `count` committed members named `m1`, `m2`, ...
pub fn seeded(count: i64) -> InMemoryStore<Member> {
    InMemoryStore::with_rows((1..=count).map(|id| member(id, &format!("m{}", id))))
}

pub fn fresh_session() -> (InMemoryStore<Member>, InMemorySession<Member>) {
    let store = InMemoryStore::new();
    let session = store.session();
    (store, session)
}
