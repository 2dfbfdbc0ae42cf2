//! SeaORM session tests against a mock database.

use common::AppError;
use domain::{ColumnDef, ColumnType, DomainError, DomainResult, Entity, FieldValue, Filters};
use repository::{Repository, SeaSession, UnitOfWork};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};

mod note {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "notes")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: i64,
        pub title: String,
        pub body: Option<String>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

const NOTE_COLUMNS: &[ColumnDef] = &[
    ColumnDef::required("id", ColumnType::Int),
    ColumnDef::required("title", ColumnType::Text),
    ColumnDef::nullable("body", ColumnType::Text),
];

impl Entity for note::Model {
    type Id = i64;

    const NAME: &'static str = "Note";

    fn columns() -> &'static [ColumnDef] {
        NOTE_COLUMNS
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn get(&self, column: &str) -> Option<FieldValue> {
        match column {
            "id" => Some(self.id.into()),
            "title" => Some(self.title.clone().into()),
            "body" => Some(self.body.clone().into()),
            _ => None,
        }
    }

    fn set(&mut self, column: &str, value: FieldValue) -> DomainResult<()> {
        match column {
            "id" => self.id = value.extract(Self::NAME, column)?,
            "title" => self.title = value.extract(Self::NAME, column)?,
            "body" => self.body = value.extract_opt(Self::NAME, column)?,
            other => return Err(DomainError::unknown_column(Self::NAME, other)),
        }
        Ok(())
    }
}

type NoteSession = SeaSession<note::Entity, note::ActiveModel>;

fn note(id: i64, title: &str) -> note::Model {
    note::Model {
        id,
        title: title.to_string(),
        body: None,
    }
}

fn mock(results: Vec<Vec<note::Model>>) -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(results)
        .into_connection()
}

#[tokio::test]
async fn test_find_by_id_reads_through_transaction() {
    let mut session = NoteSession::new(mock(vec![vec![note(1, "a")]]));
    assert!(!session.in_transaction());

    let found = Repository::<note::Model>::new()
        .find_by_id(&mut session, &1, true)
        .await
        .unwrap();
    assert_eq!(found, Some(note(1, "a")));
    assert!(session.in_transaction());
    assert!(session.is_tracked(&note(1, "a")));
}

#[tokio::test]
async fn test_find_by_id_not_found() {
    let mut session = NoteSession::new(mock(vec![Vec::new()]));

    let err = Repository::<note::Model>::new()
        .find_by_id(&mut session, &7, true)
        .await
        .unwrap_err();
    assert_eq!(err, AppError::NotFound("Note not found with ID 7".into()));
}

#[tokio::test]
async fn test_unknown_filter_column() {
    let mut session = NoteSession::new(mock(Vec::new()));
    let filters = Filters::new().eq("color", "red");

    let err = Repository::<note::Model>::new()
        .find_by(&mut session, &filters, true, false)
        .await
        .unwrap_err();
    assert_eq!(
        err.detail(),
        "Error finding entity by filters: Note has no column 'color'"
    );
    assert!(!session.in_transaction());
}

#[tokio::test]
async fn test_save_inserts_and_refreshes() {
    let stored = note(3, "draft");
    let mut session = NoteSession::new(mock(vec![vec![stored.clone()], vec![stored.clone()]]));
    let mut fresh = note(3, "draft");

    let saved = Repository::<note::Model>::new()
        .save(&mut session, &mut fresh)
        .await
        .unwrap();
    assert_eq!(saved, stored);
    assert!(session.is_tracked(&saved));
}

#[tokio::test]
async fn test_delete_by_id_executes_delete() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![note(4, "old")]])
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .into_connection();
    let mut session = NoteSession::new(db);

    let deleted = Repository::<note::Model>::new()
        .delete_by_id(&mut session, &4, true)
        .await
        .unwrap();
    assert!(deleted);
    assert!(!session.is_tracked(&note(4, "old")));
    assert!(!session.in_transaction());
}

#[tokio::test]
async fn test_delete_of_missing_row_fails() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();
    let mut session = NoteSession::new(db);

    let err = Repository::<note::Model>::new()
        .delete(&mut session, &note(5, "gone"))
        .await
        .unwrap_err();
    assert_eq!(
        err.detail(),
        "Error deleting entity: Note(id=5, title=gone, body=None) is not persistent"
    );
    assert!(!session.in_transaction());
}

#[tokio::test]
async fn test_rollback_forgets_rows_inserted_in_transaction() {
    let draft = note(9, "draft");
    let mut session = NoteSession::new(mock(vec![
        // insert, then the read that flushed it
        vec![draft.clone()],
        vec![draft.clone()],
        // insert and refresh of the later save
        vec![draft.clone()],
        vec![draft.clone()],
    ]));

    session.add(draft.clone());
    let seen = Repository::<note::Model>::new()
        .find_all(&mut session, Default::default())
        .await
        .unwrap();
    assert_eq!(seen, vec![draft.clone()]);
    assert!(session.is_tracked(&draft));

    session.rollback().await.unwrap();
    assert!(!session.is_tracked(&draft));
    assert!(!session.in_transaction());

    let mut again = draft.clone();
    let saved = Repository::<note::Model>::new()
        .save(&mut session, &mut again)
        .await
        .unwrap();
    assert_eq!(saved, draft);
    assert!(session.is_tracked(&saved));
}
