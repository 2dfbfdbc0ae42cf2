//! SeaORM-backed Unit of Work.
//!
//! Pending changes are buffered in memory and flushed into a database
//! transaction that is begun lazily on first use. Queries flush first, so
//! they observe the session's own uncommitted writes. `commit` flushes and
//! commits the transaction; `rollback` discards the buffer and rolls the
//! transaction back.

use std::marker::PhantomData;
use std::str::FromStr;

use async_trait::async_trait;
use domain::{Entity, FieldValue};
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, IntoActiveModel, QueryFilter, QuerySelect, TransactionTrait, Value,
};

use crate::error::{StoreError, StoreResult};
use crate::session::{Change, Query, UnitOfWork};

/// Unit of Work over a SeaORM entity `SE` with active model `A`
pub struct SeaSession<SE, A>
where
    SE: EntityTrait,
    SE::Model: Entity,
{
    db: DatabaseConnection,
    txn: Option<DatabaseTransaction>,
    pending: Vec<Change<SE::Model>>,
    tracked: Vec<<SE::Model as Entity>::Id>,
    committed: Vec<<SE::Model as Entity>::Id>,
    /// Rows inserted into the open transaction, not yet committed
    inserted: Vec<<SE::Model as Entity>::Id>,
    _active: PhantomData<fn() -> A>,
}

impl<SE, A> SeaSession<SE, A>
where
    SE: EntityTrait,
    SE::Model: Entity + IntoActiveModel<A>,
    A: ActiveModelTrait<Entity = SE> + ActiveModelBehavior + Send + 'static,
{
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            txn: None,
            pending: Vec::new(),
            tracked: Vec::new(),
            committed: Vec::new(),
            inserted: Vec::new(),
            _active: PhantomData,
        }
    }

    /// Whether a database transaction is currently open
    pub fn in_transaction(&self) -> bool {
        self.txn.is_some()
    }

    /// Open transaction, begun on first use
    async fn transaction(&mut self) -> StoreResult<&DatabaseTransaction> {
        let txn = match self.txn.take() {
            Some(txn) => txn,
            None => self.db.begin().await?,
        };
        Ok(&*self.txn.insert(txn))
    }

    /// Write buffered changes into the open transaction
    async fn flush(&mut self) -> StoreResult<()> {
        if self.pending.is_empty() {
            return Ok(());
        }

        let pending = std::mem::take(&mut self.pending);
        let txn = match self.txn.take() {
            Some(txn) => txn,
            None => self.db.begin().await?,
        };
        let outcome = self.write(&txn, pending).await;
        self.txn = Some(txn);
        outcome
    }

    async fn write(
        &mut self,
        txn: &DatabaseTransaction,
        pending: Vec<Change<SE::Model>>,
    ) -> StoreResult<()> {
        for change in pending {
            match change {
                Change::Insert(model) => {
                    let id = model.id();
                    let active: A = model.into_active_model().reset_all();
                    active.insert(txn).await?;
                    self.inserted.push(id);
                }
                Change::Update(model) => {
                    let active: A = model.into_active_model().reset_all();
                    active.update(txn).await?;
                }
                Change::Remove(model) => {
                    let id = model.id();
                    let label = model.display().to_string();
                    let active: A = model.into_active_model();
                    if active.delete(txn).await?.rows_affected == 0 {
                        return Err(StoreError::detached(label));
                    }
                    self.inserted.retain(|inserted| *inserted != id);
                }
            }
        }
        Ok(())
    }

    fn track(&mut self, id: <SE::Model as Entity>::Id) {
        if !self.tracked.contains(&id) {
            self.tracked.push(id);
        }
    }
}

/// Bind a column value for a SeaORM filter expression
fn to_value(value: FieldValue) -> Value {
    match value {
        FieldValue::Null => Value::Bool(None),
        FieldValue::Bool(b) => b.into(),
        FieldValue::Int(i) => i.into(),
        FieldValue::Float(f) => f.into(),
        FieldValue::Text(s) => s.into(),
        FieldValue::Uuid(id) => id.into(),
        FieldValue::Timestamp(ts) => ts.into(),
    }
}

#[async_trait]
impl<SE, A> UnitOfWork<SE::Model> for SeaSession<SE, A>
where
    SE: EntityTrait,
    SE::Model: Entity + IntoActiveModel<A>,
    A: ActiveModelTrait<Entity = SE> + ActiveModelBehavior + Send + 'static,
{
    async fn all(&mut self, query: &Query<SE::Model>) -> StoreResult<Vec<SE::Model>> {
        let mut select = SE::find();
        for (field, value) in query.filters().iter() {
            let column = SE::Column::from_str(field).map_err(|_| {
                StoreError::unknown_column(<SE::Model as Entity>::NAME, field)
            })?;
            select = match value {
                FieldValue::Null => select.filter(column.is_null()),
                other => select.filter(column.eq(to_value(other.clone()))),
            };
        }
        if let Some(offset) = query.offset_value() {
            select = select.offset(offset);
        }
        if let Some(limit) = query.limit_value() {
            select = select.limit(limit);
        }

        self.flush().await?;
        let txn = self.transaction().await?;
        let rows = select.all(txn).await?;

        for row in &rows {
            let id = row.id();
            if !self.inserted.contains(&id) && !self.committed.contains(&id) {
                self.committed.push(id.clone());
            }
            self.track(id);
        }
        Ok(rows)
    }

    fn add(&mut self, entity: SE::Model) {
        self.track(entity.id());
        self.pending.push(Change::Insert(entity));
    }

    fn merge(&mut self, entity: &SE::Model) {
        self.track(entity.id());
        self.pending.push(Change::Update(entity.clone()));
    }

    fn delete(&mut self, entity: &SE::Model) {
        let id = entity.id();
        self.tracked.retain(|tracked| *tracked != id);
        self.pending.push(Change::Remove(entity.clone()));
    }

    async fn commit(&mut self) -> StoreResult<()> {
        self.flush().await?;
        if let Some(txn) = self.txn.take() {
            txn.commit().await?;
        }
        self.inserted.clear();
        self.committed = self.tracked.clone();
        Ok(())
    }

    async fn rollback(&mut self) -> StoreResult<()> {
        self.pending.clear();
        self.inserted.clear();
        self.tracked = self.committed.clone();
        if let Some(txn) = self.txn.take() {
            txn.rollback().await?;
        }
        Ok(())
    }

    async fn refresh(&mut self, entity: &mut SE::Model) -> StoreResult<()> {
        let query = Query::new().filter_by_id(&entity.id());
        match self.first(&query).await? {
            Some(fresh) => {
                *entity = fresh;
                Ok(())
            }
            None => Err(StoreError::detached(entity.display().to_string())),
        }
    }

    fn is_tracked(&self, entity: &SE::Model) -> bool {
        self.tracked.contains(&entity.id())
    }
}
