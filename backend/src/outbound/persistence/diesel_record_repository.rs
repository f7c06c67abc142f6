//! PostgreSQL-backed record gateway.
//!
//! Employees and roles share a table layout, so one adapter serves both; the
//! [`RecordKind`] picks the table. Each method issues exactly one statement.
//! Batch lookups and deletes bind the whole id set as one array parameter
//! (`id = ANY($1)`), which PostgreSQL treats like an `IN` list.

use async_trait::async_trait;
use diesel::OptionalExtension;
use diesel::sql_query;
use diesel::sql_types::{Array, BigInt, Text, Timestamptz};
use diesel_async::pooled_connection::bb8::PooledConnection;
use diesel_async::{AnsiTransactionManager, AsyncPgConnection, RunQueryDsl, TransactionManager};
use tracing::debug;

use crate::domain::ports::{RecordGateway, RecordGatewayError, RecordTransaction};
use crate::domain::{NewRecord, Record, RecordId, RecordKind, RecordName};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{ExistsRow, IdRow, RecordRow};
use super::pool::DbPool;

const RECORD_COLUMNS: &str = "id, name, create_at, update_at";

fn select_sql(kind: RecordKind, clause: &str) -> String {
    format!("SELECT {RECORD_COLUMNS} FROM {} {clause}", kind.table())
}

fn raw_ids(ids: &[RecordId]) -> Vec<i64> {
    ids.iter().map(|id| id.get()).collect()
}

fn map_transaction_error(error: diesel::result::Error) -> RecordGatewayError {
    match map_diesel_error(error) {
        RecordGatewayError::Query { message } => RecordGatewayError::transaction(message),
        other => other,
    }
}

/// Diesel implementation of [`RecordGateway`] for one record kind.
#[derive(Clone)]
pub struct DieselRecordRepository {
    pool: DbPool,
    kind: RecordKind,
}

impl DieselRecordRepository {
    /// Create a repository for `kind` backed by `pool`.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use idm::domain::RecordKind;
    /// use idm::outbound::persistence::{DbPool, DieselRecordRepository, PoolConfig};
    ///
    /// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
    /// let pool = DbPool::new(PoolConfig::new("postgres://localhost/idm")).await?;
    /// let employees = DieselRecordRepository::new(pool, RecordKind::Employee);
    /// # let _ = employees;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(pool: DbPool, kind: RecordKind) -> Self {
        Self { pool, kind }
    }
}

#[async_trait]
impl RecordGateway for DieselRecordRepository {
    async fn begin_transaction(&self) -> Result<Box<dyn RecordTransaction>, RecordGatewayError> {
        let mut conn = self.pool.get_owned().await.map_err(map_pool_error)?;
        <AnsiTransactionManager as TransactionManager<AsyncPgConnection>>::begin_transaction(
            &mut *conn,
        )
        .await
        .map_err(map_transaction_error)?;
        debug!(kind = %self.kind, "transaction opened");
        Ok(Box::new(DieselRecordTransaction {
            conn,
            kind: self.kind,
        }))
    }

    async fn find_by_id(&self, id: RecordId) -> Result<Option<Record>, RecordGatewayError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = sql_query(select_sql(self.kind, "WHERE id = $1"))
            .bind::<BigInt, _>(id.get())
            .get_result::<RecordRow>(&mut *conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Record::from))
    }

    async fn find_by_ids(&self, ids: &[RecordId]) -> Result<Vec<Record>, RecordGatewayError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = sql_query(select_sql(self.kind, "WHERE id = ANY($1) ORDER BY id"))
            .bind::<Array<BigInt>, _>(raw_ids(ids))
            .load::<RecordRow>(&mut *conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Record::from).collect())
    }

    async fn list_all(&self) -> Result<Vec<Record>, RecordGatewayError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = sql_query(select_sql(self.kind, "ORDER BY id"))
            .load::<RecordRow>(&mut *conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Record::from).collect())
    }

    async fn delete_by_id(&self, id: RecordId) -> Result<u64, RecordGatewayError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = sql_query(format!("DELETE FROM {} WHERE id = $1", self.kind.table()))
            .bind::<BigInt, _>(id.get())
            .execute(&mut *conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted as u64)
    }

    async fn delete_by_ids(&self, ids: &[RecordId]) -> Result<u64, RecordGatewayError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = sql_query(format!(
            "DELETE FROM {} WHERE id = ANY($1)",
            self.kind.table()
        ))
        .bind::<Array<BigInt>, _>(raw_ids(ids))
        .execute(&mut *conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(deleted as u64)
    }
}

/// Open transaction owning its pooled connection.
///
/// If the handle is dropped before commit or rollback, the connection still
/// reports an open transaction and the pool discards it.
pub struct DieselRecordTransaction {
    conn: PooledConnection<'static, AsyncPgConnection>,
    kind: RecordKind,
}

#[async_trait]
impl RecordTransaction for DieselRecordTransaction {
    async fn exists_by_name(&mut self, name: &RecordName) -> Result<bool, RecordGatewayError> {
        let row = sql_query(format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE name = $1) AS found",
            self.kind.table()
        ))
        .bind::<Text, _>(name.as_str())
        .get_result::<ExistsRow>(&mut *self.conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(row.found)
    }

    async fn insert(&mut self, record: &NewRecord) -> Result<RecordId, RecordGatewayError> {
        let row = sql_query(format!(
            "INSERT INTO {} (name, create_at, update_at) VALUES ($1, $2, $3) RETURNING id",
            self.kind.table()
        ))
        .bind::<Text, _>(record.name.as_str())
        .bind::<Timestamptz, _>(record.created_at)
        .bind::<Timestamptz, _>(record.updated_at)
        .get_result::<IdRow>(&mut *self.conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(RecordId::new(row.id))
    }

    async fn commit(self: Box<Self>) -> Result<(), RecordGatewayError> {
        let Self { mut conn, kind } = *self;
        <AnsiTransactionManager as TransactionManager<AsyncPgConnection>>::commit_transaction(
            &mut *conn,
        )
        .await
        .map_err(map_transaction_error)?;
        debug!(kind = %kind, "transaction committed");
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), RecordGatewayError> {
        let Self { mut conn, kind } = *self;
        <AnsiTransactionManager as TransactionManager<AsyncPgConnection>>::rollback_transaction(
            &mut *conn,
        )
        .await
        .map_err(map_transaction_error)?;
        debug!(kind = %kind, "transaction rolled back");
        Ok(())
    }
}
