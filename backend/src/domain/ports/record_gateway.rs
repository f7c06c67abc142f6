//! Driven port for record persistence.
//!
//! Every method issues a single statement. Creation runs against a
//! [`RecordTransaction`] obtained from [`RecordGateway::begin_transaction`];
//! the transaction owns its connection until it is committed or rolled back.

use async_trait::async_trait;

use crate::domain::{NewRecord, Record, RecordId, RecordName};

use super::define_port_error;

define_port_error! {
    /// Errors raised by record gateway adapters.
    pub enum RecordGatewayError {
        /// No connection could be obtained.
        Connection { message: String } => "record gateway connection failed: {message}",
        /// A statement failed during execution.
        Query { message: String } => "record gateway query failed: {message}",
        /// The unique index on `name` rejected a row.
        UniqueViolation { message: String } => "record name already taken: {message}",
        /// Opening, committing or rolling back a transaction failed.
        Transaction { message: String } => "record gateway transaction failed: {message}",
    }
}

/// An open database transaction.
///
/// `commit` and `rollback` consume the handle, so a finished transaction
/// cannot be reused. Dropping an unfinished handle discards its connection.
#[async_trait]
pub trait RecordTransaction: Send {
    /// `SELECT EXISTS(...)` by name within this transaction.
    async fn exists_by_name(&mut self, name: &RecordName) -> Result<bool, RecordGatewayError>;

    /// `INSERT ... RETURNING id` within this transaction.
    async fn insert(&mut self, record: &NewRecord) -> Result<RecordId, RecordGatewayError>;

    async fn commit(self: Box<Self>) -> Result<(), RecordGatewayError>;

    async fn rollback(self: Box<Self>) -> Result<(), RecordGatewayError>;
}

/// Port for reading and deleting records of one kind, and for opening
/// transactions used by the create workflow.
///
/// Batch methods issue one statement for the whole id set and return without
/// touching storage when the set is empty.
#[async_trait]
pub trait RecordGateway: Send + Sync {
    async fn begin_transaction(&self) -> Result<Box<dyn RecordTransaction>, RecordGatewayError>;

    async fn find_by_id(&self, id: RecordId) -> Result<Option<Record>, RecordGatewayError>;

    async fn find_by_ids(&self, ids: &[RecordId]) -> Result<Vec<Record>, RecordGatewayError>;

    async fn list_all(&self) -> Result<Vec<Record>, RecordGatewayError>;

    /// Returns the number of deleted rows.
    async fn delete_by_id(&self, id: RecordId) -> Result<u64, RecordGatewayError>;

    /// Returns the number of deleted rows.
    async fn delete_by_ids(&self, ids: &[RecordId]) -> Result<u64, RecordGatewayError>;
}
