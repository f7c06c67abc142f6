//! Driving port for record mutations.

use async_trait::async_trait;

use crate::domain::validation::ValidationErrors;
use crate::domain::{CreateRecordRequest, Error, RecordId};

use super::define_port_error;

define_port_error! {
    /// Outcome classes of the uniqueness-checked create workflow.
    pub enum CreateRecordError {
        /// The request failed field validation; nothing was started.
        RequestValidation { violations: ValidationErrors } =>
            "request validation failed: {violations}",
        /// Another record already uses the requested name.
        AlreadyExists { message: String } => "{message}",
        /// A transaction could not be opened or committed, or its deadline
        /// elapsed.
        Transaction { message: String } => "{message}",
        /// A statement inside the transaction failed or the block panicked.
        DbOperation { message: String } => "{message}",
    }
}

impl CreateRecordError {
    /// Append a failed rollback to this error, keeping its kind.
    ///
    /// Validation failures never reach a transaction and are returned as is.
    #[must_use]
    pub fn with_rollback_failure(self, context: &str, rollback: &impl std::fmt::Display) -> Self {
        let append =
            |message: String| format!("{context}: rolling back transaction errors: {message}, {rollback}");
        match self {
            Self::RequestValidation { .. } => self,
            Self::AlreadyExists { message } => Self::already_exists(append(message)),
            Self::Transaction { message } => Self::transaction(append(message)),
            Self::DbOperation { message } => Self::db_operation(append(message)),
        }
    }

    /// Whether the caller may safely repeat the whole create.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transaction { .. })
    }
}

/// Port for creating and deleting records of one kind.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordCommand: Send + Sync {
    /// Validate, check the name is free and insert inside one transaction.
    async fn create(&self, request: CreateRecordRequest) -> Result<RecordId, CreateRecordError>;

    /// Delete one record. Unknown ids are not an error.
    async fn delete_by_id(&self, id: RecordId) -> Result<(), Error>;

    /// Delete every listed record with one statement.
    async fn delete_by_ids(&self, ids: Vec<RecordId>) -> Result<(), Error>;
}
