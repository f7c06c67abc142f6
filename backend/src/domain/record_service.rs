//! Record domain service.
//!
//! One service instance serves one [`RecordKind`]; it implements both driving
//! ports on top of a [`RecordGateway`]. Creation follows the uniqueness-checked
//! workflow: validate, then check the name and insert inside one transaction.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::FutureExt;
use tracing::info;

use crate::domain::ports::{
    CreateRecordError, RecordCommand, RecordGateway, RecordGatewayError, RecordQuery,
};
use crate::domain::transaction::TransactionCoordinator;
use crate::domain::{
    CreateRecordRequest, Error, NewRecord, Record, RecordId, RecordKind, RecordName,
};

fn map_repository_error(context: String, error: RecordGatewayError) -> Error {
    Error::internal(format!("{context}: {error}"))
}

fn already_exists(kind: RecordKind, name: &RecordName) -> CreateRecordError {
    CreateRecordError::already_exists(format!("{kind} with name {name} already exists"))
}

fn join_ids(ids: &[RecordId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Service implementing [`RecordCommand`] and [`RecordQuery`] for one kind.
pub struct RecordService<G> {
    kind: RecordKind,
    gateway: Arc<G>,
    transactions: TransactionCoordinator<G>,
}

impl<G> Clone for RecordService<G> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            gateway: Arc::clone(&self.gateway),
            transactions: self.transactions.clone(),
        }
    }
}

impl<G> RecordService<G>
where
    G: RecordGateway,
{
    /// Create a service whose transactions are bounded by `transaction_timeout`.
    pub fn new(kind: RecordKind, gateway: Arc<G>, transaction_timeout: Duration) -> Self {
        let transactions = TransactionCoordinator::new(Arc::clone(&gateway), transaction_timeout);
        Self {
            kind,
            gateway,
            transactions,
        }
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    /// Create a record whose name is not yet taken.
    ///
    /// The existence check and the insert share one transaction. A unique
    /// index violation raised by the insert (a concurrent creator won) is
    /// reported the same way as a positive existence check.
    pub async fn create_unique(
        &self,
        request: CreateRecordRequest,
    ) -> Result<RecordId, CreateRecordError> {
        let record = NewRecord::try_from(request).map_err(CreateRecordError::request_validation)?;
        let kind = self.kind;
        let context = format!("creating {kind}");

        let id = self
            .transactions
            .run(&context, move |tx| {
                async move {
                    let name = &record.name;
                    let exists = tx.exists_by_name(name).await.map_err(|err| {
                        CreateRecordError::db_operation(format!(
                            "error finding {kind} by name: {name}, {err}"
                        ))
                    })?;
                    if exists {
                        return Err(already_exists(kind, name));
                    }

                    tx.insert(&record).await.map_err(|err| match err {
                        RecordGatewayError::UniqueViolation { .. } => already_exists(kind, name),
                        other => CreateRecordError::db_operation(format!(
                            "error creating {kind} {name}: {other}"
                        )),
                    })
                }
                .boxed()
            })
            .await?;

        info!(kind = %kind, id = %id, "record created");
        Ok(id)
    }
}

#[async_trait]
impl<G> RecordCommand for RecordService<G>
where
    G: RecordGateway,
{
    async fn create(&self, request: CreateRecordRequest) -> Result<RecordId, CreateRecordError> {
        self.create_unique(request).await
    }

    async fn delete_by_id(&self, id: RecordId) -> Result<(), Error> {
        let kind = self.kind;
        let deleted = self.gateway.delete_by_id(id).await.map_err(|err| {
            map_repository_error(format!("error deleting {kind} by id {id}"), err)
        })?;
        info!(kind = %kind, id = %id, deleted, "record deleted");
        Ok(())
    }

    async fn delete_by_ids(&self, ids: Vec<RecordId>) -> Result<(), Error> {
        let kind = self.kind;
        let deleted = self.gateway.delete_by_ids(&ids).await.map_err(|err| {
            map_repository_error(
                format!("error deleting {} by ids {}", kind.plural(), join_ids(&ids)),
                err,
            )
        })?;
        info!(kind = %kind, requested = ids.len(), deleted, "records deleted");
        Ok(())
    }
}

#[async_trait]
impl<G> RecordQuery for RecordService<G>
where
    G: RecordGateway,
{
    async fn find_by_id(&self, id: RecordId) -> Result<Record, Error> {
        let kind = self.kind;
        self.gateway
            .find_by_id(id)
            .await
            .map_err(|err| map_repository_error(format!("error finding {kind} with id {id}"), err))?
            .ok_or_else(|| Error::not_found(format!("{kind} with id {id} not found")))
    }

    async fn find_by_ids(&self, ids: Vec<RecordId>) -> Result<Vec<Record>, Error> {
        let kind = self.kind;
        self.gateway.find_by_ids(&ids).await.map_err(|err| {
            map_repository_error(
                format!("error finding {} with ids {}", kind.plural(), join_ids(&ids)),
                err,
            )
        })
    }

    async fn list_all(&self) -> Result<Vec<Record>, Error> {
        let kind = self.kind;
        self.gateway
            .list_all()
            .await
            .map_err(|err| map_repository_error(format!("error listing {}", kind.plural()), err))
    }
}

#[cfg(test)]
#[path = "record_service_tests.rs"]
mod tests;
