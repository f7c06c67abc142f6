//! Transaction demarcation for multi-statement workflows.
//!
//! [`TransactionCoordinator::run`] opens a transaction, hands it to a block of
//! gateway calls and finalizes it exactly once, whatever way the block ends:
//!
//! | block outcome     | finalizer | result                                  |
//! |-------------------|-----------|-----------------------------------------|
//! | `Ok(value)`       | commit    | `value`, or `Transaction` if commit fails |
//! | `Err(err)`        | rollback  | `err`, rollback failure appended        |
//! | deadline elapsed  | rollback  | `Transaction`                           |
//! | panic             | rollback  | `DbOperation` naming the panic payload  |
//!
//! Commit and rollback are never reachable from the block itself. The block
//! and the commit share one deadline measured from `BEGIN`; the rollback is
//! bounded by a deadline of its own.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use tokio::time::{Instant, timeout};
use tracing::{error, warn};

use super::ports::{CreateRecordError, RecordGateway, RecordTransaction};

/// Default upper bound on a transaction's lifetime.
pub const DEFAULT_TRANSACTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Open transaction as seen by a protected block.
pub type TransactionHandle = Box<dyn RecordTransaction>;

/// Runs protected blocks inside gateway transactions.
pub struct TransactionCoordinator<G> {
    gateway: Arc<G>,
    deadline: Duration,
}

impl<G> Clone for TransactionCoordinator<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            deadline: self.deadline,
        }
    }
}

impl<G> TransactionCoordinator<G>
where
    G: RecordGateway,
{
    pub fn new(gateway: Arc<G>, deadline: Duration) -> Self {
        Self { gateway, deadline }
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Run `block` inside a fresh transaction.
    ///
    /// `context` prefixes finalizer messages, e.g. `"creating employee"`.
    pub async fn run<T, F>(&self, context: &str, block: F) -> Result<T, CreateRecordError>
    where
        T: Send,
        F: for<'t> FnOnce(&'t mut TransactionHandle) -> BoxFuture<'t, Result<T, CreateRecordError>>
            + Send,
    {
        let mut tx = self.gateway.begin_transaction().await.map_err(|err| {
            error!(context, error = %err, "could not open transaction");
            CreateRecordError::transaction(format!("error creating transaction: {err}"))
        })?;
        let opened = Instant::now();

        // The block is invoked inside the guard so a panic raised before it
        // yields a future is caught too.
        let deadline = self.deadline;
        let handle = &mut tx;
        let outcome = AssertUnwindSafe(async move { timeout(deadline, block(handle)).await })
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(Ok(value))) => {
                let remaining = deadline.saturating_sub(opened.elapsed());
                match timeout(remaining, tx.commit()).await {
                    Ok(Ok(())) => Ok(value),
                    Ok(Err(err)) => {
                        error!(context, error = %err, "commit failed");
                        Err(CreateRecordError::transaction(format!(
                            "{context}: committing transaction error: {err}"
                        )))
                    }
                    Err(_elapsed) => {
                        error!(context, deadline = ?deadline, "commit exceeded transaction deadline");
                        Err(CreateRecordError::transaction(format!(
                            "{context}: committing transaction error: deadline of {deadline:?} exceeded"
                        )))
                    }
                }
            }
            Ok(Ok(Err(err))) => Err(self.rollback_after(context, tx, err).await),
            Ok(Err(_elapsed)) => {
                warn!(context, deadline = ?deadline, "transaction deadline exceeded");
                let err = CreateRecordError::transaction(format!(
                    "{context}: transaction deadline of {deadline:?} exceeded"
                ));
                Err(self.rollback_after(context, tx, err).await)
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!(context, panic = %message, "transaction block panicked");
                let err = CreateRecordError::db_operation(format!("{context} panic: {message}"));
                Err(self.rollback_after(context, tx, err).await)
            }
        }
    }

    /// Roll back, appending any rollback failure to `err`.
    ///
    /// The rollback gets its own `deadline`; on expiry the handle is dropped
    /// with the transaction still open and the pool discards the connection.
    async fn rollback_after(
        &self,
        context: &str,
        tx: TransactionHandle,
        err: CreateRecordError,
    ) -> CreateRecordError {
        match timeout(self.deadline, tx.rollback()).await {
            Ok(Ok(())) => err,
            Ok(Err(rollback_err)) => {
                warn!(context, error = %rollback_err, "rollback failed");
                err.with_rollback_failure(context, &rollback_err)
            }
            Err(_elapsed) => {
                warn!(context, deadline = ?self.deadline, "rollback exceeded deadline");
                err.with_rollback_failure(
                    context,
                    &format!("rollback deadline of {:?} exceeded", self.deadline),
                )
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}

#[cfg(test)]
#[path = "transaction_tests.rs"]
mod tests;
