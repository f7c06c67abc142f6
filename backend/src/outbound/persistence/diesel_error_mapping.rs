//! Maps pool and Diesel failures onto record gateway errors.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::RecordGatewayError;

use super::pool::PoolError;

pub(crate) fn map_pool_error(error: PoolError) -> RecordGatewayError {
    debug!(error = %error, "pool checkout failed");
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            RecordGatewayError::connection(message)
        }
    }
}

pub(crate) fn map_diesel_error(error: DieselError) -> RecordGatewayError {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(error = %error, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            RecordGatewayError::unique_violation(
                info.constraint_name().unwrap_or("unique index").to_owned(),
            )
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
            RecordGatewayError::connection(info.message().to_owned())
        }
        DieselError::DatabaseError(DatabaseErrorKind::SerializationFailure, info) => {
            RecordGatewayError::transaction(info.message().to_owned())
        }
        DieselError::DatabaseError(_, info) => RecordGatewayError::query(info.message().to_owned()),
        DieselError::BrokenTransactionManager | DieselError::AlreadyInTransaction => {
            RecordGatewayError::transaction(error.to_string())
        }
        other => RecordGatewayError::query(other.to_string()),
    }
}
