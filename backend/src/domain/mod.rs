//! Domain types, ports and services.
//!
//! Public surface:
//! - `Record`, `RecordId`, `RecordKind`, `RecordName`: persisted employees
//!   and roles.
//! - `CreateRecordRequest` / `NewRecord`: create payload before and after
//!   validation.
//! - `RecordService`: implements the driving ports for one record kind.
//! - `TransactionCoordinator`: commit-or-rollback wrapper around gateway
//!   transactions.
//! - `Error` / `ErrorCode`: transport-agnostic failures for adapters.

pub mod error;
pub mod ports;
pub mod record;
pub mod record_service;
pub mod trace_id;
pub mod transaction;
pub mod validation;

pub use self::error::{Error, ErrorCode};
pub use self::record::{
    CreateRecordRequest, NAME_MAX_CHARS, NAME_MIN_CHARS, NewRecord, Record, RecordId,
    RecordIdParseError, RecordKind, RecordName,
};
pub use self::record_service::RecordService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::transaction::{DEFAULT_TRANSACTION_TIMEOUT, TransactionCoordinator};
pub use self::validation::{FieldViolation, Validate, ValidationErrors};

/// Result alias for driving port calls.
pub type ApiResult<T> = Result<T, Error>;
