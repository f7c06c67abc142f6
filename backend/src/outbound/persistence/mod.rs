//! PostgreSQL persistence adapters.
//!
//! Row structs (`models.rs`) stay private to this module. Connections come
//! from a `bb8` pool over `diesel-async`; migrations run on a plain
//! synchronous connection at startup.
//!
//! # Example
//!
//! ```rust,no_run
//! use idm::domain::RecordKind;
//! use idm::outbound::persistence::{DbPool, DieselRecordRepository, PoolConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/idm")).await?;
//! let roles = DieselRecordRepository::new(pool, RecordKind::Role);
//! # let _ = roles;
//! # Ok(())
//! # }
//! ```

mod diesel_connection_probe;
mod diesel_error_mapping;
mod diesel_record_repository;
mod migrations;
mod models;
mod pool;

pub use diesel_connection_probe::DieselConnectionProbe;
pub use diesel_record_repository::{DieselRecordRepository, DieselRecordTransaction};
pub use migrations::{MIGRATIONS, MigrationError, apply_migrations, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
