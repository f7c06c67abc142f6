//! Shared helper utilities for backend integration tests.
//!
//! Integration tests compile as separate crates under `backend/tests/`; each
//! suite pulls these helpers in with `mod support;`.

#![allow(dead_code, reason = "not every suite uses every helper")]

mod cluster_skip;
pub mod pg_embed;

pub use cluster_skip::{SKIP_MARKER, handle_cluster_setup_failure};

use diesel::Connection;
use diesel::pg::PgConnection;
use idm::outbound::persistence::run_pending_migrations;
use pg_embedded_setup_unpriv::TestCluster;
use postgres::{Client, NoTls};

/// Render a `postgres` error with the SQLSTATE and server message.
///
/// The `Display` implementation collapses database errors to `db error`.
pub fn format_postgres_error(error: &postgres::Error) -> String {
    let Some(db_error) = error.as_db_error() else {
        return error.to_string();
    };

    let mut summary = format!(
        "postgres error {:?}: {}",
        db_error.code(),
        db_error.message()
    );
    if let Some(detail) = db_error.detail() {
        summary.push_str("; detail: ");
        summary.push_str(detail);
    }
    summary
}

/// Drop and recreate `name` so each suite starts from an empty schema.
///
/// Uses `postgres` rather than Diesel because `DROP DATABASE` cannot run
/// inside a transaction block.
pub fn reset_database(cluster: &TestCluster, name: &str) -> Result<(), String> {
    let admin_url = cluster.connection().database_url("postgres");
    let mut client = Client::connect(&admin_url, NoTls).map_err(|err| format_postgres_error(&err))?;
    client
        .batch_execute(&format!(
            "DROP DATABASE IF EXISTS \"{name}\" WITH (FORCE); CREATE DATABASE \"{name}\";"
        ))
        .map_err(|err| format_postgres_error(&err))
}

/// Apply the embedded migrations to the database at `url`.
pub fn migrate_schema(url: &str) -> Result<usize, String> {
    let mut conn = PgConnection::establish(url).map_err(|err| format!("connect: {err}"))?;
    run_pending_migrations(&mut conn).map_err(|err| err.to_string())
}
