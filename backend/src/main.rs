//! Backend entry-point: loads settings, migrates the schema and serves the
//! employee and role endpoints.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

mod server;

use std::io;
use std::path::Path;

use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use idm::outbound::persistence::{DbPool, apply_migrations};
use server::{AppSettings, ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = load_settings()?;
    let pool_config = settings.pool_config().map_err(io::Error::other)?;
    let bind_addr = settings.bind_addr().map_err(io::Error::other)?;

    apply_migrations(pool_config.database_url())
        .await
        .map_err(|e| io::Error::other(format!("apply migrations: {e}")))?;

    let pool = DbPool::new(pool_config)
        .await
        .map_err(|e| io::Error::other(format!("create database pool: {e}")))?;

    let config = ServerConfig::new(bind_addr, pool, settings.app_info())
        .with_transaction_timeout(settings.transaction_timeout())
        .with_shutdown_timeout(settings.shutdown_timeout());

    create_server(config)?.await
}

/// Load settings, reading the dotenv file first so its values take part.
fn load_settings() -> io::Result<AppSettings> {
    let initial = AppSettings::load().map_err(|e| io::Error::other(format!("load settings: {e}")))?;
    load_env_file(&initial.env_file());
    AppSettings::load().map_err(|e| io::Error::other(format!("load settings: {e}")))
}

fn load_env_file(path: &Path) {
    match dotenvy::from_path(path) {
        Ok(()) => info!(path = %path.display(), "loaded environment file"),
        Err(e) if e.not_found() => {}
        Err(e) => warn!(path = %path.display(), error = %e, "ignoring unreadable environment file"),
    }
}
