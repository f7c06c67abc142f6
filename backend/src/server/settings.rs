//! Application settings loaded via OrthoConfig.
//!
//! Values come from `IDM_*` environment variables, CLI flags and config
//! files. Only the database URL is mandatory.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use idm::inbound::http::state::AppInfo;
use idm::outbound::persistence::PoolConfig;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_APP_NAME: &str = "idm";
const DEFAULT_ENV_FILE: &str = ".env";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 20;
const DEFAULT_DB_MIN_IDLE: u32 = 5;
const DEFAULT_DB_CONNECTION_TIMEOUT_SECS: u64 = 30;
const DEFAULT_TRANSACTION_TIMEOUT_SECS: u64 = 5;
const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 5;

/// Invalid or missing settings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("database url is required (set IDM_DATABASE_URL)")]
    MissingDatabaseUrl,
    #[error("invalid bind address {value}: {message}")]
    InvalidBindAddr { value: String, message: String },
}

/// Runtime configuration for the service.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "IDM")]
pub struct AppSettings {
    /// Dotenv file read before the remaining settings.
    pub env_file: Option<PathBuf>,
    /// PostgreSQL connection URL.
    pub database_url: Option<String>,
    /// Listen address, `host:port`.
    pub bind_addr: Option<String>,
    pub app_name: Option<String>,
    #[ortho_config(cli_short = 'v')]
    pub app_version: Option<String>,
    #[ortho_config(cli_short = 'm')]
    pub db_max_connections: Option<u32>,
    #[ortho_config(cli_short = 'i')]
    pub db_min_idle: Option<u32>,
    #[ortho_config(cli_short = 'c')]
    pub db_connection_timeout_secs: Option<u64>,
    /// Deadline for each create workflow transaction.
    #[ortho_config(cli_short = 't')]
    pub transaction_timeout_secs: Option<u64>,
    /// Grace period for in-flight requests on shutdown.
    #[ortho_config(cli_short = 's')]
    pub shutdown_timeout_secs: Option<u64>,
}

impl AppSettings {
    pub fn env_file(&self) -> PathBuf {
        self.env_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ENV_FILE))
    }

    /// Return the database URL.
    ///
    /// # Errors
    /// [`SettingsError::MissingDatabaseUrl`] when unset or blank.
    pub fn database_url(&self) -> Result<&str, SettingsError> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or(SettingsError::MissingDatabaseUrl)
    }

    /// Return the parsed listen address, falling back to `0.0.0.0:8080`.
    ///
    /// # Errors
    /// [`SettingsError::InvalidBindAddr`] when the value is not `host:port`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value
            .parse()
            .map_err(|err: std::net::AddrParseError| SettingsError::InvalidBindAddr {
                value: value.to_owned(),
                message: err.to_string(),
            })
    }

    pub fn app_info(&self) -> AppInfo {
        AppInfo {
            name: self
                .app_name
                .clone()
                .unwrap_or_else(|| DEFAULT_APP_NAME.to_owned()),
            version: self
                .app_version
                .clone()
                .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_owned()),
        }
    }

    /// Build the pool configuration from the database settings.
    ///
    /// # Errors
    /// [`SettingsError::MissingDatabaseUrl`] when no URL is configured.
    pub fn pool_config(&self) -> Result<PoolConfig, SettingsError> {
        Ok(PoolConfig::new(self.database_url()?)
            .with_max_size(self.db_max_connections.unwrap_or(DEFAULT_DB_MAX_CONNECTIONS))
            .with_min_idle(Some(self.db_min_idle.unwrap_or(DEFAULT_DB_MIN_IDLE)))
            .with_connection_timeout(Duration::from_secs(
                self.db_connection_timeout_secs
                    .unwrap_or(DEFAULT_DB_CONNECTION_TIMEOUT_SECS),
            )))
    }

    pub fn transaction_timeout(&self) -> Duration {
        Duration::from_secs(
            self.transaction_timeout_secs
                .unwrap_or(DEFAULT_TRANSACTION_TIMEOUT_SECS),
        )
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(
            self.shutdown_timeout_secs
                .unwrap_or(DEFAULT_SHUTDOWN_TIMEOUT_SECS),
        )
    }
}
