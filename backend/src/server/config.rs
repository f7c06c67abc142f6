//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::time::Duration;

use idm::domain::DEFAULT_TRANSACTION_TIMEOUT;
use idm::inbound::http::state::AppInfo;
use idm::outbound::persistence::DbPool;

const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: DbPool,
    pub(crate) info: AppInfo,
    pub(crate) transaction_timeout: Duration,
    pub(crate) shutdown_timeout: Duration,
}

impl ServerConfig {
    /// Construct a server configuration around an established pool.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, db_pool: DbPool, info: AppInfo) -> Self {
        Self {
            bind_addr,
            db_pool,
            info,
            transaction_timeout: DEFAULT_TRANSACTION_TIMEOUT,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }

    /// Deadline applied to each create workflow transaction.
    #[must_use]
    pub fn with_transaction_timeout(mut self, timeout: Duration) -> Self {
        self.transaction_timeout = timeout;
        self
    }

    /// Grace period for in-flight requests once a stop signal arrives.
    #[must_use]
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
