//! Port used by the health endpoint to check storage reachability.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Reasons a probe can fail.
    pub enum ConnectionProbeError {
        Unreachable { message: String } => "database unreachable: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConnectionProbe: Send + Sync {
    /// Run a trivial query against the database.
    async fn ping(&self) -> Result<(), ConnectionProbeError>;
}

/// Probe that always succeeds, for tests without a database.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureConnectionProbe;

#[async_trait]
impl ConnectionProbe for FixtureConnectionProbe {
    async fn ping(&self) -> Result<(), ConnectionProbeError> {
        Ok(())
    }
}
