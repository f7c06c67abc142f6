//! Shared HTTP adapter state.
//!
//! Handlers receive these bundles through `actix_web::web::Data`, so they
//! depend only on domain ports and can be tested without I/O.

use std::sync::Arc;

use crate::domain::ports::{ConnectionProbe, RecordCommand, RecordQuery};

/// Driving ports for one record resource.
#[derive(Clone)]
pub struct RecordPorts {
    pub command: Arc<dyn RecordCommand>,
    pub query: Arc<dyn RecordQuery>,
}

impl RecordPorts {
    /// Bundle a service implementing both ports.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use std::time::Duration;
    ///
    /// use idm::domain::{RecordKind, RecordService};
    /// use idm::inbound::http::state::RecordPorts;
    /// use idm::test_support::InMemoryRecordGateway;
    ///
    /// let service = RecordService::new(
    ///     RecordKind::Employee,
    ///     Arc::new(InMemoryRecordGateway::new()),
    ///     Duration::from_secs(5),
    /// );
    /// let _ports = RecordPorts::from_service(Arc::new(service));
    /// ```
    pub fn from_service<S>(service: Arc<S>) -> Self
    where
        S: RecordCommand + RecordQuery + 'static,
    {
        let command: Arc<dyn RecordCommand> = service.clone();
        let query: Arc<dyn RecordQuery> = service;
        Self { command, query }
    }
}

/// Application identity reported by `/internal/info`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppInfo {
    pub name: String,
    pub version: String,
}

/// Dependency bundle for every HTTP handler.
#[derive(Clone)]
pub struct HttpState {
    pub employees: RecordPorts,
    pub roles: RecordPorts,
    pub probe: Arc<dyn ConnectionProbe>,
    pub info: AppInfo,
}
