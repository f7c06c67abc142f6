//! Builders for HTTP state ports backed by the Diesel adapters.

use std::sync::Arc;
use std::time::Duration;

use idm::domain::ports::ConnectionProbe;
use idm::domain::{RecordKind, RecordService};
use idm::inbound::http::state::{HttpState, RecordPorts};
use idm::outbound::persistence::{DbPool, DieselConnectionProbe, DieselRecordRepository};

use super::ServerConfig;

/// Wire one record kind: repository, service, then the driving ports.
fn build_record_ports(pool: &DbPool, kind: RecordKind, transaction_timeout: Duration) -> RecordPorts {
    let repository = Arc::new(DieselRecordRepository::new(pool.clone(), kind));
    let service = RecordService::new(kind, repository, transaction_timeout);
    RecordPorts::from_service(Arc::new(service))
}

pub(super) fn build_http_state(config: &ServerConfig) -> HttpState {
    let pool = &config.db_pool;
    let timeout = config.transaction_timeout;
    let probe: Arc<dyn ConnectionProbe> = Arc::new(DieselConnectionProbe::new(pool.clone()));
    HttpState {
        employees: build_record_ports(pool, RecordKind::Employee, timeout),
        roles: build_record_ports(pool, RecordKind::Role, timeout),
        probe,
        info: config.info.clone(),
    }
}
