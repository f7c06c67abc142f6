//! Domain ports for the hexagonal boundary.
//!
//! Driving ports (`RecordCommand`, `RecordQuery`) are implemented by domain
//! services and called by inbound adapters. Driven ports (`RecordGateway`,
//! `ConnectionProbe`) are implemented by outbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod connection_probe;
mod record_command;
mod record_gateway;
mod record_query;

#[cfg(test)]
pub use connection_probe::MockConnectionProbe;
pub use connection_probe::{ConnectionProbe, ConnectionProbeError, FixtureConnectionProbe};
#[cfg(test)]
pub use record_command::MockRecordCommand;
pub use record_command::{CreateRecordError, RecordCommand};
pub use record_gateway::{RecordGateway, RecordGatewayError, RecordTransaction};
#[cfg(test)]
pub use record_query::MockRecordQuery;
pub use record_query::RecordQuery;
