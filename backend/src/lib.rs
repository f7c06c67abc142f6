//! Employee and role records backend.
//!
//! Records are created through a transactional workflow that checks the
//! natural key (`name`) before inserting, so concurrent creates of the same
//! name yield exactly one row.

pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use middleware::Trace;
