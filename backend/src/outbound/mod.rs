//! Outbound adapters implementing the driven ports.
//!
//! - **persistence**: PostgreSQL record gateway, health probe and migrations
//!   via Diesel and `diesel-async`.
//!
//! Adapters translate between rows and domain types; they hold no business
//! rules.

pub mod persistence;
