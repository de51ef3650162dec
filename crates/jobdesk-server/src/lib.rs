//! # Jobdesk Server Library
//!
//! Dependency injection wiring, startup helpers and the maintenance
//! commands of the Jobdesk server.

pub mod di;
pub mod maintenance;
pub mod startup;
