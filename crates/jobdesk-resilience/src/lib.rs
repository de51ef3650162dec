//! # Jobdesk Resilience
//!
//! Resilience patterns for Jobdesk.
//! Remote calls that have a cheaper fallback are bounded with a timeout.

pub mod timeout;

pub use timeout::*;
