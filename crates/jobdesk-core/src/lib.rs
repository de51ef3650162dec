//! # Jobdesk Core
//!
//! Core types, traits, and error definitions for Jobdesk.
//! This crate provides the foundational abstractions shared by the
//! domain, repository, search, and service layers.

pub mod error;
pub mod id;
pub mod result;
pub mod validation;

pub use error::*;
pub use id::*;
pub use result::*;
pub use validation::*;

// Re-export shaku for dependency injection
pub use shaku::Interface;
