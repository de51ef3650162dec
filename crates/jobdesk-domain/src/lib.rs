//! # Jobdesk Domain
//!
//! Domain entities (users and jobs), their value objects, listing filters
//! and the static association registry that drives eager loading and
//! recursive caching.

pub mod entities;
pub mod filter;
pub mod schema;
pub mod value_objects;

pub use entities::*;
pub use filter::*;
pub use schema::*;
pub use value_objects::*;
