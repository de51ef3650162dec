//! # Jobdesk Search
//!
//! The search index used for listings. Documents are the denormalized JSON
//! form of users (with their jobs) and jobs (with their user); the index is
//! eventually consistent with the entity store and may be unavailable.

pub mod document;
pub mod elasticsearch;
pub mod mappings;
pub mod query;
pub mod traits;

pub use document::*;
pub use elasticsearch::*;
pub use mappings::*;
pub use query::*;
pub use traits::*;
