//! # Jobdesk Service
//!
//! Service layer for Jobdesk: the cache-aside coordinator, the listing
//! fallback and the user/job services built on top of them.
//!
//! ```text
//! UserService / JobService
//!   ├─ CacheCoordinator  (write_cache, delete_cache, fetch_cache)
//!   │    ├─ EntityStore
//!   │    └─ CacheInterface  (Redis or in-memory)
//!   ├─ ListingService    (search index, store fallback)
//!   └─ SearchIndex       (index maintenance)
//! ```

pub mod cache;
pub mod coordinator;
pub mod dto;
pub mod r#impl;
pub mod job_service;
pub mod listing;
pub mod metrics;
pub mod user_service;

#[cfg(test)]
mod test_support;

pub use cache::*;
pub use coordinator::*;
pub use dto::*;
pub use job_service::*;
pub use listing::*;
pub use r#impl::*;
pub use user_service::*;
