//! Cache store for entity snapshots.
//!
//! [`RedisCacheService`] is the production store; [`MemoryCacheService`]
//! replaces it when Redis is disabled.

mod cache_interface;
pub mod cache_keys;
mod memory_cache;
mod redis_cache;

pub use cache_interface::CacheInterface;
pub use memory_cache::{MemoryCacheService, MemoryCacheServiceParameters};
pub use redis_cache::{RedisCacheService, RedisCacheServiceParameters};
