//! Cache interface trait for abstracted caching operations.

use async_trait::async_trait;
use jobdesk_core::JobdeskResult;
use shaku::Interface;
use std::time::Duration;

/// Key/value cache store holding JSON snapshots of entities.
///
/// Implementations must treat expired entries as absent. A `ttl` of `None`
/// stores the entry without expiry.
#[async_trait]
pub trait CacheInterface: Interface + Send + Sync {
    /// Get a raw JSON value from the cache.
    ///
    /// Returns `None` if the key doesn't exist or has expired.
    async fn read_raw(&self, key: &str) -> JobdeskResult<Option<String>>;

    /// Set a raw JSON value in the cache, replacing any previous value.
    async fn write_raw(&self, key: &str, value: &str, ttl: Option<Duration>) -> JobdeskResult<()>;

    /// Delete a value from the cache.
    ///
    /// Returns `true` if the key existed and was deleted.
    async fn delete(&self, key: &str) -> JobdeskResult<bool>;

    /// Delete every key matching a glob pattern.
    ///
    /// Returns the number of keys deleted.
    async fn delete_pattern(&self, pattern: &str) -> JobdeskResult<u64>;

    /// Check if caching is enabled.
    fn is_enabled(&self) -> bool;
}
