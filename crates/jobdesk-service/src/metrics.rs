//! Prometheus metrics for the cache and listing paths.

use jobdesk_domain::EntityKind;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::time::Duration;

/// Metric names.
pub mod names {
    /// Point reads answered from the cache.
    pub const CACHE_HITS_TOTAL: &str = "jobdesk_cache_hits_total";
    /// Point reads that went to the entity store.
    pub const CACHE_MISSES_TOTAL: &str = "jobdesk_cache_misses_total";
    /// Entries written to the cache.
    pub const CACHE_WRITES_TOTAL: &str = "jobdesk_cache_writes_total";
    /// Entries removed from the cache.
    pub const CACHE_DELETES_TOTAL: &str = "jobdesk_cache_deletes_total";
    /// Cache failures on the read path that were treated as misses.
    pub const CACHE_READ_ERRORS_TOTAL: &str = "jobdesk_cache_read_errors_total";

    /// Listings served by the search index.
    pub const LISTING_SEARCH_TOTAL: &str = "jobdesk_listing_search_total";
    /// Listings that fell back to the entity store.
    pub const LISTING_FALLBACKS_TOTAL: &str = "jobdesk_listing_fallbacks_total";
    /// Search index call duration in seconds.
    pub const SEARCH_DURATION_SECONDS: &str = "jobdesk_search_duration_seconds";
}

/// Register all metric descriptions.
pub fn register_metrics() {
    describe_counter!(names::CACHE_HITS_TOTAL, "Point reads answered from the cache");
    describe_counter!(names::CACHE_MISSES_TOTAL, "Point reads loaded from the entity store");
    describe_counter!(names::CACHE_WRITES_TOTAL, "Entity snapshots written to the cache");
    describe_counter!(names::CACHE_DELETES_TOTAL, "Entity snapshots removed from the cache");
    describe_counter!(
        names::CACHE_READ_ERRORS_TOTAL,
        "Cache read failures treated as misses"
    );
    describe_counter!(names::LISTING_SEARCH_TOTAL, "Listings served by the search index");
    describe_counter!(
        names::LISTING_FALLBACKS_TOTAL,
        "Listings served by the entity store after a search failure"
    );
    describe_histogram!(
        names::SEARCH_DURATION_SECONDS,
        "Search index call duration in seconds"
    );
}

/// Record a cache hit.
pub fn record_cache_hit(kind: EntityKind) {
    counter!(names::CACHE_HITS_TOTAL, "kind" => kind.namespace()).increment(1);
}

/// Record a cache miss.
pub fn record_cache_miss(kind: EntityKind) {
    counter!(names::CACHE_MISSES_TOTAL, "kind" => kind.namespace()).increment(1);
}

/// Record a cache write.
pub fn record_cache_write(kind: EntityKind) {
    counter!(names::CACHE_WRITES_TOTAL, "kind" => kind.namespace()).increment(1);
}

/// Record a cache delete.
pub fn record_cache_delete(kind: EntityKind) {
    counter!(names::CACHE_DELETES_TOTAL, "kind" => kind.namespace()).increment(1);
}

/// Record a cache read failure.
pub fn record_cache_read_error(kind: EntityKind) {
    counter!(names::CACHE_READ_ERRORS_TOTAL, "kind" => kind.namespace()).increment(1);
}

/// Record a listing outcome and the time spent in the search index.
pub fn record_listing(kind: EntityKind, fell_back: bool, search_duration: Duration) {
    let name = if fell_back {
        names::LISTING_FALLBACKS_TOTAL
    } else {
        names::LISTING_SEARCH_TOTAL
    };
    counter!(name, "kind" => kind.namespace()).increment(1);
    histogram!(names::SEARCH_DURATION_SECONDS, "kind" => kind.namespace())
        .record(search_duration.as_secs_f64());
}
