//! Listing with search-to-store fallback.

use crate::metrics;
use async_trait::async_trait;
use jobdesk_config::SearchConfig;
use jobdesk_core::{Interface, JobdeskError, JobdeskResult};
use jobdesk_domain::{EntityKind, FieldFilter, Record};
use jobdesk_repository::EntityStore;
use jobdesk_resilience::with_named_timeout;
use jobdesk_search::{SearchIndex, SearchQuery};
use shaku::Component;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error};

/// Default bound on one search round-trip.
pub const DEFAULT_SEARCH_TIMEOUT: Duration = Duration::from_secs(2);

/// Lists entities, preferring the search index.
#[async_trait]
pub trait ListingService: Interface + Send + Sync {
    /// Lists every entity of `kind` matching `filter`.
    ///
    /// Served by the search index when it answers in time; otherwise by the
    /// entity store with first-level associations attached. Search failures
    /// are logged and never returned.
    async fn list_entities(
        &self,
        kind: EntityKind,
        filter: Option<&FieldFilter>,
    ) -> JobdeskResult<Vec<Record>>;
}

/// Listing service over a [`SearchIndex`] with an [`EntityStore`] fallback.
#[derive(Component)]
#[shaku(interface = ListingService)]
pub struct ListingServiceComponent {
    #[shaku(inject)]
    index: Arc<dyn SearchIndex>,

    #[shaku(inject)]
    store: Arc<dyn EntityStore>,

    #[shaku(default = true)]
    search_enabled: bool,

    #[shaku(default = DEFAULT_SEARCH_TIMEOUT)]
    search_timeout: Duration,
}

impl ListingServiceComponent {
    /// Creates a new listing service.
    #[must_use]
    pub fn new(
        index: Arc<dyn SearchIndex>,
        store: Arc<dyn EntityStore>,
        config: &SearchConfig,
    ) -> Self {
        Self {
            index,
            store,
            search_enabled: config.enabled,
            search_timeout: config.timeout(),
        }
    }

    /// Component parameters for registering this service in a module.
    #[must_use]
    pub fn parameters(config: &SearchConfig) -> ListingServiceComponentParameters {
        ListingServiceComponentParameters {
            search_enabled: config.enabled,
            search_timeout: config.timeout(),
        }
    }

    async fn search(
        &self,
        kind: EntityKind,
        filter: Option<&FieldFilter>,
    ) -> JobdeskResult<Vec<Record>> {
        let query = SearchQuery::for_filter(filter);
        let documents = with_named_timeout("search", self.search_timeout, || {
            self.index.search(kind, &query)
        })
        .await?;

        documents
            .into_iter()
            .map(|document| {
                Record::from_value(kind, document).map_err(|e| {
                    JobdeskError::search(format!("Malformed {} document: {}", kind, e))
                })
            })
            .collect()
    }

    async fn from_store(
        &self,
        kind: EntityKind,
        filter: Option<&FieldFilter>,
    ) -> JobdeskResult<Vec<Record>> {
        self.store
            .find_all(kind, filter, self.store.declared_associations(kind))
            .await
    }
}

#[async_trait]
impl ListingService for ListingServiceComponent {
    async fn list_entities(
        &self,
        kind: EntityKind,
        filter: Option<&FieldFilter>,
    ) -> JobdeskResult<Vec<Record>> {
        if !self.search_enabled {
            debug!("Search disabled, listing {} from the store", kind);
            return self.from_store(kind, filter).await;
        }

        let started = Instant::now();
        let result = self.search(kind, filter).await;
        metrics::record_listing(kind, result.is_err(), started.elapsed());

        match result {
            Ok(records) => {
                debug!("Listed {} {} records from the search index", records.len(), kind);
                Ok(records)
            }
            Err(e) => {
                error!("Search for {} failed, falling back to the store: {}", kind, e);
                self.from_store(kind, filter).await
            }
        }
    }
}

impl std::fmt::Debug for ListingServiceComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListingServiceComponent")
            .field("search_enabled", &self.search_enabled)
            .field("search_timeout", &self.search_timeout)
            .finish_non_exhaustive()
    }
}
