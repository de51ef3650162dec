//! Cache-aside coordination.
//!
//! Writes go through [`CacheCoordinator::write_cache`], which re-reads the
//! entity from the store and caches it together with everything reachable
//! through its associations. Point reads go through
//! [`CacheCoordinator::fetch_cache`], which answers from the cache and falls
//! back to a single store query on a miss.

use crate::cache::{cache_keys, CacheInterface};
use crate::metrics;
use async_trait::async_trait;
use jobdesk_config::CacheConfig;
use jobdesk_core::{BoxFuture, Interface, JobdeskError, JobdeskResult};
use jobdesk_domain::{Entity, EntityKey, EntityKind, Record};
use jobdesk_repository::EntityStore;
use shaku::Component;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default TTL for cache entries (5 minutes).
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Entities already handled by one recursive cache write.
#[derive(Debug, Default, Clone)]
pub struct VisitedSet(HashSet<EntityKey>);

impl VisitedSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `key` as visited. Returns false if it already was.
    pub fn insert(&mut self, key: EntityKey) -> bool {
        self.0.insert(key)
    }

    /// Returns true if `key` was visited.
    #[must_use]
    pub fn contains(&self, key: &EntityKey) -> bool {
        self.0.contains(key)
    }

    /// Number of visited entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if nothing was visited yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Cache-aside coordinator.
#[async_trait]
pub trait CacheCoordinator: Interface + Send + Sync {
    /// Caches `record` and every entity reachable from it, each exactly once.
    async fn write_cache(&self, record: &Record) -> JobdeskResult<()> {
        let mut visited = VisitedSet::new();
        self.write_cache_with(record, &mut visited).await
    }

    /// Like [`write_cache`](Self::write_cache), skipping entities already in
    /// `visited` and adding every entity it writes.
    async fn write_cache_with(&self, record: &Record, visited: &mut VisitedSet) -> JobdeskResult<()>;

    /// Removes the cache entry of `record` only. Related entries are kept.
    async fn delete_cache(&self, record: &Record) -> JobdeskResult<()>;

    /// Returns the entity of `kind` with `id`, from the cache if present.
    async fn fetch_cache(&self, kind: EntityKind, id: i64) -> JobdeskResult<Record>;

    /// Removes every entry this coordinator owns.
    async fn clear_cache(&self) -> JobdeskResult<u64>;
}

/// Typed convenience methods over [`CacheCoordinator`].
#[async_trait]
pub trait CacheCoordinatorExt: CacheCoordinator {
    /// Fetches an entity of type `E` through the cache.
    async fn fetch<E: Entity>(&self, id: i64) -> JobdeskResult<E> {
        E::try_from(self.fetch_cache(E::KIND, id).await?)
    }
}

impl<T: CacheCoordinator + ?Sized> CacheCoordinatorExt for T {}

/// Cache coordinator over an [`EntityStore`] and a [`CacheInterface`].
#[derive(Component)]
#[shaku(interface = CacheCoordinator)]
pub struct CacheCoordinatorComponent {
    #[shaku(inject)]
    store: Arc<dyn EntityStore>,

    #[shaku(inject)]
    cache: Arc<dyn CacheInterface>,

    #[shaku(default = cache_keys::DEFAULT_PREFIX.to_string())]
    key_prefix: String,

    #[shaku(default = Some(DEFAULT_TTL))]
    ttl: Option<Duration>,
}

impl CacheCoordinatorComponent {
    /// Creates a new coordinator.
    #[must_use]
    pub fn new(
        store: Arc<dyn EntityStore>,
        cache: Arc<dyn CacheInterface>,
        config: &CacheConfig,
    ) -> Self {
        Self {
            store,
            cache,
            key_prefix: config.key_prefix.clone(),
            ttl: config.ttl(),
        }
    }

    /// Component parameters for registering this coordinator in a module.
    #[must_use]
    pub fn parameters(config: &CacheConfig) -> CacheCoordinatorComponentParameters {
        CacheCoordinatorComponentParameters {
            key_prefix: config.key_prefix.clone(),
            ttl: config.ttl(),
        }
    }

    fn cache_key(&self, key: &EntityKey) -> String {
        cache_keys::entity(&self.key_prefix, key)
    }

    async fn write_entry(&self, record: &Record) -> JobdeskResult<()> {
        let key = record.key();
        let json = record.to_json()?;
        self.cache.write_raw(&self.cache_key(&key), &json, self.ttl).await?;
        metrics::record_cache_write(key.kind);
        debug!("Cached {}", key);
        Ok(())
    }

    /// Reload, recurse into belongs-to then has-many, write self last.
    fn write_reachable<'a>(
        &'a self,
        key: EntityKey,
        visited: &'a mut VisitedSet,
    ) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            if !visited.insert(key) {
                return Ok(());
            }

            let associations = self.store.declared_associations(key.kind);
            let Some(record) = self.store.find_by_id(key.kind, key.id, associations).await? else {
                warn!("{} not found in the entity store, nothing to cache", key);
                return Ok(());
            };

            for related in record.belongs_to_keys() {
                self.write_reachable(related, visited).await?;
            }
            for related in record.has_many_keys() {
                self.write_reachable(related, visited).await?;
            }

            self.write_entry(&record).await
        })
    }

    /// Cached snapshot of `key`; any cache failure reads as a miss.
    async fn read_entry(&self, key: &EntityKey) -> Option<Record> {
        let json = match self.cache.read_raw(&self.cache_key(key)).await {
            Ok(json) => json?,
            Err(e) => {
                metrics::record_cache_read_error(key.kind);
                warn!("Cache read for {} failed, loading from store: {}", key, e);
                return None;
            }
        };

        match Record::from_json(key.kind, &json) {
            Ok(record) => Some(record),
            Err(e) => {
                metrics::record_cache_read_error(key.kind);
                warn!("Discarding unreadable cache entry for {}: {}", key, e);
                None
            }
        }
    }
}

#[async_trait]
impl CacheCoordinator for CacheCoordinatorComponent {
    async fn write_cache_with(&self, record: &Record, visited: &mut VisitedSet) -> JobdeskResult<()> {
        let before = visited.len();
        self.write_reachable(record.key(), visited).await?;
        debug!(
            "Cache write for {} covered {} entities",
            record.key(),
            visited.len() - before
        );
        Ok(())
    }

    async fn delete_cache(&self, record: &Record) -> JobdeskResult<()> {
        let key = record.key();
        let deleted = self.cache.delete(&self.cache_key(&key)).await?;
        if deleted {
            metrics::record_cache_delete(key.kind);
        }
        debug!("Evicted {} (present: {})", key, deleted);
        Ok(())
    }

    async fn fetch_cache(&self, kind: EntityKind, id: i64) -> JobdeskResult<Record> {
        let key = EntityKey::new(kind, id);

        if let Some(record) = self.read_entry(&key).await {
            metrics::record_cache_hit(kind);
            debug!("Cache hit for {}", key);
            return Ok(record);
        }

        metrics::record_cache_miss(kind);
        debug!("Cache miss for {}", key);

        let record = self
            .store
            .find_by_id(kind, id, self.store.declared_associations(kind))
            .await?
            .ok_or_else(|| JobdeskError::not_found(kind.resource_name(), id))?;

        if let Err(e) = self.write_entry(&record).await {
            warn!("Failed to populate cache for {}: {}", key, e);
        }

        Ok(record)
    }

    async fn clear_cache(&self) -> JobdeskResult<u64> {
        let deleted = self
            .cache
            .delete_pattern(&cache_keys::all(&self.key_prefix))
            .await?;
        info!("Cleared {} cache entries", deleted);
        Ok(deleted)
    }
}

impl std::fmt::Debug for CacheCoordinatorComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheCoordinatorComponent")
            .field("key_prefix", &self.key_prefix)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Fixture;
    use jobdesk_core::{JobId, UserId};
    use jobdesk_domain::{Job, JobStatus, User};

    fn coordinator(f: &Fixture) -> CacheCoordinatorComponent {
        CacheCoordinatorComponent::new(f.store.clone(), f.cache.clone(), &CacheConfig::default())
    }

    fn key(kind: EntityKind, id: i64) -> String {
        cache_keys::entity(cache_keys::DEFAULT_PREFIX, &EntityKey::new(kind, id))
    }

    async fn load(f: &Fixture, kind: EntityKind, id: i64) -> Record {
        f.store
            .find_by_id(kind, id, kind.associations())
            .await
            .unwrap()
            .unwrap()
    }

    // =============================================================================
    // write_cache
    // =============================================================================

    #[tokio::test]
    async fn test_write_user_caches_user_and_jobs() {
        let f = Fixture::with_user_and_two_jobs().await;
        let coordinator = coordinator(&f);
        let user = load(&f, EntityKind::User, 1).await;

        coordinator.write_cache(&user).await.unwrap();

        assert!(f.cache.contains(&key(EntityKind::User, 1)).await);
        assert!(f.cache.contains(&key(EntityKind::Job, 10)).await);
        assert!(f.cache.contains(&key(EntityKind::Job, 11)).await);
    }

    #[tokio::test]
    async fn test_write_visits_each_entity_once_despite_cycle() {
        let f = Fixture::with_user_and_two_jobs().await;
        let coordinator = coordinator(&f);
        let user = load(&f, EntityKind::User, 1).await;
        f.store.reset_calls();

        coordinator.write_cache(&user).await.unwrap();

        // user:1 -> job:10 -> user:1 (visited) ...
        let mut writes = f.cache.writes();
        writes.sort();
        assert_eq!(
            writes,
            vec![
                key(EntityKind::Job, 10),
                key(EntityKind::Job, 11),
                key(EntityKind::User, 1)
            ]
        );
        assert_eq!(f.store.calls(), 3);
    }

    #[tokio::test]
    async fn test_write_from_job_reaches_siblings() {
        let f = Fixture::with_user_and_two_jobs().await;
        let coordinator = coordinator(&f);
        let job = load(&f, EntityKind::Job, 11).await;

        coordinator.write_cache(&job).await.unwrap();

        // job:11 -> user:1 -> job:10
        assert_eq!(f.cache.writes().len(), 3);
        assert!(f.cache.contains(&key(EntityKind::Job, 10)).await);
    }

    #[tokio::test]
    async fn test_dependencies_are_written_before_dependents() {
        let f = Fixture::with_user_and_two_jobs().await;
        let coordinator = coordinator(&f);
        let job = load(&f, EntityKind::Job, 10).await;

        coordinator.write_cache(&job).await.unwrap();

        assert_eq!(f.cache.writes().last(), Some(&key(EntityKind::Job, 10)));
    }

    #[tokio::test]
    async fn test_write_twice_is_same_as_once() {
        let f = Fixture::with_user_and_two_jobs().await;
        let coordinator = coordinator(&f);
        let user = load(&f, EntityKind::User, 1).await;

        coordinator.write_cache(&user).await.unwrap();
        let first = f.cache.raw(&key(EntityKind::User, 1)).await;
        coordinator.write_cache(&user).await.unwrap();
        let second = f.cache.raw(&key(EntityKind::User, 1)).await;

        assert_eq!(first, second);
        assert_eq!(f.cache.writes().len(), 6);
    }

    #[tokio::test]
    async fn test_write_snapshot_is_reloaded_from_store() {
        let f = Fixture::with_user_and_two_jobs().await;
        let coordinator = coordinator(&f);
        // Caller holds a stale, association-less copy.
        let stale = Record::User(load(&f, EntityKind::User, 1).await.into_user().unwrap().detached());

        coordinator.write_cache(&stale).await.unwrap();

        let cached = f.cache.raw(&key(EntityKind::User, 1)).await.unwrap();
        let user = Record::from_json(EntityKind::User, &cached)
            .unwrap()
            .into_user()
            .unwrap();
        assert_eq!(user.jobs.map(|jobs| jobs.len()), Some(2));
    }

    #[tokio::test]
    async fn test_shared_visited_set_skips_known_entities() {
        let f = Fixture::with_user_and_two_jobs().await;
        let coordinator = coordinator(&f);
        let mut visited = VisitedSet::new();

        coordinator
            .write_cache_with(&load(&f, EntityKind::User, 1).await, &mut visited)
            .await
            .unwrap();
        coordinator
            .write_cache_with(&load(&f, EntityKind::Job, 10).await, &mut visited)
            .await
            .unwrap();

        assert_eq!(visited.len(), 3);
        assert!(visited.contains(&EntityKey::new(EntityKind::Job, 11)));
        assert_eq!(f.cache.writes().len(), 3);
    }

    #[tokio::test]
    async fn test_write_failure_propagates() {
        let f = Fixture::with_user_and_two_jobs().await;
        let coordinator = coordinator(&f);
        let user = load(&f, EntityKind::User, 1).await;
        f.cache.fail_writes();

        let err = coordinator.write_cache(&user).await.unwrap_err();
        assert!(matches!(err, JobdeskError::Cache(_)));
    }

    #[tokio::test]
    async fn test_write_of_vanished_entity_is_no_op() {
        let f = Fixture::new();
        let coordinator = coordinator(&f);
        let now = chrono::Utc::now();
        let ghost = Record::Job(Job {
            id: JobId::new(99),
            title: "Ghost".to_string(),
            description: "Gone".to_string(),
            status: JobStatus::Pending,
            user_id: UserId::new(1),
            created_at: now,
            updated_at: now,
            user: None,
        });

        coordinator.write_cache(&ghost).await.unwrap();
        assert!(f.cache.writes().is_empty());
    }

    // =============================================================================
    // fetch_cache / delete_cache
    // =============================================================================

    #[tokio::test]
    async fn test_fetch_returns_what_write_wrote_without_store() {
        let f = Fixture::with_user_and_two_jobs().await;
        let coordinator = coordinator(&f);
        let user = load(&f, EntityKind::User, 1).await;
        coordinator.write_cache(&user).await.unwrap();
        f.store.reset_calls();

        let fetched = coordinator.fetch_cache(EntityKind::User, 1).await.unwrap();

        assert_eq!(fetched, user);
        assert_eq!(f.store.calls(), 0);
    }

    #[tokio::test]
    async fn test_fetch_miss_is_one_store_query_and_populates() {
        let f = Fixture::with_user_and_two_jobs().await;
        let coordinator = coordinator(&f);

        let job: Job = coordinator.fetch(10).await.unwrap();

        assert_eq!(job.user.map(|u| u.id), Some(UserId::new(1)));
        assert_eq!(f.store.calls(), 1);
        // Associations are not cached recursively on a miss.
        assert_eq!(f.cache.writes(), vec![key(EntityKind::Job, 10)]);

        coordinator.fetch_cache(EntityKind::Job, 10).await.unwrap();
        assert_eq!(f.store.calls(), 1);
    }

    #[tokio::test]
    async fn test_fetch_unknown_id_is_not_found_and_not_cached() {
        let f = Fixture::with_user_and_two_jobs().await;
        let coordinator = coordinator(&f);

        let err = coordinator.fetch_cache(EntityKind::User, 42).await.unwrap_err();

        assert!(matches!(
            err,
            JobdeskError::NotFound { resource_type: "User", ref id } if id == "42"
        ));
        assert!(f.cache.writes().is_empty());
        assert!(coordinator.fetch_cache(EntityKind::User, 42).await.is_err());
        assert_eq!(f.store.calls(), 2);
    }

    #[tokio::test]
    async fn test_delete_then_fetch_repopulates() {
        let f = Fixture::with_user_and_two_jobs().await;
        let coordinator = coordinator(&f);
        let user = load(&f, EntityKind::User, 1).await;
        coordinator.write_cache(&user).await.unwrap();
        f.store.reset_calls();

        coordinator.delete_cache(&user).await.unwrap();
        assert!(!f.cache.contains(&key(EntityKind::User, 1)).await);

        let fetched: User = coordinator.fetch(1).await.unwrap();
        assert_eq!(fetched.id, UserId::new(1));
        assert_eq!(f.store.calls(), 1);
        assert!(f.cache.contains(&key(EntityKind::User, 1)).await);
    }

    #[tokio::test]
    async fn test_delete_does_not_cascade() {
        let f = Fixture::with_user_and_two_jobs().await;
        let coordinator = coordinator(&f);
        let user = load(&f, EntityKind::User, 1).await;
        coordinator.write_cache(&user).await.unwrap();

        coordinator.delete_cache(&user).await.unwrap();
        // Absent entry is a no-op.
        coordinator.delete_cache(&user).await.unwrap();

        assert!(f.cache.contains(&key(EntityKind::Job, 10)).await);
        assert!(f.cache.contains(&key(EntityKind::Job, 11)).await);
    }

    #[tokio::test]
    async fn test_user_and_two_jobs_scenario() {
        let f = Fixture::with_user_and_two_jobs().await;
        let coordinator = coordinator(&f);

        coordinator
            .write_cache(&load(&f, EntityKind::User, 1).await)
            .await
            .unwrap();
        for (kind, id) in [(EntityKind::User, 1), (EntityKind::Job, 10), (EntityKind::Job, 11)] {
            assert!(f.cache.contains(&key(kind, id)).await, "{kind}:{id} not cached");
        }

        let j1 = load(&f, EntityKind::Job, 10).await;
        coordinator.delete_cache(&j1).await.unwrap();
        f.store.reset_calls();

        let reloaded: Job = coordinator.fetch(10).await.unwrap();
        assert_eq!(reloaded.id, JobId::new(10));
        assert_eq!(reloaded.user.map(|u| u.id), Some(UserId::new(1)));
        assert_eq!(f.store.calls(), 1);
    }

    #[tokio::test]
    async fn test_fetch_treats_cache_read_failure_as_miss() {
        let f = Fixture::with_user_and_two_jobs().await;
        let coordinator = coordinator(&f);
        f.cache.fail_reads();

        let job: Job = coordinator.fetch(11).await.unwrap();
        assert_eq!(job.id, JobId::new(11));
        assert_eq!(f.store.calls(), 1);
    }

    #[tokio::test]
    async fn test_fetch_discards_unreadable_entry() {
        let f = Fixture::with_user_and_two_jobs().await;
        let coordinator = coordinator(&f);
        f.cache.put(&key(EntityKind::User, 1), "{not json").await;

        let user: User = coordinator.fetch(1).await.unwrap();
        assert_eq!(user.jobs.map(|jobs| jobs.len()), Some(2));
        assert_eq!(f.store.calls(), 1);
    }

    #[tokio::test]
    async fn test_fetch_survives_populate_failure() {
        let f = Fixture::with_user_and_two_jobs().await;
        let coordinator = coordinator(&f);
        f.cache.fail_writes();

        assert!(coordinator.fetch_cache(EntityKind::Job, 10).await.is_ok());
    }

    #[tokio::test]
    async fn test_fetch_propagates_store_failure() {
        let f = Fixture::with_user_and_two_jobs().await;
        let coordinator = coordinator(&f);
        f.store.fail_queries();

        let err = coordinator.fetch_cache(EntityKind::Job, 10).await.unwrap_err();
        assert!(matches!(err, JobdeskError::Database(_)));
    }

    #[tokio::test]
    async fn test_typed_fetch_uses_entity_kind() {
        let f = Fixture::with_user_and_two_jobs().await;
        let coordinator = coordinator(&f);
        // Job 10 exists but user 10 does not.
        assert!(coordinator.fetch::<User>(10).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_clear_cache_removes_prefixed_entries() {
        let f = Fixture::with_user_and_two_jobs().await;
        let coordinator = coordinator(&f);
        coordinator
            .write_cache(&load(&f, EntityKind::User, 1).await)
            .await
            .unwrap();

        assert_eq!(coordinator.clear_cache().await.unwrap(), 3);
        assert!(!f.cache.contains(&key(EntityKind::Job, 10)).await);
    }

    fn with_ttl(f: &Fixture, secs: u64) -> CacheCoordinatorComponent {
        let config = CacheConfig {
            default_ttl_secs: secs,
            ..CacheConfig::default()
        };
        CacheCoordinatorComponent::new(f.store.clone(), f.cache.clone(), &config)
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_after_ttl_expiry_reloads() {
        let f = Fixture::with_user_and_two_jobs().await;
        let coordinator = with_ttl(&f, 5);
        coordinator
            .write_cache(&load(&f, EntityKind::User, 1).await)
            .await
            .unwrap();
        f.store.reset_calls();

        coordinator.fetch_cache(EntityKind::User, 1).await.unwrap();
        assert_eq!(f.store.calls(), 0);

        tokio::time::advance(Duration::from_secs(6)).await;

        let user = coordinator.fetch_cache(EntityKind::User, 1).await.unwrap();
        assert_eq!(user.id(), 1);
        assert_eq!(f.store.calls(), 1);
        assert!(f.cache.contains(&key(EntityKind::User, 1)).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_ttl_keeps_entries_until_deleted() {
        let f = Fixture::with_user_and_two_jobs().await;
        let coordinator = with_ttl(&f, 0);
        coordinator.fetch_cache(EntityKind::Job, 10).await.unwrap();
        f.store.reset_calls();

        tokio::time::advance(Duration::from_secs(3600)).await;

        coordinator.fetch_cache(EntityKind::Job, 10).await.unwrap();
        assert_eq!(f.store.calls(), 0);
    }

    #[test]
    fn test_parameters_follow_config() {
        let config = CacheConfig {
            default_ttl_secs: 0,
            key_prefix: "custom".to_string(),
        };
        let params = CacheCoordinatorComponent::parameters(&config);
        assert_eq!(params.key_prefix, "custom");
        assert_eq!(params.ttl, None);
    }
}
