//! Dependency injection module using Shaku.
//!
//! `AppModule` wires the whole stack for a single-process deployment:
//! - MySQL pool, repositories and the entity store
//! - Redis cache store (in-memory when Redis is disabled)
//! - Elasticsearch-compatible search index
//! - Cache coordinator, listing policy and entity services

use jobdesk_config::AppConfig;
use jobdesk_core::JobdeskResult;
use jobdesk_repository::{
    DatabasePool, DatabasePoolInterface, DatabasePoolParameters, EntityStore, JobRepository,
    MySqlJobRepository, MySqlUserRepository, RepositoryEntityStore, UserRepository,
};
use jobdesk_search::{ElasticsearchIndex, SearchIndex};
use jobdesk_service::{
    CacheCoordinator, CacheCoordinatorComponent, CacheInterface, JobServiceComponent,
    ListingServiceComponent, MemoryCacheService, RedisCacheService, UserServiceComponent,
};
use shaku::{module, HasComponent};
use std::sync::Arc;
use tracing::info;

module! {
    pub AppModule {
        components = [
            DatabasePool,
            MySqlUserRepository,
            MySqlJobRepository,
            RepositoryEntityStore,
            RedisCacheService,
            ElasticsearchIndex,
            CacheCoordinatorComponent,
            ListingServiceComponent,
            UserServiceComponent,
            JobServiceComponent,
        ],
        providers = [],
    }
}

/// Builds the application module from configuration.
///
/// Connects to MySQL eagerly; the Redis pool and the search client connect
/// lazily on first use.
pub async fn build_app_module(config: &AppConfig) -> JobdeskResult<Arc<AppModule>> {
    let db_pool = DatabasePool::new(&config.database).await?;

    let mut builder = AppModule::builder()
        .with_component_parameters::<DatabasePool>(DatabasePoolParameters {
            pool: db_pool.into_inner(),
        })
        .with_component_parameters::<ElasticsearchIndex>(ElasticsearchIndex::parameters(
            &config.search,
        )?)
        .with_component_parameters::<CacheCoordinatorComponent>(
            CacheCoordinatorComponent::parameters(&config.cache),
        )
        .with_component_parameters::<ListingServiceComponent>(
            ListingServiceComponent::parameters(&config.search),
        );

    if config.redis.enabled {
        let pool = RedisCacheService::connect(&config.redis)?;
        builder = builder
            .with_component_parameters::<RedisCacheService>(RedisCacheService::parameters(pool));
    } else {
        info!("Redis disabled, using the in-process cache store");
        builder = builder
            .with_component_override::<dyn CacheInterface>(Box::new(MemoryCacheService::new()));
    }

    Ok(Arc::new(builder.build()))
}

// ============================================================================
// Module Resolution Helpers
// ============================================================================

/// Trait for resolving the storage backends from a module.
pub trait StorageResolver {
    /// Resolves the database pool.
    fn database_pool(&self) -> Arc<dyn DatabasePoolInterface>;

    /// Resolves the user repository.
    fn user_repository(&self) -> Arc<dyn UserRepository>;

    /// Resolves the job repository.
    fn job_repository(&self) -> Arc<dyn JobRepository>;

    /// Resolves the kind-generic entity store.
    fn entity_store(&self) -> Arc<dyn EntityStore>;

    /// Resolves the cache coordinator.
    fn coordinator(&self) -> Arc<dyn CacheCoordinator>;

    /// Resolves the search index.
    fn search_index(&self) -> Arc<dyn SearchIndex>;
}

impl StorageResolver for AppModule {
    fn database_pool(&self) -> Arc<dyn DatabasePoolInterface> {
        self.resolve()
    }

    fn user_repository(&self) -> Arc<dyn UserRepository> {
        self.resolve()
    }

    fn job_repository(&self) -> Arc<dyn JobRepository> {
        self.resolve()
    }

    fn entity_store(&self) -> Arc<dyn EntityStore> {
        self.resolve()
    }

    fn coordinator(&self) -> Arc<dyn CacheCoordinator> {
        self.resolve()
    }

    fn search_index(&self) -> Arc<dyn SearchIndex> {
        self.resolve()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobdesk_service::{JobService, ListingService, UserService};

    #[test]
    fn test_module_types_exist() {
        fn _assert_storage_resolver<T: StorageResolver>() {}

        _assert_storage_resolver::<AppModule>();
    }

    #[test]
    fn test_has_component_trait_bounds() {
        fn _assert_has<T: HasComponent<I>, I: ?Sized + shaku::Interface>() {}

        _assert_has::<AppModule, dyn DatabasePoolInterface>();
        _assert_has::<AppModule, dyn UserRepository>();
        _assert_has::<AppModule, dyn JobRepository>();
        _assert_has::<AppModule, dyn EntityStore>();
        _assert_has::<AppModule, dyn CacheInterface>();
        _assert_has::<AppModule, dyn SearchIndex>();
        _assert_has::<AppModule, dyn CacheCoordinator>();
        _assert_has::<AppModule, dyn ListingService>();
        _assert_has::<AppModule, dyn UserService>();
        _assert_has::<AppModule, dyn JobService>();
    }

    #[test]
    fn test_resolver_trait_is_object_safe() {
        fn _use_storage_resolver(_r: &dyn StorageResolver) {}
    }

    #[test]
    fn test_component_parameters_follow_config() {
        let mut config = AppConfig::default();
        config.cache.default_ttl_secs = 0;
        config.search.enabled = false;

        let coordinator = CacheCoordinatorComponent::parameters(&config.cache);
        assert_eq!(coordinator.ttl, None);
        assert_eq!(coordinator.key_prefix, "jobdesk:cache");

        let listing = ListingServiceComponent::parameters(&config.search);
        assert!(!listing.search_enabled);
    }
}
