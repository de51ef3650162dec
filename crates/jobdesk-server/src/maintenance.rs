//! Seed and reindex commands.
//!
//! Both commands rebuild the search indices from the store. `seed` also
//! replaces every user and job with a fixed development data set and
//! writes it through the cache.

use crate::di::StorageResolver;
use jobdesk_config::AppMetadata;
use jobdesk_core::{JobdeskError, JobdeskResult, UserId};
use jobdesk_domain::{Email, EntityKind, JobStatus, NewJob, NewUser, Record, User};
use jobdesk_repository::{EntityStore, JobRepository, UserRepository};
use jobdesk_search::SearchIndex;
use jobdesk_service::{CacheCoordinator, VisitedSet};
use std::sync::Arc;
use tracing::{info, warn};

/// Number of users (each with one job) created by `seed`.
pub const SEED_USERS: i64 = 10;

/// Outcome of a seed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    /// Users created.
    pub users: usize,
    /// Jobs created.
    pub jobs: usize,
    /// Cache entries written.
    pub cached: usize,
    /// Documents indexed.
    pub indexed: usize,
}

/// Rejects seeding outside the development environment.
pub fn ensure_seed_allowed(app: &AppMetadata) -> JobdeskResult<()> {
    if app.is_development() {
        Ok(())
    } else {
        Err(JobdeskError::Configuration(format!(
            "seed is only available in development, current environment is '{}'",
            app.environment
        )))
    }
}

fn seed_user(n: i64) -> JobdeskResult<NewUser> {
    Ok(NewUser {
        name: format!("User {n}"),
        email: Email::new(format!("user{n}@example.com"))
            .map_err(|e| JobdeskError::validation(e.to_string()))?,
        phone: format!("123-456-789{n}"),
    })
}

fn seed_job(n: i64, user_id: UserId) -> NewJob {
    let statuses = JobStatus::all();
    // n starts at 1
    let status = statuses[(n - 1).unsigned_abs() as usize % statuses.len()];
    NewJob {
        title: format!("Job Title {n}"),
        description: format!("This is a job description for job number {n}."),
        status,
        user_id,
    }
}

/// Maintenance commands over the resolved storage backends.
pub struct Maintenance {
    users: Arc<dyn UserRepository>,
    jobs: Arc<dyn JobRepository>,
    store: Arc<dyn EntityStore>,
    coordinator: Arc<dyn CacheCoordinator>,
    index: Arc<dyn SearchIndex>,
}

impl Maintenance {
    /// Creates the command runner.
    #[must_use]
    pub fn new(
        users: Arc<dyn UserRepository>,
        jobs: Arc<dyn JobRepository>,
        store: Arc<dyn EntityStore>,
        coordinator: Arc<dyn CacheCoordinator>,
        index: Arc<dyn SearchIndex>,
    ) -> Self {
        Self {
            users,
            jobs,
            store,
            coordinator,
            index,
        }
    }

    /// Resolves the backends from a module.
    pub fn from_module<M: StorageResolver + ?Sized>(module: &M) -> Self {
        Self::new(
            module.user_repository(),
            module.job_repository(),
            module.entity_store(),
            module.coordinator(),
            module.search_index(),
        )
    }

    /// Replaces all data with the development data set.
    pub async fn seed(&self) -> JobdeskResult<SeedReport> {
        let evicted = self.coordinator.clear_cache().await?;
        // Jobs go with their users.
        let removed = self.users.delete_all().await?;
        info!("Cleared {} users and {} cache entries", removed, evicted);

        self.recreate_indices().await?;

        let mut users: Vec<User> = Vec::new();
        let mut jobs = 0;
        for n in 1..=SEED_USERS {
            let user = self.users.save(&seed_user(n)?).await?;
            self.jobs.save(&seed_job(n, user.id)).await?;
            jobs += 1;
            users.push(user);
        }

        let mut visited = VisitedSet::new();
        for user in &users {
            self.coordinator
                .write_cache_with(&Record::User(user.clone()), &mut visited)
                .await?;
        }

        let indexed = self.import().await?;
        let report = SeedReport {
            users: users.len(),
            jobs,
            cached: visited.len(),
            indexed,
        };
        info!("Seed complete: {:?}", report);
        Ok(report)
    }

    /// Recreates both indices and imports every user and job.
    ///
    /// Returns the number of documents indexed.
    pub async fn reindex(&self) -> JobdeskResult<usize> {
        self.recreate_indices().await?;
        let indexed = self.import().await?;
        info!("Reindex complete: {} documents", indexed);
        Ok(indexed)
    }

    async fn recreate_indices(&self) -> JobdeskResult<()> {
        for kind in EntityKind::ALL {
            self.index.delete_index(kind).await?;
            self.index.create_index(kind).await?;
        }
        Ok(())
    }

    async fn import(&self) -> JobdeskResult<usize> {
        let mut indexed = 0;
        for kind in EntityKind::ALL {
            let records = self
                .store
                .find_all(kind, None, self.store.declared_associations(kind))
                .await?;
            if records.is_empty() {
                warn!("No {} records to index", kind);
            }
            for record in &records {
                self.index.index_document(record).await?;
                indexed += 1;
            }
        }
        Ok(indexed)
    }
}

impl std::fmt::Debug for Maintenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Maintenance").finish_non_exhaustive()
    }
}
