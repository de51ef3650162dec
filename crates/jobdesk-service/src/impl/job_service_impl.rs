//! Job service implementation.

use super::{index_quietly, unindex_quietly};
use crate::coordinator::{CacheCoordinator, CacheCoordinatorExt};
use crate::dto::{CreateJobRequest, JobListResponse, JobResponse, UpdateJobRequest};
use crate::job_service::JobService;
use crate::listing::ListingService;
use async_trait::async_trait;
use jobdesk_core::{JobId, JobdeskError, JobdeskResult, UserId, ValidateExt};
use jobdesk_domain::{EntityKind, FieldFilter, Job, NewJob, Record};
use jobdesk_repository::JobRepository;
use jobdesk_search::SearchIndex;
use shaku::Component;
use std::sync::Arc;
use tracing::{debug, info};

/// A foreign key violation on `jobs.user_id` means the owner is missing.
fn owner_must_exist(err: JobdeskError) -> JobdeskError {
    match err {
        JobdeskError::Validation(_) => JobdeskError::validation("user: must exist"),
        other => other,
    }
}

/// Job service component for Shaku DI.
#[derive(Component)]
#[shaku(interface = JobService)]
pub struct JobServiceComponent {
    #[shaku(inject)]
    job_repository: Arc<dyn JobRepository>,
    #[shaku(inject)]
    coordinator: Arc<dyn CacheCoordinator>,
    #[shaku(inject)]
    listing: Arc<dyn ListingService>,
    #[shaku(inject)]
    index: Arc<dyn SearchIndex>,
}

impl JobServiceComponent {
    /// Creates a new job service.
    #[must_use]
    pub fn new(
        job_repository: Arc<dyn JobRepository>,
        coordinator: Arc<dyn CacheCoordinator>,
        listing: Arc<dyn ListingService>,
        index: Arc<dyn SearchIndex>,
    ) -> Self {
        Self {
            job_repository,
            coordinator,
            listing,
            index,
        }
    }

    /// Row a partial update applies to. The cached snapshot only proves the
    /// job exists; its fields may be older than the table.
    async fn current_row(&self, id: JobId) -> JobdeskResult<Job> {
        self.coordinator
            .fetch_cache(EntityKind::Job, id.into_inner())
            .await?;
        self.job_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| JobdeskError::not_found("Job", id))
    }

    /// Writes the job (and its owner) through the cache, then re-indexes it.
    async fn cache_and_index(&self, record: Record) -> JobdeskResult<Job> {
        self.coordinator.write_cache(&record).await?;

        let record = self.coordinator.fetch_cache(record.kind(), record.id()).await?;
        index_quietly(self.index.as_ref(), &record).await;
        record.into_job()
    }

    /// Re-caches a user whose job list changed without the user being touched.
    async fn recache_owner(&self, user_id: UserId) -> JobdeskResult<()> {
        match self
            .coordinator
            .fetch_cache(EntityKind::User, user_id.into_inner())
            .await
        {
            Ok(owner) => self.coordinator.write_cache(&owner).await,
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl JobService for JobServiceComponent {
    async fn list_jobs(&self, user_id: Option<UserId>) -> JobdeskResult<JobListResponse> {
        debug!("Listing jobs, user: {:?}", user_id);

        let filter = user_id.map(FieldFilter::user_id);
        let jobs = self
            .listing
            .list_entities(EntityKind::Job, filter.as_ref())
            .await?
            .into_iter()
            .map(Job::try_from)
            .collect::<JobdeskResult<Vec<_>>>()?;

        Ok(JobListResponse::from(jobs))
    }

    async fn get_job(&self, id: JobId) -> JobdeskResult<JobResponse> {
        debug!("Getting job: {}", id);

        let job: Job = self.coordinator.fetch(id.into_inner()).await?;
        Ok(JobResponse::from(job))
    }

    async fn create_job(&self, request: CreateJobRequest) -> JobdeskResult<JobResponse> {
        debug!("Creating job for user {}: {}", request.user_id, request.title);

        request.validate_request()?;
        let job = NewJob {
            status: request.job_status()?,
            title: request.title,
            description: request.description,
            user_id: request.user_id,
        };
        let saved = self
            .job_repository
            .save(&job)
            .await
            .map_err(owner_must_exist)?;
        info!("Job created: {}", saved.id);

        let job = self.cache_and_index(Record::Job(saved)).await?;
        Ok(JobResponse::from(job))
    }

    async fn update_job(&self, id: JobId, request: UpdateJobRequest) -> JobdeskResult<JobResponse> {
        debug!("Updating job: {}", id);

        request.validate_request()?;
        let status = request.job_status()?;
        let mut job = self.current_row(id).await?;
        let previous_owner = job.user_id;

        if job.apply_changes(request.title, request.description, status, request.user_id) {
            job.validate_request()?;
            self.job_repository
                .update(&job)
                .await
                .map_err(owner_must_exist)?;
            info!("Job updated: {}", id);
        }

        let job = self.cache_and_index(Record::Job(job)).await?;
        if job.user_id != previous_owner {
            self.recache_owner(previous_owner).await?;
        }
        Ok(JobResponse::from(job))
    }

    async fn delete_job(&self, id: JobId) -> JobdeskResult<()> {
        debug!("Deleting job: {}", id);

        let record = self
            .coordinator
            .fetch_cache(EntityKind::Job, id.into_inner())
            .await?;
        // Evict before the row disappears.
        self.coordinator.delete_cache(&record).await?;
        let job = record.into_job()?;

        if !self.job_repository.delete(id).await? {
            return Err(JobdeskError::not_found("Job", id));
        }

        unindex_quietly(self.index.as_ref(), job.key()).await;
        self.recache_owner(job.user_id).await?;

        info!("Job deleted: {}", id);
        Ok(())
    }
}

impl std::fmt::Debug for JobServiceComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobServiceComponent").finish_non_exhaustive()
    }
}
