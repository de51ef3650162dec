//! Job service trait definition.

use crate::dto::{CreateJobRequest, JobListResponse, JobResponse, UpdateJobRequest};
use async_trait::async_trait;
use jobdesk_core::{Interface, JobId, JobdeskResult, UserId};

/// Job service trait.
#[async_trait]
pub trait JobService: Interface + Send + Sync {
    /// Lists all jobs, or only those of `user_id`.
    async fn list_jobs(&self, user_id: Option<UserId>) -> JobdeskResult<JobListResponse>;

    /// Gets a job by ID.
    async fn get_job(&self, id: JobId) -> JobdeskResult<JobResponse>;

    /// Creates a new job.
    async fn create_job(&self, request: CreateJobRequest) -> JobdeskResult<JobResponse>;

    /// Updates a job.
    async fn update_job(&self, id: JobId, request: UpdateJobRequest) -> JobdeskResult<JobResponse>;

    /// Deletes a job.
    async fn delete_job(&self, id: JobId) -> JobdeskResult<()>;
}
