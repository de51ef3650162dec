//! MySQL job repository implementation.

use super::{push_filter, push_in_list};
use crate::{traits::JobRepository, DatabasePoolInterface};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jobdesk_core::{JobId, JobdeskError, JobdeskResult, UserId};
use jobdesk_domain::{FieldFilter, Job, JobStatus, NewJob};
use shaku::Component;
use sqlx::{FromRow, QueryBuilder};
use std::sync::Arc;
use tracing::{debug, info};

const SELECT_JOBS: &str =
    "SELECT id, title, description, status, user_id, created_at, updated_at FROM jobs";

/// Columns a job listing may be filtered on.
const FILTER_COLUMNS: &[&str] = &["id", "user_id", "status", "title"];

/// MySQL job repository implementation.
#[derive(Component, Clone)]
#[shaku(interface = JobRepository)]
pub struct MySqlJobRepository {
    #[shaku(inject)]
    pool: Arc<dyn DatabasePoolInterface>,
}

impl MySqlJobRepository {
    /// Creates a new MySQL job repository.
    #[must_use]
    pub fn new(pool: Arc<dyn DatabasePoolInterface>) -> Self {
        Self { pool }
    }

    async fn fetch(&self, mut builder: QueryBuilder<'_, sqlx::MySql>) -> JobdeskResult<Vec<Job>> {
        builder
            .build_query_as::<JobRow>()
            .fetch_all(self.pool.inner())
            .await?
            .into_iter()
            .map(Job::try_from)
            .collect()
    }
}

/// Database row representation of a job.
#[derive(Debug, FromRow)]
struct JobRow {
    id: i64,
    title: String,
    description: String,
    status: String,
    user_id: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<JobRow> for Job {
    type Error = JobdeskError;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        let status: JobStatus = row
            .status
            .parse()
            .map_err(|e| JobdeskError::Internal(format!("Invalid job status in database: {}", e)))?;

        Ok(Job {
            id: JobId::new(row.id),
            title: row.title,
            description: row.description,
            status,
            user_id: UserId::new(row.user_id),
            created_at: row.created_at,
            updated_at: row.updated_at,
            user: None,
        })
    }
}

#[async_trait]
impl JobRepository for MySqlJobRepository {
    async fn find_by_id(&self, id: JobId) -> JobdeskResult<Option<Job>> {
        debug!("Finding job by id: {}", id);

        let row = sqlx::query_as::<_, JobRow>(
            r#"
            SELECT id, title, description, status, user_id, created_at, updated_at
            FROM jobs
            WHERE id = ?
            "#,
        )
        .bind(id.into_inner())
        .fetch_optional(self.pool.inner())
        .await?;

        row.map(Job::try_from).transpose()
    }

    async fn find_all(&self, filter: Option<&FieldFilter>) -> JobdeskResult<Vec<Job>> {
        debug!("Finding all jobs, filter: {:?}", filter);

        let mut builder = QueryBuilder::new(SELECT_JOBS);
        push_filter(&mut builder, filter, FILTER_COLUMNS)?;
        builder.push(" ORDER BY id");
        self.fetch(builder).await
    }

    async fn find_by_user_ids(&self, user_ids: &[UserId]) -> JobdeskResult<Vec<Job>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        debug!("Finding jobs of {} users", user_ids.len());

        let ids: Vec<i64> = user_ids.iter().map(|id| id.into_inner()).collect();
        let mut builder = QueryBuilder::new(SELECT_JOBS);
        push_in_list(&mut builder, "user_id", &ids);
        builder.push(" ORDER BY id");
        self.fetch(builder).await
    }

    async fn save(&self, job: &NewJob) -> JobdeskResult<Job> {
        debug!("Saving new job for user {}: {}", job.user_id, job.title);

        let now = Utc::now();

        // A missing owner surfaces as a foreign key violation (Validation).
        let result = sqlx::query(
            r#"
            INSERT INTO jobs (title, description, status, user_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&job.title)
        .bind(&job.description)
        .bind(job.status.as_str())
        .bind(job.user_id.into_inner())
        .bind(now)
        .bind(now)
        .execute(self.pool.inner())
        .await?;

        let id = JobId::new(i64::try_from(result.last_insert_id()).map_err(|e| {
            JobdeskError::Internal(format!("Inserted job id out of range: {}", e))
        })?);
        info!("Inserted job {}", id);

        self.find_by_id(id)
            .await?
            .ok_or_else(|| JobdeskError::Internal("Failed to fetch inserted job".to_string()))
    }

    async fn update(&self, job: &Job) -> JobdeskResult<Job> {
        debug!("Updating job: {}", job.id);

        sqlx::query(
            r#"
            UPDATE jobs
            SET title = ?, description = ?, status = ?, user_id = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&job.title)
        .bind(&job.description)
        .bind(job.status.as_str())
        .bind(job.user_id.into_inner())
        .bind(job.updated_at)
        .bind(job.id.into_inner())
        .execute(self.pool.inner())
        .await?;

        self.find_by_id(job.id)
            .await?
            .ok_or_else(|| JobdeskError::not_found("Job", job.id))
    }

    async fn delete(&self, id: JobId) -> JobdeskResult<bool> {
        debug!("Deleting job: {}", id);

        let result = sqlx::query("DELETE FROM jobs WHERE id = ?")
            .bind(id.into_inner())
            .execute(self.pool.inner())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl std::fmt::Debug for MySqlJobRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlJobRepository").finish_non_exhaustive()
    }
}
