//! Job-related DTOs.

use super::UserResponse;
use chrono::{DateTime, Utc};
use jobdesk_core::{JobId, JobdeskError, JobdeskResult, UserId};
use jobdesk_domain::{Job, JobStatus};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

fn known_status(value: &str) -> Result<(), ValidationError> {
    if value.parse::<JobStatus>().is_err() {
        let mut err = ValidationError::new("inclusion");
        err.message = Some("is not included in the list".into());
        return Err(err);
    }
    Ok(())
}

fn parse_status(value: &str) -> JobdeskResult<JobStatus> {
    value
        .parse()
        .map_err(|_| JobdeskError::validation("status: is not included in the list"))
}

/// Request to create a new job.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateJobRequest {
    #[validate(custom(function = "jobdesk_core::rules::not_blank"))]
    pub title: String,

    #[validate(custom(function = "jobdesk_core::rules::not_blank"))]
    pub description: String,

    #[validate(custom(function = "known_status"))]
    pub status: String,

    pub user_id: UserId,
}

impl CreateJobRequest {
    /// Parsed status; call after validation.
    pub fn job_status(&self) -> JobdeskResult<JobStatus> {
        parse_status(&self.status)
    }
}

/// Request to update a job. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateJobRequest {
    #[validate(custom(function = "jobdesk_core::rules::not_blank"))]
    pub title: Option<String>,

    #[validate(custom(function = "jobdesk_core::rules::not_blank"))]
    pub description: Option<String>,

    #[validate(custom(function = "known_status"))]
    pub status: Option<String>,

    pub user_id: Option<UserId>,
}

impl UpdateJobRequest {
    /// Parsed status, if one was given; call after validation.
    pub fn job_status(&self) -> JobdeskResult<Option<JobStatus>> {
        self.status.as_deref().map(parse_status).transpose()
    }
}

/// Job response DTO.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobResponse {
    pub id: JobId,
    pub title: String,
    pub description: String,
    pub status: String,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Box<UserResponse>>,
}

impl From<Job> for JobResponse {
    fn from(job: Job) -> Self {
        Self {
            id: job.id,
            title: job.title,
            description: job.description,
            status: job.status.as_str().to_string(),
            user_id: job.user_id,
            created_at: job.created_at,
            updated_at: job.updated_at,
            user: job.user.map(|user| Box::new(UserResponse::from(*user))),
        }
    }
}

/// Job list response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobListResponse {
    pub jobs: Vec<JobResponse>,
    pub total: usize,
}

impl From<Vec<Job>> for JobListResponse {
    fn from(jobs: Vec<Job>) -> Self {
        let jobs: Vec<JobResponse> = jobs.into_iter().map(JobResponse::from).collect();
        Self {
            total: jobs.len(),
            jobs,
        }
    }
}
