//! User-related DTOs.

use super::JobResponse;
use chrono::{DateTime, Utc};
use jobdesk_core::UserId;
use jobdesk_domain::User;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to create a new user.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(custom(function = "jobdesk_core::rules::not_blank"))]
    pub name: String,

    #[validate(email(message = "is invalid"))]
    pub email: String,

    #[validate(custom(function = "jobdesk_core::rules::not_blank"))]
    pub phone: String,
}

/// Request to update a user. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(custom(function = "jobdesk_core::rules::not_blank"))]
    pub name: Option<String>,

    #[validate(email(message = "is invalid"))]
    pub email: Option<String>,

    #[validate(custom(function = "jobdesk_core::rules::not_blank"))]
    pub phone: Option<String>,
}

/// User response DTO.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jobs: Option<Vec<JobResponse>>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email.to_string(),
            phone: user.phone,
            created_at: user.created_at,
            updated_at: user.updated_at,
            jobs: user
                .jobs
                .map(|jobs| jobs.into_iter().map(JobResponse::from).collect()),
        }
    }
}

/// User list response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserListResponse {
    pub users: Vec<UserResponse>,
    pub total: usize,
}

impl From<Vec<User>> for UserListResponse {
    fn from(users: Vec<User>) -> Self {
        let users: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();
        Self {
            total: users.len(),
            users,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobdesk_core::{JobId, ValidateExt};
    use jobdesk_domain::{Email, Job, JobStatus};

    fn create_test_user() -> User {
        let now = Utc::now();
        User {
            id: UserId::new(1),
            name: "John Doe".to_string(),
            email: Email::new("john@example.com").unwrap(),
            phone: "123-456-7890".to_string(),
            created_at: now,
            updated_at: now,
            jobs: None,
        }
    }

    #[test]
    fn test_create_user_request_valid() {
        let request = CreateUserRequest {
            name: "John Doe".to_string(),
            email: "john@example.com".to_string(),
            phone: "123".to_string(),
        };

        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_create_user_request_collects_errors() {
        let request = CreateUserRequest {
            name: " ".to_string(),
            email: "not-an-email".to_string(),
            phone: String::new(),
        };

        let err = request.validate_request().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: email: is invalid; name: can't be blank; phone: can't be blank"
        );
    }

    #[test]
    fn test_update_user_request_skips_absent_fields() {
        assert!(UpdateUserRequest::default().validate().is_ok());

        let request = UpdateUserRequest {
            email: Some("bad".to_string()),
            ..UpdateUserRequest::default()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_user_response_from_user_with_jobs() {
        let user = create_test_user();
        let job = Job {
            id: JobId::new(10),
            title: "Title".to_string(),
            description: "Description".to_string(),
            status: JobStatus::Completed,
            user_id: user.id,
            created_at: user.created_at,
            updated_at: user.updated_at,
            user: None,
        };

        let response = UserResponse::from(user.with_jobs(vec![job]));

        assert_eq!(response.email, "john@example.com");
        let jobs = response.jobs.unwrap();
        assert_eq!(jobs[0].id, JobId::new(10));
        assert_eq!(jobs[0].status, "completed");
    }

    #[test]
    fn test_unloaded_jobs_are_omitted() {
        let json = serde_json::to_value(UserResponse::from(create_test_user())).unwrap();
        assert!(json.get("jobs").is_none());
        assert_eq!(json["name"], "John Doe");
    }

    #[test]
    fn test_user_list_response() {
        let response = UserListResponse::from(vec![create_test_user()]);
        assert_eq!(response.total, 1);
        assert_eq!(response.users[0].id, UserId::new(1));
    }
}
