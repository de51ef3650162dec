//! User service trait definition.

use crate::dto::{CreateUserRequest, UpdateUserRequest, UserListResponse, UserResponse};
use async_trait::async_trait;
use jobdesk_core::{Interface, JobdeskResult, UserId};

/// User service trait.
#[async_trait]
pub trait UserService: Interface + Send + Sync {
    /// Lists all users, each with its jobs.
    async fn list_users(&self) -> JobdeskResult<UserListResponse>;

    /// Gets a user by ID.
    async fn get_user(&self, id: UserId) -> JobdeskResult<UserResponse>;

    /// Creates a new user.
    async fn create_user(&self, request: CreateUserRequest) -> JobdeskResult<UserResponse>;

    /// Updates a user's profile.
    async fn update_user(&self, id: UserId, request: UpdateUserRequest) -> JobdeskResult<UserResponse>;

    /// Deletes a user and, through the store, its jobs.
    async fn delete_user(&self, id: UserId) -> JobdeskResult<()>;
}
