//! Repository trait definitions.

use async_trait::async_trait;
use jobdesk_core::{Interface, JobId, JobdeskResult, UserId};
use jobdesk_domain::{
    AssociationSchema, EntityKind, FieldFilter, Job, NewJob, NewUser, Record, User,
};

/// User repository trait.
#[async_trait]
pub trait UserRepository: Interface + Send + Sync {
    /// Finds a user by ID.
    async fn find_by_id(&self, id: UserId) -> JobdeskResult<Option<User>>;

    /// Finds every user whose id is in `ids`, in id order.
    async fn find_by_ids(&self, ids: &[UserId]) -> JobdeskResult<Vec<User>>;

    /// Finds all users matching the optional filter, in id order.
    async fn find_all(&self, filter: Option<&FieldFilter>) -> JobdeskResult<Vec<User>>;

    /// Checks if an email is already taken.
    async fn exists_by_email(&self, email: &str) -> JobdeskResult<bool>;

    /// Saves a new user.
    async fn save(&self, user: &NewUser) -> JobdeskResult<User>;

    /// Updates an existing user.
    async fn update(&self, user: &User) -> JobdeskResult<User>;

    /// Deletes a user by ID. Owned jobs are removed by the store.
    async fn delete(&self, id: UserId) -> JobdeskResult<bool>;

    /// Deletes every user and, through the store, every job.
    async fn delete_all(&self) -> JobdeskResult<u64>;
}

/// Job repository trait.
#[async_trait]
pub trait JobRepository: Interface + Send + Sync {
    /// Finds a job by ID.
    async fn find_by_id(&self, id: JobId) -> JobdeskResult<Option<Job>>;

    /// Finds all jobs matching the optional filter, in id order.
    async fn find_all(&self, filter: Option<&FieldFilter>) -> JobdeskResult<Vec<Job>>;

    /// Finds every job owned by one of `user_ids`, in id order.
    async fn find_by_user_ids(&self, user_ids: &[UserId]) -> JobdeskResult<Vec<Job>>;

    /// Saves a new job. The owning user must exist.
    async fn save(&self, job: &NewJob) -> JobdeskResult<Job>;

    /// Updates an existing job.
    async fn update(&self, job: &Job) -> JobdeskResult<Job>;

    /// Deletes a job by ID.
    async fn delete(&self, id: JobId) -> JobdeskResult<bool>;
}

/// Kind-generic read access with eager association loading.
///
/// This is the only view of persistence the cache coordinator and the
/// listing fallback have.
#[async_trait]
pub trait EntityStore: Interface + Send + Sync {
    /// Loads one entity with the requested associations attached.
    async fn find_by_id(
        &self,
        kind: EntityKind,
        id: i64,
        associations: &AssociationSchema,
    ) -> JobdeskResult<Option<Record>>;

    /// Loads every entity of `kind` matching `filter`, with the requested
    /// associations attached.
    async fn find_all(
        &self,
        kind: EntityKind,
        filter: Option<&FieldFilter>,
        associations: &AssociationSchema,
    ) -> JobdeskResult<Vec<Record>>;

    /// Associations declared on `kind`.
    fn declared_associations(&self, kind: EntityKind) -> &'static AssociationSchema {
        kind.associations()
    }
}
