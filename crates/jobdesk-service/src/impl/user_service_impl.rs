//! User service implementation.

use super::{index_quietly, unindex_quietly};
use crate::coordinator::{CacheCoordinator, CacheCoordinatorExt};
use crate::dto::{CreateUserRequest, UpdateUserRequest, UserListResponse, UserResponse};
use crate::listing::ListingService;
use crate::user_service::UserService;
use async_trait::async_trait;
use jobdesk_core::{JobdeskError, JobdeskResult, UserId, ValidateExt};
use jobdesk_domain::{Email, EntityKind, NewUser, Record, User};
use jobdesk_repository::UserRepository;
use jobdesk_search::SearchIndex;
use shaku::Component;
use std::sync::Arc;
use tracing::{debug, info};

fn parse_email(email: &str) -> JobdeskResult<Email> {
    Email::new(email).map_err(|_| JobdeskError::validation("email: is invalid"))
}

/// User service component for Shaku DI.
#[derive(Component)]
#[shaku(interface = UserService)]
pub struct UserServiceComponent {
    #[shaku(inject)]
    user_repository: Arc<dyn UserRepository>,
    #[shaku(inject)]
    coordinator: Arc<dyn CacheCoordinator>,
    #[shaku(inject)]
    listing: Arc<dyn ListingService>,
    #[shaku(inject)]
    index: Arc<dyn SearchIndex>,
}

impl UserServiceComponent {
    /// Creates a new user service.
    #[must_use]
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        coordinator: Arc<dyn CacheCoordinator>,
        listing: Arc<dyn ListingService>,
        index: Arc<dyn SearchIndex>,
    ) -> Self {
        Self {
            user_repository,
            coordinator,
            listing,
            index,
        }
    }

    async fn ensure_email_available(&self, email: &Email) -> JobdeskResult<()> {
        if self.user_repository.exists_by_email(email.as_str()).await? {
            return Err(JobdeskError::conflict(format!(
                "Email '{}' has already been taken",
                email
            )));
        }
        Ok(())
    }

    /// Row a partial update applies to. The cached snapshot only proves the
    /// user exists; its fields may be older than the table.
    async fn current_row(&self, id: UserId) -> JobdeskResult<User> {
        self.coordinator
            .fetch_cache(EntityKind::User, id.into_inner())
            .await?;
        self.user_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| JobdeskError::not_found("User", id))
    }

    /// Writes the user (and its jobs) through the cache, then re-indexes it.
    async fn cache_and_index(&self, record: Record) -> JobdeskResult<User> {
        self.coordinator.write_cache(&record).await?;

        let record = self.coordinator.fetch_cache(record.kind(), record.id()).await?;
        index_quietly(self.index.as_ref(), &record).await;
        record.into_user()
    }
}

#[async_trait]
impl UserService for UserServiceComponent {
    async fn list_users(&self) -> JobdeskResult<UserListResponse> {
        debug!("Listing users");

        let users = self
            .listing
            .list_entities(EntityKind::User, None)
            .await?
            .into_iter()
            .map(User::try_from)
            .collect::<JobdeskResult<Vec<_>>>()?;

        Ok(UserListResponse::from(users))
    }

    async fn get_user(&self, id: UserId) -> JobdeskResult<UserResponse> {
        debug!("Getting user: {}", id);

        let user: User = self.coordinator.fetch(id.into_inner()).await?;
        Ok(UserResponse::from(user))
    }

    async fn create_user(&self, request: CreateUserRequest) -> JobdeskResult<UserResponse> {
        debug!("Creating user: {}", request.email);

        request.validate_request()?;
        let email = parse_email(&request.email)?;
        self.ensure_email_available(&email).await?;

        let user = NewUser {
            name: request.name,
            email,
            phone: request.phone,
        };
        let saved = self.user_repository.save(&user).await?;
        info!("User created: {}", saved.id);

        let user = self.cache_and_index(Record::User(saved)).await?;
        Ok(UserResponse::from(user))
    }

    async fn update_user(&self, id: UserId, request: UpdateUserRequest) -> JobdeskResult<UserResponse> {
        debug!("Updating user: {}", id);

        request.validate_request()?;
        let mut user = self.current_row(id).await?;

        let email = request.email.as_deref().map(parse_email).transpose()?;
        if let Some(email) = &email {
            if *email != user.email {
                self.ensure_email_available(email).await?;
            }
        }

        if user.apply_changes(request.name, email, request.phone) {
            user.validate_request()?;
            self.user_repository.update(&user).await?;
            info!("User updated: {}", id);
        }

        let user = self.cache_and_index(Record::User(user)).await?;
        Ok(UserResponse::from(user))
    }

    async fn delete_user(&self, id: UserId) -> JobdeskResult<()> {
        debug!("Deleting user: {}", id);

        let record = self
            .coordinator
            .fetch_cache(EntityKind::User, id.into_inner())
            .await?;

        // Evict before the row (and its cascaded jobs) disappear.
        let key = record.key();
        let dependents = record.has_many_keys();
        self.coordinator.delete_cache(&record).await?;
        for job in record.into_user()?.jobs.into_iter().flatten() {
            self.coordinator.delete_cache(&Record::Job(job)).await?;
        }

        if !self.user_repository.delete(id).await? {
            return Err(JobdeskError::not_found("User", id));
        }

        unindex_quietly(self.index.as_ref(), key).await;
        for key in dependents {
            unindex_quietly(self.index.as_ref(), key).await;
        }

        info!("User deleted: {}", id);
        Ok(())
    }
}

impl std::fmt::Debug for UserServiceComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserServiceComponent").finish_non_exhaustive()
    }
}
