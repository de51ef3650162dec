//! MySQL user repository implementation.

use super::{push_filter, push_in_list};
use crate::{traits::UserRepository, DatabasePoolInterface};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jobdesk_core::{JobdeskError, JobdeskResult, UserId};
use jobdesk_domain::{Email, FieldFilter, NewUser, User};
use shaku::Component;
use sqlx::{FromRow, QueryBuilder};
use std::sync::Arc;
use tracing::{debug, info};

const SELECT_USERS: &str = "SELECT id, name, email, phone, created_at, updated_at FROM users";

/// Columns a user listing may be filtered on.
const FILTER_COLUMNS: &[&str] = &["id", "email", "name", "phone"];

/// MySQL user repository implementation.
#[derive(Component, Clone)]
#[shaku(interface = UserRepository)]
pub struct MySqlUserRepository {
    #[shaku(inject)]
    pool: Arc<dyn DatabasePoolInterface>,
}

impl MySqlUserRepository {
    /// Creates a new MySQL user repository.
    #[must_use]
    pub fn new(pool: Arc<dyn DatabasePoolInterface>) -> Self {
        Self { pool }
    }
}

/// Database row representation of a user.
#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
    phone: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: UserId::new(row.id),
            name: row.name,
            email: Email::new_unchecked(row.email),
            phone: row.phone,
            created_at: row.created_at,
            updated_at: row.updated_at,
            jobs: None,
        }
    }
}

#[async_trait]
impl UserRepository for MySqlUserRepository {
    async fn find_by_id(&self, id: UserId) -> JobdeskResult<Option<User>> {
        debug!("Finding user by id: {}", id);

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, phone, created_at, updated_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id.into_inner())
        .fetch_optional(self.pool.inner())
        .await?;

        Ok(row.map(User::from))
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> JobdeskResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        debug!("Finding {} users by id", ids.len());

        let ids: Vec<i64> = ids.iter().map(|id| id.into_inner()).collect();
        let mut builder = QueryBuilder::new(SELECT_USERS);
        push_in_list(&mut builder, "id", &ids);
        builder.push(" ORDER BY id");

        let rows = builder
            .build_query_as::<UserRow>()
            .fetch_all(self.pool.inner())
            .await?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn find_all(&self, filter: Option<&FieldFilter>) -> JobdeskResult<Vec<User>> {
        debug!("Finding all users, filter: {:?}", filter);

        let mut builder = QueryBuilder::new(SELECT_USERS);
        push_filter(&mut builder, filter, FILTER_COLUMNS)?;
        builder.push(" ORDER BY id");

        let rows = builder
            .build_query_as::<UserRow>()
            .fetch_all(self.pool.inner())
            .await?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn exists_by_email(&self, email: &str) -> JobdeskResult<bool> {
        let result: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM users WHERE LOWER(email) = LOWER(?) LIMIT 1")
                .bind(email)
                .fetch_optional(self.pool.inner())
                .await?;

        Ok(result.is_some())
    }

    async fn save(&self, user: &NewUser) -> JobdeskResult<User> {
        debug!("Saving new user: {}", user.email);

        let now = Utc::now();

        // MySQL doesn't support RETURNING, so insert then select
        let result = sqlx::query(
            r#"
            INSERT INTO users (name, email, phone, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.name)
        .bind(user.email.as_str())
        .bind(&user.phone)
        .bind(now)
        .bind(now)
        .execute(self.pool.inner())
        .await?;

        let id = UserId::new(i64::try_from(result.last_insert_id()).map_err(|e| {
            JobdeskError::Internal(format!("Inserted user id out of range: {}", e))
        })?);
        info!("Inserted user {}", id);

        self.find_by_id(id)
            .await?
            .ok_or_else(|| JobdeskError::Internal("Failed to fetch inserted user".to_string()))
    }

    async fn update(&self, user: &User) -> JobdeskResult<User> {
        debug!("Updating user: {}", user.id);

        sqlx::query(
            r#"
            UPDATE users
            SET name = ?, email = ?, phone = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&user.name)
        .bind(user.email.as_str())
        .bind(&user.phone)
        .bind(user.updated_at)
        .bind(user.id.into_inner())
        .execute(self.pool.inner())
        .await?;

        // A no-op update reports zero affected rows; the re-read decides.
        self.find_by_id(user.id)
            .await?
            .ok_or_else(|| JobdeskError::not_found("User", user.id))
    }

    async fn delete(&self, id: UserId) -> JobdeskResult<bool> {
        debug!("Deleting user: {}", id);

        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id.into_inner())
            .execute(self.pool.inner())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_all(&self) -> JobdeskResult<u64> {
        let result = sqlx::query("DELETE FROM users")
            .execute(self.pool.inner())
            .await?;

        info!("Deleted {} users", result.rows_affected());
        Ok(result.rows_affected())
    }
}

impl std::fmt::Debug for MySqlUserRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlUserRepository").finish_non_exhaustive()
    }
}
