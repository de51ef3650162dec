//! Job entity.

use super::User;
use crate::value_objects::JobStatus;
use crate::{EntityKey, EntityKind};
use chrono::{DateTime, Utc};
use jobdesk_core::{JobId, UserId};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A unit of work owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Job {
    /// Database-assigned identifier.
    pub id: JobId,

    /// Short title.
    #[validate(custom(function = "jobdesk_core::rules::not_blank"))]
    pub title: String,

    /// Free-form description.
    #[validate(custom(function = "jobdesk_core::rules::not_blank"))]
    pub description: String,

    /// Lifecycle status.
    pub status: JobStatus,

    /// Owning user.
    pub user_id: UserId,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,

    /// Owning user, when the association was loaded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Box<User>>,
}

impl Job {
    /// Returns the cache key of this job.
    #[must_use]
    pub const fn key(&self) -> EntityKey {
        EntityKey::new(EntityKind::Job, self.id.0)
    }

    /// Returns a copy of this job without any loaded association.
    #[must_use]
    pub fn detached(&self) -> Self {
        Self {
            user: None,
            ..self.clone()
        }
    }

    /// Attaches the given user as the loaded `user` association.
    #[must_use]
    pub fn with_user(mut self, user: User) -> Self {
        self.user = Some(Box::new(user));
        self
    }

    /// Applies a partial change.
    ///
    /// Returns true if any field actually changed.
    pub fn apply_changes(
        &mut self,
        title: Option<String>,
        description: Option<String>,
        status: Option<JobStatus>,
        user_id: Option<UserId>,
    ) -> bool {
        let mut changed = false;
        if let Some(title) = title.filter(|t| *t != self.title) {
            self.title = title;
            changed = true;
        }
        if let Some(description) = description.filter(|d| *d != self.description) {
            self.description = description;
            changed = true;
        }
        if let Some(status) = status.filter(|s| *s != self.status) {
            self.status = status;
            changed = true;
        }
        if let Some(user_id) = user_id.filter(|u| *u != self.user_id) {
            self.user_id = user_id;
            // The loaded owner no longer matches.
            self.user = None;
            changed = true;
        }
        if changed {
            self.updated_at = Utc::now();
        }
        changed
    }
}

/// A job that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct NewJob {
    /// Short title.
    #[validate(custom(function = "jobdesk_core::rules::not_blank"))]
    pub title: String,

    /// Free-form description.
    #[validate(custom(function = "jobdesk_core::rules::not_blank"))]
    pub description: String,

    /// Lifecycle status.
    pub status: JobStatus,

    /// Owning user.
    pub user_id: UserId,
}
