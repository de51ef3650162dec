//! User entity.

use super::Job;
use crate::value_objects::Email;
use crate::{EntityKey, EntityKind};
use chrono::{DateTime, Utc};
use jobdesk_core::UserId;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A user account that owns jobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct User {
    /// Database-assigned identifier.
    pub id: UserId,

    /// Display name.
    #[validate(custom(function = "jobdesk_core::rules::not_blank"))]
    pub name: String,

    /// Unique email address.
    pub email: Email,

    /// Contact phone number.
    #[validate(custom(function = "jobdesk_core::rules::not_blank"))]
    pub phone: String,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,

    /// Jobs owned by this user, when the association was loaded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jobs: Option<Vec<Job>>,
}

impl User {
    /// Returns the cache key of this user.
    #[must_use]
    pub const fn key(&self) -> EntityKey {
        EntityKey::new(EntityKind::User, self.id.0)
    }

    /// Returns a copy of this user without any loaded association.
    #[must_use]
    pub fn detached(&self) -> Self {
        Self {
            jobs: None,
            ..self.clone()
        }
    }

    /// Attaches the given jobs as the loaded `jobs` association.
    #[must_use]
    pub fn with_jobs(mut self, jobs: Vec<Job>) -> Self {
        self.jobs = Some(jobs);
        self
    }

    /// Applies a partial profile change.
    ///
    /// Returns true if any field actually changed.
    pub fn apply_changes(
        &mut self,
        name: Option<String>,
        email: Option<Email>,
        phone: Option<String>,
    ) -> bool {
        let mut changed = false;
        if let Some(name) = name.filter(|n| *n != self.name) {
            self.name = name;
            changed = true;
        }
        if let Some(email) = email.filter(|e| *e != self.email) {
            self.email = email;
            changed = true;
        }
        if let Some(phone) = phone.filter(|p| *p != self.phone) {
            self.phone = phone;
            changed = true;
        }
        if changed {
            self.updated_at = Utc::now();
        }
        changed
    }
}

/// A user that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct NewUser {
    /// Display name.
    #[validate(custom(function = "jobdesk_core::rules::not_blank"))]
    pub name: String,

    /// Unique email address.
    pub email: Email,

    /// Contact phone number.
    #[validate(custom(function = "jobdesk_core::rules::not_blank"))]
    pub phone: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobdesk_core::ValidateExt;

    fn sample_user() -> User {
        let now = Utc::now();
        User {
            id: UserId::new(1),
            name: "John Doe".to_string(),
            email: Email::new("john@example.com").unwrap(),
            phone: "123456789".to_string(),
            created_at: now,
            updated_at: now,
            jobs: None,
        }
    }

    #[test]
    fn test_valid_user() {
        assert!(sample_user().validate_request().is_ok());
    }

    #[test]
    fn test_user_requires_name_and_phone() {
        let mut user = sample_user();
        user.name = String::new();
        user.phone = " ".to_string();
        let err = user.validate_request().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("name: can't be blank"));
        assert!(msg.contains("phone: can't be blank"));
    }

    #[test]
    fn test_unloaded_jobs_are_not_serialized() {
        let json = serde_json::to_value(sample_user()).unwrap();
        assert!(json.get("jobs").is_none());

        let json = serde_json::to_value(sample_user().with_jobs(vec![])).unwrap();
        assert_eq!(json["jobs"], serde_json::json!([]));
    }

    #[test]
    fn test_apply_changes_touches_updated_at_only_on_change() {
        let mut user = sample_user();
        let before = user.updated_at;
        assert!(!user.apply_changes(Some("John Doe".to_string()), None, None));
        assert_eq!(user.updated_at, before);

        assert!(user.apply_changes(None, None, Some("555".to_string())));
        assert_eq!(user.phone, "555");
        assert!(user.updated_at >= before);
    }

    #[test]
    fn test_key_uses_user_namespace() {
        assert_eq!(sample_user().key().to_string(), "user:1");
    }
}
