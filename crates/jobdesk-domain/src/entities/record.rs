//! Kind-erased entity wrapper.
//!
//! The cache coordinator and the entity store work across entity kinds, so
//! they pass entities around as [`Record`]s. The typed [`Entity`] trait
//! converts back to `User`/`Job` at the service boundary.

use super::{Job, User};
use crate::{Association, EntityKey, EntityKind};
use jobdesk_core::{JobdeskError, JobdeskResult};
use serde::Serialize;
use serde_json::Value;

/// A user or a job, together with whatever associations were loaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Record {
    /// A user record.
    User(User),
    /// A job record.
    Job(Job),
}

impl Record {
    /// Kind of the wrapped entity.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        match self {
            Self::User(_) => EntityKind::User,
            Self::Job(_) => EntityKind::Job,
        }
    }

    /// Database id of the wrapped entity.
    #[must_use]
    pub const fn id(&self) -> i64 {
        match self {
            Self::User(user) => user.id.0,
            Self::Job(job) => job.id.0,
        }
    }

    /// Cache key of the wrapped entity.
    #[must_use]
    pub const fn key(&self) -> EntityKey {
        EntityKey::new(self.kind(), self.id())
    }

    /// Keys of the loaded belongs-to associations that are present.
    #[must_use]
    pub fn belongs_to_keys(&self) -> Vec<EntityKey> {
        self.kind()
            .associations()
            .belongs_to
            .iter()
            .flat_map(|association| self.loaded_keys(*association))
            .collect()
    }

    /// Keys of every member of the loaded has-many associations.
    #[must_use]
    pub fn has_many_keys(&self) -> Vec<EntityKey> {
        self.kind()
            .associations()
            .has_many
            .iter()
            .flat_map(|association| self.loaded_keys(*association))
            .collect()
    }

    fn loaded_keys(&self, association: Association) -> Vec<EntityKey> {
        match (self, association) {
            (Self::Job(job), Association::User) => {
                job.user.iter().map(|user| user.key()).collect()
            }
            (Self::User(user), Association::Jobs) => user
                .jobs
                .iter()
                .flatten()
                .map(Job::key)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Serializes the wrapped entity (without a kind tag) to JSON.
    pub fn to_json(&self) -> JobdeskResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserializes an entity of the given kind from JSON.
    pub fn from_json(kind: EntityKind, json: &str) -> JobdeskResult<Self> {
        Ok(match kind {
            EntityKind::User => Self::User(serde_json::from_str(json)?),
            EntityKind::Job => Self::Job(serde_json::from_str(json)?),
        })
    }

    /// Converts a JSON document (e.g. a search hit source) of the given kind.
    pub fn from_value(kind: EntityKind, value: Value) -> JobdeskResult<Self> {
        Ok(match kind {
            EntityKind::User => Self::User(serde_json::from_value(value)?),
            EntityKind::Job => Self::Job(serde_json::from_value(value)?),
        })
    }

    /// Unwraps a user record.
    pub fn into_user(self) -> JobdeskResult<User> {
        User::try_from(self)
    }

    /// Unwraps a job record.
    pub fn into_job(self) -> JobdeskResult<Job> {
        Job::try_from(self)
    }
}

/// Typed view of a [`Record`] variant.
pub trait Entity: Into<Record> + TryFrom<Record, Error = JobdeskError> + Send + Sync + 'static {
    /// Kind of this entity type.
    const KIND: EntityKind;
}

impl Entity for User {
    const KIND: EntityKind = EntityKind::User;
}

impl Entity for Job {
    const KIND: EntityKind = EntityKind::Job;
}

impl From<User> for Record {
    fn from(user: User) -> Self {
        Self::User(user)
    }
}

impl From<Job> for Record {
    fn from(job: Job) -> Self {
        Self::Job(job)
    }
}

impl TryFrom<Record> for User {
    type Error = JobdeskError;

    fn try_from(record: Record) -> Result<Self, Self::Error> {
        match record {
            Record::User(user) => Ok(user),
            other => Err(JobdeskError::internal(format!(
                "Expected a user record, got {}",
                other.key()
            ))),
        }
    }
}

impl TryFrom<Record> for Job {
    type Error = JobdeskError;

    fn try_from(record: Record) -> Result<Self, Self::Error> {
        match record {
            Record::Job(job) => Ok(job),
            other => Err(JobdeskError::internal(format!(
                "Expected a job record, got {}",
                other.key()
            ))),
        }
    }
}
