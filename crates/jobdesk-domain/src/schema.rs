//! Static association registry.
//!
//! Every entity kind declares its belongs-to and has-many associations here,
//! once, at compile time. The entity store uses the schema to decide what to
//! eager load and the cache coordinator uses it to walk related entities.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kinds of entity the system persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A user account.
    User,
    /// A job owned by a user.
    Job,
}

impl EntityKind {
    /// Every entity kind.
    pub const ALL: [Self; 2] = [Self::User, Self::Job];

    /// Cache namespace for this kind (lower-case type name).
    #[must_use]
    pub const fn namespace(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Job => "job",
        }
    }

    /// Human-readable resource name used in error messages.
    #[must_use]
    pub const fn resource_name(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Job => "Job",
        }
    }

    /// Search index holding documents of this kind.
    #[must_use]
    pub const fn index_name(self) -> &'static str {
        match self {
            Self::User => "users",
            Self::Job => "jobs",
        }
    }

    /// Associations declared on this kind.
    #[must_use]
    pub const fn associations(self) -> &'static AssociationSchema {
        match self {
            Self::User => &USER_ASSOCIATIONS,
            Self::Job => &JOB_ASSOCIATIONS,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.namespace())
    }
}

/// A named association between two entity kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Association {
    /// `Job` belongs to `User` through `user_id`.
    User,
    /// `User` has many `Job`s.
    Jobs,
}

/// Belongs-to and has-many associations of one entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssociationSchema {
    /// Single-valued references this kind depends on.
    pub belongs_to: &'static [Association],
    /// Collections of dependents referencing this kind.
    pub has_many: &'static [Association],
}

impl AssociationSchema {
    /// A schema with no associations, for loading bare rows.
    pub const NONE: Self = Self {
        belongs_to: &[],
        has_many: &[],
    };

    /// Returns true if `association` is part of this schema.
    #[must_use]
    pub fn includes(&self, association: Association) -> bool {
        self.belongs_to.contains(&association) || self.has_many.contains(&association)
    }
}

static USER_ASSOCIATIONS: AssociationSchema = AssociationSchema {
    belongs_to: &[],
    has_many: &[Association::Jobs],
};

static JOB_ASSOCIATIONS: AssociationSchema = AssociationSchema {
    belongs_to: &[Association::User],
    has_many: &[],
};

/// Cache identity of an entity: its kind plus its database id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityKey {
    /// Kind of the entity; provides the namespace.
    pub kind: EntityKind,
    /// Database id of the entity.
    pub id: i64,
}

impl EntityKey {
    /// Creates a new key.
    #[must_use]
    pub const fn new(kind: EntityKind, id: i64) -> Self {
        Self { kind, id }
    }

    /// Namespace of the key.
    #[must_use]
    pub const fn namespace(&self) -> &'static str {
        self.kind.namespace()
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.namespace(), self.id)
    }
}
