//! Cache key generation utilities.
//!
//! Entity entries live under `{prefix}:{namespace}:{id}`, e.g.
//! `jobdesk:cache:user:1`.

use jobdesk_domain::EntityKey;

/// Prefix used when none is configured.
pub const DEFAULT_PREFIX: &str = "jobdesk:cache";

/// Key of the entry caching the entity identified by `key`.
#[must_use]
pub fn entity(prefix: &str, key: &EntityKey) -> String {
    format!("{}:{}:{}", prefix, key.namespace(), key.id)
}

/// Pattern matching every entry under `prefix`.
#[must_use]
pub fn all(prefix: &str) -> String {
    format!("{prefix}:*")
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobdesk_domain::EntityKind;

    #[test]
    fn test_entity_key() {
        let key = EntityKey::new(EntityKind::User, 1);
        assert_eq!(entity(DEFAULT_PREFIX, &key), "jobdesk:cache:user:1");
    }

    #[test]
    fn test_same_id_different_kind() {
        let user = entity("p", &EntityKey::new(EntityKind::User, 10));
        let job = entity("p", &EntityKey::new(EntityKind::Job, 10));
        assert_eq!(user, "p:user:10");
        assert_eq!(job, "p:job:10");
    }

    #[test]
    fn test_prefix_pattern() {
        assert_eq!(all(DEFAULT_PREFIX), "jobdesk:cache:*");
    }
}
