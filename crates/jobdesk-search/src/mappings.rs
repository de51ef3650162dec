//! Index settings and mappings.

use jobdesk_domain::EntityKind;
use serde_json::{json, Value};

/// Body of the create-index request for `kind`.
///
/// Mappings are not dynamic: only the listed fields are searchable, the
/// rest of the document is kept in `_source`.
#[must_use]
pub fn index_settings(kind: EntityKind) -> Value {
    let properties = match kind {
        EntityKind::User => json!({
            "id":         { "type": "long" },
            "name":       { "type": "text" },
            "email":      { "type": "keyword" },
            "phone":      { "type": "keyword" },
            "created_at": { "type": "date" },
            "updated_at": { "type": "date" },
            "jobs": {
                "type": "nested",
                "properties": job_properties()
            }
        }),
        EntityKind::Job => {
            let mut properties = job_properties();
            properties["user"] = json!({
                "type": "object",
                "properties": {
                    "id":         { "type": "long" },
                    "name":       { "type": "text" },
                    "email":      { "type": "keyword" },
                    "phone":      { "type": "keyword" },
                    "created_at": { "type": "date" },
                    "updated_at": { "type": "date" }
                }
            });
            properties
        }
    };

    json!({
        "mappings": {
            "dynamic": false,
            "properties": properties
        }
    })
}

fn job_properties() -> Value {
    json!({
        "id":          { "type": "long" },
        "user_id":     { "type": "long" },
        "title":       { "type": "text" },
        "description": { "type": "text" },
        "status":      { "type": "keyword" },
        "created_at":  { "type": "date" },
        "updated_at":  { "type": "date" }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_index_nests_jobs() {
        let settings = index_settings(EntityKind::User);
        assert_eq!(settings["mappings"]["dynamic"], false);
        assert_eq!(settings["mappings"]["properties"]["jobs"]["type"], "nested");
        assert_eq!(settings["mappings"]["properties"]["email"]["type"], "keyword");
    }

    #[test]
    fn test_job_index_maps_owner() {
        let settings = index_settings(EntityKind::Job);
        let properties = &settings["mappings"]["properties"];
        assert_eq!(properties["user_id"]["type"], "long");
        assert_eq!(properties["status"]["type"], "keyword");
        assert_eq!(properties["user"]["properties"]["email"]["type"], "keyword");
    }
}
