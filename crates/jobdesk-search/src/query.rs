//! Listing queries.

use jobdesk_domain::FieldFilter;
use serde_json::{json, Value};

/// Query sent to the search index for a listing.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchQuery {
    /// Every document of the index.
    MatchAll,
    /// Documents whose `field` matches `value`.
    Match {
        /// Document field.
        field: String,
        /// Value to match.
        value: Value,
    },
}

impl SearchQuery {
    /// Builds the query for an optional listing filter.
    #[must_use]
    pub fn for_filter(filter: Option<&FieldFilter>) -> Self {
        filter.map_or(Self::MatchAll, |filter| Self::Match {
            field: filter.field.clone(),
            value: filter.json_value(),
        })
    }

    /// Query DSL form.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::MatchAll => json!({ "match_all": {} }),
            Self::Match { field, value } => json!({ "match": { field.as_str(): value } }),
        }
    }
}
