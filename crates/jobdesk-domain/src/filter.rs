//! Field-equality filters for listings.

use crate::Record;
use jobdesk_core::UserId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Scalar value compared by a [`FieldFilter`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Integer column such as a foreign key.
    Int(i64),
    /// Text column such as a status.
    Text(String),
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
        }
    }
}

/// `field = value` restriction applied to a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldFilter {
    /// Top-level document field / table column.
    pub field: String,
    /// Required value.
    pub value: FilterValue,
}

impl FieldFilter {
    /// Creates a filter on an arbitrary field.
    pub fn new(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Jobs owned by the given user.
    #[must_use]
    pub fn user_id(user_id: UserId) -> Self {
        Self::new("user_id", user_id.into_inner())
    }

    /// Filter value as JSON, for query documents.
    #[must_use]
    pub fn json_value(&self) -> Value {
        match &self.value {
            FilterValue::Int(v) => Value::from(*v),
            FilterValue::Text(v) => Value::from(v.as_str()),
        }
    }

    /// Returns true if the record's top-level field equals the filter value.
    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        serde_json::to_value(record)
            .ok()
            .and_then(|doc| doc.get(&self.field).cloned())
            .is_some_and(|actual| actual == self.json_value())
    }
}

impl fmt::Display for FieldFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.field, self.value)
    }
}
