//! Unified error types for all layers of the application.

use std::fmt::Debug;
use thiserror::Error;

/// Unified error type for all layers of Jobdesk.
///
/// The infrastructure variants map onto the failure classes of the
/// caching core: `Database` for entity store failures, `Cache` for cache
/// store failures and `Search` for search index failures.
#[derive(Error, Debug)]
pub enum JobdeskError {
    // ============ Domain Errors ============
    /// Resource not found
    #[error("Resource not found: {resource_type} with id {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Conflict error (e.g., duplicate entry)
    #[error("Conflict: {0}")]
    Conflict(String),

    // ============ Infrastructure Errors ============
    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Redis/Cache error
    #[error("Cache error: {0}")]
    Cache(String),

    /// Search index error
    #[error("Search error: {0}")]
    Search(String),

    /// Timeout error
    #[error("Operation timed out: {0}")]
    Timeout(String),

    // ============ Internal Errors ============
    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl JobdeskError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::Validation(_) => 422,
            Self::Conflict(_) => 409,
            Self::Timeout(_) => 503,
            Self::Search(_) => 502,
            Self::Database(_)
            | Self::Configuration(_)
            | Self::Cache(_)
            | Self::Internal(_)
            | Self::Other(_) => 500,
        }
    }

    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Cache(_) => "CACHE_ERROR",
            Self::Search(_) => "SEARCH_ERROR",
            Self::Timeout(_) => "TIMEOUT",
            Self::Internal(_) | Self::Other(_) => "INTERNAL_ERROR",
        }
    }

    /// Creates a not found error for a resource.
    #[must_use]
    pub fn not_found<T: ToString>(resource_type: &'static str, id: T) -> Self {
        Self::NotFound {
            resource_type,
            id: id.to_string(),
        }
    }

    /// Creates a validation error.
    #[must_use]
    pub fn validation<T: Into<String>>(message: T) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a conflict error.
    #[must_use]
    pub fn conflict<T: Into<String>>(message: T) -> Self {
        Self::Conflict(message.into())
    }

    /// Creates a cache error.
    #[must_use]
    pub fn cache<T: Into<String>>(message: T) -> Self {
        Self::Cache(message.into())
    }

    /// Creates a search error.
    #[must_use]
    pub fn search<T: Into<String>>(message: T) -> Self {
        Self::Search(message.into())
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal<T: Into<String>>(message: T) -> Self {
        Self::Internal(message.into())
    }

    /// Returns true for the not found variant.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for JobdeskError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => Self::NotFound {
                resource_type: "database_row",
                id: "unknown".to_string(),
            },
            sqlx::Error::Database(db_err) => {
                if db_err.is_unique_violation() {
                    return Self::Conflict(db_err.message().to_string());
                }
                if db_err.is_foreign_key_violation() {
                    return Self::Validation(format!(
                        "Referenced record does not exist: {}",
                        db_err.message()
                    ));
                }
                Self::Database(err.to_string())
            }
            _ => Self::Database(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for JobdeskError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON serialization error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(JobdeskError::not_found("User", 1).status_code(), 404);
        assert_eq!(JobdeskError::validation("Name can't be blank").status_code(), 422);
        assert_eq!(JobdeskError::conflict("duplicate").status_code(), 409);
        assert_eq!(JobdeskError::Database("db error".to_string()).status_code(), 500);
        assert_eq!(JobdeskError::cache("redis down").status_code(), 500);
        assert_eq!(JobdeskError::Timeout("timed out".to_string()).status_code(), 503);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(JobdeskError::not_found("Job", 10).error_code(), "NOT_FOUND");
        assert_eq!(JobdeskError::cache("x").error_code(), "CACHE_ERROR");
        assert_eq!(JobdeskError::search("x").error_code(), "SEARCH_ERROR");
        assert_eq!(JobdeskError::internal("x").error_code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_not_found_display() {
        let err = JobdeskError::not_found("User", 42);
        assert_eq!(err.to_string(), "Resource not found: User with id 42");
        assert!(err.is_not_found());
        assert!(!JobdeskError::cache("x").is_not_found());
    }

    #[test]
    fn test_json_error_conversion() {
        let err: JobdeskError = serde_json::from_str::<u32>("not json").unwrap_err().into();
        assert!(matches!(err, JobdeskError::Internal(_)));
    }
}
