//! Validation utilities.

use crate::JobdeskError;
use validator::{Validate, ValidationErrors};

/// Extension trait for validation.
pub trait ValidateExt: Validate {
    /// Validates the struct and returns a `JobdeskError` on failure.
    fn validate_request(&self) -> Result<(), JobdeskError> {
        self.validate().map_err(validation_errors_to_jobdesk_error)
    }
}

impl<T: Validate> ValidateExt for T {}

/// Converts `validator::ValidationErrors` to `JobdeskError`.
///
/// Field errors are flattened into one `field: message` list, sorted by
/// field name so the message is stable across runs.
#[must_use]
pub fn validation_errors_to_jobdesk_error(errors: ValidationErrors) -> JobdeskError {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                let message = error
                    .message
                    .as_ref()
                    .map_or_else(|| error.code.to_string(), ToString::to_string);
                format!("{}: {}", field, message)
            })
        })
        .collect();
    messages.sort();

    JobdeskError::Validation(messages.join("; "))
}

/// Common validation functions.
pub mod rules {
    use validator::ValidationError;

    /// Validates that a string is not blank (not empty after trimming).
    pub fn not_blank(value: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            let mut err = ValidationError::new("blank");
            err.message = Some("can't be blank".into());
            return Err(err);
        }
        Ok(())
    }
}
