//! MySQL repository implementations.

mod job_repository;
mod user_repository;

pub use job_repository::*;
pub use user_repository::*;

use jobdesk_core::{JobdeskError, JobdeskResult};
use jobdesk_domain::{FieldFilter, FilterValue};
use sqlx::{MySql, QueryBuilder};

/// Appends `WHERE <column> = ?` for a filter on one of `columns`.
///
/// Only whitelisted columns are accepted; anything else is a validation
/// error rather than an empty result.
fn push_filter(
    builder: &mut QueryBuilder<'_, MySql>,
    filter: Option<&FieldFilter>,
    columns: &[&'static str],
) -> JobdeskResult<()> {
    let Some(filter) = filter else {
        return Ok(());
    };
    let column = columns
        .iter()
        .find(|column| **column == filter.field)
        .ok_or_else(|| {
            JobdeskError::validation(format!("Cannot filter on unknown field '{}'", filter.field))
        })?;

    builder.push(" WHERE ").push(*column).push(" = ");
    match &filter.value {
        FilterValue::Int(value) => builder.push_bind(*value),
        FilterValue::Text(value) => builder.push_bind(value.clone()),
    };
    Ok(())
}

/// Appends ` WHERE <column> IN (?, ?, ...)`.
fn push_in_list(builder: &mut QueryBuilder<'_, MySql>, column: &'static str, ids: &[i64]) {
    builder.push(" WHERE ").push(column).push(" IN (");
    let mut separated = builder.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");
}
