//! Index document shaping and search response parsing.

use jobdesk_core::{JobdeskError, JobdeskResult};
use jobdesk_domain::{Job, Record, User};
use serde::Deserialize;
use serde_json::Value;

/// Builds the index document of a record.
///
/// A user document embeds its jobs (without their user); a job document
/// embeds its user (without the user's jobs). Both deserialize back into
/// the matching [`Record`] variant.
pub fn to_document(record: &Record) -> JobdeskResult<Value> {
    let shaped = match record {
        Record::User(user) => Record::User(User {
            jobs: Some(user.jobs.iter().flatten().map(Job::detached).collect()),
            ..user.detached()
        }),
        Record::Job(job) => Record::Job(Job {
            user: job.user.as_deref().map(|user| Box::new(user.detached())),
            ..job.detached()
        }),
    };
    Ok(serde_json::to_value(&shaped)?)
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: HitsEnvelope,
}

#[derive(Debug, Deserialize)]
struct HitsEnvelope {
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "_source")]
    source: Value,
}

/// Extracts the `_source` of every hit, in order.
pub fn parse_hits(body: &str) -> JobdeskResult<Vec<Value>> {
    let response: SearchResponse = serde_json::from_str(body)
        .map_err(|e| JobdeskError::search(format!("Malformed search response: {}", e)))?;
    Ok(response.hits.hits.into_iter().map(|hit| hit.source).collect())
}

/// Extracts `error.reason` (or the raw body) from an error response.
#[must_use]
pub fn error_reason(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error").map(|e| match e.get("reason").and_then(Value::as_str) {
                Some(reason) => reason.to_string(),
                None => e.to_string(),
            })
        })
        .unwrap_or_else(|| body.to_string())
}

/// Extracts `error.type` from an error response.
#[must_use]
pub fn error_type(body: &str) -> Option<String> {
    serde_json::from_str::<Value>(body)
        .ok()?
        .get("error")?
        .get("type")?
        .as_str()
        .map(str::to_string)
}
