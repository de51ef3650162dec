//! Timeout wrapper for async operations.

use jobdesk_core::JobdeskError;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Wraps an async operation with a timeout.
///
/// The operation is dropped when the deadline passes; its own error is
/// returned unchanged when it finishes in time.
pub async fn with_timeout<F, Fut, T>(duration: Duration, f: F) -> Result<T, JobdeskError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, JobdeskError>>,
{
    tokio::time::timeout(duration, f())
        .await
        .map_err(|_| JobdeskError::Timeout(format!("Operation timed out after {:?}", duration)))?
}

/// Like [`with_timeout`], but names the operation in the error and logs the expiry.
pub async fn with_named_timeout<F, Fut, T>(
    operation: &str,
    duration: Duration,
    f: F,
) -> Result<T, JobdeskError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, JobdeskError>>,
{
    match tokio::time::timeout(duration, f()).await {
        Ok(result) => result,
        Err(_) => {
            warn!(operation, timeout_ms = duration.as_millis() as u64, "Operation timed out");
            Err(JobdeskError::Timeout(format!(
                "{} timed out after {:?}",
                operation, duration
            )))
        }
    }
}
