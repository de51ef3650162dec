//! Result type aliases for Jobdesk.

use crate::JobdeskError;

/// A specialized `Result` type for Jobdesk operations.
pub type JobdeskResult<T> = Result<T, JobdeskError>;

/// A boxed future returning a `JobdeskResult`.
pub type BoxFuture<'a, T> = std::pin::Pin<Box<dyn std::future::Future<Output = JobdeskResult<T>> + Send + 'a>>;
