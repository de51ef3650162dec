//! Service implementations.
//!
//! Trait definitions live in the parent module (e.g. `user_service.rs`).

pub mod job_service_impl;
pub mod user_service_impl;

pub use job_service_impl::JobServiceComponent;
pub use user_service_impl::UserServiceComponent;

use jobdesk_domain::{EntityKey, Record};
use jobdesk_search::SearchIndex;
use tracing::warn;

/// Indexes `record`; the index is eventually consistent, so failures are only logged.
async fn index_quietly(index: &dyn SearchIndex, record: &Record) {
    if let Err(e) = index.index_document(record).await {
        warn!("Failed to index {}: {}", record.key(), e);
    }
}

/// Removes the document of `key` from the index, logging failures.
async fn unindex_quietly(index: &dyn SearchIndex, key: EntityKey) {
    if let Err(e) = index.delete_document(key.kind, key.id).await {
        warn!("Failed to remove {} from the index: {}", key, e);
    }
}
