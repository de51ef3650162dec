//! Search index trait definitions.

use crate::SearchQuery;
use async_trait::async_trait;
use jobdesk_core::{Interface, JobdeskResult};
use jobdesk_domain::{EntityKind, Record};
use serde_json::Value;

/// Full-text search index holding one index per entity kind.
#[async_trait]
pub trait SearchIndex: Interface + Send + Sync {
    /// Runs `query` against the index of `kind` and returns the source
    /// documents in index order.
    async fn search(&self, kind: EntityKind, query: &SearchQuery) -> JobdeskResult<Vec<Value>>;

    /// Indexes (or replaces) the document of `record`.
    async fn index_document(&self, record: &Record) -> JobdeskResult<()>;

    /// Removes the document of `kind` with `id`. Missing documents are ignored.
    async fn delete_document(&self, kind: EntityKind, id: i64) -> JobdeskResult<()>;

    /// Creates the index of `kind` with its mappings. An existing index is kept.
    async fn create_index(&self, kind: EntityKind) -> JobdeskResult<()>;

    /// Drops the index of `kind`. A missing index is ignored.
    async fn delete_index(&self, kind: EntityKind) -> JobdeskResult<()>;
}
