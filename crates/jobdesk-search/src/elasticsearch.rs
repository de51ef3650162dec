//! Elasticsearch-compatible HTTP search index.

use crate::{error_reason, error_type, index_settings, parse_hits, to_document, SearchIndex, SearchQuery};
use async_trait::async_trait;
use jobdesk_config::SearchConfig;
use jobdesk_core::{JobdeskError, JobdeskResult};
use jobdesk_domain::{EntityKind, Record};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::{json, Value};
use shaku::Component;
use tracing::{debug, info};

/// Search index backed by the Elasticsearch REST API.
#[derive(Component, Clone)]
#[shaku(interface = SearchIndex)]
pub struct ElasticsearchIndex {
    client: Client,
    base_url: String,
    username: Option<String>,
    password: Option<String>,
    max_results: u32,
}

impl ElasticsearchIndex {
    /// Creates a new index client from configuration.
    ///
    /// The HTTP client timeout matches `search.timeout_ms`.
    pub fn new(config: &SearchConfig) -> JobdeskResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| JobdeskError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self::with_client(client, config))
    }

    /// Creates a new index client around an existing HTTP client.
    #[must_use]
    pub fn with_client(client: Client, config: &SearchConfig) -> Self {
        Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            password: config.password.clone(),
            max_results: config.max_results,
        }
    }

    /// Component parameters for registering this index in a module.
    pub fn parameters(config: &SearchConfig) -> JobdeskResult<ElasticsearchIndexParameters> {
        let index = Self::new(config)?;
        Ok(ElasticsearchIndexParameters {
            client: index.client,
            base_url: index.base_url,
            username: index.username,
            password: index.password,
            max_results: index.max_results,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.username {
            Some(user) => request.basic_auth(user, self.password.as_deref()),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> JobdeskResult<(StatusCode, String)> {
        let response: Response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| JobdeskError::search(format!("HTTP error: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| JobdeskError::search(format!("Failed to read response: {}", e)))?;
        Ok((status, body))
    }
}

fn failure(status: StatusCode, body: &str) -> JobdeskError {
    JobdeskError::search(format!("{}: {}", status, error_reason(body)))
}

#[async_trait]
impl SearchIndex for ElasticsearchIndex {
    async fn search(&self, kind: EntityKind, query: &SearchQuery) -> JobdeskResult<Vec<Value>> {
        let index = kind.index_name();
        debug!("Searching index {}: {:?}", index, query);

        let body = json!({
            "query": query.to_json(),
            "size": self.max_results,
        });
        let (status, body) = self
            .send(self.client.post(self.url(&format!("{index}/_search"))).json(&body))
            .await?;

        if !status.is_success() {
            return Err(failure(status, &body));
        }
        parse_hits(&body)
    }

    async fn index_document(&self, record: &Record) -> JobdeskResult<()> {
        let index = record.kind().index_name();
        debug!("Indexing document {} in index {}", record.id(), index);

        let document = to_document(record)?;
        let (status, body) = self
            .send(
                self.client
                    .put(self.url(&format!("{index}/_doc/{}", record.id())))
                    .json(&document),
            )
            .await?;

        if !status.is_success() {
            return Err(failure(status, &body));
        }
        Ok(())
    }

    async fn delete_document(&self, kind: EntityKind, id: i64) -> JobdeskResult<()> {
        let index = kind.index_name();
        debug!("Deleting document {} from index {}", id, index);

        let (status, body) = self
            .send(self.client.delete(self.url(&format!("{index}/_doc/{id}"))))
            .await?;

        if status == StatusCode::NOT_FOUND {
            debug!("Document {} not present in index {}", id, index);
            return Ok(());
        }
        if !status.is_success() {
            return Err(failure(status, &body));
        }
        Ok(())
    }

    async fn create_index(&self, kind: EntityKind) -> JobdeskResult<()> {
        let index = kind.index_name();
        info!("Creating index: {}", index);

        let (status, body) = self
            .send(self.client.put(self.url(index)).json(&index_settings(kind)))
            .await?;

        if status == StatusCode::BAD_REQUEST
            && error_type(&body).as_deref() == Some("resource_already_exists_exception")
        {
            debug!("Index {} already exists", index);
            return Ok(());
        }
        if !status.is_success() {
            return Err(failure(status, &body));
        }
        Ok(())
    }

    async fn delete_index(&self, kind: EntityKind) -> JobdeskResult<()> {
        let index = kind.index_name();
        info!("Deleting index: {}", index);

        let (status, body) = self.send(self.client.delete(self.url(index))).await?;

        if status == StatusCode::NOT_FOUND {
            debug!("Index {} does not exist", index);
            return Ok(());
        }
        if !status.is_success() {
            return Err(failure(status, &body));
        }
        Ok(())
    }
}

impl std::fmt::Debug for ElasticsearchIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElasticsearchIndex")
            .field("base_url", &self.base_url)
            .field("max_results", &self.max_results)
            .finish_non_exhaustive()
    }
}
