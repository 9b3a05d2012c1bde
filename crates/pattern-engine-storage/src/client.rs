//! JSON-over-HTTP vector-store adapter.
//!
//! Owns a single connection pool. Every request carries the configured
//! timeout; expiry and transport failures map to typed [`StoreError`]
//! variants and never panic.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use pattern_engine_core::config::VectorStoreConfig;
use pattern_engine_core::error::{StoreError, StoreResult};
use pattern_engine_core::traits::{StoreHealth, VectorStore};
use pattern_engine_core::types::document::{SearchMatch, VectorDocument};

/// Query payload for `get_recent_data`.
#[derive(Debug, Serialize)]
struct QueryRequest {
    filter: Value,
    sort: &'static str,
    limit: usize,
    types: Vec<&'static str>,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    documents: Vec<RawDocument>,
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    content: RawContent,
}

#[derive(Debug, Deserialize)]
struct RawContent {
    #[serde(default)]
    values: Vec<f64>,
}

/// Search payload for `search_similar_patterns`.
#[derive(Debug, Serialize)]
struct SearchRequest {
    vector: Vec<f32>,
    k: usize,
    filter: Value,
    include_metadata: bool,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    matches: Vec<SearchMatch>,
}

/// HTTP implementation of the core `VectorStore` trait.
#[derive(Clone)]
pub struct HttpVectorStore {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpVectorStore {
    /// Build the adapter from configuration.
    ///
    /// The bearer token, when configured, is attached to every request by
    /// the underlying client.
    pub fn new(config: &VectorStoreConfig) -> StoreResult<Self> {
        let timeout = Duration::from_millis(config.timeout_ms);
        let mut headers = reqwest::header::HeaderMap::new();
        if let Some(api_key) = &config.api_key {
            let value = reqwest::header::HeaderValue::from_str(&format!("Bearer {api_key}"))
                .map_err(|e| StoreError::Serialization(e.to_string()))?;
            headers.insert(reqwest::header::AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn map_error(&self, error: reqwest::Error) -> StoreError {
        if error.is_timeout() {
            StoreError::Timeout {
                elapsed_ms: self.timeout.as_millis() as u64,
            }
        } else if error.is_connect() {
            StoreError::Connection(error.to_string())
        } else {
            StoreError::Serialization(error.to_string())
        }
    }

    async fn post_json<T: Serialize>(&self, path: &str, payload: &T) -> StoreResult<Value> {
        let response = self
            .client
            .post(self.endpoint(path))
            .json(payload)
            .send()
            .await
            .map_err(|e| self.map_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StoreError::Status {
                status: status.as_u16(),
                message,
            });
        }
        response
            .json::<Value>()
            .await
            .map_err(|e| StoreError::Serialization(e.to_string()))
    }

    async fn store_document(&self, document: VectorDocument) -> StoreResult<()> {
        debug!(id = %document.id, kind = ?document.kind, "storing document");
        self.post_json("documents", &document).await.map(|_| ())
    }
}

#[async_trait]
impl VectorStore for HttpVectorStore {
    async fn store_pattern(&self, document: VectorDocument) -> StoreResult<()> {
        self.store_document(document).await
    }

    async fn store_anomaly(&self, document: VectorDocument) -> StoreResult<()> {
        self.store_document(document).await
    }

    async fn store_correlation(&self, document: VectorDocument) -> StoreResult<()> {
        self.store_document(document).await
    }

    async fn get_recent_data(&self, limit: usize) -> StoreResult<Vec<f64>> {
        let request = QueryRequest {
            filter: json!({"type": "raw"}),
            sort: "timestamp_desc",
            limit,
            types: vec!["raw"],
        };
        let value = self.post_json("query", &request).await?;
        let response: QueryResponse =
            serde_json::from_value(value).map_err(|e| StoreError::Serialization(e.to_string()))?;
        let mut samples: Vec<f64> = response
            .documents
            .into_iter()
            .flat_map(|d| d.content.values)
            .collect();
        samples.truncate(limit);
        Ok(samples)
    }

    async fn search_similar_patterns(
        &self,
        vector: Vec<f32>,
        k: usize,
    ) -> StoreResult<Vec<SearchMatch>> {
        let request = SearchRequest {
            vector,
            k,
            filter: json!({"type": "pattern"}),
            include_metadata: true,
        };
        let value = self.post_json("search", &request).await?;
        let response: SearchResponse =
            serde_json::from_value(value).map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(response.matches)
    }

    async fn health_check(&self) -> StoreResult<StoreHealth> {
        let response = self
            .client
            .get(self.endpoint("health"))
            .send()
            .await
            .map_err(|e| self.map_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Unhealthy(format!("status {}", status.as_u16())));
        }
        response
            .json::<StoreHealth>()
            .await
            .map_err(|e| StoreError::Serialization(e.to_string()))
    }
}
