//! HTTP vector-index client.
//!
//! Speaks the common `/query` REST shape: the query text is embedded via
//! the injected [`Embedder`], then posted as `{namespace, vector, topK,
//! includeMetadata}`. Matches whose metadata lacks a `user_id` cannot be
//! resolved to a profile and are skipped with a warning.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use talentscout_core::action::Namespace;
use talentscout_core::capabilities::{Embedder, VectorIndex, VectorMatch};
use talentscout_core::error::RetrievalError;
use tracing::{debug, warn};

/// A vector index reachable over HTTP.
pub struct HttpVectorIndex {
    base_url: String,
    api_key: Option<String>,
    embedder: Arc<dyn Embedder>,
    client: reqwest::Client,
}

impl HttpVectorIndex {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        embedder: Arc<dyn Embedder>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            embedder,
            client,
        }
    }
}

#[async_trait]
impl VectorIndex for HttpVectorIndex {
    async fn query(
        &self,
        query: &str,
        namespace: Namespace,
        top_k: usize,
    ) -> Result<Vec<VectorMatch>, RetrievalError> {
        let vector = self.embedder.embed(query).await?;

        let url = format!("{}/query", self.base_url);
        let body = serde_json::json!({
            "namespace": namespace.as_str(),
            "vector": vector,
            "topK": top_k,
            "includeMetadata": true,
            "includeValues": false,
        });

        debug!(%namespace, top_k, "Querying vector index");

        let mut request = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.header("Api-Key", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| RetrievalError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Vector index returned error");
            return Err(RetrievalError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let api_resp: QueryResponse = response
            .json()
            .await
            .map_err(|e| RetrievalError::BadResponse(format!("query response: {e}")))?;

        let matches = api_resp
            .matches
            .into_iter()
            .filter_map(|m| {
                let metadata = m.metadata.unwrap_or_default();
                match metadata.user_id {
                    Some(user_id) => Some(VectorMatch {
                        id: m.id,
                        score: m.score,
                        user_id,
                        text: metadata.text,
                    }),
                    None => {
                        warn!(match_id = %m.id, "Vector match missing user_id metadata, skipping");
                        None
                    }
                }
            })
            .collect();

        Ok(matches)
    }
}

// --- API wire types ---

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<ApiMatch>,
}

#[derive(Deserialize)]
struct ApiMatch {
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Option<ApiMetadata>,
}

#[derive(Deserialize, Default)]
struct ApiMetadata {
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    text: Option<String>,
}
