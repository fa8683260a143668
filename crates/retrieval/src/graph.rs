//! HTTP graph-store client.
//!
//! Targets the Neo4j transactional HTTP API: one statement per call,
//! committed immediately. Result rows come back as JSON objects keyed by
//! column name. Only the optional `search_graph` action consumes this.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use talentscout_core::capabilities::GraphStore;
use talentscout_core::error::RetrievalError;
use tracing::{debug, warn};

/// A graph database reachable over the transactional HTTP API.
pub struct HttpGraphStore {
    base_url: String,
    username: String,
    password: String,
    database: String,
    client: reqwest::Client,
}

impl HttpGraphStore {
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            username: username.into(),
            password: password.into(),
            database: database.into(),
            client,
        }
    }

    /// Zip one result's columns with a row into a JSON object.
    fn row_to_object(columns: &[String], row: Vec<Value>) -> Value {
        let map: serde_json::Map<String, Value> = columns
            .iter()
            .cloned()
            .zip(row.into_iter())
            .collect();
        Value::Object(map)
    }
}

#[async_trait]
impl GraphStore for HttpGraphStore {
    async fn query(&self, statement: &str) -> Result<Vec<Value>, RetrievalError> {
        let url = format!("{}/db/{}/tx/commit", self.base_url, self.database);
        let body = serde_json::json!({
            "statements": [{ "statement": statement }]
        });

        debug!("Running graph query");

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.username, Some(&self.password))
            .json(&body)
            .send()
            .await
            .map_err(|e| RetrievalError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Graph store returned error");
            return Err(RetrievalError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let api_resp: TxResponse = response
            .json()
            .await
            .map_err(|e| RetrievalError::BadResponse(format!("tx response: {e}")))?;

        if let Some(err) = api_resp.errors.first() {
            return Err(RetrievalError::BadResponse(format!(
                "{}: {}",
                err.code, err.message
            )));
        }

        let rows = api_resp
            .results
            .into_iter()
            .flat_map(|result| {
                let columns = result.columns;
                result
                    .data
                    .into_iter()
                    .map(move |d| Self::row_to_object(&columns, d.row))
            })
            .collect();

        Ok(rows)
    }
}

// --- API wire types ---

#[derive(Deserialize)]
struct TxResponse {
    #[serde(default)]
    results: Vec<TxResult>,
    #[serde(default)]
    errors: Vec<TxError>,
}

#[derive(Deserialize)]
struct TxResult {
    #[serde(default)]
    columns: Vec<String>,
    #[serde(default)]
    data: Vec<TxRow>,
}

#[derive(Deserialize)]
struct TxRow {
    #[serde(default)]
    row: Vec<Value>,
}

#[derive(Deserialize)]
struct TxError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}
