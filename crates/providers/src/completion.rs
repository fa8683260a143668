//! Capability adapters over the raw OpenAI-compatible client.
//!
//! [`StreamingCompletion`] implements the `TextCompletion` contract the
//! agent consumes: its stream never fails — transport errors become one
//! final inline error-marker fragment, and empty prompts short-circuit to
//! an empty stream without touching the network.

use std::sync::Arc;

use async_trait::async_trait;
use talentscout_core::capabilities::{Embedder, TextCompletion};
use talentscout_core::error::RetrievalError;
use tokio::sync::mpsc;
use tracing::warn;

use crate::openai_compat::OpenAiCompatClient;

/// Prefix of the inline marker emitted when the LLM transport fails.
///
/// Callers surface fragments carrying this marker verbatim instead of
/// parsing them as content.
pub const ERROR_MARKER: &str = "Error communicating with language model";

/// Streaming completion backed by an OpenAI-compatible endpoint.
pub struct StreamingCompletion {
    client: Arc<OpenAiCompatClient>,
    model: String,
    temperature: f32,
}

impl StreamingCompletion {
    pub fn new(client: Arc<OpenAiCompatClient>, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            client,
            model: model.into(),
            temperature,
        }
    }
}

#[async_trait]
impl TextCompletion for StreamingCompletion {
    async fn stream_chat(&self, prompt: &str) -> mpsc::Receiver<String> {
        let (tx, rx) = mpsc::channel(64);

        if prompt.trim().is_empty() {
            warn!("Completion requested with empty prompt, skipping call");
            return rx; // sender dropped → empty, closed stream
        }

        let mut raw_rx = match self
            .client
            .stream_chat(&self.model, prompt, self.temperature)
            .await
        {
            Ok(raw_rx) => raw_rx,
            Err(e) => {
                warn!(error = %e, "LLM call failed before streaming");
                let _ = tx.send(format!("{ERROR_MARKER}: {e}")).await;
                return rx;
            }
        };

        tokio::spawn(async move {
            while let Some(item) = raw_rx.recv().await {
                match item {
                    Ok(fragment) => {
                        if tx.send(fragment).await.is_err() {
                            return; // receiver dropped
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "LLM stream interrupted");
                        let _ = tx.send(format!("{ERROR_MARKER}: {e}")).await;
                        return;
                    }
                }
            }
        });

        rx
    }
}

/// Embedder backed by the provider's `/embeddings` endpoint.
pub struct OpenAiEmbedder {
    client: Arc<OpenAiCompatClient>,
    model: String,
}

impl OpenAiEmbedder {
    pub fn new(client: Arc<OpenAiCompatClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, RetrievalError> {
        self.client.embed(&self.model, text).await
    }
}
