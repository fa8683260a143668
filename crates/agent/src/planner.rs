//! The planner bridge — thin seam between the loop and the LLM.
//!
//! Each operation renders one prompt template and starts one streaming
//! completion. Streams are restartable per call, never resumable
//! mid-stream. The underlying `TextCompletion` is infallible by contract:
//! transport failures arrive as an inline error-marker fragment, which the
//! loop forwards verbatim like any other fragment.

use std::sync::Arc;

use talentscout_core::capabilities::TextCompletion;
use tokio::sync::mpsc;
use tracing::warn;

use crate::prompts::PromptLibrary;

/// Produces reasoning text, action proposals, final answers, and id
/// extractions through a shared completion backend.
#[derive(Clone)]
pub struct Planner {
    completion: Arc<dyn TextCompletion>,
    prompts: Arc<PromptLibrary>,
}

impl Planner {
    pub fn new(completion: Arc<dyn TextCompletion>, prompts: Arc<PromptLibrary>) -> Self {
        Self {
            completion,
            prompts,
        }
    }

    /// Stream free-form reasoning about the next step.
    pub async fn think(&self, query: &str, history: &str) -> mpsc::Receiver<String> {
        self.stream(
            "thought",
            &[("query", query), ("observation_history", history)],
        )
        .await
    }

    /// Stream an `<action>`/`<input>` proposal seeded with the thought.
    pub async fn propose_action(&self, thought: &str) -> mpsc::Receiver<String> {
        self.stream("action", &[("thought", thought)]).await
    }

    /// Stream the final user-facing answer.
    pub async fn final_response(&self, query: &str, history: &str) -> mpsc::Receiver<String> {
        self.stream(
            "response",
            &[("query", query), ("observation_history", history)],
        )
        .await
    }

    /// Stream a constrained id-extraction completion over the final text.
    pub async fn extract_user_ids(&self, history: &str) -> mpsc::Receiver<String> {
        self.stream("format_users", &[("observation_history", history)])
            .await
    }

    async fn stream(&self, template: &str, vars: &[(&str, &str)]) -> mpsc::Receiver<String> {
        match self.prompts.render(template, vars) {
            Ok(prompt) => self.completion.stream_chat(&prompt).await,
            Err(e) => {
                // A missing template is a deployment mistake, not a run
                // failure; degrade to an empty stream.
                warn!(template, error = %e, "Prompt render failed");
                let (_tx, rx) = mpsc::channel(1);
                rx
            }
        }
    }
}
