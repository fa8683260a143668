//! Capability traits the agent consumes.
//!
//! The surrounding application constructs long-lived client handles at
//! startup and injects them into the agent at construction time — the core
//! never builds or tears down infrastructure itself, and never reaches for
//! process-wide globals. Every trait here is object-safe and `Send + Sync`
//! so implementations can be shared as `Arc<dyn ...>` across sessions.

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::action::{Namespace, StructuredFilters};
use crate::error::{RetrievalError, StoreError};
use crate::message::{Message, SessionId};
use crate::profile::Profile;

/// A scored candidate returned by the vector index.
#[derive(Debug, Clone)]
pub struct VectorMatch {
    /// Vector-record id within the index.
    pub id: String,
    /// Similarity score.
    pub score: f32,
    /// The profile this vector belongs to.
    pub user_id: String,
    /// Source text the vector was built from, when the index stores it.
    pub text: Option<String>,
}

/// Semantic search over the vector index.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Query one namespace for the `top_k` closest records.
    async fn query(
        &self,
        query: &str,
        namespace: Namespace,
        top_k: usize,
    ) -> Result<Vec<VectorMatch>, RetrievalError>;
}

/// Read-only query surface over the graph store.
///
/// Consumed only by the optional `search_graph` extended action; the
/// minimal loop never touches it.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Run a cypher-like statement, returning one JSON object per row.
    async fn query(&self, statement: &str) -> Result<Vec<Value>, RetrievalError>;
}

/// Profile lookup with eagerly loaded sub-record collections.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Load a full profile. `None` when the id is unknown — not an error.
    async fn get_by_id(&self, user_id: &str) -> Result<Option<Profile>, StoreError>;
}

/// Structured sub-record filtering over a bounded id set.
#[async_trait]
pub trait StructuredFilterStore: Send + Sync {
    /// Return the subset of `id_scope` whose sub-records satisfy every
    /// present filter. The result is deduplicated.
    async fn filter_ids(
        &self,
        filters: &StructuredFilters,
        id_scope: &[String],
    ) -> Result<Vec<String>, StoreError>;
}

/// Append-only message log keyed by session id.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Ordered history for a session. Unknown session → empty list.
    async fn load_history(&self, session_id: &SessionId) -> Result<Vec<Message>, StoreError>;

    /// Atomically append one message. Either the message is durably
    /// recorded or the call fails — partial writes are not acceptable.
    async fn append_message(
        &self,
        session_id: &SessionId,
        message: &Message,
    ) -> Result<(), StoreError>;
}

/// A streaming text-completion backend.
#[async_trait]
pub trait TextCompletion: Send + Sync {
    /// Stream completion fragments for a single-message prompt.
    ///
    /// This call is infallible by contract: transport failures yield one
    /// final fragment containing a human-readable error marker instead of
    /// an `Err`, and callers surface such fragments verbatim. An empty
    /// prompt short-circuits to an empty stream without a network call.
    async fn stream_chat(&self, prompt: &str) -> mpsc::Receiver<String>;
}

/// Text embedding for vector-index queries.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, RetrievalError>;
}
