//! LLM provider implementations for Talentscout.
//!
//! One concrete backend: any OpenAI-compatible endpoint (OpenAI,
//! OpenRouter, Ollama, vLLM, ...) via [`openai_compat::OpenAiCompatClient`].
//! [`completion::StreamingCompletion`] adapts the raw client to the
//! `TextCompletion` capability the agent consumes, and
//! [`completion::OpenAiEmbedder`] backs the `Embedder` capability used by
//! the vector-index client.

pub mod completion;
pub mod openai_compat;

pub use completion::{OpenAiEmbedder, StreamingCompletion};
pub use openai_compat::OpenAiCompatClient;
