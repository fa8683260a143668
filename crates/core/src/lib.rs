//! Core domain types and capability traits for Talentscout.
//!
//! This crate defines the vocabulary the rest of the workspace speaks:
//! sessions and messages, candidate profiles, the closed action set the
//! agent may dispatch, the stream-event protocol, and the capability
//! traits (vector index, graph store, profile store, session store,
//! text completion) that backing services implement.
//!
//! Infrastructure crates implement the traits; the agent crate consumes
//! them. Nothing in here performs I/O.

pub mod action;
pub mod capabilities;
pub mod error;
pub mod event;
pub mod message;
pub mod profile;

pub use action::{Action, Namespace, StructuredFilters};
pub use capabilities::{
    Embedder, GraphStore, ProfileStore, SessionStore, StructuredFilterStore, TextCompletion,
    VectorMatch, VectorIndex,
};
pub use error::{CompletionError, DispatchError, Error, Result, RetrievalError, StoreError};
pub use event::{EventKind, StreamEvent};
pub use message::{Message, Role, SessionId};
pub use profile::{CompactProfile, Education, Experience, Profile, Project, Skill};
