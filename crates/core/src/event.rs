//! The incremental event-stream protocol.
//!
//! Every agent run emits an ordered sequence of [`StreamEvent`]s that the
//! gateway forwards to the caller one per SSE data frame. The wire shape is
//! `{"type": ..., "message": ..., "session_id": ...}`, terminated by a
//! final `end` event. Delivery order must match emission order — there is
//! no out-of-order buffering anywhere in the pipeline.

use serde::{Deserialize, Serialize};

use crate::message::SessionId;
use crate::profile::Profile;

/// One event in a run's output stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamEvent {
    pub session_id: SessionId,

    #[serde(flatten)]
    pub kind: EventKind,
}

/// The payload-carrying kind of a stream event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "message", rename_all = "snake_case")]
pub enum EventKind {
    /// The run has begun processing the query.
    Start(String),

    /// A fragment of reasoning text.
    Thought(String),

    /// A phase transition notice ("Determining next action", ...).
    Status(String),

    /// The resolved action name for this iteration.
    Action(String),

    /// Full-view profiles produced by the current step.
    Users(Vec<Profile>),

    /// The run is suspended, awaiting an answer from the caller.
    ClarificationRequest(String),

    /// A fragment of the final answer text.
    Response(String),

    /// Full-view profiles referenced by the final answer.
    UsersFound(Vec<Profile>),

    /// A recoverable or fatal error description.
    Error(String),

    /// The stream is complete. Always the last event.
    End(String),
}

impl EventKind {
    /// Wire name for this event kind.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Start(_) => "start",
            Self::Thought(_) => "thought",
            Self::Status(_) => "status",
            Self::Action(_) => "action",
            Self::Users(_) => "users",
            Self::ClarificationRequest(_) => "clarification_request",
            Self::Response(_) => "response",
            Self::UsersFound(_) => "users_found",
            Self::Error(_) => "error",
            Self::End(_) => "end",
        }
    }
}

impl StreamEvent {
    pub fn new(session_id: &SessionId, kind: EventKind) -> Self {
        Self {
            session_id: session_id.clone(),
            kind,
        }
    }
}
