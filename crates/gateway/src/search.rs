//! The streaming search endpoint.
//!
//! `POST /search` runs one agent turn and streams its events over SSE,
//! one JSON object per data frame, flushed incrementally. The session id
//! comes from the `X-Session-ID` request header when present; otherwise a
//! fresh one is created. Either way it is echoed back in the response
//! header so subsequent turns reuse the same conversation state.

use std::convert::Infallible;

use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue};
use axum::response::sse::{Event as SseEvent, Sse};
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tracing::info;

use talentscout_core::message::SessionId;

use crate::SharedState;

pub const SESSION_HEADER: &str = "X-Session-ID";

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

/// `POST /search` — stream agent events for one conversational turn.
pub async fn search_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(payload): Json<QueryRequest>,
) -> Response {
    let (session_id, new_session) = match headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
    {
        Some(id) => (SessionId::from(id.trim()), false),
        None => (SessionId::new(), true),
    };

    info!(
        session = %session_id,
        new_session,
        query_len = payload.query.len(),
        "Search request received"
    );

    let rx = state.agent.run(&payload.query, &session_id);

    let stream = ReceiverStream::new(rx).map(|event| {
        let event_type = event.kind.event_type();
        let data = serde_json::to_string(&event).unwrap_or_else(|e| {
            format!(r#"{{"type":"error","message":"Failed to serialize event: {e}"}}"#)
        });
        Ok::<_, Infallible>(SseEvent::default().event(event_type).data(data))
    });

    let mut response = Sse::new(stream).into_response();
    if let Ok(value) = HeaderValue::from_str(&session_id.0) {
        response.headers_mut().insert(SESSION_HEADER, value);
    }
    response
}
