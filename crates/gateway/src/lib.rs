//! HTTP API gateway for Talentscout.
//!
//! Exposes the search agent over REST: a health check and the streaming
//! `/search` endpoint. Built on Axum.
//!
//! All backing clients (database pool, vector index, LLM, optional graph
//! store) are constructed exactly once in [`start`] and injected into the
//! agent — the per-request path never builds infrastructure.

pub mod search;

use std::sync::Arc;

use axum::{Router, response::Json, routing::{get, post}};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tracing::info;

use talentscout_agent::{Dispatcher, Planner, ProfileResolver, PromptLibrary, SearchAgent};
use talentscout_providers::{OpenAiCompatClient, OpenAiEmbedder, StreamingCompletion};
use talentscout_retrieval::{HttpGraphStore, HttpVectorIndex};
use talentscout_store::{PgProfileStore, PgSessionStore};

/// Shared application state for the gateway.
pub struct GatewayState {
    pub agent: SearchAgent,
}

pub type SharedState = Arc<GatewayState>;

/// Build the Axum router with all gateway routes.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/search", post(search::search_handler))
        .layer(CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the gateway HTTP server.
///
/// Builds every backing client once and hands them to the agent.
pub async fn start(
    config: talentscout_config::AppConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    // === LLM ===
    let api_key = config.llm.api_key.clone().unwrap_or_else(|| {
        tracing::warn!("No LLM API key configured — completions will fail");
        String::new()
    });
    let llm_client = Arc::new(OpenAiCompatClient::new(
        "openai",
        &config.llm.base_url,
        api_key,
    ));
    let completion = Arc::new(StreamingCompletion::new(
        llm_client.clone(),
        &config.llm.model,
        config.llm.temperature,
    ));
    let embedder = Arc::new(OpenAiEmbedder::new(
        llm_client,
        &config.llm.embedding_model,
    ));

    // === Stores ===
    let pool =
        talentscout_store::postgres::connect(&config.database.url, config.database.max_connections)
            .await?;
    let profile_store = Arc::new(PgProfileStore::new(pool.clone()));
    let session_store = Arc::new(PgSessionStore::new(pool).await?);

    // === Retrieval ===
    let vector_index = Arc::new(HttpVectorIndex::new(
        &config.vector_index.base_url,
        config.vector_index.api_key.clone(),
        embedder,
    ));

    // === Prompts ===
    let prompts = match &config.agent.prompt_file {
        Some(path) => Arc::new(PromptLibrary::with_overrides(std::path::Path::new(path))?),
        None => Arc::new(PromptLibrary::builtin()),
    };

    // === Agent ===
    let planner = Planner::new(completion, prompts);
    let resolver = ProfileResolver::new(profile_store.clone());
    let mut dispatcher = Dispatcher::new(vector_index, profile_store, resolver.clone());
    if let Some(graph) = &config.graph {
        dispatcher = dispatcher.with_graph(Arc::new(HttpGraphStore::new(
            &graph.url,
            &graph.username,
            &graph.password,
            &graph.database,
        )));
        info!("Graph store attached");
    }
    let agent = SearchAgent::new(planner, dispatcher, resolver, session_store)
        .with_max_iterations(config.agent.max_iterations);

    let state = Arc::new(GatewayState { agent });
    let app = build_router(state);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
