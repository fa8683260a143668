//! Action dispatch — validate a proposed action and execute it.
//!
//! One branch per action in the closed vocabulary. Validation happens
//! before any store call; execution failures propagate so the loop can
//! absorb them per its error policy. Unknown actions log a warning and
//! return an empty result, never an error.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;
use talentscout_core::action::Action;
use talentscout_core::capabilities::{GraphStore, StructuredFilterStore, VectorIndex};
use talentscout_core::error::DispatchError;
use talentscout_core::profile::Profile;
use tracing::{debug, info, warn};

use crate::resolver::ProfileResolver;
use crate::working_memory::WorkingMemory;

/// Executes validated actions against the retrieval capabilities.
#[derive(Clone)]
pub struct Dispatcher {
    vector_index: Arc<dyn VectorIndex>,
    filter_store: Arc<dyn StructuredFilterStore>,
    resolver: ProfileResolver,
    graph: Option<Arc<dyn GraphStore>>,
}

impl Dispatcher {
    pub fn new(
        vector_index: Arc<dyn VectorIndex>,
        filter_store: Arc<dyn StructuredFilterStore>,
        resolver: ProfileResolver,
    ) -> Self {
        Self {
            vector_index,
            filter_store,
            resolver,
            graph: None,
        }
    }

    /// Attach the optional graph store, enabling the `search_graph` action.
    pub fn with_graph(mut self, graph: Arc<dyn GraphStore>) -> Self {
        self.graph = Some(graph);
        self
    }

    /// Resolve and execute one proposed action.
    ///
    /// Returns the full-view profiles the action produced. Side effects on
    /// `memory` are limited to the clarification flags.
    pub async fn execute(
        &self,
        name: &str,
        input: &Value,
        memory: &mut WorkingMemory,
    ) -> Result<Vec<Profile>, DispatchError> {
        let action = Action::resolve(name, input)?;
        debug!(action = action.name(), "Dispatching action");

        match action {
            Action::SearchVectorDb {
                query,
                namespace,
                top_k,
            } => {
                let matches = self.vector_index.query(&query, namespace, top_k).await?;
                let user_ids =
                    dedup_preserving_order(matches.into_iter().map(|m| m.user_id));
                debug!(unique = user_ids.len(), "Vector search produced candidate ids");

                if user_ids.is_empty() {
                    return Ok(vec![]);
                }
                Ok(self.resolver.resolve_many(&user_ids).await)
            }

            Action::FetchProfile { user_id } => {
                // Not-found is an empty result, not an error.
                match self.resolver.resolve(&user_id).await? {
                    Some(profile) => Ok(vec![profile]),
                    None => {
                        debug!(%user_id, "fetch_profile: no such profile");
                        Ok(vec![])
                    }
                }
            }

            Action::FilterStructured { filters, user_ids } => {
                if user_ids.is_empty() {
                    warn!("filter_structured called without user_ids, returning empty");
                    return Ok(vec![]);
                }

                let scope = dedup_preserving_order(user_ids.into_iter());

                if filters.is_empty() {
                    // No recognized filters — behave as a bulk resolve.
                    return Ok(self.resolver.resolve_many(&scope).await);
                }

                let filtered = self.filter_store.filter_ids(&filters, &scope).await?;
                let filtered = dedup_preserving_order(filtered.into_iter());
                debug!(matched = filtered.len(), "Structured filter narrowed candidates");
                Ok(self.resolver.resolve_many(&filtered).await)
            }

            Action::SearchGraph { query } => {
                let Some(graph) = &self.graph else {
                    warn!("search_graph requested but no graph store is configured");
                    return Ok(vec![]);
                };

                let rows = graph.query(&query).await?;
                let user_ids = dedup_preserving_order(rows.iter().filter_map(|row| {
                    row.get("user_id")
                        .and_then(Value::as_str)
                        .map(String::from)
                }));
                debug!(unique = user_ids.len(), "Graph query produced candidate ids");
                Ok(self.resolver.resolve_many(&user_ids).await)
            }

            Action::RequestClarification { question } => {
                info!(%question, "Clarification requested");
                memory.request_clarification(&question);
                Ok(vec![])
            }

            Action::Finish => Ok(vec![]),

            Action::Unknown { name } => {
                warn!(action = %name, "Unknown action, returning empty result");
                Ok(vec![])
            }
        }
    }
}

/// Drop duplicate ids while keeping first-occurrence order.
fn dedup_preserving_order(ids: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(id.clone())).collect()
}
