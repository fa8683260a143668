//! Concurrent profile resolution.
//!
//! `resolve_many` fans one resolution task out per id and aggregates
//! whatever succeeded: both not-found and per-id transport failures are
//! dropped from the result (each logged with its id), never raised. The
//! concurrency bound is the size of the id set — the backing store's pool
//! is the actual throttle.

use std::sync::Arc;

use futures::future::join_all;
use talentscout_core::capabilities::ProfileStore;
use talentscout_core::error::StoreError;
use talentscout_core::profile::Profile;
use tracing::{debug, warn};

/// Resolves candidate ids into full profiles.
#[derive(Clone)]
pub struct ProfileResolver {
    store: Arc<dyn ProfileStore>,
}

impl ProfileResolver {
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self { store }
    }

    /// Resolve a single id. `None` when unknown.
    pub async fn resolve(&self, user_id: &str) -> Result<Option<Profile>, StoreError> {
        self.store.get_by_id(user_id).await
    }

    /// Resolve a set of ids concurrently, keeping only the successes.
    ///
    /// Completion order does not affect the output: results are aggregated
    /// in the order of `user_ids`.
    pub async fn resolve_many(&self, user_ids: &[String]) -> Vec<Profile> {
        let fetches = user_ids.iter().map(|id| {
            let store = self.store.clone();
            async move { (id, store.get_by_id(id).await) }
        });

        join_all(fetches)
            .await
            .into_iter()
            .filter_map(|(id, result)| match result {
                Ok(Some(profile)) => Some(profile),
                Ok(None) => {
                    debug!(user_id = %id, "Profile not found, dropping from batch");
                    None
                }
                Err(e) => {
                    warn!(user_id = %id, error = %e, "Profile resolution failed, dropping from batch");
                    None
                }
            })
            .collect()
    }
}
