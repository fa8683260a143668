//! In-memory backends — useful for testing and ephemeral dev sessions.
//!
//! Filter semantics deliberately match the SQL translation in the
//! Postgres backend: substring, case-insensitive for location /
//! company_name / job_title against experiences; exact, case-insensitive
//! for skill against skills.

use std::collections::HashMap;

use async_trait::async_trait;
use talentscout_core::action::StructuredFilters;
use talentscout_core::capabilities::{ProfileStore, SessionStore, StructuredFilterStore};
use talentscout_core::error::StoreError;
use talentscout_core::message::{Message, SessionId};
use talentscout_core::profile::Profile;
use tokio::sync::RwLock;

/// Profiles held in a HashMap keyed by user id.
#[derive(Default)]
pub struct InMemoryProfileStore {
    profiles: RwLock<HashMap<String, Profile>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a profile.
    pub async fn insert(&self, profile: Profile) {
        self.profiles
            .write()
            .await
            .insert(profile.user_id.clone(), profile);
    }

    fn matches(profile: &Profile, filters: &StructuredFilters) -> bool {
        if let Some(location) = &filters.location {
            let needle = location.to_lowercase();
            if !profile
                .experiences
                .iter()
                .any(|e| e.location.to_lowercase().contains(&needle))
            {
                return false;
            }
        }

        if let Some(company) = &filters.company_name {
            let needle = company.to_lowercase();
            if !profile
                .experiences
                .iter()
                .any(|e| e.company_name.to_lowercase().contains(&needle))
            {
                return false;
            }
        }

        if let Some(title) = &filters.job_title {
            let needle = title.to_lowercase();
            if !profile
                .experiences
                .iter()
                .any(|e| e.job_title.to_lowercase().contains(&needle))
            {
                return false;
            }
        }

        if let Some(skill) = &filters.skill {
            let needle = skill.to_lowercase();
            if !profile
                .skills
                .iter()
                .any(|s| s.skill_name.to_lowercase() == needle)
            {
                return false;
            }
        }

        true
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn get_by_id(&self, user_id: &str) -> Result<Option<Profile>, StoreError> {
        Ok(self.profiles.read().await.get(user_id).cloned())
    }
}

#[async_trait]
impl StructuredFilterStore for InMemoryProfileStore {
    async fn filter_ids(
        &self,
        filters: &StructuredFilters,
        id_scope: &[String],
    ) -> Result<Vec<String>, StoreError> {
        let profiles = self.profiles.read().await;
        let mut seen = std::collections::HashSet::new();

        Ok(id_scope
            .iter()
            .filter(|id| seen.insert(id.as_str().to_string()))
            .filter(|id| {
                profiles
                    .get(id.as_str())
                    .is_some_and(|p| Self::matches(p, filters))
            })
            .cloned()
            .collect())
    }
}

/// Session logs held in a HashMap keyed by session id.
#[derive(Default)]
pub struct InMemorySessionStore {
    logs: RwLock<HashMap<String, Vec<Message>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load_history(&self, session_id: &SessionId) -> Result<Vec<Message>, StoreError> {
        Ok(self
            .logs
            .read()
            .await
            .get(&session_id.0)
            .cloned()
            .unwrap_or_default())
    }

    async fn append_message(
        &self,
        session_id: &SessionId,
        message: &Message,
    ) -> Result<(), StoreError> {
        self.logs
            .write()
            .await
            .entry(session_id.0.clone())
            .or_default()
            .push(message.clone());
        Ok(())
    }
}
