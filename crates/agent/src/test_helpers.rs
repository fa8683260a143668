//! Shared test doubles for agent tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use talentscout_core::action::Namespace;
use talentscout_core::capabilities::{
    GraphStore, ProfileStore, SessionStore, TextCompletion, VectorIndex, VectorMatch,
};
use talentscout_core::error::{RetrievalError, StoreError};
use talentscout_core::message::{Message, SessionId};
use talentscout_core::profile::{Experience, Profile, Skill};
use talentscout_store::InMemoryProfileStore;
use tokio::sync::mpsc;

/// A minimal profile with one experience and one skill.
pub fn sample_profile(user_id: &str) -> Profile {
    Profile {
        user_id: user_id.into(),
        first_name: "Sample".into(),
        last_name: user_id.to_uppercase(),
        email: format!("{user_id}@example.com"),
        pfp_url: None,
        projects: vec![],
        educations: vec![],
        experiences: vec![Experience {
            experience_id: format!("exp-{user_id}"),
            user_id: user_id.into(),
            company_name: "Initech".into(),
            job_title: "Software Engineer".into(),
            location: "Austin".into(),
            experience_description: String::new(),
            start_date: None,
            end_date: None,
        }],
        skills: vec![Skill {
            skill_id: format!("skill-{user_id}"),
            user_id: user_id.into(),
            skill_name: "Rust".into(),
        }],
    }
}

/// A completion backend that replays scripted responses in order.
///
/// Each `stream_chat` call consumes the next response and streams it in
/// small fragments. Once the script is exhausted, calls yield empty
/// streams (mirroring the empty-prompt short-circuit).
pub struct ScriptedCompletion {
    responses: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedCompletion {
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Every prompt this backend has been called with, in order.
    pub fn prompts_seen(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextCompletion for ScriptedCompletion {
    async fn stream_chat(&self, prompt: &str) -> mpsc::Receiver<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        let (tx, rx) = mpsc::channel(16);
        let Some(response) = self.responses.lock().unwrap().pop_front() else {
            return rx;
        };

        tokio::spawn(async move {
            // Stream in small fragments to exercise accumulation.
            let chars: Vec<char> = response.chars().collect();
            for chunk in chars.chunks(8) {
                let fragment: String = chunk.iter().collect();
                if tx.send(fragment).await.is_err() {
                    return;
                }
            }
        });

        rx
    }
}

/// A vector index returning a fixed match list, counting calls.
pub struct ScriptedVectorIndex {
    matches: Vec<VectorMatch>,
    calls: AtomicUsize,
    fail: bool,
}

impl ScriptedVectorIndex {
    pub fn new(matches: Vec<VectorMatch>) -> Self {
        Self {
            matches,
            calls: AtomicUsize::new(0),
            fail: false,
        }
    }

    /// An index whose every query fails with a transport error.
    pub fn failing() -> Self {
        Self {
            matches: vec![],
            calls: AtomicUsize::new(0),
            fail: true,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VectorIndex for ScriptedVectorIndex {
    async fn query(
        &self,
        _query: &str,
        _namespace: Namespace,
        _top_k: usize,
    ) -> Result<Vec<VectorMatch>, RetrievalError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(RetrievalError::Network("index unreachable".into()));
        }
        Ok(self.matches.clone())
    }
}

/// A graph store returning fixed rows.
pub struct ScriptedGraphStore {
    rows: Vec<Value>,
}

impl ScriptedGraphStore {
    pub fn new(rows: Vec<Value>) -> Self {
        Self { rows }
    }
}

#[async_trait]
impl GraphStore for ScriptedGraphStore {
    async fn query(&self, _statement: &str) -> Result<Vec<Value>, RetrievalError> {
        Ok(self.rows.clone())
    }
}

/// A profile store that fails resolution for chosen ids.
pub struct FlakyProfileStore {
    inner: InMemoryProfileStore,
    fail_ids: Vec<String>,
}

impl FlakyProfileStore {
    pub fn new(inner: InMemoryProfileStore, fail_ids: &[&str]) -> Self {
        Self {
            inner,
            fail_ids: fail_ids.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[async_trait]
impl ProfileStore for FlakyProfileStore {
    async fn get_by_id(&self, user_id: &str) -> Result<Option<Profile>, StoreError> {
        if self.fail_ids.iter().any(|id| id == user_id) {
            return Err(StoreError::Connection("connection reset".into()));
        }
        self.inner.get_by_id(user_id).await
    }
}

/// A session store whose history loads always fail.
pub struct BrokenSessionStore;

#[async_trait]
impl SessionStore for BrokenSessionStore {
    async fn load_history(&self, _session_id: &SessionId) -> Result<Vec<Message>, StoreError> {
        Err(StoreError::Connection("database down".into()))
    }

    async fn append_message(
        &self,
        _session_id: &SessionId,
        _message: &Message,
    ) -> Result<(), StoreError> {
        Err(StoreError::Connection("database down".into()))
    }
}
