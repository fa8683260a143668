//! The agent loop — owns per-run state and drives the think→act cycle.
//!
//! `SearchAgent::run` returns a receiver of ordered [`StreamEvent`]s fed by
//! a background task. The loop's error policy, from strictest to softest:
//!
//! - session-history load (and the initial user-message append) failing is
//!   fatal: `error` + `end`, the run terminates;
//! - invalid action parameters emit `error` and force `finish` for that
//!   iteration;
//! - store/retrieval failures during execution emit `error`, count as an
//!   empty result, and the loop continues;
//! - LLM transport failures arrive as inline marker fragments and are
//!   forwarded like any other fragment.
//!
//! Whatever happens, a stream that produced `start` is closed by exactly
//! one `end`. A clarification suspends the run: the next turn with the
//! same session id starts fresh from the persisted log.

use std::sync::Arc;

use serde_json::Value;
use talentscout_core::action::DEFAULT_CLARIFICATION_QUESTION;
use talentscout_core::capabilities::SessionStore;
use talentscout_core::error::DispatchError;
use talentscout_core::event::{EventKind, StreamEvent};
use talentscout_core::message::{Message, SessionId};
use talentscout_core::profile::Profile;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::dispatcher::Dispatcher;
use crate::planner::Planner;
use crate::resolver::ProfileResolver;
use crate::tag_parser;
use crate::working_memory::{Step, WorkingMemory};

const FINISH: &str = "finish";

/// The conversational search agent.
///
/// All capabilities are injected at construction; the agent owns no
/// infrastructure and holds no cross-session state, so one instance serves
/// any number of concurrent sessions.
#[derive(Clone)]
pub struct SearchAgent {
    planner: Planner,
    dispatcher: Dispatcher,
    resolver: ProfileResolver,
    sessions: Arc<dyn SessionStore>,
    max_iterations: u32,
}

impl SearchAgent {
    pub fn new(
        planner: Planner,
        dispatcher: Dispatcher,
        resolver: ProfileResolver,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            planner,
            dispatcher,
            resolver,
            sessions,
            max_iterations: 10,
        }
    }

    /// Set the maximum number of reasoning iterations.
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max;
        self
    }

    /// Run one query against a session, streaming progress events.
    ///
    /// The returned receiver yields events in emission order and closes
    /// after the terminal `end` event. Dropping the receiver cancels the
    /// run cooperatively at its next emission point.
    pub fn run(&self, query: &str, session_id: &SessionId) -> mpsc::Receiver<StreamEvent> {
        let (tx, rx) = mpsc::channel(128);
        let agent = self.clone();
        let query = query.to_string();
        let session_id = session_id.clone();

        tokio::spawn(async move {
            agent.run_inner(query, session_id, tx).await;
        });

        rx
    }

    async fn run_inner(&self, query: String, session_id: SessionId, tx: mpsc::Sender<StreamEvent>) {
        // ── Session history (failure here is fatal to the run) ──
        let conversation = match self.sessions.load_history(&session_id).await {
            Ok(history) => history,
            Err(e) => {
                error!(session = %session_id, error = %e, "Failed to load session history");
                emit(
                    &tx,
                    &session_id,
                    EventKind::Error(format!("Failed to load session history: {e}")),
                )
                .await;
                emit(
                    &tx,
                    &session_id,
                    EventKind::End("Task ended due to an error.".into()),
                )
                .await;
                return;
            }
        };

        // Persist the user's utterance before any reasoning begins, so a
        // crash mid-run never loses it.
        if let Err(e) = self
            .sessions
            .append_message(&session_id, &Message::user(&query))
            .await
        {
            error!(session = %session_id, error = %e, "Failed to persist user message");
            emit(
                &tx,
                &session_id,
                EventKind::Error(format!("Failed to record your message: {e}")),
            )
            .await;
            emit(
                &tx,
                &session_id,
                EventKind::End("Task ended due to an error.".into()),
            )
            .await;
            return;
        }

        let mut memory = WorkingMemory::new(conversation, &query);
        info!(
            session = %session_id,
            history_len = memory.conversation.len(),
            %query,
            "Run starting"
        );

        if !emit(
            &tx,
            &session_id,
            EventKind::Start("Starting to process your query".into()),
        )
        .await
        {
            return;
        }

        let mut iteration = 0u32;
        loop {
            iteration += 1;
            if iteration > self.max_iterations {
                warn!(max = self.max_iterations, "Maximum iterations reached, forcing finish");
                break;
            }

            // ── Thought ──
            let history = memory.render_history();
            let mut thought = String::new();
            let mut thought_rx = self.planner.think(&memory.query, &history).await;
            while let Some(fragment) = thought_rx.recv().await {
                thought.push_str(&fragment);
                if !emit(&tx, &session_id, EventKind::Thought(fragment)).await {
                    return;
                }
            }
            debug!(iteration, thought_len = thought.len(), "Thought complete");

            // ── Action proposal ──
            if !emit(
                &tx,
                &session_id,
                EventKind::Status("Determining next action".into()),
            )
            .await
            {
                return;
            }

            let mut raw_action = String::new();
            let mut action_rx = self.planner.propose_action(&thought).await;
            while let Some(fragment) = action_rx.recv().await {
                raw_action.push_str(&fragment);
            }

            // Repair unclosed tags before extraction — truncated streams
            // are an expected failure mode, not a validation error.
            let repaired = tag_parser::ensure_closed(&raw_action, "action");
            let repaired = tag_parser::ensure_closed(&repaired, "input");
            let mut action_name = tag_parser::clean_action_name(
                &tag_parser::extract(&repaired, "action").unwrap_or_default(),
            );
            let input_text = tag_parser::extract(&repaired, "input").unwrap_or_default();

            // ── Input parsing ──
            let mut action_input = Value::Object(Default::default());
            if action_name != FINISH && !input_text.is_empty() {
                match serde_json::from_str::<Value>(&input_text) {
                    Ok(parsed) => action_input = parsed,
                    Err(_) => {
                        warn!(input = %input_text, "Failed to parse action input");
                        if !emit(
                            &tx,
                            &session_id,
                            EventKind::Error(format!(
                                "Invalid action input format received: {input_text}"
                            )),
                        )
                        .await
                        {
                            return;
                        }
                        action_name = FINISH.into();
                        action_input = Value::Object(Default::default());
                    }
                }
            }

            info!(action = %action_name, "Action resolved");
            if !emit(&tx, &session_id, EventKind::Action(action_name.clone())).await {
                return;
            }

            // Flags are transient per iteration.
            memory.reset_clarification();

            if !emit(
                &tx,
                &session_id,
                EventKind::Status(format!("Executing action: {action_name}")),
            )
            .await
            {
                return;
            }

            // ── Execution ──
            let mut result_users: Vec<Profile> = Vec::new();
            if action_name != FINISH {
                match self
                    .dispatcher
                    .execute(&action_name, &action_input, &mut memory)
                    .await
                {
                    Ok(users) => {
                        debug!(count = users.len(), "Action produced results");
                        result_users = users;
                        if !result_users.is_empty()
                            && !memory.needs_clarification
                            && !emit(
                                &tx,
                                &session_id,
                                EventKind::Users(result_users.clone()),
                            )
                            .await
                        {
                            return;
                        }
                    }
                    Err(DispatchError::InvalidArgument(msg)) => {
                        warn!(action = %action_name, %msg, "Action validation failed");
                        if !emit(
                            &tx,
                            &session_id,
                            EventKind::Error(format!("Action failed: {msg}")),
                        )
                        .await
                        {
                            return;
                        }
                        // Bad parameters force finish for this iteration.
                        action_name = FINISH.into();
                    }
                    Err(e) => {
                        warn!(action = %action_name, error = %e, "Action execution failed");
                        if !emit(
                            &tx,
                            &session_id,
                            EventKind::Error(format!("Action failed: {e}")),
                        )
                        .await
                        {
                            return;
                        }
                        // Empty result; the loop continues.
                    }
                }
            }

            // ── Clarification check ──
            if memory.needs_clarification {
                let question = memory
                    .clarification_question
                    .clone()
                    .unwrap_or_else(|| DEFAULT_CLARIFICATION_QUESTION.to_string());

                let clarification_input = if action_name == "request_clarification" {
                    action_input.clone()
                } else {
                    serde_json::json!({ "question": question })
                };
                memory.push_step(Step {
                    thought: thought.clone(),
                    action: "request_clarification".into(),
                    action_input: clarification_input,
                    result: vec![],
                });

                info!(session = %session_id, %question, "Run paused for clarification");
                emit(
                    &tx,
                    &session_id,
                    EventKind::ClarificationRequest(question),
                )
                .await;
                emit(
                    &tx,
                    &session_id,
                    EventKind::End("Waiting for user clarification.".into()),
                )
                .await;
                return;
            }

            // ── Record the step ──
            let compact = result_users.iter().map(|u| u.for_llm()).collect();
            memory.push_step(Step {
                thought,
                action: action_name,
                action_input,
                result: compact,
            });

            // ── Completion check ──
            if memory.last_action_is_finish() {
                break;
            }
        }

        self.finish_run(&session_id, &memory, &tx).await;
    }

    /// The finishing flow: stream the final answer, extract the referenced
    /// user ids, resolve them, persist the assistant message, close.
    async fn finish_run(
        &self,
        session_id: &SessionId,
        memory: &WorkingMemory,
        tx: &mpsc::Sender<StreamEvent>,
    ) {
        let history = memory.render_history();

        let mut final_response = String::new();
        let mut response_rx = self.planner.final_response(&memory.query, &history).await;
        while let Some(fragment) = response_rx.recv().await {
            final_response.push_str(&fragment);
            if !emit(tx, session_id, EventKind::Response(fragment)).await {
                return;
            }
        }

        // Constrained extraction over history + final text.
        let extraction_context = format!("{history}{final_response}");
        let mut raw_ids = String::new();
        let mut ids_rx = self.planner.extract_user_ids(&extraction_context).await;
        while let Some(fragment) = ids_rx.recv().await {
            raw_ids.push_str(&fragment);
        }

        let repaired = tag_parser::ensure_closed(&raw_ids, "user_id");
        let user_ids: Vec<String> = tag_parser::extract(&repaired, "user_id")
            .and_then(|text| serde_json::from_str(&text).ok())
            .unwrap_or_else(|| {
                warn!("Could not parse user ids from final extraction");
                vec![]
            });

        let mut seen = std::collections::HashSet::new();
        let unique_ids: Vec<String> = user_ids
            .into_iter()
            .filter(|id| seen.insert(id.clone()))
            .collect();
        let final_users = self.resolver.resolve_many(&unique_ids).await;
        info!(count = final_users.len(), "Final users resolved");

        if !emit(tx, session_id, EventKind::UsersFound(final_users.clone())).await {
            return;
        }

        // Persist the assistant's answer with the resolved profiles
        // embedded, so a later turn can reason over them from the log.
        let profiles_json =
            serde_json::to_string(&final_users).unwrap_or_else(|_| "[]".into());
        let content =
            format!("{final_response}\n<full_profiles>\n{profiles_json}\n</full_profiles>");
        if let Err(e) = self
            .sessions
            .append_message(session_id, &Message::assistant(content))
            .await
        {
            error!(session = %session_id, error = %e, "Failed to persist assistant message");
            if !emit(
                tx,
                session_id,
                EventKind::Error(format!("Failed to record the answer: {e}")),
            )
            .await
            {
                return;
            }
        }

        emit(
            tx,
            session_id,
            EventKind::End("Task completed successfully.".into()),
        )
        .await;
        info!(session = %session_id, "Run finished");
    }
}

/// Send one event; `false` means the caller went away and the run should
/// wind down cooperatively.
async fn emit(tx: &mpsc::Sender<StreamEvent>, session_id: &SessionId, kind: EventKind) -> bool {
    tx.send(StreamEvent::new(session_id, kind)).await.is_ok()
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompts::PromptLibrary;
    use crate::test_helpers::*;
    use talentscout_core::capabilities::{ProfileStore, VectorMatch};
    use talentscout_store::{InMemoryProfileStore, InMemorySessionStore};

    fn vector_match(user_id: &str, score: f32) -> VectorMatch {
        VectorMatch {
            id: format!("vec-{user_id}-{score}"),
            score,
            user_id: user_id.into(),
            text: None,
        }
    }

    struct Harness {
        agent: SearchAgent,
        sessions: Arc<InMemorySessionStore>,
    }

    fn harness(
        responses: Vec<&str>,
        index: ScriptedVectorIndex,
        profiles: Arc<InMemoryProfileStore>,
    ) -> Harness {
        harness_with_resolver_store(responses, index, profiles.clone(), profiles)
    }

    fn harness_with_resolver_store(
        responses: Vec<&str>,
        index: ScriptedVectorIndex,
        filter_store: Arc<InMemoryProfileStore>,
        resolver_store: Arc<dyn ProfileStore>,
    ) -> Harness {
        let completion = Arc::new(ScriptedCompletion::new(
            responses.into_iter().map(String::from).collect(),
        ));
        let planner = Planner::new(completion, Arc::new(PromptLibrary::builtin()));
        let resolver = ProfileResolver::new(resolver_store);
        let dispatcher = Dispatcher::new(Arc::new(index), filter_store, resolver.clone());
        let sessions = Arc::new(InMemorySessionStore::new());

        Harness {
            agent: SearchAgent::new(planner, dispatcher, resolver, sessions.clone()),
            sessions,
        }
    }

    async fn collect(mut rx: mpsc::Receiver<StreamEvent>) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    }

    fn kinds(events: &[StreamEvent]) -> Vec<&'static str> {
        events.iter().map(|e| e.kind.event_type()).collect()
    }

    fn assert_single_terminal_end(events: &[StreamEvent]) {
        let end_count = events
            .iter()
            .filter(|e| matches!(e.kind, EventKind::End(_)))
            .count();
        assert_eq!(end_count, 1, "exactly one end event, got {:?}", kinds(events));
        assert!(
            matches!(events.last().unwrap().kind, EventKind::End(_)),
            "end must be the last event, got {:?}",
            kinds(events)
        );
    }

    const SEARCH_PROPOSAL: &str = "<action>search_vector_db</action>\n<input>{\"query\": \"software engineer\", \"namespace\": \"experience\", \"top_k\": 5}</input>";
    const FINISH_PROPOSAL: &str = "<action>finish</action>\n<input></input>";

    #[tokio::test]
    async fn normal_flow_search_then_finish() {
        let profiles = Arc::new(InMemoryProfileStore::new());
        profiles.insert(sample_profile("u-1")).await;
        profiles.insert(sample_profile("u-2")).await;

        // Gateway returns 3 candidates with one duplicate id.
        let index = ScriptedVectorIndex::new(vec![
            vector_match("u-1", 0.93),
            vector_match("u-2", 0.88),
            vector_match("u-1", 0.71),
        ]);

        let h = harness(
            vec![
                "I should search experiences for software engineers",
                SEARCH_PROPOSAL,
                "Two strong candidates found, time to wrap up",
                FINISH_PROPOSAL,
                "Sample U-1 and Sample U-2 both fit.",
                "<user_id>[\"u-1\", \"u-2\"]</user_id>",
            ],
            index,
            profiles,
        );

        let session = SessionId::new();
        let events = collect(h.agent.run("software engineers at Google", &session)).await;

        assert_single_terminal_end(&events);
        assert!(matches!(events[0].kind, EventKind::Start(_)));

        // Deduplicated profiles in the step's users event.
        let users = events
            .iter()
            .find_map(|e| match &e.kind {
                EventKind::Users(users) => Some(users),
                _ => None,
            })
            .expect("users event expected");
        assert_eq!(users.len(), 2);

        // Action events in order.
        let actions: Vec<&str> = events
            .iter()
            .filter_map(|e| match &e.kind {
                EventKind::Action(name) => Some(name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(actions, vec!["search_vector_db", "finish"]);

        // Response fragments accumulate to the scripted answer.
        let response: String = events
            .iter()
            .filter_map(|e| match &e.kind {
                EventKind::Response(fragment) => Some(fragment.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(response, "Sample U-1 and Sample U-2 both fit.");

        // Final users resolved through the extraction pass.
        let found = events
            .iter()
            .find_map(|e| match &e.kind {
                EventKind::UsersFound(users) => Some(users),
                _ => None,
            })
            .expect("users_found event expected");
        assert_eq!(found.len(), 2);

        // Session log: user message then assistant message with profiles.
        let history = h.sessions.load_history(&session).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].content, "software engineers at Google");
        assert!(history[1].content.contains("<full_profiles>"));
        assert!(history[1].content.contains("u-1"));
    }

    #[tokio::test]
    async fn thought_fragments_are_forwarded_incrementally() {
        let profiles = Arc::new(InMemoryProfileStore::new());
        let h = harness(
            vec![
                "a deliberately longer reasoning text to split",
                FINISH_PROPOSAL,
                "done",
                "<user_id>[]</user_id>",
            ],
            ScriptedVectorIndex::new(vec![]),
            profiles,
        );

        let events = collect(h.agent.run("anything", &SessionId::new())).await;
        let fragments: Vec<&str> = events
            .iter()
            .filter_map(|e| match &e.kind {
                EventKind::Thought(f) => Some(f.as_str()),
                _ => None,
            })
            .collect();
        assert!(fragments.len() > 1, "thought should stream in fragments");
        assert_eq!(
            fragments.concat(),
            "a deliberately longer reasoning text to split"
        );
    }

    #[tokio::test]
    async fn clarification_suspends_the_run() {
        let profiles = Arc::new(InMemoryProfileStore::new());
        let h = harness(
            vec![
                "The request is ambiguous",
                "<action>request_clarification</action>\n<input>{\"question\": \"Which city?\"}</input>",
            ],
            ScriptedVectorIndex::new(vec![]),
            profiles,
        );

        let session = SessionId::new();
        let events = collect(h.agent.run("engineers near me", &session)).await;

        assert_single_terminal_end(&events);
        let question = events
            .iter()
            .find_map(|e| match &e.kind {
                EventKind::ClarificationRequest(q) => Some(q.as_str()),
                _ => None,
            })
            .expect("clarification_request expected");
        assert_eq!(question, "Which city?");

        // No finishing flow ran.
        assert!(!events
            .iter()
            .any(|e| matches!(e.kind, EventKind::Response(_) | EventKind::UsersFound(_))));

        // Only the user's message was persisted — no assistant answer.
        let history = h.sessions.load_history(&session).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].role, talentscout_core::message::Role::User);
    }

    #[tokio::test]
    async fn malformed_input_is_repaired_then_forced_to_finish() {
        let profiles = Arc::new(InMemoryProfileStore::new());
        // <input> opened but never closed, and the JSON inside is invalid.
        let truncated =
            "<action>search_vector_db</action>\n<input>{\"query\": \"engineers\", \"namespace\":";
        let h = harness(
            vec![
                "search it",
                truncated,
                "Could not complete the search.",
                "<user_id>[]</user_id>",
            ],
            ScriptedVectorIndex::new(vec![]),
            profiles,
        );

        let events = collect(h.agent.run("engineers", &SessionId::new())).await;

        assert_single_terminal_end(&events);
        assert!(events.iter().any(|e| matches!(
            &e.kind,
            EventKind::Error(msg) if msg.contains("Invalid action input format")
        )));

        // The forced action is finish, so the run completes with a response.
        let actions: Vec<&str> = events
            .iter()
            .filter_map(|e| match &e.kind {
                EventKind::Action(name) => Some(name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(actions, vec!["finish"]);
        assert!(events.iter().any(|e| matches!(e.kind, EventKind::Response(_))));
    }

    #[tokio::test]
    async fn invalid_namespace_forces_finish_for_the_iteration() {
        let profiles = Arc::new(InMemoryProfileStore::new());
        let bad_namespace = "<action>search_vector_db</action>\n<input>{\"query\": \"x\", \"namespace\": \"hobbies\"}</input>";
        let h = harness(
            vec![
                "search the wrong partition",
                bad_namespace,
                "Nothing to report.",
                "<user_id>[]</user_id>",
            ],
            ScriptedVectorIndex::new(vec![]),
            profiles,
        );

        let events = collect(h.agent.run("engineers", &SessionId::new())).await;

        assert_single_terminal_end(&events);
        assert!(events.iter().any(|e| matches!(
            &e.kind,
            EventKind::Error(msg) if msg.contains("hobbies")
        )));
        // Validation failure ends the run through the finishing flow.
        assert!(events.iter().any(|e| matches!(e.kind, EventKind::Response(_))));
    }

    #[tokio::test]
    async fn store_failure_is_absorbed_and_the_loop_continues() {
        let profiles = Arc::new(InMemoryProfileStore::new());
        let h = harness(
            vec![
                "search first",
                SEARCH_PROPOSAL,
                "that failed, stop here",
                FINISH_PROPOSAL,
                "The index was unavailable.",
                "<user_id>[]</user_id>",
            ],
            ScriptedVectorIndex::failing(),
            profiles,
        );

        let events = collect(h.agent.run("engineers", &SessionId::new())).await;

        assert_single_terminal_end(&events);
        assert!(events.iter().any(|e| matches!(
            &e.kind,
            EventKind::Error(msg) if msg.contains("Action failed")
        )));
        // The run continued into a second iteration and finished cleanly.
        let actions: Vec<&str> = events
            .iter()
            .filter_map(|e| match &e.kind {
                EventKind::Action(name) => Some(name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(actions, vec!["search_vector_db", "finish"]);
    }

    #[tokio::test]
    async fn partial_resolver_failure_keeps_the_successes() {
        let inner = InMemoryProfileStore::new();
        for i in 1..=5 {
            inner.insert(sample_profile(&format!("u-{i}"))).await;
        }
        let flaky: Arc<dyn ProfileStore> = Arc::new(FlakyProfileStore::new(inner, &["u-3"]));

        let index = ScriptedVectorIndex::new(
            (1..=5).map(|i| vector_match(&format!("u-{i}"), 0.9)).collect(),
        );
        let h = harness_with_resolver_store(
            vec![
                "search",
                SEARCH_PROPOSAL,
                "wrap up",
                FINISH_PROPOSAL,
                "Found four candidates.",
                "<user_id>[]</user_id>",
            ],
            index,
            Arc::new(InMemoryProfileStore::new()),
            flaky,
        );

        let events = collect(h.agent.run("engineers", &SessionId::new())).await;

        let users = events
            .iter()
            .find_map(|e| match &e.kind {
                EventKind::Users(users) => Some(users),
                _ => None,
            })
            .expect("users event expected");
        assert_eq!(users.len(), 4);
        assert!(!users.iter().any(|p| p.user_id == "u-3"));
        assert_single_terminal_end(&events);
    }

    #[tokio::test]
    async fn history_load_failure_is_fatal() {
        let completion = Arc::new(ScriptedCompletion::new(vec![]));
        let planner = Planner::new(completion, Arc::new(PromptLibrary::builtin()));
        let profiles = Arc::new(InMemoryProfileStore::new());
        let resolver = ProfileResolver::new(profiles.clone());
        let dispatcher = Dispatcher::new(
            Arc::new(ScriptedVectorIndex::new(vec![])),
            profiles,
            resolver.clone(),
        );
        let agent = SearchAgent::new(planner, dispatcher, resolver, Arc::new(BrokenSessionStore));

        let events = collect(agent.run("engineers", &SessionId::new())).await;

        assert_eq!(kinds(&events), vec!["error", "end"]);
    }

    #[tokio::test]
    async fn max_iterations_forces_the_finishing_flow() {
        let profiles = Arc::new(InMemoryProfileStore::new());
        let h = harness(
            vec![
                "keep searching",
                SEARCH_PROPOSAL,
                "keep searching more",
                SEARCH_PROPOSAL,
                "Ran out of budget.",
                "<user_id>[]</user_id>",
            ],
            ScriptedVectorIndex::new(vec![]),
            profiles,
        );
        let agent = h.agent.with_max_iterations(2);

        let events = collect(agent.run("engineers", &SessionId::new())).await;

        assert_single_terminal_end(&events);
        assert!(events.iter().any(|e| matches!(e.kind, EventKind::Response(_))));
        let actions = events
            .iter()
            .filter(|e| matches!(e.kind, EventKind::Action(_)))
            .count();
        assert_eq!(actions, 2);
    }

    #[tokio::test]
    async fn every_event_carries_the_session_id() {
        let profiles = Arc::new(InMemoryProfileStore::new());
        let h = harness(
            vec![
                "nothing to do",
                FINISH_PROPOSAL,
                "done",
                "<user_id>[]</user_id>",
            ],
            ScriptedVectorIndex::new(vec![]),
            profiles,
        );

        let session = SessionId::from("session-under-test");
        let events = collect(h.agent.run("engineers", &session)).await;

        assert!(events.iter().all(|e| e.session_id == session));
    }
}
