//! Working memory — per-run scratchpad for a single agent run.
//!
//! Holds the conversation snapshot taken at run start, the current query,
//! and the append-only sequence of completed steps. Steps are only ever
//! pushed, never mutated in place. The two clarification flags are
//! transient: reset at the start of every iteration before dispatch, set
//! only by the `request_clarification` action.
//!
//! Working memory is dropped with the run — a clarification turn
//! reconstructs its context from the persisted session log alone.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use talentscout_core::message::{Message, Role};
use talentscout_core::profile::CompactProfile;

/// One completed think→propose→execute iteration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    /// The full reasoning text for this iteration.
    pub thought: String,

    /// The resolved action name.
    pub action: String,

    /// The parsed action input.
    pub action_input: Value,

    /// Compact-view profiles the action produced.
    pub result: Vec<CompactProfile>,
}

/// The agent's scratchpad within a single run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkingMemory {
    /// Session history at run start. Immutable for the run's lifetime.
    pub conversation: Vec<Message>,

    /// The current user utterance.
    pub query: String,

    /// Completed steps, in order. Only grows.
    pub steps: Vec<Step>,

    /// Set when the last dispatched action requested clarification.
    pub needs_clarification: bool,

    /// The question to relay to the caller, when set.
    pub clarification_question: Option<String>,
}

impl WorkingMemory {
    /// Create working memory for a new run.
    pub fn new(conversation: Vec<Message>, query: impl Into<String>) -> Self {
        Self {
            conversation,
            query: query.into(),
            steps: Vec::new(),
            needs_clarification: false,
            clarification_question: None,
        }
    }

    /// Append a completed step.
    pub fn push_step(&mut self, step: Step) {
        self.steps.push(step);
    }

    /// Clear the clarification flags. Called before every dispatch.
    pub fn reset_clarification(&mut self) {
        self.needs_clarification = false;
        self.clarification_question = None;
    }

    /// Flag the run as needing caller input.
    pub fn request_clarification(&mut self, question: &str) {
        self.needs_clarification = true;
        self.clarification_question = Some(question.to_string());
    }

    /// Whether the most recently appended step finished the run.
    pub fn last_action_is_finish(&self) -> bool {
        self.steps
            .last()
            .is_some_and(|step| step.action == "finish")
    }

    /// Render the conversation snapshot as prompt text.
    pub fn render_conversation(&self) -> String {
        if self.conversation.is_empty() {
            return "<no history yet>".to_string();
        }

        let mut out = String::from("<conversation>\n");
        for message in &self.conversation {
            match message.role {
                Role::User => {
                    out.push_str(&format!("<user>{}</user>\n", message.content));
                }
                Role::Assistant => {
                    out.push_str(&format!("<assistant>{}</assistant>\n", message.content));
                }
            }
        }
        out.push_str("</conversation>\n");
        out
    }

    /// Render the conversation plus the thought chain as prompt text.
    pub fn render_history(&self) -> String {
        let mut out = self.render_conversation();
        if self.steps.is_empty() {
            return out;
        }

        out.push_str("<thought_chain>\n");
        for (i, step) in self.steps.iter().enumerate() {
            let action_input =
                serde_json::to_string(&step.action_input).unwrap_or_else(|_| "{}".into());
            let result = serde_json::to_string(&step.result).unwrap_or_else(|_| "[]".into());

            out.push_str(&format!("<step index=\"{i}\">\n"));
            out.push_str(&format!("  <thought>{}</thought>\n", step.thought));
            out.push_str(&format!("  <action>{}</action>\n", step.action));
            out.push_str(&format!("  <action_input>{action_input}</action_input>\n"));
            out.push_str(&format!("  <result>{result}</result>\n"));
            out.push_str("</step>\n");
        }
        out.push_str("</thought_chain>\n");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn step(action: &str) -> Step {
        Step {
            thought: "thinking".into(),
            action: action.into(),
            action_input: json!({}),
            result: vec![],
        }
    }

    #[test]
    fn new_memory_is_clean() {
        let wm = WorkingMemory::new(vec![], "find rust devs");
        assert!(wm.steps.is_empty());
        assert!(!wm.needs_clarification);
        assert!(wm.clarification_question.is_none());
        assert!(!wm.last_action_is_finish());
    }

    #[test]
    fn clarification_flags_round_trip() {
        let mut wm = WorkingMemory::new(vec![], "q");
        wm.request_clarification("Which city?");
        assert!(wm.needs_clarification);
        assert_eq!(wm.clarification_question.as_deref(), Some("Which city?"));

        wm.reset_clarification();
        assert!(!wm.needs_clarification);
        assert!(wm.clarification_question.is_none());
    }

    #[test]
    fn finish_detection_checks_last_step_only() {
        let mut wm = WorkingMemory::new(vec![], "q");
        wm.push_step(step("finish"));
        wm.push_step(step("search_vector_db"));
        assert!(!wm.last_action_is_finish());

        wm.push_step(step("finish"));
        assert!(wm.last_action_is_finish());
    }

    #[test]
    fn empty_conversation_renders_placeholder() {
        let wm = WorkingMemory::new(vec![], "q");
        assert_eq!(wm.render_conversation(), "<no history yet>");
    }

    #[test]
    fn conversation_renders_role_tags_in_order() {
        let wm = WorkingMemory::new(
            vec![
                Message::user("find engineers"),
                Message::assistant("found two"),
            ],
            "q",
        );
        let rendered = wm.render_conversation();
        assert!(rendered.starts_with("<conversation>\n<user>find engineers</user>"));
        assert!(rendered.contains("<assistant>found two</assistant>"));
        assert!(rendered.ends_with("</conversation>\n"));
    }

    #[test]
    fn history_renders_thought_chain() {
        let mut wm = WorkingMemory::new(vec![Message::user("hi")], "q");
        wm.push_step(Step {
            thought: "search experiences".into(),
            action: "search_vector_db".into(),
            action_input: json!({"query": "rust", "namespace": "experience"}),
            result: vec![],
        });

        let rendered = wm.render_history();
        assert!(rendered.contains("<thought_chain>"));
        assert!(rendered.contains("<step index=\"0\">"));
        assert!(rendered.contains("<thought>search experiences</thought>"));
        assert!(rendered.contains("<action>search_vector_db</action>"));
        assert!(rendered.contains(r#""namespace":"experience""#));
    }

    #[test]
    fn history_without_steps_omits_thought_chain() {
        let wm = WorkingMemory::new(vec![Message::user("hi")], "q");
        assert!(!wm.render_history().contains("<thought_chain>"));
    }
}
