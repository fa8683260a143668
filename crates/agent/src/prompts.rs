//! Prompt templates for the planner.
//!
//! Ships with built-in templates; an operator can override any of them
//! with a TOML file (a flat string table keyed by template name) without
//! rebuilding. Placeholders use `{name}` syntax and are substituted
//! verbatim — no escaping, the values are prompt text themselves.

use std::collections::HashMap;
use std::path::Path;

use talentscout_core::error::Error;
use tracing::info;

const THOUGHT_TEMPLATE: &str = r#"You are a talent-search agent. Given the user's request and your
observations so far, reason step by step about what to do next.

Available actions:
- search_vector_db: semantic search over candidate data. Input keys: "query", "namespace" (one of experience, education, skill, summary), optional "top_k".
- fetch_profile: load one candidate by id. Input key: "user_id".
- filter_structured: narrow an id list with structured predicates. Input keys: "user_ids" (list), "filters" (map with any of location, company_name, job_title, skill).
- request_clarification: ask the user a question when the request is ambiguous. Input key: "question".
- finish: stop once you have enough information to answer.

User request: {query}

Observations so far:
{observation_history}

Think about the next step. Do not name an action yet, just reason."#;

const ACTION_TEMPLATE: &str = r#"Based on the reasoning below, choose exactly one action.

Reasoning:
{thought}

Reply with the action name wrapped in <action></action> tags and its JSON
input wrapped in <input></input> tags, nothing else. Example:

<action>search_vector_db</action>
<input>{{"query": "backend engineer", "namespace": "experience", "top_k": 5}}</input>"#;

const RESPONSE_TEMPLATE: &str = r#"You are a talent-search agent. Write the final answer to the user's
request using everything you observed. Mention the matching candidates by
name and say briefly why each one fits. Be concise and concrete.

User request: {query}

Observations:
{observation_history}"#;

const FORMAT_USERS_TEMPLATE: &str = r#"From the observations and final answer below, collect the user ids of
every candidate the answer refers to.

{observation_history}

Reply with a JSON array of user id strings wrapped in <user_id></user_id>
tags, nothing else. Example: <user_id>["id-1", "id-2"]</user_id>"#;

/// Named prompt templates with `{placeholder}` substitution.
pub struct PromptLibrary {
    templates: HashMap<String, String>,
}

impl PromptLibrary {
    /// The built-in template set.
    pub fn builtin() -> Self {
        let mut templates = HashMap::new();
        templates.insert("thought".to_string(), THOUGHT_TEMPLATE.to_string());
        templates.insert("action".to_string(), ACTION_TEMPLATE.to_string());
        templates.insert("response".to_string(), RESPONSE_TEMPLATE.to_string());
        templates.insert(
            "format_users".to_string(),
            FORMAT_USERS_TEMPLATE.to_string(),
        );
        Self { templates }
    }

    /// Built-in templates with overrides merged from a TOML file.
    ///
    /// The file is a flat table: `thought = "..."`, `action = "..."`, etc.
    /// Unknown keys are accepted so operators can stage new templates.
    pub fn with_overrides(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("Failed to read prompt file {}: {e}", path.display()),
        })?;

        let overrides: HashMap<String, String> =
            toml::from_str(&content).map_err(|e| Error::Config {
                message: format!("Invalid prompt file {}: {e}", path.display()),
            })?;

        let mut library = Self::builtin();
        for (name, template) in overrides {
            info!(template = %name, "Prompt template overridden");
            library.templates.insert(name, template);
        }
        Ok(library)
    }

    /// Render a template with the given placeholder substitutions.
    pub fn render(&self, name: &str, vars: &[(&str, &str)]) -> Result<String, Error> {
        let template = self.templates.get(name).ok_or_else(|| Error::Config {
            message: format!("Prompt template not found: {name}"),
        })?;

        let mut rendered = template.clone();
        for (key, value) in vars {
            rendered = rendered.replace(&format!("{{{key}}}"), value);
        }
        Ok(rendered)
    }
}

impl Default for PromptLibrary {
    fn default() -> Self {
        Self::builtin()
    }
}
