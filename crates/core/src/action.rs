//! The closed action vocabulary the agent may dispatch.
//!
//! Planner output arrives as an action name plus a loosely-typed JSON
//! input. [`Action::resolve`] turns that pair into a typed variant,
//! validating required parameters at the boundary. Unknown action names
//! become [`Action::Unknown`] — never an error — and unknown extra input
//! keys are tolerated for forward compatibility.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::DispatchError;

/// Default number of vector matches requested per search.
pub const DEFAULT_TOP_K: usize = 5;

/// Fallback question when the planner requests clarification without one.
pub const DEFAULT_CLARIFICATION_QUESTION: &str =
    "Could you please provide more details or clarify your request?";

/// A partition of the vector index, one per sub-record category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    Experience,
    Education,
    Skill,
    Summary,
}

impl Namespace {
    pub const ALL: [Namespace; 4] = [
        Namespace::Experience,
        Namespace::Education,
        Namespace::Skill,
        Namespace::Summary,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Experience => "experience",
            Namespace::Education => "education",
            Namespace::Skill => "skill",
            Namespace::Summary => "summary",
        }
    }
}

impl std::str::FromStr for Namespace {
    type Err = DispatchError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "experience" => Ok(Namespace::Experience),
            "education" => Ok(Namespace::Education),
            "skill" => Ok(Namespace::Skill),
            "summary" => Ok(Namespace::Summary),
            other => Err(DispatchError::InvalidArgument(format!(
                "invalid namespace '{other}', allowed: experience, education, skill, summary"
            ))),
        }
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recognized structured-filter keys for `filter_structured`.
///
/// Each present filter becomes a sub-record existence predicate; predicates
/// are conjoined with AND. Unrecognized keys in the incoming map are
/// silently dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredFilters {
    /// Case-insensitive substring match on experience locations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Case-insensitive substring match on experience company names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,

    /// Case-insensitive substring match on experience job titles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,

    /// Case-insensitive exact match on skill names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill: Option<String>,
}

impl StructuredFilters {
    /// Extract recognized filters from a loose JSON value.
    ///
    /// Non-string and blank values are dropped with a warning rather than
    /// failing the whole action.
    pub fn from_value(value: &Value) -> Self {
        let Some(map) = value.as_object() else {
            return Self::default();
        };

        let mut filters = Self::default();
        for (key, raw) in map {
            let text = raw.as_str().map(str::trim).filter(|s| !s.is_empty());
            match key.as_str() {
                "location" | "company_name" | "job_title" | "skill" => {
                    if text.is_none() {
                        warn!(filter = %key, "Dropping filter with invalid or empty value");
                        continue;
                    }
                    let value = text.map(String::from);
                    match key.as_str() {
                        "location" => filters.location = value,
                        "company_name" => filters.company_name = value,
                        "job_title" => filters.job_title = value,
                        _ => filters.skill = value,
                    }
                }
                other => {
                    warn!(filter = %other, "Ignoring unrecognized filter key");
                }
            }
        }
        filters
    }

    pub fn is_empty(&self) -> bool {
        self.location.is_none()
            && self.company_name.is_none()
            && self.job_title.is_none()
            && self.skill.is_none()
    }
}

/// One discrete retrieval/filtering/control operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Semantic search against one vector-index namespace.
    SearchVectorDb {
        query: String,
        namespace: Namespace,
        top_k: usize,
    },

    /// Load a single profile by id.
    FetchProfile { user_id: String },

    /// Narrow a candidate-id set with structured sub-record predicates.
    FilterStructured {
        filters: StructuredFilters,
        user_ids: Vec<String>,
    },

    /// Run a graph query (optional extended action).
    SearchGraph { query: String },

    /// Suspend the run and ask the caller a question.
    RequestClarification { question: String },

    /// Terminate the reasoning loop.
    Finish,

    /// Any name outside the vocabulary. Always executes to an empty result.
    Unknown { name: String },
}

impl Action {
    /// Resolve an action name plus loose JSON input into a typed action.
    ///
    /// Names are matched case-insensitively. Missing required parameters
    /// fail with [`DispatchError::InvalidArgument`]; unknown names resolve
    /// to [`Action::Unknown`].
    pub fn resolve(name: &str, input: &Value) -> std::result::Result<Self, DispatchError> {
        match name.to_lowercase().as_str() {
            "search_vector_db" => {
                let query = required_str(input, "query", "search_vector_db")?;
                let namespace: Namespace =
                    required_str(input, "namespace", "search_vector_db")?.parse()?;
                let top_k = match input.get("top_k") {
                    None | Some(Value::Null) => DEFAULT_TOP_K,
                    Some(v) => v
                        .as_u64()
                        .map(|n| n as usize)
                        .or_else(|| v.as_str().and_then(|s| s.parse().ok()))
                        .unwrap_or(DEFAULT_TOP_K),
                };
                Ok(Action::SearchVectorDb {
                    query,
                    namespace,
                    top_k,
                })
            }
            "fetch_profile" => {
                // Planners sometimes emit a bare id instead of a map.
                let user_id = match input {
                    Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
                    _ => required_str(input, "user_id", "fetch_profile")?,
                };
                Ok(Action::FetchProfile { user_id })
            }
            "filter_structured" => {
                let user_ids = input
                    .get("user_ids")
                    .and_then(Value::as_array)
                    .map(|arr| {
                        arr.iter()
                            .filter_map(|v| v.as_str().map(String::from))
                            .collect()
                    })
                    .unwrap_or_default();
                let filters = input
                    .get("filters")
                    .map(StructuredFilters::from_value)
                    .unwrap_or_default();
                Ok(Action::FilterStructured { filters, user_ids })
            }
            "search_graph" => {
                let query = required_str(input, "query", "search_graph")?;
                Ok(Action::SearchGraph { query })
            }
            "request_clarification" => {
                let question = input
                    .get("question")
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .unwrap_or(DEFAULT_CLARIFICATION_QUESTION)
                    .to_string();
                Ok(Action::RequestClarification { question })
            }
            "finish" => Ok(Action::Finish),
            _ => Ok(Action::Unknown {
                name: name.to_string(),
            }),
        }
    }

    /// The canonical name of this action.
    pub fn name(&self) -> &str {
        match self {
            Action::SearchVectorDb { .. } => "search_vector_db",
            Action::FetchProfile { .. } => "fetch_profile",
            Action::FilterStructured { .. } => "filter_structured",
            Action::SearchGraph { .. } => "search_graph",
            Action::RequestClarification { .. } => "request_clarification",
            Action::Finish => "finish",
            Action::Unknown { name } => name,
        }
    }

    /// Whether this action terminates the reasoning loop.
    pub fn is_finish(&self) -> bool {
        matches!(self, Action::Finish)
    }
}

fn required_str(
    input: &Value,
    key: &str,
    action: &str,
) -> std::result::Result<String, DispatchError> {
    input
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .ok_or_else(|| {
            DispatchError::InvalidArgument(format!("missing required '{key}' for {action}"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn vector_search_resolves_with_default_top_k() {
        let action = Action::resolve(
            "search_vector_db",
            &json!({"query": "software engineer", "namespace": "experience"}),
        )
        .unwrap();
        assert_eq!(
            action,
            Action::SearchVectorDb {
                query: "software engineer".into(),
                namespace: Namespace::Experience,
                top_k: DEFAULT_TOP_K,
            }
        );
    }

    #[test]
    fn vector_search_rejects_bad_namespace() {
        let err = Action::resolve(
            "search_vector_db",
            &json!({"query": "x", "namespace": "hobbies"}),
        )
        .unwrap_err();
        assert!(matches!(err, DispatchError::InvalidArgument(_)));
        assert!(err.to_string().contains("hobbies"));
    }

    #[test]
    fn vector_search_requires_query() {
        let err =
            Action::resolve("search_vector_db", &json!({"namespace": "skill"})).unwrap_err();
        assert!(matches!(err, DispatchError::InvalidArgument(_)));
    }

    #[test]
    fn vector_search_accepts_stringly_top_k() {
        let action = Action::resolve(
            "search_vector_db",
            &json!({"query": "x", "namespace": "skill", "top_k": "7"}),
        )
        .unwrap();
        assert!(matches!(action, Action::SearchVectorDb { top_k: 7, .. }));
    }

    #[test]
    fn fetch_profile_accepts_bare_id() {
        let action = Action::resolve("fetch_profile", &json!("user-42")).unwrap();
        assert_eq!(
            action,
            Action::FetchProfile {
                user_id: "user-42".into()
            }
        );
    }

    #[test]
    fn fetch_profile_accepts_map_id() {
        let action = Action::resolve("fetch_profile", &json!({"user_id": "user-42"})).unwrap();
        assert_eq!(
            action,
            Action::FetchProfile {
                user_id: "user-42".into()
            }
        );
    }

    #[test]
    fn fetch_profile_requires_id() {
        let err = Action::resolve("fetch_profile", &json!({})).unwrap_err();
        assert!(matches!(err, DispatchError::InvalidArgument(_)));
    }

    #[test]
    fn filter_structured_ignores_unknown_keys() {
        let action = Action::resolve(
            "filter_structured",
            &json!({
                "user_ids": ["a", "b"],
                "filters": {"location": "Berlin", "favorite_color": "green"}
            }),
        )
        .unwrap();
        let Action::FilterStructured { filters, user_ids } = action else {
            panic!("wrong variant");
        };
        assert_eq!(user_ids, vec!["a", "b"]);
        assert_eq!(filters.location.as_deref(), Some("Berlin"));
        assert!(filters.skill.is_none());
    }

    #[test]
    fn filter_structured_drops_non_string_values() {
        let filters = StructuredFilters::from_value(&json!({"skill": 42, "location": "  "}));
        assert!(filters.is_empty());
    }

    #[test]
    fn clarification_defaults_blank_question() {
        let action =
            Action::resolve("request_clarification", &json!({"question": "  "})).unwrap();
        assert_eq!(
            action,
            Action::RequestClarification {
                question: DEFAULT_CLARIFICATION_QUESTION.into()
            }
        );
    }

    #[test]
    fn unknown_action_is_not_an_error() {
        let action = Action::resolve("summon_dragon", &json!({})).unwrap();
        assert_eq!(
            action,
            Action::Unknown {
                name: "summon_dragon".into()
            }
        );
        assert_eq!(action.name(), "summon_dragon");
    }

    #[test]
    fn action_names_are_canonical() {
        assert_eq!(Action::Finish.name(), "finish");
        assert!(Action::Finish.is_finish());
        assert_eq!(
            Action::FetchProfile {
                user_id: "u".into()
            }
            .name(),
            "fetch_profile"
        );
    }
}
