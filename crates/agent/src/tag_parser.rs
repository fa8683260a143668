//! Tolerant parsing of tagged planner output.
//!
//! The planner is asked to wrap its decisions in XML-ish tags
//! (`<action>...</action>`, `<input>...</input>`), but the producer is a
//! language model, not a controlled grammar. The repair policy:
//!
//! - an opening tag with no matching closing tag gets the closing tag
//!   appended at the end of the text (truncated streams are common);
//! - extraction is case-insensitive and spans newlines;
//! - action names are stripped of surrounding whitespace and brackets.
//!
//! Deliberately never strict — malformed content yields `None`, not an
//! error, and downstream code decides how to degrade.

use regex::Regex;

/// Append the closing tag when the opening tag was never closed.
pub fn ensure_closed(text: &str, tag: &str) -> String {
    let open_tag = format!("<{tag}>");
    let close_tag = format!("</{tag}>");
    if text.contains(&open_tag) && !text.contains(&close_tag) {
        return format!("{}\n{close_tag}", text.trim_end());
    }
    text.to_string()
}

/// Extract the trimmed inner text of the first `<tag>...</tag>` pair.
pub fn extract(text: &str, tag: &str) -> Option<String> {
    let pattern = format!("(?is)<{tag}>(.*?)</{tag}>");
    let re = Regex::new(&pattern).expect("tag pattern is static");
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// Normalize an extracted action name: trim whitespace and any enclosing
/// brackets the model sometimes adds.
pub fn clean_action_name(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c| c == '[' || c == ']')
        .trim()
        .to_string()
}
