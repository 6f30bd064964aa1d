//! Input validation helpers for project submissions.
//!
//! Required text fields are trimmed before checking, so a topic made only
//! of whitespace counts as missing.

use validator::ValidationErrors;

use crate::error::CoreError;

/// Maximum accepted topic length, in characters.
pub const MAX_TOPIC_LEN: u64 = 500;
/// Maximum accepted guidelines length, in characters.
pub const MAX_GUIDELINES_LEN: u64 = 5000;
/// Maximum accepted display name length, in characters.
pub const MAX_NAME_LEN: u64 = 200;

/// Number of topic characters used when deriving a default name.
pub const NAME_FROM_TOPIC_CHARS: usize = 50;
/// Name used when neither a name nor a topic is available.
pub const DEFAULT_PROJECT_NAME: &str = "Untitled Project";

/// Trim `value` and fail with `message` if nothing is left.
pub fn require_text(value: Option<&str>, message: &str) -> Result<String, CoreError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(CoreError::Validation(message.to_string())),
    }
}

/// Pick the display name for a new project.
///
/// An explicit non-blank name wins. Otherwise the first
/// [`NAME_FROM_TOPIC_CHARS`] characters of the topic are used, falling back
/// to [`DEFAULT_PROJECT_NAME`].
pub fn resolve_project_name(name: Option<&str>, topic: &str) -> String {
    if let Some(n) = name.map(str::trim).filter(|n| !n.is_empty()) {
        return n.to_string();
    }
    let topic = topic.trim();
    if topic.is_empty() {
        return DEFAULT_PROJECT_NAME.to_string();
    }
    topic.chars().take(NAME_FROM_TOPIC_CHARS).collect()
}

/// Flatten `validator` errors into one human-readable message.
///
/// Fields are sorted so the message is stable across runs.
pub fn describe_validation_errors(errors: &ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(msg) => format!("{field}: {msg}"),
                None => format!("{field}: invalid ({})", e.code),
            })
        })
        .collect();
    parts.sort();
    parts.join("; ")
}

/// Convert `validator` errors into a [`CoreError::Validation`].
pub fn into_core_error(errors: ValidationErrors) -> CoreError {
    CoreError::Validation(describe_validation_errors(&errors))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_text_trims() {
        assert_eq!(require_text(Some("  hello \n"), "x").unwrap(), "hello");
    }

    #[test]
    fn require_text_rejects_blank_and_missing() {
        let err = require_text(Some("   "), "Topic is required").unwrap_err();
        assert_eq!(err.to_string(), "Validation failed: Topic is required");
        assert!(require_text(None, "Topic is required").is_err());
    }

    #[test]
    fn explicit_name_wins() {
        assert_eq!(resolve_project_name(Some(" Launch "), "topic"), "Launch");
    }

    #[test]
    fn blank_name_falls_back_to_topic() {
        assert_eq!(
            resolve_project_name(Some("  "), "The Future of Agentic AI"),
            "The Future of Agentic AI"
        );
    }

    #[test]
    fn long_topic_is_cut_at_fifty_chars() {
        let topic = "é".repeat(80);
        let name = resolve_project_name(None, &topic);
        assert_eq!(name.chars().count(), NAME_FROM_TOPIC_CHARS);
    }

    #[test]
    fn empty_topic_uses_default_name() {
        assert_eq!(resolve_project_name(None, ""), DEFAULT_PROJECT_NAME);
    }
}
