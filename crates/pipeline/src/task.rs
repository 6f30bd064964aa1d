//! Task templates and `{placeholder}` interpolation.
//!
//! Descriptions are written as templates with `{topic}` and `{guidelines}`
//! placeholders and filled in once per run, in a single pass, so user text
//! that happens to contain a placeholder is never expanded again.

use std::collections::HashMap;
use std::sync::LazyLock;

use copydesk_core::lifecycle::PipelineStage;
use regex::{Captures, Regex};

use crate::agent::Agent;

/// Regex pattern matching `{placeholder}` tokens in task templates.
pub const PLACEHOLDER_PATTERN: &str = r"\{([a-zA-Z_][a-zA-Z0-9_]*)\}";

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PLACEHOLDER_PATTERN).expect("valid regex"));

const WRITE_DESCRIPTION: &str = "Write a 300-word blog post about the topic: '{topic}'. \
The post must be engaging and easy to understand.";

const WRITE_EXPECTED: &str = "A formatted blog post (text) of around 300 words.";

const REVIEW_DESCRIPTION: &str = "Review the blog post written by the Creative Content Writer. \
Check it against the following Brand Guidelines: '{guidelines}'. \
Decide whether the draft is APPROVED or REJECTED, give clear feedback, and then \
produce the final version of the post, revised wherever needed so that it fully \
complies with the guidelines.";

const REVIEW_EXPECTED: &str = "Exactly this layout:\n\
VERDICT: APPROVED or REJECTED\n\
FEEDBACK:\n<concise revision notes>\n\
FINAL POST:\n<the complete final blog post>";

const COMPLIANCE_DESCRIPTION: &str = "Perform a final legal and ethical compliance check on \
the final blog post. Scan the text for any sensitive topics, potential misinformation, or \
copyright red flags. Provide a final 'GO' or 'NO-GO' with a brief justification.";

const COMPLIANCE_EXPECTED: &str = "A final 'GO' or 'NO-GO' verdict with a 1-sentence explanation.";

/// One unit of work bound to an agent.
#[derive(Debug, Clone)]
pub struct Task {
    pub stage: PipelineStage,
    pub description: String,
    pub expected_output: String,
    pub agent: Agent,
    /// Earlier stages whose outputs are handed to this task.
    pub context: Vec<PipelineStage>,
}

impl Task {
    /// The writer's drafting task.
    pub fn write(inputs: &HashMap<&str, &str>) -> Self {
        Self {
            stage: PipelineStage::Writing,
            description: interpolate(WRITE_DESCRIPTION, inputs),
            expected_output: WRITE_EXPECTED.to_string(),
            agent: Agent::creative_writer(),
            context: Vec::new(),
        }
    }

    /// The reviewer's check-and-finalize task.
    pub fn review(inputs: &HashMap<&str, &str>) -> Self {
        Self {
            stage: PipelineStage::Reviewing,
            description: interpolate(REVIEW_DESCRIPTION, inputs),
            expected_output: REVIEW_EXPECTED.to_string(),
            agent: Agent::brand_reviewer(),
            context: vec![PipelineStage::Writing],
        }
    }

    /// The optional legal/ethics verdict task.
    pub fn compliance(inputs: &HashMap<&str, &str>) -> Self {
        Self {
            stage: PipelineStage::Compliance,
            description: interpolate(COMPLIANCE_DESCRIPTION, inputs),
            expected_output: COMPLIANCE_EXPECTED.to_string(),
            agent: Agent::compliance_officer(),
            context: vec![PipelineStage::Writing, PipelineStage::Reviewing],
        }
    }
}

/// Replace every known `{name}` with its input value. Unknown placeholders
/// are left untouched.
pub fn interpolate(template: &str, inputs: &HashMap<&str, &str>) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |caps: &Captures| match inputs.get(&caps[1]) {
            Some(value) => (*value).to_string(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs<'a>(topic: &'a str, guidelines: &'a str) -> HashMap<&'static str, &'a str> {
        HashMap::from([("topic", topic), ("guidelines", guidelines)])
    }

    #[test]
    fn interpolate_fills_known_placeholders() {
        let out = interpolate("About {topic} under {guidelines}", &inputs("AI", "be kind"));
        assert_eq!(out, "About AI under be kind");
    }

    #[test]
    fn interpolate_leaves_unknown_placeholders() {
        let out = interpolate("Hello {who}", &inputs("AI", "x"));
        assert_eq!(out, "Hello {who}");
    }

    #[test]
    fn interpolate_is_single_pass() {
        let out = interpolate("T: {topic}", &inputs("{guidelines}", "secret"));
        assert_eq!(out, "T: {guidelines}");
    }

    #[test]
    fn review_task_uses_guidelines_and_writer_context() {
        let task = Task::review(&inputs("AI", "Tone must be optimistic"));
        assert!(task.description.contains("'Tone must be optimistic'"));
        assert_eq!(task.context, vec![PipelineStage::Writing]);
        assert_eq!(task.agent.role, "Brand Compliance Reviewer");
    }

    #[test]
    fn write_task_uses_topic() {
        let task = Task::write(&inputs("The Future of Agentic AI", "x"));
        assert!(task.description.contains("'The Future of Agentic AI'"));
        assert!(task.context.is_empty());
    }
}
