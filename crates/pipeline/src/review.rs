//! Parsing of reviewer and compliance responses.
//!
//! Models do not always follow the requested layout exactly, so headings
//! are matched case-insensitively and may be decorated with Markdown
//! (`**FINAL POST:**`, `## Feedback:`).

use std::sync::LazyLock;

use copydesk_core::outcome::{ComplianceReport, ComplianceVerdict, ReviewVerdict};
use regex::Regex;

static VERDICT_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^[ \t*#_>]*verdict[ \t*_]*:?[ \t*_]*(approved|rejected)\b.*$")
        .expect("valid regex")
});

static FEEDBACK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^[ \t*#_>]*(?:feedback|revision notes)[ \t*_]*:[ \t*_]*")
        .expect("valid regex")
});

static FINAL_POST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^[ \t*#_>]*final[ \t]+(?:post|version)[ \t*_]*:[ \t*_]*")
        .expect("valid regex")
});

static NOT_APPROVED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:not|un)[ \t_-]?approved\b").expect("valid regex")
});

static NO_GO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bno[ \t_-]?go\b").expect("valid regex"));

static GO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bGO\b|(?i:verdict\W*go\b)").expect("valid regex"));

/// The pieces of a reviewer response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReview {
    pub verdict: Option<ReviewVerdict>,
    pub feedback: String,
    /// Content of the `FINAL POST:` section, if present and non-blank.
    pub final_post: Option<String>,
}

/// Split a reviewer response into verdict, feedback and final post.
pub fn parse_review(text: &str) -> ParsedReview {
    let verdict = parse_verdict(text);

    let (head, final_post) = match FINAL_POST_RE.find(text) {
        Some(m) => (&text[..m.start()], Some(text[m.end()..].trim())),
        None => (text, None),
    };

    let feedback = match FEEDBACK_RE.find(head) {
        Some(m) => head[m.end()..].trim().to_string(),
        None => VERDICT_LINE_RE.replace_all(head, "").trim().to_string(),
    };

    ParsedReview {
        verdict,
        feedback,
        final_post: final_post.filter(|p| !p.is_empty()).map(str::to_string),
    }
}

fn parse_verdict(text: &str) -> Option<ReviewVerdict> {
    if let Some(caps) = VERDICT_LINE_RE.captures(text) {
        return Some(if caps[1].eq_ignore_ascii_case("approved") {
            ReviewVerdict::Approved
        } else {
            ReviewVerdict::Rejected
        });
    }
    if text.contains("REJECTED") || NOT_APPROVED_RE.is_match(text) {
        Some(ReviewVerdict::Rejected)
    } else if text.contains("APPROVED") {
        Some(ReviewVerdict::Approved)
    } else {
        None
    }
}

/// Pick the post to publish.
///
/// The reviewer's `FINAL POST:` section wins. Without one, an approved draft
/// is published as written; otherwise the whole reviewer response is the
/// best text available.
pub fn resolve_final_post(review: &ParsedReview, draft: &str, raw_review: &str) -> String {
    if let Some(post) = &review.final_post {
        return post.clone();
    }
    match review.verdict {
        Some(ReviewVerdict::Approved) => draft.trim().to_string(),
        _ => raw_review.trim().to_string(),
    }
}

/// Read the go / no-go call out of a compliance report.
pub fn parse_compliance(text: &str) -> ComplianceReport {
    let verdict = if NO_GO_RE.is_match(text) {
        ComplianceVerdict::NoGo
    } else if GO_RE.is_match(text) {
        ComplianceVerdict::Go
    } else {
        ComplianceVerdict::Undetermined
    };
    ComplianceReport {
        verdict,
        report: text.trim().to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const WELL_FORMED: &str = "VERDICT: REJECTED\n\
FEEDBACK:\nToo much jargon in paragraph two.\n\
FINAL POST:\nAgentic AI will help everyone do more.\n";

    // -- Reviews --

    #[test]
    fn parses_well_formed_review() {
        let parsed = parse_review(WELL_FORMED);
        assert_eq!(parsed.verdict, Some(ReviewVerdict::Rejected));
        assert_eq!(parsed.feedback, "Too much jargon in paragraph two.");
        assert_eq!(
            parsed.final_post.as_deref(),
            Some("Agentic AI will help everyone do more.")
        );
    }

    #[test]
    fn parses_markdown_decorated_headings() {
        let text = "**Verdict:** Approved\n\n## Feedback:\nGreat tone.\n\n**FINAL POST:**\nThe post.";
        let parsed = parse_review(text);
        assert_eq!(parsed.verdict, Some(ReviewVerdict::Approved));
        assert_eq!(parsed.feedback, "Great tone.");
        assert_eq!(parsed.final_post.as_deref(), Some("The post."));
    }

    #[test]
    fn falls_back_to_keyword_verdict() {
        let parsed = parse_review("Overall this is APPROVED, nice work.");
        assert_eq!(parsed.verdict, Some(ReviewVerdict::Approved));
        assert_eq!(parsed.final_post, None);
        assert_eq!(parsed.feedback, "Overall this is APPROVED, nice work.");
    }

    #[test]
    fn negated_approval_is_a_rejection() {
        assert_eq!(
            parse_review("VERDICT: NOT APPROVED\nFEEDBACK: Too much jargon.").verdict,
            Some(ReviewVerdict::Rejected)
        );
        assert_eq!(
            parse_review("This draft is not approved in its current form.").verdict,
            Some(ReviewVerdict::Rejected)
        );
    }

    #[test]
    fn feedback_without_heading_drops_verdict_line() {
        let parsed = parse_review("VERDICT: APPROVED\nClear and upbeat.");
        assert_eq!(parsed.feedback, "Clear and upbeat.");
    }

    #[test]
    fn empty_final_section_is_ignored() {
        let parsed = parse_review("VERDICT: APPROVED\nFINAL POST:\n   ");
        assert_eq!(parsed.final_post, None);
    }

    // -- Final post resolution --

    #[test]
    fn final_section_wins() {
        let parsed = parse_review(WELL_FORMED);
        assert_eq!(
            resolve_final_post(&parsed, "draft", WELL_FORMED),
            "Agentic AI will help everyone do more."
        );
    }

    #[test]
    fn approved_without_final_section_publishes_draft() {
        let raw = "VERDICT: APPROVED\nLooks great.";
        let parsed = parse_review(raw);
        assert_eq!(resolve_final_post(&parsed, " the draft ", raw), "the draft");
    }

    #[test]
    fn unparseable_review_publishes_raw_text() {
        let raw = "Some free-form commentary.";
        let parsed = parse_review(raw);
        assert_eq!(resolve_final_post(&parsed, "draft", raw), raw);
    }

    // -- Compliance --

    #[test]
    fn compliance_no_go() {
        let report = parse_compliance("NO-GO: the post makes an unverified medical claim.");
        assert_eq!(report.verdict, ComplianceVerdict::NoGo);
    }

    #[test]
    fn compliance_go() {
        let report = parse_compliance("Final verdict: GO. No legal concerns found.");
        assert_eq!(report.verdict, ComplianceVerdict::Go);
        assert_eq!(report.report, "Final verdict: GO. No legal concerns found.");
    }

    #[test]
    fn compliance_lowercase_prose_is_undetermined() {
        let report = parse_compliance("Good to go ahead, I think.");
        assert_eq!(report.verdict, ComplianceVerdict::Undetermined);
    }
}
