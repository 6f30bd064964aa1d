//! Parsed verdicts produced by the reviewer and compliance agents.

use serde::{Deserialize, Serialize};

/// The brand reviewer's decision on the writer's draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewVerdict {
    Approved,
    Rejected,
}

/// The compliance officer's final go / no-go call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceVerdict {
    Go,
    NoGo,
    /// The report did not contain a recognisable verdict.
    Undetermined,
}

/// Verdict plus the raw report text it was parsed from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub verdict: ComplianceVerdict,
    pub report: String,
}
