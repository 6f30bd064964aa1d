//! Project lifecycle status and pipeline stages.
//!
//! A project moves strictly forward:
//!
//! ```text
//! pending -> in_progress -> completed
//!                        \-> failed
//! ```
//!
//! There are no backward transitions and no way out of a terminal state.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Project status
// ---------------------------------------------------------------------------

/// Lifecycle status of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl ProjectStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [ProjectStatus; 4] = [
        ProjectStatus::Pending,
        ProjectStatus::InProgress,
        ProjectStatus::Completed,
        ProjectStatus::Failed,
    ];

    /// Wire name, matching the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectStatus::Pending => "pending",
            ProjectStatus::InProgress => "in_progress",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Failed => "failed",
        }
    }

    /// Whether the status is final.
    pub fn is_terminal(self) -> bool {
        matches!(self, ProjectStatus::Completed | ProjectStatus::Failed)
    }

    /// Whether moving from `self` to `next` is a legal lifecycle step.
    pub fn can_transition_to(self, next: ProjectStatus) -> bool {
        matches!(
            (self, next),
            (ProjectStatus::Pending, ProjectStatus::InProgress)
                | (ProjectStatus::InProgress, ProjectStatus::Completed)
                | (ProjectStatus::InProgress, ProjectStatus::Failed)
        )
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reject any transition that is not a legal forward step.
pub fn validate_transition(from: ProjectStatus, to: ProjectStatus) -> Result<(), CoreError> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(CoreError::Conflict(format!(
            "Cannot move project from '{from}' to '{to}'"
        )))
    }
}

// ---------------------------------------------------------------------------
// Pipeline stages
// ---------------------------------------------------------------------------

/// A step of the content pipeline. Only meaningful while a project is
/// `in_progress`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Writing,
    Reviewing,
    Compliance,
}

impl PipelineStage {
    pub fn as_str(self) -> &'static str {
        match self {
            PipelineStage::Writing => "writing",
            PipelineStage::Reviewing => "reviewing",
            PipelineStage::Compliance => "compliance",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- Transitions --

    #[test]
    fn forward_transitions_are_allowed() {
        assert!(ProjectStatus::Pending.can_transition_to(ProjectStatus::InProgress));
        assert!(ProjectStatus::InProgress.can_transition_to(ProjectStatus::Completed));
        assert!(ProjectStatus::InProgress.can_transition_to(ProjectStatus::Failed));
    }

    #[test]
    fn pending_cannot_skip_to_terminal() {
        assert!(!ProjectStatus::Pending.can_transition_to(ProjectStatus::Completed));
        assert!(!ProjectStatus::Pending.can_transition_to(ProjectStatus::Failed));
    }

    #[test]
    fn terminal_states_are_final() {
        for next in ProjectStatus::ALL {
            assert!(!ProjectStatus::Completed.can_transition_to(next));
            assert!(!ProjectStatus::Failed.can_transition_to(next));
        }
    }

    #[test]
    fn self_transitions_are_rejected() {
        for status in ProjectStatus::ALL {
            assert!(!status.can_transition_to(status));
        }
    }

    #[test]
    fn validate_transition_reports_conflict() {
        let err = validate_transition(ProjectStatus::Completed, ProjectStatus::InProgress)
            .unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));
        assert_eq!(
            err.to_string(),
            "Conflict: Cannot move project from 'completed' to 'in_progress'"
        );
    }

    #[test]
    fn terminal_flags() {
        assert!(!ProjectStatus::Pending.is_terminal());
        assert!(!ProjectStatus::InProgress.is_terminal());
        assert!(ProjectStatus::Completed.is_terminal());
        assert!(ProjectStatus::Failed.is_terminal());
    }

    // -- Serialization --

    #[test]
    fn status_serializes_as_snake_case() {
        assert_eq!(
            serde_json::to_value(ProjectStatus::InProgress).unwrap(),
            serde_json::json!("in_progress")
        );
        for status in ProjectStatus::ALL {
            assert_eq!(serde_json::to_value(status).unwrap(), status.as_str());
        }
    }

    #[test]
    fn stage_display_matches_wire_name() {
        assert_eq!(PipelineStage::Reviewing.to_string(), "reviewing");
        assert_eq!(
            serde_json::to_value(PipelineStage::Compliance).unwrap(),
            serde_json::json!("compliance")
        );
    }
}
