//! Project entity model and DTOs.

use copydesk_core::error::CoreError;
use copydesk_core::lifecycle::{validate_transition, PipelineStage, ProjectStatus};
use copydesk_core::outcome::{ComplianceReport, ReviewVerdict};
use copydesk_core::types::{DbId, Timestamp};
use copydesk_core::validation::{self, MAX_GUIDELINES_LEN, MAX_NAME_LEN, MAX_TOPIC_LEN};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// One generation request and its outcome.
///
/// `result` is populated only when `status` is `completed` and `error` only
/// when it is `failed`. The mutators below are the only way to change the
/// status, and each of them checks the lifecycle rules first.
#[derive(Debug, Clone, Serialize)]
pub struct Project {
    pub id: DbId,
    pub name: String,
    pub topic: String,
    pub guidelines: String,
    pub status: ProjectStatus,
    pub stage: Option<PipelineStage>,
    pub result: Option<String>,
    pub writer_output: Option<String>,
    pub reviewer_feedback: Option<String>,
    pub review_verdict: Option<ReviewVerdict>,
    pub compliance: Option<ComplianceReport>,
    pub error: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
}

/// Validated fields for a new project.
#[derive(Debug, Clone)]
pub struct NewProject {
    pub name: Option<String>,
    pub topic: String,
    pub guidelines: String,
}

/// DTO for updating an existing project. All fields are optional.
///
/// Only descriptive fields can be edited; status and outcome fields are
/// owned by the pipeline.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateProject {
    #[serde(alias = "project_name")]
    #[validate(length(max = MAX_NAME_LEN, message = "must be at most 200 characters"))]
    pub name: Option<String>,
    #[validate(length(max = MAX_TOPIC_LEN, message = "must be at most 500 characters"))]
    pub topic: Option<String>,
    #[validate(length(max = MAX_GUIDELINES_LEN, message = "must be at most 5000 characters"))]
    pub guidelines: Option<String>,
}

impl UpdateProject {
    /// Check lengths and trim every provided field, rejecting blanks.
    pub fn normalized(&self) -> Result<UpdateProject, CoreError> {
        self.validate().map_err(validation::into_core_error)?;
        Ok(UpdateProject {
            name: trimmed(self.name.as_deref(), "Name cannot be empty")?,
            topic: trimmed(self.topic.as_deref(), "Topic cannot be empty")?,
            guidelines: trimmed(
                self.guidelines.as_deref(),
                "Brand guidelines cannot be empty",
            )?,
        })
    }
}

fn trimmed(value: Option<&str>, message: &str) -> Result<Option<String>, CoreError> {
    value
        .map(|v| validation::require_text(Some(v), message))
        .transpose()
}

/// Everything a successful pipeline run writes onto the project.
#[derive(Debug, Clone)]
pub struct CompletedGeneration {
    pub result: String,
    pub writer_output: String,
    pub reviewer_feedback: String,
    pub review_verdict: Option<ReviewVerdict>,
    pub compliance: Option<ComplianceReport>,
}

impl Project {
    /// Build a fresh `pending` project.
    pub fn new(id: DbId, input: NewProject, now: Timestamp) -> Self {
        let name = validation::resolve_project_name(input.name.as_deref(), &input.topic);
        Self {
            id,
            name,
            topic: input.topic,
            guidelines: input.guidelines,
            status: ProjectStatus::Pending,
            stage: None,
            result: None,
            writer_output: None,
            reviewer_feedback: None,
            review_verdict: None,
            compliance: None,
            error: None,
            created_at: now,
            updated_at: now,
            started_at: None,
            completed_at: None,
        }
    }

    /// Apply descriptive edits. Expects an already-normalized update.
    pub fn apply_update(&mut self, update: &UpdateProject, now: Timestamp) {
        if let Some(name) = &update.name {
            self.name.clone_from(name);
        }
        if let Some(topic) = &update.topic {
            self.topic.clone_from(topic);
        }
        if let Some(guidelines) = &update.guidelines {
            self.guidelines.clone_from(guidelines);
        }
        self.updated_at = now;
    }

    /// `pending -> in_progress`, entering the writing stage.
    pub fn start(&mut self, now: Timestamp) -> Result<(), CoreError> {
        validate_transition(self.status, ProjectStatus::InProgress)?;
        self.status = ProjectStatus::InProgress;
        self.stage = Some(PipelineStage::Writing);
        self.started_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Record the stage currently executing.
    pub fn enter_stage(&mut self, stage: PipelineStage, now: Timestamp) -> Result<(), CoreError> {
        if self.status != ProjectStatus::InProgress {
            return Err(CoreError::Conflict(format!(
                "Cannot enter stage '{stage}' while project is '{}'",
                self.status
            )));
        }
        self.stage = Some(stage);
        self.updated_at = now;
        Ok(())
    }

    /// `in_progress -> completed`. The result must not be blank.
    pub fn complete(&mut self, outcome: CompletedGeneration, now: Timestamp) -> Result<(), CoreError> {
        validate_transition(self.status, ProjectStatus::Completed)?;
        if outcome.result.trim().is_empty() {
            return Err(CoreError::Validation(
                "A completed project needs a non-empty result".to_string(),
            ));
        }
        self.status = ProjectStatus::Completed;
        self.stage = None;
        self.result = Some(outcome.result);
        self.writer_output = Some(outcome.writer_output);
        self.reviewer_feedback = Some(outcome.reviewer_feedback);
        self.review_verdict = outcome.review_verdict;
        self.compliance = outcome.compliance;
        self.completed_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// `in_progress -> failed`. Blank messages become `Unknown error`.
    pub fn fail(&mut self, message: &str, now: Timestamp) -> Result<(), CoreError> {
        validate_transition(self.status, ProjectStatus::Failed)?;
        let message = message.trim();
        self.status = ProjectStatus::Failed;
        self.stage = None;
        self.error = Some(if message.is_empty() {
            "Unknown error".to_string()
        } else {
            message.to_string()
        });
        self.completed_at = Some(now);
        self.updated_at = now;
        Ok(())
    }
}
