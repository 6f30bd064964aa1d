//! The [`ProjectStore`] itself.

use std::collections::HashMap;

use chrono::Utc;
use copydesk_core::error::CoreError;
use copydesk_core::lifecycle::{PipelineStage, ProjectStatus};
use copydesk_core::types::{new_id, DbId};
use indexmap::IndexMap;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::models::project::{CompletedGeneration, NewProject, Project, UpdateProject};

/// Number of projects per status, for health reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub failed: usize,
}

/// Process-local project records keyed by id, in creation order.
///
/// Every mutation runs under the write lock and is applied to a copy of the
/// record first, so a rejected change leaves the stored record untouched and
/// concurrent writers to the same id never interleave.
pub struct ProjectStore {
    projects: RwLock<IndexMap<DbId, Project>>,
}

impl Default for ProjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            projects: RwLock::new(IndexMap::new()),
        }
    }

    /// Insert a new `pending` project with a freshly generated id.
    pub async fn create(&self, input: NewProject) -> Project {
        let project = Project::new(new_id(), input, Utc::now());
        self.projects
            .write()
            .await
            .insert(project.id, project.clone());
        tracing::debug!(project_id = %project.id, "Project created");
        project
    }

    /// Fetch a project by id.
    pub async fn get(&self, id: DbId) -> Option<Project> {
        self.projects.read().await.get(&id).cloned()
    }

    /// All projects in creation order.
    pub async fn list(&self) -> Vec<Project> {
        self.projects.read().await.values().cloned().collect()
    }

    /// Edit descriptive fields. Returns `Ok(None)` if the id is unknown.
    pub async fn update(
        &self,
        id: DbId,
        input: &UpdateProject,
    ) -> Result<Option<Project>, CoreError> {
        let input = input.normalized()?;
        let mut projects = self.projects.write().await;
        let Some(project) = projects.get_mut(&id) else {
            return Ok(None);
        };
        project.apply_update(&input, Utc::now());
        Ok(Some(project.clone()))
    }

    /// Move a project from `pending` to `in_progress`.
    pub async fn mark_in_progress(&self, id: DbId) -> Result<Project, CoreError> {
        self.mutate(id, |p| p.start(Utc::now())).await
    }

    /// Record the pipeline stage a running project has entered.
    pub async fn set_stage(&self, id: DbId, stage: PipelineStage) -> Result<Project, CoreError> {
        self.mutate(id, |p| p.enter_stage(stage, Utc::now())).await
    }

    /// Store a successful outcome and mark the project `completed`.
    pub async fn complete(
        &self,
        id: DbId,
        outcome: CompletedGeneration,
    ) -> Result<Project, CoreError> {
        self.mutate(id, |p| p.complete(outcome, Utc::now())).await
    }

    /// Store an error message and mark the project `failed`.
    pub async fn fail(&self, id: DbId, message: &str) -> Result<Project, CoreError> {
        self.mutate(id, |p| p.fail(message, Utc::now())).await
    }

    /// Total number of projects.
    pub async fn count(&self) -> usize {
        self.projects.read().await.len()
    }

    /// Number of projects in each status.
    pub async fn status_counts(&self) -> StatusCounts {
        let projects = self.projects.read().await;
        let mut by_status: HashMap<ProjectStatus, usize> = HashMap::new();
        for project in projects.values() {
            *by_status.entry(project.status).or_default() += 1;
        }
        let get = |s: ProjectStatus| by_status.get(&s).copied().unwrap_or_default();
        StatusCounts {
            pending: get(ProjectStatus::Pending),
            in_progress: get(ProjectStatus::InProgress),
            completed: get(ProjectStatus::Completed),
            failed: get(ProjectStatus::Failed),
        }
    }

    async fn mutate<F>(&self, id: DbId, f: F) -> Result<Project, CoreError>
    where
        F: FnOnce(&mut Project) -> Result<(), CoreError>,
    {
        let mut projects = self.projects.write().await;
        let stored = projects.get_mut(&id).ok_or(CoreError::NotFound {
            entity: "Project",
            id,
        })?;
        let mut draft = stored.clone();
        f(&mut draft)?;
        *stored = draft.clone();
        Ok(draft)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
