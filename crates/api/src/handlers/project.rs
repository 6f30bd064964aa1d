//! Handlers for the `/projects` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use copydesk_core::error::CoreError;
use copydesk_core::types::DbId;
use copydesk_core::validation::{
    self, require_text, MAX_GUIDELINES_LEN, MAX_NAME_LEN, MAX_TOPIC_LEN,
};
use copydesk_events::bus::EVENT_PROJECT_CREATED;
use copydesk_events::ProjectEvent;
use copydesk_pipeline::ApiKey;
use copydesk_store::models::project::{NewProject, Project, UpdateProject};
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::response::DataResponse;
use crate::state::AppState;

/// Body of `POST /api/projects`.
///
/// Not `Debug`: it carries the caller's provider key.
#[derive(Deserialize, Validate)]
pub struct CreateProjectRequest {
    #[serde(default, alias = "project_name")]
    #[validate(length(max = MAX_NAME_LEN, message = "must be at most 200 characters"))]
    pub name: Option<String>,
    #[serde(default)]
    #[validate(length(max = MAX_TOPIC_LEN, message = "must be at most 500 characters"))]
    pub topic: Option<String>,
    #[serde(default)]
    #[validate(length(max = MAX_GUIDELINES_LEN, message = "must be at most 5000 characters"))]
    pub guidelines: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
}

/// Query string of `POST /api/projects`.
#[derive(Debug, Deserialize)]
pub struct CreateParams {
    /// Wait for the generation to finish before responding (default `true`).
    #[serde(default = "default_wait")]
    pub wait: bool,
}

fn default_wait() -> bool {
    true
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Project",
        id,
    })
}

/// POST /api/projects
///
/// Creates the project and runs the pipeline. By default the response is
/// sent once the project is `completed` or `failed`; with `?wait=false` it
/// returns `202 Accepted` straight away and the caller polls.
pub async fn create(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<CreateParams>,
    AppJson(input): AppJson<CreateProjectRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Project>>)> {
    let topic = require_text(input.topic.as_deref(), "Topic is required")?;
    let guidelines = require_text(input.guidelines.as_deref(), "Brand guidelines are required")?;
    let api_key = resolve_api_key(
        input.api_key.as_deref(),
        state.config.pipeline.default_api_key.as_ref(),
    )?;
    // Limits apply to the trimmed values that get stored.
    let checked = CreateProjectRequest {
        name: input
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string),
        topic: Some(topic.clone()),
        guidelines: Some(guidelines.clone()),
        api_key: None,
    };
    checked.validate().map_err(validation::into_core_error)?;

    let project = state
        .store
        .create(NewProject {
            name: checked.name,
            topic,
            guidelines,
        })
        .await;
    state
        .event_bus
        .publish(ProjectEvent::new(EVENT_PROJECT_CREATED, project.id));

    let (running, handle) = state.runner.start(&project, api_key).await?;

    if !params.wait {
        return Ok((StatusCode::ACCEPTED, Json(DataResponse { data: running })));
    }

    let finished = handle
        .await
        .map_err(|e| AppError::InternalError(format!("Generation task failed: {e}")))??;
    Ok((StatusCode::OK, Json(DataResponse { data: finished })))
}

/// The request's own key wins; otherwise fall back to the server default.
fn resolve_api_key(provided: Option<&str>, fallback: Option<&ApiKey>) -> Result<ApiKey, CoreError> {
    match provided.map(str::trim).filter(|k| !k.is_empty()) {
        Some(key) => Ok(ApiKey::new(key)),
        None => fallback.cloned().ok_or_else(|| {
            CoreError::Validation("Gemini / OpenAI API key is required".to_string())
        }),
    }
}

/// GET /api/projects
pub async fn list(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<Project>>>> {
    let projects = state.store.list().await;
    Ok(Json(DataResponse { data: projects }))
}

/// GET /api/projects/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<DataResponse<Project>>> {
    let project = state.store.get(id).await.ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: project }))
}

/// PUT /api/projects/{id}
pub async fn update(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateProject>,
) -> AppResult<Json<DataResponse<Project>>> {
    let project = state
        .store
        .update(id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: project }))
}

/// POST /api/projects/{id}/cancel
///
/// Signals a running generation to stop. The project turns `failed` with a
/// cancellation message once the task has wound down.
pub async fn cancel(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<(StatusCode, Json<DataResponse<Project>>)> {
    let cancelled = state.runner.cancel(id).await;
    let project = state.store.get(id).await.ok_or_else(|| not_found(id))?;

    if !cancelled {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Project is '{}' and has no running generation",
            project.status
        ))));
    }
    Ok((StatusCode::ACCEPTED, Json(DataResponse { data: project })))
}
