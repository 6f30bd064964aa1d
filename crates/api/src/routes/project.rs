//! Route definitions for the `/projects` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{events, project};
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                 -> list
/// POST   /                 -> create (add ?wait=false to return immediately)
/// GET    /{id}             -> get_by_id
/// PUT    /{id}             -> update
/// POST   /{id}/cancel      -> cancel
/// GET    /{id}/events      -> stream_events
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(project::list).post(project::create))
        .route("/{id}", get(project::get_by_id).put(project::update))
        .route("/{id}/cancel", post(project::cancel))
        .route("/{id}/events", get(events::stream_events))
}
