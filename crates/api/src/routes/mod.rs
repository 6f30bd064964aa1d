pub mod health;
pub mod project;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /health                              service health and project counts
///
/// /projects                            list, create
/// /projects/{id}                       get, update
/// /projects/{id}/cancel                cancel a running generation (POST)
/// /projects/{id}/events                lifecycle event stream (SSE)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/projects", project::router())
}
