//! Server-sent event stream of one project's lifecycle.
//!
//! The stream opens with a `snapshot` event holding the current record, then
//! relays `project.stage`, `project.completed` and `project.failed` events
//! for that project, and ends after the terminal one.

use std::convert::Infallible;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use copydesk_core::error::CoreError;
use copydesk_core::types::DbId;
use futures::stream::{self, Stream, StreamExt};
use tokio::sync::broadcast::error::RecvError;

use crate::error::{AppError, AppResult};
use crate::extract::AppPath;
use crate::state::AppState;

/// GET /api/projects/{id}/events
pub async fn stream_events(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    // Subscribe before reading the snapshot so nothing falls in between.
    let rx = state.event_bus.subscribe();
    let project = state.store.get(id).await.ok_or(AppError::Core(CoreError::NotFound {
        entity: "Project",
        id,
    }))?;

    let snapshot = json_event("snapshot", &project);
    let rx = if project.status.is_terminal() {
        None
    } else {
        Some(rx)
    };

    let updates = stream::unfold(rx, move |rx| async move {
        let mut rx = rx?;
        loop {
            match rx.recv().await {
                Ok(event) if event.project_id == id => {
                    let sse = json_event(&event.event_type, &event);
                    let next = if event.is_terminal() { None } else { Some(rx) };
                    return Some((Ok::<_, Infallible>(sse), next));
                }
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(project_id = %id, skipped, "Event stream lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    let events = stream::once(async move { Ok::<_, Infallible>(snapshot) }).chain(updates);
    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

fn json_event<T: serde::Serialize>(name: &str, payload: &T) -> Event {
    match Event::default().event(name).json_data(payload) {
        Ok(event) => event,
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize event payload");
            Event::default().event(name).comment("unserializable payload")
        }
    }
}

