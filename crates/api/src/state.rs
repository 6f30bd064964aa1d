use std::sync::Arc;

use copydesk_events::EventBus;
use copydesk_store::ProjectStore;

use crate::config::ServerConfig;
use crate::engine::PipelineRunner;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// The one project store for this process.
    pub store: Arc<ProjectStore>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Project lifecycle events, consumed by the event stream endpoint.
    pub event_bus: Arc<EventBus>,
    /// Spawns and tracks generation tasks.
    pub runner: Arc<PipelineRunner>,
}
