//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for [`ProjectEvent`]s. It is
//! shared via `Arc<EventBus>` between the pipeline runner (publisher) and
//! the event stream endpoint (subscribers).

use chrono::{DateTime, Utc};
use copydesk_core::lifecycle::PipelineStage;
use copydesk_core::types::DbId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

pub const EVENT_PROJECT_CREATED: &str = "project.created";
pub const EVENT_PROJECT_STAGE: &str = "project.stage";
pub const EVENT_PROJECT_COMPLETED: &str = "project.completed";
pub const EVENT_PROJECT_FAILED: &str = "project.failed";

// ---------------------------------------------------------------------------
// ProjectEvent
// ---------------------------------------------------------------------------

/// Something that happened to a project.
///
/// Constructed via [`ProjectEvent::new`] and enriched with
/// [`with_stage`](ProjectEvent::with_stage) and
/// [`with_payload`](ProjectEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectEvent {
    /// Dot-separated event name, e.g. `"project.stage"`.
    pub event_type: String,

    /// The project the event is about.
    pub project_id: DbId,

    /// Pipeline stage, for stage events.
    pub stage: Option<PipelineStage>,

    /// Free-form JSON payload carrying event-specific data.
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl ProjectEvent {
    pub fn new(event_type: impl Into<String>, project_id: DbId) -> Self {
        Self {
            event_type: event_type.into(),
            project_id,
            stage: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    pub fn with_stage(mut self, stage: PipelineStage) -> Self {
        self.stage = Some(stage);
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    /// Whether this is the last event a project will ever produce.
    pub fn is_terminal(&self) -> bool {
        self.event_type == EVENT_PROJECT_COMPLETED || self.event_type == EVENT_PROJECT_FAILED
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`ProjectEvent`].
pub struct EventBus {
    sender: broadcast::Sender<ProjectEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped.
    pub fn publish(&self, event: ProjectEvent) {
        tracing::trace!(
            event_type = %event.event_type,
            project_id = %event.project_id,
            "Publishing project event",
        );
        // A SendError only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<ProjectEvent> {
        self.sender.subscribe()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
