//! Copydesk project event bus.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`ProjectEvent`]: the lifecycle event envelope streamed to browsers.

pub mod bus;

pub use bus::{EventBus, ProjectEvent};
