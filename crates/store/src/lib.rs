//! In-memory project store.
//!
//! Projects live only for the lifetime of the process. The store is a single
//! owned instance shared through `Arc`; there is no global state.

pub mod models;
pub mod store;

pub use store::{ProjectStore, StatusCounts};
