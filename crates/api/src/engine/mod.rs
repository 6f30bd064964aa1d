//! Generation engine: runs the content pipeline for projects.

pub mod runner;

pub use runner::PipelineRunner;
