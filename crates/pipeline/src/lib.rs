//! Copydesk content pipeline.
//!
//! Turns a topic and brand guidelines into a reviewed blog post by running
//! role-configured agents in sequence against a hosted LLM:
//!
//! 1. the Creative Content Writer drafts the post,
//! 2. the Brand Compliance Reviewer checks it against the guidelines and
//!    produces the final approved version,
//! 3. optionally, the Legal and Ethics Compliance Officer gives a go / no-go.
//!
//! [`ContentPipeline`] is the entry point. The LLM is reached through the
//! [`LlmProvider`] trait; [`GeminiClient`] is the production implementation.

pub mod agent;
pub mod crew;
pub mod error;
pub mod gemini;
pub mod invoker;
pub mod llm;
pub mod review;
pub mod task;

pub use crew::{Crew, CrewOutput, NoopObserver, StageObserver, TaskOutput};
pub use error::PipelineError;
pub use gemini::{GeminiClient, GeminiConfig};
pub use invoker::{ContentPipeline, PipelineConfig, PipelineOutput};
pub use llm::{ApiKey, CompletionRequest, LlmError, LlmProvider};
