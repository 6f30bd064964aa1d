//! The content pipeline entry point.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use copydesk_core::lifecycle::PipelineStage;
use copydesk_core::outcome::{ComplianceReport, ReviewVerdict};
use tokio_util::sync::CancellationToken;

use crate::crew::{Crew, GenerationSettings, StageObserver};
use crate::error::PipelineError;
use crate::llm::{ApiKey, LlmProvider};
use crate::review::{parse_compliance, parse_review, resolve_final_post};
use crate::task::Task;

/// Default time budget for a whole run.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(240);

/// Tunables for every run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Upper bound on the whole run, all stages included.
    pub timeout: Duration,
    /// Append the legal/ethics compliance stage.
    pub compliance_check: bool,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            compliance_check: false,
            temperature: 0.7,
            max_output_tokens: 2048,
        }
    }
}

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutput {
    /// The final approved post.
    pub result: String,
    pub writer_output: String,
    pub reviewer_feedback: String,
    pub review_verdict: Option<ReviewVerdict>,
    pub compliance: Option<ComplianceReport>,
}

/// Writer -> reviewer (-> compliance) pipeline over an [`LlmProvider`].
pub struct ContentPipeline {
    provider: Arc<dyn LlmProvider>,
    config: PipelineConfig,
}

impl ContentPipeline {
    pub fn new(provider: Arc<dyn LlmProvider>, config: PipelineConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Assemble the task sequence for one topic.
    pub fn build_crew(&self, topic: &str, guidelines: &str) -> Crew {
        let inputs = HashMap::from([("topic", topic), ("guidelines", guidelines)]);
        let mut tasks = vec![Task::write(&inputs), Task::review(&inputs)];
        if self.config.compliance_check {
            tasks.push(Task::compliance(&inputs));
        }
        Crew::sequential(tasks)
    }

    /// Run the pipeline to completion, timeout, or cancellation.
    pub async fn run(
        &self,
        topic: &str,
        guidelines: &str,
        api_key: &ApiKey,
        observer: &dyn StageObserver,
        cancel: &CancellationToken,
    ) -> Result<PipelineOutput, PipelineError> {
        let crew = self.build_crew(topic, guidelines);
        let settings = GenerationSettings {
            temperature: self.config.temperature,
            max_output_tokens: self.config.max_output_tokens,
        };
        let work = crew.kickoff(self.provider.as_ref(), api_key, settings, observer);

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(PipelineError::Cancelled),
            outcome = tokio::time::timeout(self.config.timeout, work) => match outcome {
                Ok(output) => assemble(&output?),
                Err(_) => Err(PipelineError::Timeout(self.config.timeout)),
            },
        }
    }
}

fn assemble(output: &crate::crew::CrewOutput) -> Result<PipelineOutput, PipelineError> {
    let draft = output
        .output(PipelineStage::Writing)
        .ok_or(PipelineError::EmptyOutput(PipelineStage::Writing))?;
    let raw_review = output
        .output(PipelineStage::Reviewing)
        .ok_or(PipelineError::EmptyOutput(PipelineStage::Reviewing))?;

    let review = parse_review(raw_review);
    let result = resolve_final_post(&review, draft, raw_review);

    Ok(PipelineOutput {
        result,
        writer_output: draft.to_string(),
        reviewer_feedback: review.feedback,
        review_verdict: review.verdict,
        compliance: output.output(PipelineStage::Compliance).map(parse_compliance),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
