//! Sequential execution of a task list.
//!
//! Each task runs after the previous one finished and sees the outputs of
//! the stages listed in its `context`. Stages are reported to a
//! [`StageObserver`] before they start, which is how callers get real
//! progress instead of guessing.

use async_trait::async_trait;
use copydesk_core::lifecycle::PipelineStage;

use crate::error::PipelineError;
use crate::llm::{ApiKey, CompletionRequest, LlmProvider};
use crate::task::Task;

/// Receives progress notifications from a running crew.
#[async_trait]
pub trait StageObserver: Send + Sync {
    async fn stage_started(&self, stage: PipelineStage);
}

/// Observer that ignores everything.
pub struct NoopObserver;

#[async_trait]
impl StageObserver for NoopObserver {
    async fn stage_started(&self, _stage: PipelineStage) {}
}

/// Text produced by one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOutput {
    pub stage: PipelineStage,
    pub agent_role: String,
    pub raw: String,
}

/// Outputs of every task, in execution order.
#[derive(Debug, Clone, Default)]
pub struct CrewOutput {
    pub tasks: Vec<TaskOutput>,
}

impl CrewOutput {
    /// Output of the given stage, if it ran.
    pub fn output(&self, stage: PipelineStage) -> Option<&str> {
        self.tasks
            .iter()
            .find(|t| t.stage == stage)
            .map(|t| t.raw.as_str())
    }

    /// Output of the last task.
    pub fn final_output(&self) -> Option<&str> {
        self.tasks.last().map(|t| t.raw.as_str())
    }
}

/// Sampling settings applied to every call in a run.
#[derive(Debug, Clone, Copy)]
pub struct GenerationSettings {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

/// An ordered list of tasks executed one after another.
pub struct Crew {
    tasks: Vec<Task>,
}

impl Crew {
    pub fn sequential(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    /// Stages in execution order.
    pub fn stages(&self) -> Vec<PipelineStage> {
        self.tasks.iter().map(|t| t.stage).collect()
    }

    /// Run every task in order. Stops at the first failure.
    pub async fn kickoff(
        &self,
        provider: &dyn LlmProvider,
        api_key: &ApiKey,
        settings: GenerationSettings,
        observer: &dyn StageObserver,
    ) -> Result<CrewOutput, PipelineError> {
        let mut output = CrewOutput::default();

        for task in &self.tasks {
            observer.stage_started(task.stage).await;
            tracing::debug!(
                stage = %task.stage,
                agent = %task.agent.role,
                provider = provider.name(),
                "Running crew task",
            );

            let request = CompletionRequest {
                system: task.agent.system_prompt(),
                prompt: task_prompt(task, &output),
                temperature: settings.temperature,
                max_output_tokens: settings.max_output_tokens,
            };

            let raw = provider
                .complete(api_key, &request)
                .await
                .map_err(|source| PipelineError::Stage {
                    stage: task.stage,
                    source,
                })?;

            let raw = raw.trim();
            if raw.is_empty() {
                return Err(PipelineError::EmptyOutput(task.stage));
            }

            output.tasks.push(TaskOutput {
                stage: task.stage,
                agent_role: task.agent.role.clone(),
                raw: raw.to_string(),
            });
        }

        Ok(output)
    }
}

/// Build the user prompt: description, expected output, then any context.
fn task_prompt(task: &Task, done: &CrewOutput) -> String {
    let mut prompt = format!(
        "{}\n\nThis is the expected criteria for your final answer: {}",
        task.description, task.expected_output
    );

    let context: Vec<String> = task
        .context
        .iter()
        .filter_map(|stage| {
            done.tasks
                .iter()
                .find(|t| t.stage == *stage)
                .map(|t| format!("--- Output of the {} ---\n{}", t.agent_role, t.raw))
        })
        .collect();

    if !context.is_empty() {
        prompt.push_str("\n\nThis is the context you're working with:\n");
        prompt.push_str(&context.join("\n\n"));
    }
    prompt
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
