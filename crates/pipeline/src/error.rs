use std::time::Duration;

use copydesk_core::lifecycle::PipelineStage;

use crate::llm::LlmError;

/// Why a pipeline run did not produce a post.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The provider call for one stage failed.
    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: PipelineStage,
        #[source]
        source: LlmError,
    },

    /// A stage returned only whitespace.
    #[error("{0} stage produced no output")]
    EmptyOutput(PipelineStage),

    /// The run exceeded its time budget.
    #[error("Generation timed out after {0:?}")]
    Timeout(Duration),

    /// The run was cancelled before it finished.
    #[error("Generation cancelled")]
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_message_keeps_sub_second_budgets() {
        assert_eq!(
            PipelineError::Timeout(Duration::from_millis(500)).to_string(),
            "Generation timed out after 500ms"
        );
        assert_eq!(
            PipelineError::Timeout(Duration::from_secs(1)).to_string(),
            "Generation timed out after 1s"
        );
    }
}
