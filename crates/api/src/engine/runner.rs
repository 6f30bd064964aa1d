//! Pipeline runner.
//!
//! Every generation runs on its own Tokio task, bounded by the pipeline
//! timeout and tied to a child of the server-wide cancellation token.
//! The HTTP handler may wait for the task or return immediately; either way
//! the project reaches a terminal state without the client staying around.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use copydesk_core::error::CoreError;
use copydesk_core::lifecycle::PipelineStage;
use copydesk_core::types::DbId;
use copydesk_events::bus::{EVENT_PROJECT_COMPLETED, EVENT_PROJECT_FAILED, EVENT_PROJECT_STAGE};
use copydesk_events::{EventBus, ProjectEvent};
use copydesk_pipeline::{ApiKey, ContentPipeline, PipelineOutput, StageObserver};
use copydesk_store::models::project::{CompletedGeneration, Project};
use copydesk_store::ProjectStore;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// Handle to a started generation. Resolves to the terminal project.
pub type RunHandle = JoinHandle<Result<Project, CoreError>>;

/// Spawns, tracks and cancels generation tasks.
pub struct PipelineRunner {
    store: Arc<ProjectStore>,
    event_bus: Arc<EventBus>,
    pipeline: Arc<ContentPipeline>,
    shutdown: CancellationToken,
    tracker: TaskTracker,
    in_flight: Mutex<HashMap<DbId, CancellationToken>>,
}

impl PipelineRunner {
    pub fn new(
        store: Arc<ProjectStore>,
        event_bus: Arc<EventBus>,
        pipeline: Arc<ContentPipeline>,
    ) -> Self {
        Self {
            store,
            event_bus,
            pipeline,
            shutdown: CancellationToken::new(),
            tracker: TaskTracker::new(),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Move a pending project to `in_progress` and spawn its generation.
    ///
    /// Returns the project as it is once running, plus a handle resolving to
    /// the terminal project.
    pub async fn start(
        self: &Arc<Self>,
        project: &Project,
        api_key: ApiKey,
    ) -> Result<(Project, RunHandle), CoreError> {
        let id = project.id;
        let running = self.store.mark_in_progress(id).await?;

        let cancel = self.shutdown.child_token();
        self.in_flight.lock().await.insert(id, cancel.clone());

        tracing::info!(
            project_id = %id,
            provider = self.pipeline.provider_name(),
            "Generation started",
        );

        let runner = Arc::clone(self);
        let topic = project.topic.clone();
        let guidelines = project.guidelines.clone();

        let handle = self.tracker.spawn(async move {
            // Run on a nested task so a panic inside the pipeline still
            // leaves the project in a terminal state.
            let work = tokio::spawn({
                let runner = Arc::clone(&runner);
                async move { runner.execute(id, &topic, &guidelines, &api_key, &cancel).await }
            });

            match work.await {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!(project_id = %id, error = %e, "Generation task aborted");
                    runner.in_flight.lock().await.remove(&id);
                    runner
                        .record_failure(id, "Generation task aborted unexpectedly")
                        .await
                }
            }
        });

        Ok((running, handle))
    }

    /// Cancel a running generation. Returns `false` if none was running.
    pub async fn cancel(&self, id: DbId) -> bool {
        match self.in_flight.lock().await.get(&id) {
            Some(token) => {
                tracing::info!(project_id = %id, "Cancelling generation");
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Number of generations currently running.
    pub async fn in_flight(&self) -> usize {
        self.in_flight.lock().await.len()
    }

    /// Cancel every running generation. Runs started afterwards fail
    /// immediately as cancelled.
    ///
    /// Call this as soon as a termination signal arrives: waiting creates
    /// hold their HTTP request open until the run ends, so the server cannot
    /// finish its graceful shutdown before the runs are stopped.
    pub fn begin_shutdown(&self) {
        if self.shutdown.is_cancelled() {
            return;
        }
        tracing::info!("Cancelling running generations for shutdown");
        self.shutdown.cancel();
        self.tracker.close();
    }

    /// Cancel everything and wait up to `timeout` for tasks to settle.
    pub async fn shutdown(&self, timeout: Duration) {
        let running = self.in_flight().await;
        tracing::info!(running, "Stopping pipeline runner");
        self.begin_shutdown();
        if tokio::time::timeout(timeout, self.tracker.wait())
            .await
            .is_err()
        {
            tracing::warn!("Pipeline runner did not drain before the shutdown timeout");
        }
    }

    async fn execute(
        &self,
        id: DbId,
        topic: &str,
        guidelines: &str,
        api_key: &ApiKey,
        cancel: &CancellationToken,
    ) -> Result<Project, CoreError> {
        let observer = ProjectObserver {
            id,
            store: Arc::clone(&self.store),
            event_bus: Arc::clone(&self.event_bus),
        };

        let outcome = self
            .pipeline
            .run(topic, guidelines, api_key, &observer, cancel)
            .await;
        // Deregister before recording so a successful cancel() always
        // precedes the terminal write.
        self.in_flight.lock().await.remove(&id);

        match outcome {
            Ok(output) => self.record_success(id, output).await,
            Err(e) => {
                tracing::warn!(project_id = %id, error = %e, "Generation failed");
                self.record_failure(id, &e.to_string()).await
            }
        }
    }

    async fn record_success(&self, id: DbId, output: PipelineOutput) -> Result<Project, CoreError> {
        let outcome = CompletedGeneration {
            result: output.result,
            writer_output: output.writer_output,
            reviewer_feedback: output.reviewer_feedback,
            review_verdict: output.review_verdict,
            compliance: output.compliance,
        };

        match self.store.complete(id, outcome).await {
            Ok(project) => {
                tracing::info!(project_id = %id, "Generation completed");
                self.event_bus.publish(
                    ProjectEvent::new(EVENT_PROJECT_COMPLETED, id).with_payload(
                        serde_json::json!({ "review_verdict": project.review_verdict }),
                    ),
                );
                Ok(project)
            }
            Err(e) => {
                tracing::error!(project_id = %id, error = %e, "Failed to store generation result");
                self.record_failure(id, &format!("Failed to store result: {e}"))
                    .await
            }
        }
    }

    async fn record_failure(&self, id: DbId, message: &str) -> Result<Project, CoreError> {
        let project = self.store.fail(id, message).await?;
        self.event_bus.publish(
            ProjectEvent::new(EVENT_PROJECT_FAILED, id)
                .with_payload(serde_json::json!({ "error": project.error })),
        );
        Ok(project)
    }
}

/// Mirrors pipeline progress onto the project record and the event bus.
struct ProjectObserver {
    id: DbId,
    store: Arc<ProjectStore>,
    event_bus: Arc<EventBus>,
}

#[async_trait]
impl StageObserver for ProjectObserver {
    async fn stage_started(&self, stage: PipelineStage) {
        if let Err(e) = self.store.set_stage(self.id, stage).await {
            tracing::error!(project_id = %self.id, %stage, error = %e, "Failed to record stage");
            return;
        }
        tracing::debug!(project_id = %self.id, %stage, "Stage started");
        self.event_bus
            .publish(ProjectEvent::new(EVENT_PROJECT_STAGE, self.id).with_stage(stage));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use copydesk_core::lifecycle::ProjectStatus;
    use copydesk_pipeline::{CompletionRequest, LlmError, LlmProvider, PipelineConfig};
    use copydesk_store::models::project::NewProject;

    use super::*;

    /// Answers every agent after `delay` with a reviewer-shaped reply.
    struct Slow {
        delay: Duration,
    }

    #[async_trait]
    impl LlmProvider for Slow {
        fn name(&self) -> &str {
            "slow"
        }

        async fn complete(
            &self,
            _api_key: &ApiKey,
            _request: &CompletionRequest,
        ) -> Result<String, LlmError> {
            tokio::time::sleep(self.delay).await;
            Ok("VERDICT: APPROVED\nFEEDBACK: Fine.\nFINAL POST:\nA short post.".to_string())
        }
    }

    fn runner(delay: Duration) -> Arc<PipelineRunner> {
        let pipeline = ContentPipeline::new(Arc::new(Slow { delay }), PipelineConfig::default());
        Arc::new(PipelineRunner::new(
            Arc::new(ProjectStore::new()),
            Arc::new(EventBus::default()),
            Arc::new(pipeline),
        ))
    }

    async fn pending_project(runner: &PipelineRunner) -> Project {
        runner
            .store
            .create(NewProject {
                name: None,
                topic: "Rust at work".to_string(),
                guidelines: "Be concise".to_string(),
            })
            .await
    }

    #[tokio::test]
    async fn finished_generation_is_no_longer_cancellable() {
        let runner = runner(Duration::ZERO);
        let mut events = runner.event_bus.subscribe();
        let project = pending_project(&runner).await;

        let (_, handle) = runner.start(&project, ApiKey::new("key")).await.unwrap();

        loop {
            let event = events.recv().await.unwrap();
            if event.project_id == project.id && event.is_terminal() {
                break;
            }
        }
        // The terminal state is already visible, so the token must be gone.
        assert!(!runner.cancel(project.id).await);
        assert_eq!(runner.in_flight().await, 0);

        let done = handle.await.unwrap().unwrap();
        assert_eq!(done.status, ProjectStatus::Completed);
    }

    #[tokio::test]
    async fn begin_shutdown_cancels_running_generations() {
        let runner = runner(Duration::from_secs(30));
        let project = pending_project(&runner).await;
        let (_, handle) = runner.start(&project, ApiKey::new("key")).await.unwrap();

        runner.begin_shutdown();

        let done = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("generation should stop promptly")
            .unwrap()
            .unwrap();
        assert_eq!(done.status, ProjectStatus::Failed);
        assert_eq!(done.error.as_deref(), Some("Generation cancelled"));
        assert_eq!(runner.in_flight().await, 0);
    }

    #[tokio::test]
    async fn runs_started_after_shutdown_fail_as_cancelled() {
        let runner = runner(Duration::from_secs(30));
        runner.begin_shutdown();

        let project = pending_project(&runner).await;
        let (_, handle) = runner.start(&project, ApiKey::new("key")).await.unwrap();

        let done = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("generation should stop promptly")
            .unwrap()
            .unwrap();
        assert_eq!(done.error.as_deref(), Some("Generation cancelled"));
    }
}
