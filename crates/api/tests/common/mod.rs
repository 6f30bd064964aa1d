#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use copydesk_api::config::{LogFormat, PipelineSettings, ServerConfig};
use copydesk_api::engine::PipelineRunner;
use copydesk_api::router::build_app_router;
use copydesk_api::state::AppState;
use copydesk_events::EventBus;
use copydesk_pipeline::{ApiKey, CompletionRequest, ContentPipeline, LlmError, LlmProvider};
use copydesk_store::ProjectStore;

/// Key the stub provider rejects the way Gemini rejects a bad key.
pub const INVALID_KEY: &str = "invalid-key";

pub const DRAFT: &str = "Agentic AI will make software friendlier for everyone.";
pub const FINAL_POST: &str = "Agentic AI is set to make everyday software friendlier and more helpful.";

/// Canned LLM that answers by agent role.
pub struct StubProvider {
    /// Delay before every answer, to keep generations in flight.
    pub delay: Duration,
}

#[async_trait]
impl LlmProvider for StubProvider {
    fn name(&self) -> &str {
        "stub"
    }

    async fn complete(
        &self,
        api_key: &ApiKey,
        request: &CompletionRequest,
    ) -> Result<String, LlmError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if api_key.expose() == INVALID_KEY {
            return Err(LlmError::Api {
                status: 400,
                message: "API key not valid. Please pass a valid API key.".to_string(),
            });
        }

        let reply = if request.system.contains("Creative Content Writer") {
            DRAFT.to_string()
        } else if request.system.contains("Brand Compliance Reviewer") {
            format!(
                "VERDICT: APPROVED\nFEEDBACK: Tone is optimistic and jargon free.\nFINAL POST:\n{FINAL_POST}"
            )
        } else {
            "VERDICT: GO\nNo legal or copyright concerns.".to_string()
        };
        Ok(reply)
    }
}

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin and a 30-second request
/// timeout.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        static_dir: "../../frontend".to_string(),
        log_format: LogFormat::Pretty,
        pipeline: PipelineSettings {
            timeout_secs: 10,
            ..PipelineSettings::default()
        },
    }
}

/// Build shared state around the stub provider.
pub fn build_test_state(config: &ServerConfig, delay: Duration) -> AppState {
    let provider = Arc::new(StubProvider { delay });
    let pipeline = Arc::new(ContentPipeline::new(
        provider,
        config.pipeline.pipeline_config(),
    ));
    let store = Arc::new(ProjectStore::new());
    let event_bus = Arc::new(EventBus::default());
    let runner = Arc::new(PipelineRunner::new(
        Arc::clone(&store),
        Arc::clone(&event_bus),
        pipeline,
    ));

    AppState {
        store,
        config: Arc::new(config.clone()),
        event_bus,
        runner,
    }
}

/// Build the full application router over the given state, with the same
/// middleware stack production uses.
pub fn build_app(state: AppState) -> Router {
    let config = state.config.as_ref().clone();
    build_app_router(state, &config)
}

/// Router backed by a fresh store and an instant stub provider.
pub fn build_test_app() -> (Router, AppState) {
    let state = build_test_state(&test_config(), Duration::ZERO);
    (build_app(state.clone()), state)
}

pub async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send_json(app, Method::POST, uri, body).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send_json(app, Method::PUT, uri, body).await
}

pub async fn post_empty(app: Router, uri: &str) -> Response {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

async fn send_json(app: Router, method: Method, uri: &str, body: serde_json::Value) -> Response {
    app.oneshot(
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

/// A valid creation body for the given topic.
pub fn create_body(topic: &str) -> serde_json::Value {
    serde_json::json!({
        "topic": topic,
        "guidelines": "Tone must be optimistic, avoid jargon",
        "api_key": "test-key",
    })
}

/// Poll `GET /api/projects/{id}` until the project is terminal.
pub async fn wait_for_terminal(state: &AppState, id: &str) -> serde_json::Value {
    for _ in 0..200 {
        let response = get(build_app(state.clone()), &format!("/api/projects/{id}")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let status = json["data"]["status"].as_str().unwrap_or_default().to_string();
        if status == "completed" || status == "failed" {
            return json;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("project {id} never reached a terminal state");
}
