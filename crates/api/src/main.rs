use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use copydesk_api::config::{LogFormat, ServerConfig};
use copydesk_api::engine::PipelineRunner;
use copydesk_api::router::build_app_router;
use copydesk_api::state::AppState;
use copydesk_events::EventBus;
use copydesk_pipeline::{ContentPipeline, GeminiClient};
use copydesk_store::ProjectStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config = ServerConfig::from_env();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "copydesk_api=debug,copydesk_pipeline=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }

    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    if config.request_timeout_secs <= config.pipeline.timeout_secs {
        tracing::warn!(
            request_timeout_secs = config.request_timeout_secs,
            pipeline_timeout_secs = config.pipeline.timeout_secs,
            "Request timeout does not exceed the pipeline timeout; waiting creates may be cut off",
        );
    }
    if config.pipeline.default_api_key.is_some() {
        tracing::info!("Default API key configured; requests may omit api_key");
    }

    // --- Pipeline ---
    let provider = Arc::new(GeminiClient::new(config.pipeline.gemini_config()));
    tracing::info!(model = %provider.model(), "LLM provider ready");
    let pipeline = Arc::new(ContentPipeline::new(provider, config.pipeline.pipeline_config()));

    // --- Shared state ---
    let store = Arc::new(ProjectStore::new());
    let event_bus = Arc::new(EventBus::default());
    let runner = Arc::new(PipelineRunner::new(
        Arc::clone(&store),
        Arc::clone(&event_bus),
        pipeline,
    ));

    let state = AppState {
        store,
        config: Arc::new(config.clone()),
        event_bus,
        runner: Arc::clone(&runner),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Invalid HOST or PORT");
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(Arc::clone(&runner)))
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    runner
        .shutdown(Duration::from_secs(config.shutdown_timeout_secs))
        .await;

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix). Running generations
/// are cancelled right away so open waiting requests can complete.
async fn shutdown_signal(runner: Arc<PipelineRunner>) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }

    runner.begin_shutdown();
}
