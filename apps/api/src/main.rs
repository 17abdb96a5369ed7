mod completion;
mod config;
mod conversation;
mod errors;
mod models;
mod panel;
mod routes;
mod scoring;
mod screening;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::completion::azure::AzureOpenAiClient;
use crate::completion::gemini::GeminiClient;
use crate::completion::local::LocalLlmClient;
use crate::completion::openai::OpenAiClient;
use crate::completion::CompletionClient;
use crate::config::{BackendConfig, Config};
use crate::routes::build_router;
use crate::screening::registry::SessionRegistry;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Conclave API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the completion backend
    let completion = build_completion_client(&config.backend);
    info!(
        "Completion backend initialized (service: {}, model: {}, orchestrator model: {})",
        config.backend.service_name(),
        config.backend.model(),
        config.backend.orchestrator_model()
    );

    // Build app state
    let state = AppState {
        completion,
        config: config.clone(),
        sessions: SessionRegistry::new(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs the completion client for whichever provider `AI_SERVICE`
/// selected. Exactly one backend is live per process.
fn build_completion_client(backend: &BackendConfig) -> Arc<dyn CompletionClient> {
    match backend {
        BackendConfig::Azure {
            endpoint,
            api_key,
            api_version,
            ..
        } => Arc::new(AzureOpenAiClient::new(
            endpoint.clone(),
            api_key.clone(),
            api_version.clone(),
        )),
        BackendConfig::OpenAi { api_key, .. } => Arc::new(OpenAiClient::new(api_key.clone())),
        BackendConfig::Gemini { api_key, .. } => Arc::new(GeminiClient::new(api_key.clone())),
        BackendConfig::Local { base_url, .. } => Arc::new(LocalLlmClient::new(base_url.clone())),
    }
}
