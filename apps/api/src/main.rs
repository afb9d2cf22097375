mod config;
mod errors;
mod generation;
mod history;
mod llm_client;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::generation::pipeline::GenerationPipeline;
use crate::history::HistoryStore;
use crate::llm_client::{LlmClient, TextGenerator};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Jobcraft API v{}", env!("CARGO_PKG_VERSION"));

    // Pick the history backend once; it stays fixed for the process lifetime
    let history = HistoryStore::from_config(&config).await?;

    // Initialize LLM client (optional: generation routes report NOT_CONFIGURED without it)
    let provider: Option<Arc<dyn TextGenerator>> = match &config.openai_api_key {
        Some(key) => {
            let client: Arc<dyn TextGenerator> =
                Arc::new(LlmClient::new(key.clone(), &config.openai_base_url)?);
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            Some(client)
        }
        None => {
            warn!("OPENAI_API_KEY is not set; generation routes are disabled until it is configured");
            None
        }
    };

    // Build app state
    let state = AppState {
        generation: GenerationPipeline::new(provider, history.clone()),
        history,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
