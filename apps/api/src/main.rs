mod config;
mod errors;
mod ingest;
mod llm_client;
mod matching;
mod models;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::matching::enrichment::LlmReasonEnricher;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Cyno API v{}", env!("CARGO_PKG_VERSION"));

    let mut state = AppState::new(config.clone());
    info!("Fit scorer initialized (backend: {})", state.scorer.backend());

    // Reason elaboration is optional; without a server the explain endpoint stays rule-based
    match &config.llm_base_url {
        Some(base_url) => {
            let llm = LlmClient::new(base_url, &config.llm_model, config.llm_timeout)?;
            info!("LLM client initialized (model: {}, url: {})", llm.model(), base_url);
            state = state.with_enricher(Arc::new(LlmReasonEnricher(llm)));
        }
        None => info!("LLM_BASE_URL not set, reason elaboration disabled"),
    }

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
