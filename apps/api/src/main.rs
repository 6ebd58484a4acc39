mod config;
mod db;
mod embedding;
mod errors;
mod intake;
mod llm_client;
mod models;
mod routes;
mod screening;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, FitAnalyzerKind};
use crate::db::create_pool;
use crate::embedding::{Embedder, OpenAiEmbedder};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::screening::analysis::{FitAnalyzer, KeywordFitAnalyzer, LlmFitAnalyzer};
use crate::screening::session::ActiveScreening;
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

    info!("Starting Resume Screening API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize SQLite (schema is bootstrapped on connect)
    let db = create_pool(&config.database_url).await?;

    let embedder: Arc<dyn Embedder> = Arc::new(OpenAiEmbedder::new(
        config.openai_api_key.clone(),
        config.openai_base_url.clone(),
    )?);
    info!("Embedder initialized (model: {})", embedder.model_name());

    let fit_analyzer: Arc<dyn FitAnalyzer> = match config.fit_analyzer {
        FitAnalyzerKind::Llm => {
            let llm = LlmClient::new(
                config.openai_api_key.clone(),
                config.openai_base_url.clone(),
            )?;
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            Arc::new(LlmFitAnalyzer(llm))
        }
        FitAnalyzerKind::Keyword => Arc::new(KeywordFitAnalyzer),
    };
    info!("Fit analyzer: {}", fit_analyzer.backend());

    let state = AppState {
        db,
        config: config.clone(),
        embedder,
        fit_analyzer,
        screening: Arc::new(RwLock::new(ActiveScreening::default())),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
