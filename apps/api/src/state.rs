use std::sync::Arc;

use sqlx::SqlitePool;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::embedding::Embedder;
use crate::screening::analysis::FitAnalyzer;
use crate::screening::session::ActiveScreening;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Config,
    /// OpenAI embeddings in production; swapped for a deterministic fake in tests.
    pub embedder: Arc<dyn Embedder>,
    /// LLM analyzer by default. `FIT_ANALYZER=keyword` selects the offline scorer.
    pub fit_analyzer: Arc<dyn FitAnalyzer>,
    /// Current JD and its latest ranked results. Never held across network calls.
    pub screening: Arc<RwLock<ActiveScreening>>,
}
