use anyhow::{bail, Context, Result};

/// Which backend produces the per-resume fit analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitAnalyzerKind {
    Llm,
    Keyword,
}

impl std::str::FromStr for FitAnalyzerKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "llm" => Ok(FitAnalyzerKind::Llm),
            "keyword" => Ok(FitAnalyzerKind::Keyword),
            other => bail!("FIT_ANALYZER must be 'llm' or 'keyword', got '{other}'"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub database_url: String,
    pub port: u16,
    pub rust_log: String,
    pub max_upload_mb: u64,
    pub fit_analyzer: FitAnalyzerKind,
    pub embedding_batch_size: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            openai_api_key: require_env("OPENAI_API_KEY")?,
            openai_base_url: optional_env("OPENAI_BASE_URL", "https://api.openai.com/v1")
                .trim_end_matches('/')
                .to_string(),
            database_url: optional_env("DATABASE_URL", "sqlite:resume_screening.db"),
            port: optional_env("PORT", "8000")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional_env("RUST_LOG", "info"),
            max_upload_mb: optional_env("MAX_UPLOAD_MB", "10")
                .parse::<u64>()
                .context("MAX_UPLOAD_MB must be a whole number of megabytes")?,
            fit_analyzer: optional_env("FIT_ANALYZER", "llm").parse()?,
            embedding_batch_size: optional_env("EMBEDDING_BATCH_SIZE", "10")
                .parse::<usize>()
                .context("EMBEDDING_BATCH_SIZE must be a positive integer")?
                .max(1),
        })
    }

    /// Per-file upload limit in bytes.
    pub fn max_upload_bytes(&self) -> usize {
        (self.max_upload_mb as usize).saturating_mul(1024 * 1024)
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
