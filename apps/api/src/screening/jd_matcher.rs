//! Job Description Matcher — holds one job description, its embedding and the fit analyzer.
//!
//! The JD is embedded exactly once, in [`JobMatcher::new`]; every resume is then compared
//! against that in-memory vector.

use std::sync::Arc;

use tracing::info;

use crate::embedding::{cosine_similarity, normalize_vector, Embedder};
use crate::errors::AppError;
use crate::intake::parser::ParsedResume;
use crate::screening::analysis::{FitAnalysis, FitAnalyzer};

pub struct JobMatcher {
    job_description: String,
    jd_embedding: Vec<f32>,
    embedder: Arc<dyn Embedder>,
    analyzer: Arc<dyn FitAnalyzer>,
}

impl JobMatcher {
    /// Validates and embeds the job description.
    pub async fn new(
        job_description: &str,
        embedder: Arc<dyn Embedder>,
        analyzer: Arc<dyn FitAnalyzer>,
    ) -> Result<Self, AppError> {
        let job_description = job_description.trim();
        if job_description.is_empty() {
            return Err(AppError::Validation(
                "Job description text is required".to_string(),
            ));
        }

        let jd_embedding = normalize_vector(&embedder.embed_query(job_description).await?);
        info!(
            "Job description embedded ({} chars, {} dims, model {})",
            job_description.len(),
            jd_embedding.len(),
            embedder.model_name()
        );

        Ok(Self {
            job_description: job_description.to_string(),
            jd_embedding,
            embedder,
            analyzer,
        })
    }

    pub fn job_description(&self) -> &str {
        &self.job_description
    }

    pub fn embedder(&self) -> &dyn Embedder {
        self.embedder.as_ref()
    }

    pub fn analyzer_backend(&self) -> &'static str {
        self.analyzer.backend()
    }

    /// Embeds one resume text and compares it with the JD. Result is in [0, 1].
    #[cfg_attr(not(test), allow(dead_code))]
    pub async fn calculate_similarity(&self, resume_text: &str) -> Result<f64, AppError> {
        let resume_embedding = self.embedder.embed_query(resume_text).await?;
        self.similarity_from_embedding(&resume_embedding)
    }

    /// Cosine similarity against the JD, floored at 0 so it can feed a 0–100 score.
    pub fn similarity_from_embedding(&self, resume_embedding: &[f32]) -> Result<f64, AppError> {
        let similarity = cosine_similarity(resume_embedding, &self.jd_embedding)?;
        Ok(similarity.max(0.0))
    }

    pub async fn analyze_fit(&self, resume: &ParsedResume) -> Result<FitAnalysis, AppError> {
        self.analyzer.analyze_fit(resume, &self.job_description).await
    }
}
