//! Deterministic stand-ins for the hosted backends, shared by screening and router tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::embedding::{Embedder, EmbeddingError};
use crate::errors::AppError;
use crate::intake::parser::{ParsedResume, SKILL_VOCABULARY};
use crate::screening::analysis::{FitAnalysis, FitAnalyzer, Recommendation};
use crate::screening::jd_matcher::JobMatcher;

/// Embeds text as a skill-presence vector with a constant bias dimension.
pub struct SkillEmbedder {
    pub calls: AtomicUsize,
}

impl SkillEmbedder {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    pub fn vector(text: &str) -> Vec<f32> {
        let skills = crate::intake::parser::extract_skills(text);
        let mut v: Vec<f32> = SKILL_VOCABULARY
            .iter()
            .map(|s| if skills.iter().any(|k| k == s) { 1.0 } else { 0.0 })
            .collect();
        v.push(0.25);
        v
    }
}

#[async_trait]
impl Embedder for SkillEmbedder {
    fn model_name(&self) -> &str {
        "skill-presence"
    }

    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }
}

/// Returns a fixed score per resume, looked up by a marker word in the text.
pub struct ScriptedAnalyzer {
    pub scores: Vec<(&'static str, u32)>,
}

#[async_trait]
impl FitAnalyzer for ScriptedAnalyzer {
    fn backend(&self) -> &'static str {
        "scripted"
    }

    async fn analyze_fit(
        &self,
        resume: &ParsedResume,
        _job_description: &str,
    ) -> Result<FitAnalysis, AppError> {
        let score = self
            .scores
            .iter()
            .find(|(marker, _)| resume.raw_text.contains(marker))
            .map(|(_, score)| *score)
            .unwrap_or(0);
        Ok(FitAnalysis {
            score,
            strengths: vec![format!("scored {score}")],
            missing: vec![],
            recommendation: Recommendation::from_score(score),
        })
    }
}

/// Always fails, standing in for an unreachable LLM.
pub struct FailingAnalyzer;

#[async_trait]
impl FitAnalyzer for FailingAnalyzer {
    fn backend(&self) -> &'static str {
        "failing"
    }

    async fn analyze_fit(
        &self,
        _resume: &ParsedResume,
        _job_description: &str,
    ) -> Result<FitAnalysis, AppError> {
        Err(AppError::Llm("upstream unavailable".to_string()))
    }
}

pub async fn matcher_with(jd: &str, analyzer: Arc<dyn FitAnalyzer>) -> JobMatcher {
    JobMatcher::new(jd, Arc::new(SkillEmbedder::new()), analyzer)
        .await
        .unwrap()
}
