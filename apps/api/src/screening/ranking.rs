//! Ranking Engine — blends LLM fit, embedding similarity and skill coverage into one score.
//!
//! Flow: batch-embed cleaned texts → cosine vs JD → fit analysis per resume →
//!       weighted final score → stable sort (descending) → 1-based ranks.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::embedding::batch_embed;
use crate::errors::AppError;
use crate::intake::parser::ParsedResume;
use crate::intake::ProcessedResume;
use crate::screening::analysis::FitAnalysis;
use crate::screening::jd_matcher::JobMatcher;

/// Skill count at which the skills factor saturates.
const SKILLS_SATURATION: f64 = 20.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingWeights {
    pub llm_score: f64,
    pub similarity: f64,
    pub skills: f64,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            llm_score: 0.5,
            similarity: 0.3,
            skills: 0.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingFactors {
    pub llm_score: u32,
    /// Cosine similarity × 100, unrounded.
    pub embedding_similarity: f64,
    pub skills_count: usize,
}

/// One candidate after scoring, in final rank order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedResume {
    /// 1-based
    pub rank: usize,
    pub id: Uuid,
    pub filename: String,
    pub file_size: usize,
    #[serde(rename = "processed_data")]
    pub parsed: ParsedResume,
    /// Cosine similarity × 100, rounded to 2 decimals.
    pub similarity_score: f64,
    pub analysis: FitAnalysis,
    pub final_score: f64,
    pub ranking_factors: RankingFactors,
}

/// 0.5·llm + 0.3·(similarity·100) + 0.2·min(skills/20, 1)·100, clamped to [0, 100].
pub fn calculate_final_score(
    llm_score: u32,
    similarity: f64,
    skills_count: usize,
    weights: &RankingWeights,
) -> f64 {
    let normalized_skills = (skills_count as f64 / SKILLS_SATURATION).min(1.0) * 100.0;
    let score = weights.llm_score * llm_score as f64
        + weights.similarity * similarity * 100.0
        + weights.skills * normalized_skills;
    if score.is_finite() {
        score.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub struct RankingEngine<'a> {
    matcher: &'a JobMatcher,
    batch_size: usize,
    weights: RankingWeights,
}

impl<'a> RankingEngine<'a> {
    pub fn new(matcher: &'a JobMatcher, batch_size: usize) -> Self {
        Self {
            matcher,
            batch_size,
            weights: RankingWeights::default(),
        }
    }

    /// Scores every resume and returns them best-first. Ties keep upload order.
    ///
    /// Any embedding or analysis failure aborts the whole ranking.
    pub async fn rank_resumes(
        &self,
        resumes: Vec<ProcessedResume>,
    ) -> Result<Vec<RankedResume>, AppError> {
        if resumes.is_empty() {
            return Ok(Vec::new());
        }

        let texts: Vec<String> = resumes
            .iter()
            .map(|r| r.parsed.cleaned_text.clone())
            .collect();
        let embeddings = batch_embed(self.matcher.embedder(), &texts, self.batch_size).await?;

        let mut ranked = Vec::with_capacity(resumes.len());
        for (resume, embedding) in resumes.into_iter().zip(embeddings) {
            let similarity = self.matcher.similarity_from_embedding(&embedding)?;
            let analysis = self.matcher.analyze_fit(&resume.parsed).await?;
            let skills_count = resume.parsed.skills.len();

            let final_score =
                calculate_final_score(analysis.score, similarity, skills_count, &self.weights);
            debug!(
                "{}: llm={} similarity={:.3} skills={} final={:.2}",
                resume.filename, analysis.score, similarity, skills_count, final_score
            );

            ranked.push(RankedResume {
                rank: 0,
                id: resume.id,
                filename: resume.filename,
                file_size: resume.file_size,
                similarity_score: round2(similarity * 100.0),
                final_score: round2(final_score),
                ranking_factors: RankingFactors {
                    llm_score: analysis.score,
                    embedding_similarity: similarity * 100.0,
                    skills_count,
                },
                analysis,
                parsed: resume.parsed,
            });
        }

        ranked.sort_by(|a, b| b.final_score.total_cmp(&a.final_score));
        for (position, resume) in ranked.iter_mut().enumerate() {
            resume.rank = position + 1;
        }

        info!(
            "Ranked {} resumes (top score {:.2})",
            ranked.len(),
            ranked.first().map(|r| r.final_score).unwrap_or(0.0)
        );
        Ok(ranked)
    }
}
