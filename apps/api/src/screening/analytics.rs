//! Dashboard numbers over the active ranked results: quick stats, score histogram,
//! recommendation breakdown, top skills and the filtered results view.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::screening::analysis::Recommendation;
use crate::screening::ranking::{round2, RankedResume};

const HISTOGRAM_BINS: usize = 20;
const BIN_WIDTH: f64 = 100.0 / HISTOGRAM_BINS as f64;
pub const TOP_SKILLS_LIMIT: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QuickStats {
    pub total: usize,
    /// Strong Yes + Yes
    pub recommended: usize,
    pub average_score: f64,
    pub top_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBin {
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationCount {
    pub recommendation: Recommendation,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillCount {
    pub skill: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsReport {
    pub stats: QuickStats,
    pub score_distribution: Vec<ScoreBin>,
    pub recommendations: Vec<RecommendationCount>,
    pub top_skills: Vec<SkillCount>,
}

impl AnalyticsReport {
    pub fn build(results: &[RankedResume]) -> Self {
        Self {
            stats: quick_stats(results),
            score_distribution: score_distribution(results),
            recommendations: recommendation_breakdown(results),
            top_skills: top_skills(results, TOP_SKILLS_LIMIT),
        }
    }
}

pub fn quick_stats(results: &[RankedResume]) -> QuickStats {
    if results.is_empty() {
        return QuickStats::default();
    }
    let total = results.len();
    let recommended = results
        .iter()
        .filter(|r| r.analysis.recommendation.is_positive())
        .count();
    let sum: f64 = results.iter().map(|r| r.final_score).sum();
    let top_score = results
        .iter()
        .map(|r| r.final_score)
        .fold(f64::MIN, f64::max);

    QuickStats {
        total,
        recommended,
        average_score: round2(sum / total as f64),
        top_score,
    }
}

/// Fixed bins of width 5 over [0, 100]; a score of exactly 100 lands in the last bin.
pub fn score_distribution(results: &[RankedResume]) -> Vec<ScoreBin> {
    let mut bins: Vec<ScoreBin> = (0..HISTOGRAM_BINS)
        .map(|i| ScoreBin {
            min: i as f64 * BIN_WIDTH,
            max: (i + 1) as f64 * BIN_WIDTH,
            count: 0,
        })
        .collect();

    for result in results {
        let score = result.final_score.clamp(0.0, 100.0);
        let index = ((score / BIN_WIDTH) as usize).min(HISTOGRAM_BINS - 1);
        bins[index].count += 1;
    }
    bins
}

/// Counts for every recommendation, zeros included, in Strong Yes → No order.
pub fn recommendation_breakdown(results: &[RankedResume]) -> Vec<RecommendationCount> {
    Recommendation::ALL
        .iter()
        .map(|&recommendation| RecommendationCount {
            recommendation,
            count: results
                .iter()
                .filter(|r| r.analysis.recommendation == recommendation)
                .count(),
        })
        .collect()
}

/// Most common extracted skills, count descending then name ascending.
pub fn top_skills(results: &[RankedResume], limit: usize) -> Vec<SkillCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for result in results {
        for skill in &result.parsed.skills {
            *counts.entry(skill.as_str()).or_default() += 1;
        }
    }

    let mut skills: Vec<SkillCount> = counts
        .into_iter()
        .map(|(skill, count)| SkillCount {
            skill: skill.to_string(),
            count,
        })
        .collect();
    skills.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.skill.cmp(&b.skill)));
    skills.truncate(limit);
    skills
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    FinalScore,
    SimilarityScore,
    LlmScore,
    SkillsCount,
}

impl SortKey {
    fn value(self, resume: &RankedResume) -> f64 {
        match self {
            SortKey::FinalScore => resume.final_score,
            SortKey::SimilarityScore => resume.similarity_score,
            SortKey::LlmScore => resume.analysis.score as f64,
            SortKey::SkillsCount => resume.parsed.skills.len() as f64,
        }
    }
}

/// Query parameters of `GET /api/results`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ResultsFilter {
    pub min_score: f64,
    pub recommendation: Option<Recommendation>,
    pub sort_by: SortKey,
}

pub fn apply_filter(results: &[RankedResume], filter: &ResultsFilter) -> Vec<RankedResume> {
    let mut kept: Vec<RankedResume> = results
        .iter()
        .filter(|r| r.final_score >= filter.min_score)
        .filter(|r| {
            filter
                .recommendation
                .map_or(true, |wanted| r.analysis.recommendation == wanted)
        })
        .cloned()
        .collect();
    kept.sort_by(|a, b| filter.sort_by.value(b).total_cmp(&filter.sort_by.value(a)));
    kept
}
