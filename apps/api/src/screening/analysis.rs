//! Fit Analysis — pluggable, trait-based judgement of one resume against a job description.
//!
//! Default: `LlmFitAnalyzer` (chat model, line-oriented response parsed here).
//! Offline: `KeywordFitAnalyzer` (pure-Rust skill overlap, deterministic, no network).
//!
//! `AppState` holds an `Arc<dyn FitAnalyzer>`, chosen at startup via `FIT_ANALYZER`.

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::intake::parser::{extract_skills, ParsedResume};
use crate::llm_client::prompts::SCREENING_SYSTEM;
use crate::llm_client::LlmClient;
use crate::screening::prompts::{FIT_ANALYSIS_PROMPT_TEMPLATE, RESUME_EXCERPT_CHARS};

lazy_static! {
    static ref FIRST_INTEGER: Regex = Regex::new(r"\d+").unwrap();
}

const MAX_SCORE: u32 = 100;

// ────────────────────────────────────────────────────────────────────────────
// Output data models (shared across all analyzer backends)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Recommendation {
    #[serde(rename = "Strong Yes", alias = "strong_yes")]
    StrongYes,
    #[serde(rename = "Yes", alias = "yes")]
    Yes,
    #[default]
    #[serde(rename = "Maybe", alias = "maybe")]
    Maybe,
    #[serde(rename = "No", alias = "no")]
    No,
}

impl Recommendation {
    pub const ALL: [Recommendation; 4] = [
        Recommendation::StrongYes,
        Recommendation::Yes,
        Recommendation::Maybe,
        Recommendation::No,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Recommendation::StrongYes => "Strong Yes",
            Recommendation::Yes => "Yes",
            Recommendation::Maybe => "Maybe",
            Recommendation::No => "No",
        }
    }

    /// "Strong Yes" and "Yes" count as recommended candidates.
    pub fn is_positive(self) -> bool {
        matches!(self, Recommendation::StrongYes | Recommendation::Yes)
    }

    /// Lenient parse of model output: ignores case, brackets and anything after the verdict
    /// ("No, lacks required skills" is `No`). An echoed option list such as
    /// "Strong Yes/Yes/Maybe/No" and anything unrecognised is `Maybe`.
    pub fn parse_lenient(text: &str) -> Self {
        let normalized = text
            .trim()
            .trim_start_matches(|c: char| matches!(c, '[' | '*' | '"'))
            .trim_start()
            .to_ascii_lowercase()
            .replace(['_', '-'], " ");

        const VERDICTS: [(&str, Recommendation); 4] = [
            ("strong yes", Recommendation::StrongYes),
            ("strongyes", Recommendation::StrongYes),
            ("yes", Recommendation::Yes),
            ("no", Recommendation::No),
        ];
        VERDICTS
            .iter()
            .find(|(word, _)| {
                normalized.strip_prefix(word).is_some_and(|rest| {
                    rest.chars()
                        .next()
                        .map_or(true, |c| !c.is_alphanumeric() && c != '/')
                })
            })
            .map(|(_, recommendation)| *recommendation)
            .unwrap_or(Recommendation::Maybe)
    }

    /// Maps a 0–100 score onto a recommendation.
    pub fn from_score(score: u32) -> Self {
        if score >= 80 {
            Recommendation::StrongYes
        } else if score >= 60 {
            Recommendation::Yes
        } else if score >= 40 {
            Recommendation::Maybe
        } else {
            Recommendation::No
        }
    }
}

/// Structured fit judgement for one resume.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FitAnalysis {
    /// 0 – 100
    pub score: u32,
    pub strengths: Vec<String>,
    pub missing: Vec<String>,
    pub recommendation: Recommendation,
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Implement this to swap analysis backends without touching the ranking or handler code.
#[async_trait]
pub trait FitAnalyzer: Send + Sync {
    fn backend(&self) -> &'static str;

    async fn analyze_fit(
        &self,
        resume: &ParsedResume,
        job_description: &str,
    ) -> Result<FitAnalysis, AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// LlmFitAnalyzer — default backend
// ────────────────────────────────────────────────────────────────────────────

pub struct LlmFitAnalyzer(pub LlmClient);

#[async_trait]
impl FitAnalyzer for LlmFitAnalyzer {
    fn backend(&self) -> &'static str {
        "llm"
    }

    async fn analyze_fit(
        &self,
        resume: &ParsedResume,
        job_description: &str,
    ) -> Result<FitAnalysis, AppError> {
        let prompt = build_fit_prompt(resume, job_description);
        let response = self
            .0
            .call_text(&prompt, SCREENING_SYSTEM)
            .await
            .map_err(|e| AppError::Llm(format!("Fit analysis failed: {e}")))?;
        Ok(parse_fit_response(&response))
    }
}

fn build_fit_prompt(resume: &ParsedResume, job_description: &str) -> String {
    let excerpt: String = resume
        .cleaned_text
        .chars()
        .take(RESUME_EXCERPT_CHARS)
        .collect();

    FIT_ANALYSIS_PROMPT_TEMPLATE
        .replace("{resume_text}", &excerpt)
        .replace("{skills}", &resume.skills.join(", "))
        .replace("{experience}", resume.experience_display())
        .replace("{education}", &resume.education.join(", "))
        .replace("{job_description}", job_description)
}

// ────────────────────────────────────────────────────────────────────────────
// KeywordFitAnalyzer — offline backend
// ────────────────────────────────────────────────────────────────────────────

/// Scores the share of skills named in the JD that the resume also lists.
pub struct KeywordFitAnalyzer;

#[async_trait]
impl FitAnalyzer for KeywordFitAnalyzer {
    fn backend(&self) -> &'static str {
        "keyword"
    }

    async fn analyze_fit(
        &self,
        resume: &ParsedResume,
        job_description: &str,
    ) -> Result<FitAnalysis, AppError> {
        Ok(compute_keyword_fit(resume, job_description))
    }
}

fn compute_keyword_fit(resume: &ParsedResume, job_description: &str) -> FitAnalysis {
    let jd_skills = extract_skills(job_description);
    if jd_skills.is_empty() {
        return FitAnalysis::default();
    }

    let (matched, missing): (Vec<String>, Vec<String>) = jd_skills
        .into_iter()
        .partition(|skill| resume.skills.contains(skill));

    let total = matched.len() + missing.len();
    let score = ((matched.len() as f64 / total as f64) * 100.0).round() as u32;

    FitAnalysis {
        score,
        strengths: matched,
        missing,
        recommendation: Recommendation::from_score(score),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Response parsing
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy)]
enum Section {
    None,
    Strengths,
    Missing,
}

/// Parses the `Score:` / `Strengths:` / `Missing:` / `Recommendation:` response format.
///
/// Missing fields fall back to score 0, no bullets and `Maybe`.
pub fn parse_fit_response(response: &str) -> FitAnalysis {
    let mut result = FitAnalysis::default();
    let mut section = Section::None;

    for line in response.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some(rest) = header_value(line, "Score:") {
            if let Some(score) = FIRST_INTEGER
                .find(rest)
                .and_then(|m| m.as_str().parse::<u64>().ok())
            {
                result.score = score.min(MAX_SCORE as u64) as u32;
            }
            section = Section::None;
        } else if let Some(rest) = header_value(line, "Strengths:") {
            section = Section::Strengths;
            push_bullet(&mut result.strengths, rest);
        } else if let Some(rest) = header_value(line, "Missing:") {
            section = Section::Missing;
            push_bullet(&mut result.missing, rest);
        } else if let Some(rest) = header_value(line, "Recommendation:") {
            result.recommendation = Recommendation::parse_lenient(rest);
            section = Section::None;
        } else {
            match section {
                Section::Strengths => push_bullet(&mut result.strengths, line),
                Section::Missing => push_bullet(&mut result.missing, line),
                Section::None => {}
            }
        }
    }

    result
}

/// Returns the text after `name` when `line` starts with it (case-insensitive, markdown-tolerant).
fn header_value<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    let line = line.trim_start_matches(['*', '#']).trim_start();
    let head = line.get(..name.len())?;
    if !head.eq_ignore_ascii_case(name) {
        return None;
    }
    Some(line[name.len()..].trim_start_matches('*').trim())
}

fn push_bullet(bullets: &mut Vec<String>, line: &str) {
    let text = line.trim_start_matches(['-', '•', '*']).trim();
    if !text.is_empty() {
        bullets.push(text.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::parser::parse_resume;

    #[test]
    fn test_response_parsing() {
        let sample_response = "
        Score: 85
        Strengths: - Strong Python experience
        - Good communication skills
        Missing: - Cloud experience
        - Team leadership
        Recommendation: Yes
        ";

        let parsed = parse_fit_response(sample_response);
        assert_eq!(parsed.score, 85);
        assert_eq!(parsed.recommendation, Recommendation::Yes);
        assert_eq!(
            parsed.strengths,
            vec!["Strong Python experience", "Good communication skills"]
        );
        assert_eq!(parsed.missing, vec!["Cloud experience", "Team leadership"]);
    }

    #[test]
    fn test_bullets_on_following_lines_with_blank_lines() {
        let response = "Score: 62/100\n\nStrengths:\n• Kubernetes in production\n\n* Led migrations\nMissing:\n- Go\nRecommendation: [Maybe]";
        let parsed = parse_fit_response(response);
        assert_eq!(parsed.score, 62);
        assert_eq!(
            parsed.strengths,
            vec!["Kubernetes in production", "Led migrations"]
        );
        assert_eq!(parsed.missing, vec!["Go"]);
        assert_eq!(parsed.recommendation, Recommendation::Maybe);
    }

    #[test]
    fn test_markdown_headers_and_case() {
        let response = "**Score:** 91\n**Recommendation:** strong yes";
        let parsed = parse_fit_response(response);
        assert_eq!(parsed.score, 91);
        assert_eq!(parsed.recommendation, Recommendation::StrongYes);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let parsed = parse_fit_response("I cannot evaluate this resume.");
        assert_eq!(parsed, FitAnalysis::default());
        assert_eq!(parsed.recommendation, Recommendation::Maybe);
    }

    #[test]
    fn test_score_clamped_to_100() {
        assert_eq!(parse_fit_response("Score: 250").score, 100);
        assert_eq!(
            parse_fit_response("Score: 99999999999999999999999").score,
            0,
            "unparseable overflow keeps the default"
        );
    }

    #[test]
    fn test_recommendation_parse_lenient() {
        assert_eq!(Recommendation::parse_lenient("No."), Recommendation::No);
        assert_eq!(Recommendation::parse_lenient(" YES "), Recommendation::Yes);
        assert_eq!(
            Recommendation::parse_lenient("Strong Yes/Yes/Maybe/No"),
            Recommendation::Maybe
        );
        assert_eq!(Recommendation::parse_lenient("strong_yes"), Recommendation::StrongYes);
        assert_eq!(Recommendation::parse_lenient("Nothing to add"), Recommendation::Maybe);
    }

    #[test]
    fn test_recommendation_ignores_trailing_commentary() {
        assert_eq!(
            Recommendation::parse_lenient("No, lacks required skills"),
            Recommendation::No
        );
        assert_eq!(
            Recommendation::parse_lenient("Yes - solid match"),
            Recommendation::Yes
        );
        assert_eq!(
            Recommendation::parse_lenient("Strong Yes (excellent fit)"),
            Recommendation::StrongYes
        );
        assert_eq!(
            Recommendation::parse_lenient("[Strong Yes]"),
            Recommendation::StrongYes
        );

        let parsed = parse_fit_response("Score: 80\nRecommendation: No, lacks required skills");
        assert_eq!(parsed.recommendation, Recommendation::No);
    }

    #[test]
    fn test_recommendation_serde_uses_display_names() {
        let json = serde_json::to_string(&Recommendation::StrongYes).unwrap();
        assert_eq!(json, r#""Strong Yes""#);
        let parsed: Recommendation = serde_json::from_str(r#""strong_yes""#).unwrap();
        assert_eq!(parsed, Recommendation::StrongYes);
    }

    #[test]
    fn test_recommendation_from_score_thresholds() {
        assert_eq!(Recommendation::from_score(80), Recommendation::StrongYes);
        assert_eq!(Recommendation::from_score(79), Recommendation::Yes);
        assert_eq!(Recommendation::from_score(40), Recommendation::Maybe);
        assert_eq!(Recommendation::from_score(39), Recommendation::No);
    }

    #[test]
    fn test_fit_prompt_truncates_resume_and_fills_fields() {
        let long_text = format!("Python developer. {}", "word ".repeat(1000));
        let resume = parse_resume(&long_text);
        let prompt = build_fit_prompt(&resume, "Need a Python engineer");

        assert!(prompt.contains("JOB DESCRIPTION:\nNeed a Python engineer"));
        assert!(prompt.contains("RESUME SKILLS: python"));
        assert!(prompt.contains("EXPERIENCE: Experience not specified"));
        assert!(!prompt.contains("{resume_text}"));

        let excerpt_start = prompt.find("RESUME EXTRACT:\n").unwrap() + "RESUME EXTRACT:\n".len();
        let excerpt_end = prompt.find("\n\nRESUME SKILLS").unwrap();
        assert_eq!(
            prompt[excerpt_start..excerpt_end].chars().count(),
            RESUME_EXCERPT_CHARS
        );
    }

    #[tokio::test]
    async fn test_keyword_analyzer_scores_overlap() {
        let resume = parse_resume("Python and Docker, some SQL");
        let jd = "We need Python, Docker, Kubernetes and AWS";
        let analysis = KeywordFitAnalyzer.analyze_fit(&resume, jd).await.unwrap();

        assert_eq!(analysis.score, 50);
        assert_eq!(analysis.recommendation, Recommendation::Maybe);
        assert_eq!(analysis.strengths, vec!["python", "docker"]);
        assert_eq!(analysis.missing, vec!["aws", "kubernetes"]);
    }

    #[tokio::test]
    async fn test_keyword_analyzer_without_jd_skills() {
        let resume = parse_resume("Python");
        let analysis = KeywordFitAnalyzer
            .analyze_fit(&resume, "A friendly team player")
            .await
            .unwrap();
        assert_eq!(analysis.score, 0);
        assert_eq!(analysis.recommendation, Recommendation::Maybe);
    }
}
