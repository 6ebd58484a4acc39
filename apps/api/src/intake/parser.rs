//! Heuristic resume parser — pulls skills, experience and education out of raw text.
//!
//! Deliberately cheap and deterministic: it feeds the LLM prompt and the skills factor of
//! the final score, it is not meant to be a full resume understanding model.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Shown wherever a resume states no years of experience.
pub const EXPERIENCE_NOT_SPECIFIED: &str = "Experience not specified";

/// Skill vocabulary, matched case-insensitively on token boundaries.
pub const SKILL_VOCABULARY: &[&str] = &[
    "python", "java", "javascript", "sql", "machine learning", "ai",
    "deep learning", "tensorflow", "pytorch", "react", "node.js",
    "aws", "docker", "kubernetes", "git", "rest api", "mongodb",
    "postgresql", "mysql", "html", "css", "typescript", "angular",
    "vue", "django", "flask", "fastapi", "spring", "hibernate",
    "jenkins", "ansible", "terraform", "gcp", "azure", "linux",
    "unix", "bash", "shell", "power bi", "tableau", "excel",
    "agile", "scrum", "jira", "confluence", "devops", "ci/cd",
    "rust",
];

lazy_static! {
    static ref EXPERIENCE_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(\d+)\s*years?[\s\w]*experience").unwrap(),
        Regex::new(r"experience[\s\w]*(\d+)\s*years?").unwrap(),
        Regex::new(r"(\d+)\s*\+?\s*years?").unwrap(),
    ];

    /// (label, pattern). `be` / `me` only count as upper-case abbreviations.
    static ref EDUCATION_PATTERNS: Vec<(&'static str, Regex)> = vec![
        ("bachelor", Regex::new(r"(?i)\bbachelor(?:'?s)?\b").unwrap()),
        ("master", Regex::new(r"(?i)\bmaster(?:'?s)?\b").unwrap()),
        ("phd", Regex::new(r"(?i)\bph\.?\s?d\b").unwrap()),
        ("b.tech", Regex::new(r"(?i)\bb\.?\s?tech\b").unwrap()),
        ("m.tech", Regex::new(r"(?i)\bm\.?\s?tech\b").unwrap()),
        ("be", Regex::new(r"\bB\.?E\b").unwrap()),
        ("me", Regex::new(r"\bM\.?E\b").unwrap()),
        ("bsc", Regex::new(r"(?i)\bb\.?\s?sc\b").unwrap()),
        ("msc", Regex::new(r"(?i)\bm\.?\s?sc\b").unwrap()),
        ("mbbs", Regex::new(r"(?i)\bmbbs\b").unwrap()),
        ("bca", Regex::new(r"(?i)\bbca\b").unwrap()),
        ("mca", Regex::new(r"(?i)\bmca\b").unwrap()),
        ("associate", Regex::new(r"(?i)\bassociate(?:'?s)?\b").unwrap()),
        ("diploma", Regex::new(r"(?i)\bdiploma\b").unwrap()),
    ];

    static ref DISALLOWED_CHARS: Regex = Regex::new(r"[^\w\s.,!?;:]").unwrap();
    static ref WHITESPACE_RUNS: Regex = Regex::new(r"\s+").unwrap();
}

/// Structured view of a resume's text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParsedResume {
    pub raw_text: String,
    pub cleaned_text: String,
    pub skills: Vec<String>,
    pub experience: Option<String>,
    pub education: Vec<String>,
}

impl ParsedResume {
    pub fn experience_display(&self) -> &str {
        self.experience.as_deref().unwrap_or(EXPERIENCE_NOT_SPECIFIED)
    }
}

pub fn parse_resume(text: &str) -> ParsedResume {
    ParsedResume {
        raw_text: text.to_string(),
        cleaned_text: clean_text(text),
        skills: extract_skills(text),
        experience: extract_experience(text),
        education: extract_education(text),
    }
}

/// Skills from [`SKILL_VOCABULARY`] present in `text`, in vocabulary order.
pub fn extract_skills(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    SKILL_VOCABULARY
        .iter()
        .filter(|skill| contains_token(&lower, skill))
        .map(|skill| skill.to_string())
        .collect()
}

/// True when `needle` occurs in `haystack` with no alphanumeric character on either side.
fn contains_token(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(start, matched)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + matched.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

/// First experience phrase such as "5 years of experience", lower-cased.
pub fn extract_experience(text: &str) -> Option<String> {
    let lower = text.to_lowercase();
    EXPERIENCE_PATTERNS
        .iter()
        .find_map(|re| re.find(&lower))
        .map(|m| m.as_str().to_string())
}

pub fn extract_education(text: &str) -> Vec<String> {
    EDUCATION_PATTERNS
        .iter()
        .filter(|(_, re)| re.is_match(text))
        .map(|(label, _)| label.to_string())
        .collect()
}

/// Drops symbols outside `[\w\s.,!?;:]` and collapses whitespace.
pub fn clean_text(text: &str) -> String {
    let stripped = DISALLOWED_CHARS.replace_all(text, "");
    WHITESPACE_RUNS
        .replace_all(&stripped, " ")
        .trim()
        .to_string()
}
