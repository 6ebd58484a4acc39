use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

use crate::screening::analysis::FitAnalysis;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ScreeningSessionRow {
    pub id: i64,
    pub job_description: String,
    pub created_at: DateTime<Utc>,
}

/// Session row plus the number of resumes stored under it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SessionSummaryRow {
    pub id: i64,
    pub job_description: String,
    pub created_at: DateTime<Utc>,
    pub resume_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeResultRow {
    pub id: i64,
    pub session_id: i64,
    pub filename: String,
    pub final_score: f64,
    pub llm_score: i64,
    pub similarity_score: f64,
    pub skills_count: i64,
    pub recommendation: String,
    #[serde(rename = "analysis")]
    pub analysis_json: Json<FitAnalysis>,
    pub created_at: DateTime<Utc>,
}
