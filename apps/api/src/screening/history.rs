//! Persisted screening history: one session per processed batch, one row per ranked resume.

use chrono::Utc;
use serde::Serialize;
use sqlx::types::Json;
use sqlx::SqlitePool;
use tracing::info;

use crate::errors::AppError;
use crate::models::session::{ResumeResultRow, ScreeningSessionRow, SessionSummaryRow};
use crate::screening::ranking::RankedResume;

#[derive(Debug, Serialize)]
pub struct SessionDetail {
    pub session: ScreeningSessionRow,
    pub results: Vec<ResumeResultRow>,
}

/// Stores the JD and every ranked resume atomically. Returns the new session id.
pub async fn save_screening_session(
    pool: &SqlitePool,
    job_description: &str,
    ranked: &[RankedResume],
) -> Result<i64, AppError> {
    let now = Utc::now();
    let mut tx = pool.begin().await?;

    let session_id = sqlx::query(
        "INSERT INTO screening_sessions (job_description, created_at) VALUES ($1, $2)",
    )
    .bind(job_description)
    .bind(now)
    .execute(&mut *tx)
    .await?
    .last_insert_rowid();

    for resume in ranked {
        sqlx::query(
            r#"
            INSERT INTO resume_results
                (session_id, filename, final_score, llm_score, similarity_score,
                 skills_count, recommendation, analysis_json, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(session_id)
        .bind(&resume.filename)
        .bind(resume.final_score)
        .bind(resume.analysis.score as i64)
        .bind(resume.similarity_score)
        .bind(resume.parsed.skills.len() as i64)
        .bind(resume.analysis.recommendation.as_str())
        .bind(Json(&resume.analysis))
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    info!(
        "Saved screening session {session_id} with {} results",
        ranked.len()
    );
    Ok(session_id)
}

/// All sessions, newest first.
pub async fn list_sessions(pool: &SqlitePool) -> Result<Vec<SessionSummaryRow>, AppError> {
    let sessions = sqlx::query_as::<_, SessionSummaryRow>(
        r#"
        SELECT s.id, s.job_description, s.created_at, COUNT(r.id) AS resume_count
        FROM screening_sessions s
        LEFT JOIN resume_results r ON r.session_id = s.id
        GROUP BY s.id, s.job_description, s.created_at
        ORDER BY s.id DESC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(sessions)
}

pub async fn get_session_results(
    pool: &SqlitePool,
    session_id: i64,
) -> Result<SessionDetail, AppError> {
    let session = sqlx::query_as::<_, ScreeningSessionRow>(
        "SELECT id, job_description, created_at FROM screening_sessions WHERE id = $1",
    )
    .bind(session_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Screening session {session_id} not found")))?;

    let results = sqlx::query_as::<_, ResumeResultRow>(
        r#"
        SELECT id, session_id, filename, final_score, llm_score, similarity_score,
               skills_count, recommendation, analysis_json, created_at
        FROM resume_results
        WHERE session_id = $1
        ORDER BY final_score DESC, id ASC
        "#,
    )
    .bind(session_id)
    .fetch_all(pool)
    .await?;

    Ok(SessionDetail { session, results })
}
