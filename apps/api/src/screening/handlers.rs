use std::sync::Arc;

use anyhow::anyhow;
use axum::{
    extract::{multipart::MultipartError, Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::intake::formats::{file_size_mb, supported_formats, validate_file_format};
use crate::intake::{prepare_resume, ProcessedResume, SkippedFile};
use crate::models::session::SessionSummaryRow;
use crate::screening::analytics::{apply_filter, AnalyticsReport, ResultsFilter};
use crate::screening::history::{
    get_session_results, list_sessions, save_screening_session, SessionDetail,
};
use crate::screening::jd_matcher::JobMatcher;
use crate::screening::ranking::{RankedResume, RankingEngine};
use crate::state::AppState;

const UPLOAD_FIELD: &str = "files";

#[derive(Deserialize)]
pub struct JobDescriptionRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub message: String,
    pub status: &'static str,
}

#[derive(Serialize)]
pub struct JobDescriptionResponse {
    pub job_description: String,
}

#[derive(Serialize)]
pub struct ProcessResponse {
    pub status: &'static str,
    pub session_id: i64,
    pub processed_count: usize,
    pub ranked_resumes: Vec<RankedResume>,
    pub skipped: Vec<SkippedFile>,
}

#[derive(Serialize)]
pub struct ResultsResponse {
    pub count: usize,
    pub results: Vec<RankedResume>,
}

/// POST /api/set-job-description
pub async fn handle_set_job_description(
    State(state): State<AppState>,
    Json(req): Json<JobDescriptionRequest>,
) -> Result<Json<StatusResponse>, AppError> {
    // Embed before taking the lock; the network call must not block readers.
    let matcher = JobMatcher::new(
        &req.text,
        state.embedder.clone(),
        state.fit_analyzer.clone(),
    )
    .await?;

    state.screening.write().await.set_matcher(Arc::new(matcher));
    info!("Job description set; previous results cleared");

    Ok(Json(StatusResponse {
        message: "Job description set successfully".to_string(),
        status: "success",
    }))
}

/// GET /api/job-description
pub async fn handle_get_job_description(
    State(state): State<AppState>,
) -> Result<Json<JobDescriptionResponse>, AppError> {
    let matcher = state
        .screening
        .read()
        .await
        .matcher()
        .ok_or_else(|| AppError::NotFound("Job description not set".to_string()))?;
    Ok(Json(JobDescriptionResponse {
        job_description: matcher.job_description().to_string(),
    }))
}

/// POST /api/process-resumes
pub async fn handle_process_resumes(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ProcessResponse>, AppError> {
    let matcher = state.screening.read().await.matcher().ok_or_else(|| {
        AppError::Validation("Job description not set. Please set JD first.".to_string())
    })?;

    let max_bytes = state.config.max_upload_bytes();
    let mut resumes: Vec<ProcessedResume> = Vec::new();
    let mut skipped: Vec<SkippedFile> = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(multipart_error)?;

        if !validate_file_format(&filename) {
            warn!("Skipping {filename}: unsupported format");
            skipped.push(SkippedFile {
                filename,
                reason: format!(
                    "Unsupported file format. Supported: {}",
                    supported_formats().join(", ")
                ),
            });
            continue;
        }

        if bytes.len() > max_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "{filename} is {:.2} MB; the limit is {} MB per file",
                file_size_mb(bytes.len()),
                state.config.max_upload_mb
            )));
        }
        if bytes.is_empty() {
            warn!("Skipping {filename}: empty file");
            skipped.push(SkippedFile {
                filename,
                reason: "File is empty".to_string(),
            });
            continue;
        }

        let name = filename.clone();
        let prepared = tokio::task::spawn_blocking(move || prepare_resume(&name, &bytes))
            .await
            .map_err(|e| AppError::Internal(anyhow!("resume extraction task failed: {e}")))?;

        match prepared {
            Ok(resume) => resumes.push(resume),
            Err(e) => {
                warn!("Skipping {filename}: {e}");
                skipped.push(SkippedFile {
                    filename,
                    reason: e.to_string(),
                });
            }
        }
    }

    if resumes.is_empty() {
        return Err(AppError::Validation(format!(
            "No valid resumes could be processed. Supported formats: {}",
            supported_formats().join(", ")
        )));
    }

    info!(
        "Processing {} resumes ({} skipped) with {} analyzer",
        resumes.len(),
        skipped.len(),
        matcher.analyzer_backend()
    );
    let ranked = RankingEngine::new(&matcher, state.config.embedding_batch_size)
        .rank_resumes(resumes)
        .await?;

    let session_id = save_screening_session(&state.db, matcher.job_description(), &ranked).await?;

    if !state
        .screening
        .write()
        .await
        .store_results(&matcher, ranked.clone())
    {
        warn!("Job description changed while processing; session {session_id} results not kept as active");
    }

    Ok(Json(ProcessResponse {
        status: "success",
        session_id,
        processed_count: ranked.len(),
        ranked_resumes: ranked,
        skipped,
    }))
}

/// GET /api/results
pub async fn handle_get_results(
    State(state): State<AppState>,
    Query(filter): Query<ResultsFilter>,
) -> Json<ResultsResponse> {
    let screening = state.screening.read().await;
    let results = apply_filter(screening.results(), &filter);
    Json(ResultsResponse {
        count: results.len(),
        results,
    })
}

/// DELETE /api/results
pub async fn handle_clear_results(State(state): State<AppState>) -> StatusCode {
    state.screening.write().await.clear_results();
    StatusCode::NO_CONTENT
}

/// GET /api/analytics
pub async fn handle_analytics(State(state): State<AppState>) -> Json<AnalyticsReport> {
    let screening = state.screening.read().await;
    Json(AnalyticsReport::build(screening.results()))
}

/// GET /api/sessions
pub async fn handle_list_sessions(
    State(state): State<AppState>,
) -> Result<Json<Vec<SessionSummaryRow>>, AppError> {
    Ok(Json(list_sessions(&state.db).await?))
}

/// GET /api/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<SessionDetail>, AppError> {
    Ok(Json(get_session_results(&state.db, id).await?))
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::Validation(e.body_text())
    }
}
