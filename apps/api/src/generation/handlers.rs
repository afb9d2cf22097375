//! Axum route handlers for the Generation API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::generation::pipeline::{GenerationInput, GenerationKind, GenerationOutcome};
use crate::generation::validation::validate_job_description;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub job_description: Option<String>,
    pub resume: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverLetterResponse {
    pub cover_letter: String,
    pub history_id: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeRewriteResponse {
    pub rewritten_resume: String,
    pub history_id: i64,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/cover-letter
pub async fn handle_cover_letter(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<CoverLetterResponse>, AppError> {
    let outcome = generate(&state, GenerationKind::CoverLetter, request).await?;
    Ok(Json(CoverLetterResponse {
        cover_letter: outcome.text,
        history_id: outcome.history_id,
    }))
}

/// POST /api/resume
pub async fn handle_resume_rewrite(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<ResumeRewriteResponse>, AppError> {
    let outcome = generate(&state, GenerationKind::Resume, request).await?;
    Ok(Json(ResumeRewriteResponse {
        rewritten_resume: outcome.text,
        history_id: outcome.history_id,
    }))
}

async fn generate(
    state: &AppState,
    kind: GenerationKind,
    request: GenerateRequest,
) -> Result<GenerationOutcome, AppError> {
    let job_description = validate_job_description(request.job_description.as_deref())?.to_string();

    let input = GenerationInput {
        job_description,
        resume: request.resume.unwrap_or_default(),
    };

    Ok(state.generation.run(kind, input).await?)
}
