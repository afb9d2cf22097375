//! Axum route handlers for plain history CRUD. These call the `HistoryStore`
//! directly; generation routes live in `generation::handlers`.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::history::{HistoryEntry, HistoryPatch, NewHistoryEntry, DEFAULT_LIST_LIMIT};
use crate::state::AppState;

pub const MAX_LIST_LIMIT: usize = 200;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateHistoryRequest {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub job_description: Option<String>,
    pub resume: Option<String>,
    pub output: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub ok: bool,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/history?limit=N
///
/// Newest first. Defaults to 50 entries, never more than 200.
pub async fn handle_list_history(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<HistoryEntry>>, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT).min(MAX_LIST_LIMIT);
    Ok(Json(state.history.list(limit).await?))
}

/// GET /api/history/:id
pub async fn handle_get_history(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<HistoryEntry>, AppError> {
    Ok(Json(state.history.get(id).await?))
}

/// POST /api/history
///
/// Manual create. `type` and `output` are required; missing job description or
/// resume are stored as empty strings.
pub async fn handle_create_history(
    State(state): State<AppState>,
    Json(request): Json<CreateHistoryRequest>,
) -> Result<Json<HistoryEntry>, AppError> {
    let (Some(kind), Some(output)) = (non_empty(request.kind), non_empty(request.output)) else {
        return Err(AppError::Validation(
            "Missing fields: type and output are required".to_string(),
        ));
    };

    let entry = state
        .history
        .insert(NewHistoryEntry {
            kind,
            job_description: request.job_description.unwrap_or_default(),
            resume: request.resume.unwrap_or_default(),
            output,
        })
        .await?;

    Ok(Json(entry))
}

/// PUT /api/history/:id
///
/// Partial update of `type`, `jobDescription`, `resume`, `output`.
/// `id` and `createdAt` in the body are ignored.
pub async fn handle_update_history(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<HistoryPatch>,
) -> Result<Json<HistoryEntry>, AppError> {
    let blank = |v: &Option<String>| v.as_deref().is_some_and(|s| s.trim().is_empty());
    if blank(&patch.kind) || blank(&patch.output) {
        return Err(AppError::Validation(
            "type and output cannot be empty".to_string(),
        ));
    }

    Ok(Json(state.history.update(id, patch).await?))
}

/// DELETE /api/history/:id
pub async fn handle_delete_history(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DeleteResponse>, AppError> {
    if !state.history.delete(id).await? {
        return Err(AppError::NotFound(format!("History entry {id} not found")));
    }
    Ok(Json(DeleteResponse { ok: true }))
}
