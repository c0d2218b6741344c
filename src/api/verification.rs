//! Verification API handlers
//!
//! POST /verify/submit, POST /verify/cancel/:id,
//! GET /verify/progress/:id, GET /verify/result/:id

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use base64::Engine;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{SessionState, StageProgress, VerificationResult};
use crate::services::ResultQuery;
use crate::AppState;

/// POST /verify/submit request
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    /// Base64-encoded document bytes
    pub document: String,
    pub mime_type: String,
}

/// POST /verify/submit response
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub request_id: Uuid,
    pub state: SessionState,
}

/// GET /verify/result/:id response
#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum ResultResponse {
    Pending,
    Completed { result: VerificationResult },
    Failed { error: String },
    Cancelled,
}

/// POST /verify/cancel/:id response
#[derive(Debug, Serialize)]
pub struct CancelResponse {
    pub request_id: Uuid,
    pub state: SessionState,
}

/// POST /verify/submit
///
/// Accept a document for verification. The pipeline starts
/// immediately; a request already in flight is superseded.
pub async fn submit(
    State(state): State<AppState>,
    Json(request): Json<SubmitRequest>,
) -> ApiResult<(StatusCode, Json<SubmitResponse>)> {
    let document = base64::engine::general_purpose::STANDARD
        .decode(&request.document)
        .map_err(|e| ApiError::BadRequest(format!("Document is not valid base64: {}", e)))?;

    let request_id = state.controller.submit(document, request.mime_type).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(SubmitResponse {
            request_id,
            state: SessionState::Staged,
        }),
    ))
}

/// POST /verify/cancel/:request_id
///
/// Cancel an in-flight verification; no-op when already terminal.
pub async fn cancel(
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
) -> ApiResult<Json<CancelResponse>> {
    state.controller.cancel(request_id).await?;
    let session = state.controller.session_snapshot(request_id).await?;

    Ok(Json(CancelResponse {
        request_id,
        state: session.state,
    }))
}

/// GET /verify/progress/:request_id
///
/// Observable progress snapshot: stage index, label, detail.
pub async fn progress(
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
) -> ApiResult<Json<StageProgress>> {
    let progress = state.controller.progress(request_id).await?;
    Ok(Json(progress))
}

/// GET /verify/result/:request_id
pub async fn result(
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
) -> ApiResult<Json<ResultResponse>> {
    let response = match state.controller.result(request_id).await? {
        ResultQuery::Pending => ResultResponse::Pending,
        ResultQuery::Completed(result) => ResultResponse::Completed { result },
        ResultQuery::Failed(error) => ResultResponse::Failed { error },
        ResultQuery::Cancelled => ResultResponse::Cancelled,
    };
    Ok(Json(response))
}

/// Build verification routes
pub fn verification_routes() -> Router<AppState> {
    Router::new()
        .route("/verify/submit", post(submit))
        .route("/verify/cancel/:request_id", post(cancel))
        .route("/verify/progress/:request_id", get(progress))
        .route("/verify/result/:request_id", get(result))
}
