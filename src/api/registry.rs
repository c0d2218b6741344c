//! Registry API handlers
//!
//! GET /history, GET /favorites, POST /favorites/:result_id/toggle

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::ApiResult;
use crate::models::VerificationResult;
use crate::AppState;

/// POST /favorites/:result_id/toggle response
#[derive(Debug, Serialize)]
pub struct ToggleFavoriteResponse {
    pub result_id: Uuid,
    pub favorite: bool,
}

/// GET /history - ordered verification history, most recent first
pub async fn history(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<VerificationResult>>> {
    let results = state.controller.history().await?;
    Ok(Json(results))
}

/// GET /favorites - favorited results in registry order
pub async fn favorites(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<VerificationResult>>> {
    let results = state.controller.favorites().await?;
    Ok(Json(results))
}

/// POST /favorites/:result_id/toggle
///
/// Flips membership; 404 when the id is not in history.
pub async fn toggle_favorite(
    State(state): State<AppState>,
    Path(result_id): Path<Uuid>,
) -> ApiResult<Json<ToggleFavoriteResponse>> {
    let favorite = state.controller.toggle_favorite(result_id).await?;
    Ok(Json(ToggleFavoriteResponse {
        result_id,
        favorite,
    }))
}

/// Build registry routes
pub fn registry_routes() -> Router<AppState> {
    Router::new()
        .route("/history", get(history))
        .route("/favorites", get(favorites))
        .route("/favorites/:result_id/toggle", post(toggle_favorite))
}
