//! Favorites set persistence
//!
//! Favorites are a derived subset of history: a favorite may only
//! reference a result id that exists in `verification_results`.

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::VerifyResult;
use crate::models::VerificationResult;

/// Whether the result id is currently a favorite
pub async fn is_favorite(pool: &SqlitePool, result_id: Uuid) -> VerifyResult<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM favorites WHERE result_id = ?")
        .bind(result_id.to_string())
        .fetch_one(pool)
        .await?;

    Ok(count > 0)
}

/// Add a result id to the favorites set
pub async fn add_favorite(pool: &SqlitePool, result_id: Uuid) -> VerifyResult<()> {
    sqlx::query("INSERT INTO favorites (result_id, marked_at) VALUES (?, ?)")
        .bind(result_id.to_string())
        .bind(Utc::now().to_rfc3339())
        .execute(pool)
        .await?;

    Ok(())
}

/// Remove a result id from the favorites set
pub async fn remove_favorite(pool: &SqlitePool, result_id: Uuid) -> VerifyResult<()> {
    sqlx::query("DELETE FROM favorites WHERE result_id = ?")
        .bind(result_id.to_string())
        .execute(pool)
        .await?;

    Ok(())
}

/// Load favorited results in registry order (most recent first)
pub async fn load_favorites(pool: &SqlitePool) -> VerifyResult<Vec<VerificationResult>> {
    let rows = sqlx::query(
        r#"
        SELECT r.result_id, r.verified_at, r.status, r.confidence_score,
               r.extracted_data, r.indicators, r.summary_explanation
        FROM verification_results r
        INNER JOIN favorites f ON f.result_id = r.result_id
        ORDER BY r.rowid DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(super::results::row_to_result).collect()
}
