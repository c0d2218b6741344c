//! Verification result persistence
//!
//! History storage order is append order (rowid); read order is most
//! recent first.

use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::error::{VerifyError, VerifyResult};
use crate::models::{ExtractedData, Indicator, VerificationResult, VerificationStatus};

/// Insert a result row. The registry checks for duplicates under its
/// writer lock before calling this; the primary key is the backstop.
pub async fn insert_result(pool: &SqlitePool, result: &VerificationResult) -> VerifyResult<()> {
    let extracted_data = serde_json::to_string(&result.extracted_data)
        .map_err(|e| VerifyError::Internal(format!("Failed to serialize extracted data: {}", e)))?;
    let indicators = serde_json::to_string(&result.indicators)
        .map_err(|e| VerifyError::Internal(format!("Failed to serialize indicators: {}", e)))?;
    let status = serde_json::to_string(&result.status)
        .map_err(|e| VerifyError::Internal(format!("Failed to serialize status: {}", e)))?;

    sqlx::query(
        r#"
        INSERT INTO verification_results (
            result_id, verified_at, status, confidence_score,
            extracted_data, indicators, summary_explanation
        ) VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(result.id.to_string())
    .bind(result.verified_at.to_rfc3339())
    .bind(status)
    .bind(result.confidence_score as i64)
    .bind(extracted_data)
    .bind(indicators)
    .bind(&result.summary_explanation)
    .execute(pool)
    .await?;

    Ok(())
}

/// Whether a result with this id exists in history
pub async fn result_exists(pool: &SqlitePool, result_id: Uuid) -> VerifyResult<bool> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM verification_results WHERE result_id = ?",
    )
    .bind(result_id.to_string())
    .fetch_one(pool)
    .await?;

    Ok(count > 0)
}

/// Load a single result by id
pub async fn load_result(
    pool: &SqlitePool,
    result_id: Uuid,
) -> VerifyResult<Option<VerificationResult>> {
    let row = sqlx::query(
        r#"
        SELECT result_id, verified_at, status, confidence_score,
               extracted_data, indicators, summary_explanation
        FROM verification_results
        WHERE result_id = ?
        "#,
    )
    .bind(result_id.to_string())
    .fetch_optional(pool)
    .await?;

    row.map(row_to_result).transpose()
}

/// Load full history, most recent first
pub async fn load_history(pool: &SqlitePool) -> VerifyResult<Vec<VerificationResult>> {
    let rows = sqlx::query(
        r#"
        SELECT result_id, verified_at, status, confidence_score,
               extracted_data, indicators, summary_explanation
        FROM verification_results
        ORDER BY rowid DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(row_to_result).collect()
}

pub(crate) fn row_to_result(row: sqlx::sqlite::SqliteRow) -> VerifyResult<VerificationResult> {
    let id: String = row.get("result_id");
    let id = Uuid::parse_str(&id)
        .map_err(|e| VerifyError::Internal(format!("Corrupt result id: {}", e)))?;

    let verified_at: String = row.get("verified_at");
    let verified_at = chrono::DateTime::parse_from_rfc3339(&verified_at)
        .map_err(|e| VerifyError::Internal(format!("Failed to parse verified_at: {}", e)))?
        .with_timezone(&chrono::Utc);

    let status: String = row.get("status");
    let status: VerificationStatus = serde_json::from_str(&status)
        .map_err(|e| VerifyError::Internal(format!("Failed to deserialize status: {}", e)))?;

    let confidence_score: i64 = row.get("confidence_score");

    let extracted_data: String = row.get("extracted_data");
    let extracted_data: ExtractedData = serde_json::from_str(&extracted_data)
        .map_err(|e| VerifyError::Internal(format!("Failed to deserialize extracted data: {}", e)))?;

    let indicators: String = row.get("indicators");
    let indicators: Vec<Indicator> = serde_json::from_str(&indicators)
        .map_err(|e| VerifyError::Internal(format!("Failed to deserialize indicators: {}", e)))?;

    Ok(VerificationResult {
        id,
        verified_at,
        status,
        confidence_score: confidence_score.clamp(0, 100) as u8,
        extracted_data,
        indicators,
        summary_explanation: row.get("summary_explanation"),
    })
}
