//! Verification registry: durable history plus favorites set
//!
//! The registry is a shared resource. Mutations (`append`,
//! `toggle_favorite`) are serialized behind a single writer lock so the
//! exists-then-write sequences stay atomic; reads go straight to the
//! pool.

use sqlx::SqlitePool;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::db;
use crate::error::{VerifyError, VerifyResult};
use crate::models::VerificationResult;

pub struct VerificationRegistry {
    pool: SqlitePool,
    write_lock: Mutex<()>,
}

impl VerificationRegistry {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            write_lock: Mutex::new(()),
        }
    }

    /// Append a completed result to history.
    ///
    /// Fails with `DuplicateResult` if the id is already recorded,
    /// leaving history unchanged. Duplicate ids come from
    /// double-submission (e.g. re-invocation after a transient network
    /// retry), not from normal pipeline operation.
    pub async fn append(&self, result: &VerificationResult) -> VerifyResult<()> {
        let _guard = self.write_lock.lock().await;

        if db::results::result_exists(&self.pool, result.id).await? {
            return Err(VerifyError::DuplicateResult(result.id));
        }
        db::results::insert_result(&self.pool, result).await?;

        tracing::debug!(result_id = %result.id, status = ?result.status, "Result appended to history");
        Ok(())
    }

    /// Flip favorites membership for a result id.
    ///
    /// Returns the new membership state. Fails with `NotFound` if the
    /// id is not in history; favorites can only reference results that
    /// exist.
    pub async fn toggle_favorite(&self, result_id: Uuid) -> VerifyResult<bool> {
        let _guard = self.write_lock.lock().await;

        if !db::results::result_exists(&self.pool, result_id).await? {
            return Err(VerifyError::NotFound(format!(
                "Result not in history: {}",
                result_id
            )));
        }

        let favorite = if db::favorites::is_favorite(&self.pool, result_id).await? {
            db::favorites::remove_favorite(&self.pool, result_id).await?;
            false
        } else {
            db::favorites::add_favorite(&self.pool, result_id).await?;
            true
        };

        tracing::debug!(result_id = %result_id, favorite, "Favorite toggled");
        Ok(favorite)
    }

    /// Full history, most recent first. Callers get owned copies; the
    /// stored rows are never handed out mutably.
    pub async fn history(&self) -> VerifyResult<Vec<VerificationResult>> {
        db::results::load_history(&self.pool).await
    }

    /// Favorited results in registry order
    pub async fn favorites(&self) -> VerifyResult<Vec<VerificationResult>> {
        db::favorites::load_favorites(&self.pool).await
    }

    /// Load one result by id
    pub async fn load(&self, result_id: Uuid) -> VerifyResult<Option<VerificationResult>> {
        db::results::load_result(&self.pool, result_id).await
    }
}
