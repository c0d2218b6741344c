//! SQLite persistence for the verification registry

pub mod favorites;
pub mod results;

use std::path::Path;

use anyhow::Result;
use sqlx::SqlitePool;

/// Initialize database connection pool and registry tables
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // mode=rwc: read, write, create
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;
    init_tables(&pool).await?;

    Ok(pool)
}

/// Create registry tables if they don't exist.
///
/// History order is append order (rowid); reads present most recent
/// first. Favorites reference history by id, which keeps the
/// favorites-subset-of-history invariant enforceable.
pub async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS verification_results (
            result_id TEXT PRIMARY KEY,
            verified_at TEXT NOT NULL,
            status TEXT NOT NULL,
            confidence_score INTEGER NOT NULL,
            extracted_data TEXT NOT NULL,
            indicators TEXT NOT NULL,
            summary_explanation TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS favorites (
            result_id TEXT PRIMARY KEY,
            marked_at TEXT NOT NULL,
            FOREIGN KEY (result_id) REFERENCES verification_results(result_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Database tables initialized (verification_results, favorites)");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_database_file_and_tables() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry").join("test.db");

        let pool = init_database_pool(&path).await.unwrap();
        assert!(path.exists());

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM verification_results")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM favorites")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}
