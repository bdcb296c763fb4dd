//! Store-wide bookkeeping.

use chrono::Utc;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};

use crate::errors::AppError;
use crate::models::RevisionInfo;

/// Handle on the shared pool. Cloning shares the pool.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get the current revision ID.
    pub async fn get_revision_id(&self) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT revision_id FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("revision_id"))
    }

    pub async fn get_revision_info(&self) -> Result<RevisionInfo, AppError> {
        let row = sqlx::query("SELECT revision_id, generated_at FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(RevisionInfo {
            revision_id: row.get("revision_id"),
            generated_at: row.get("generated_at"),
        })
    }

    /// Increment the revision ID inside a write transaction, so the bump
    /// commits or rolls back with the write itself.
    pub async fn increment_revision(tx: &mut Transaction<'_, Sqlite>) -> Result<i64, sqlx::Error> {
        let now = Utc::now().to_rfc3339();
        let row = sqlx::query(
            "UPDATE meta SET revision_id = revision_id + 1, generated_at = ? WHERE id = 1 RETURNING revision_id",
        )
        .bind(&now)
        .fetch_one(&mut **tx)
        .await?;
        Ok(row.get("revision_id"))
    }
}
