//! SQLite-backed wallet session.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};

use crate::wallet::{SessionStore, WalletError};

/// Keeps the connected address in the single-row `wallet_session` table.
#[derive(Clone)]
pub struct SqliteSessionStore {
    pool: SqlitePool,
}

impl SqliteSessionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn load(&self) -> Result<Option<String>, WalletError> {
        let row = sqlx::query("SELECT address FROM wallet_session WHERE id = 1")
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.get("address")))
    }

    async fn save(&self, address: &str) -> Result<(), WalletError> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO wallet_session (id, address, connected_at) VALUES (1, ?, ?)
             ON CONFLICT(id) DO UPDATE SET address = excluded.address, connected_at = excluded.connected_at",
        )
        .bind(address)
        .bind(&now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), WalletError> {
        sqlx::query("DELETE FROM wallet_session WHERE id = 1")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_save_load_clear() {
        let dir = TempDir::new().unwrap();
        let pool = init_database(&dir.path().join("test.sqlite")).await.unwrap();
        let store = SqliteSessionStore::new(pool);

        assert_eq!(store.load().await.unwrap(), None);

        store.save("GFIRST").await.unwrap();
        store.save("GSECOND").await.unwrap();
        assert_eq!(store.load().await.unwrap().as_deref(), Some("GSECOND"));

        store.clear().await.unwrap();
        assert_eq!(store.load().await.unwrap(), None);
    }
}
