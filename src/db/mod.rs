//! Database module for SQLite persistence.
//!
//! SQLite holds the store revision, the wallet session and the marketplace
//! ledger. Catalog fixtures are compiled in and never touch the database.

mod repository;
mod session;

pub use repository::*;
pub use session::*;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

/// Initialize the database connection pool and run migrations.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS meta (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            schema_version INTEGER NOT NULL DEFAULT 1,
            revision_id INTEGER NOT NULL DEFAULT 0,
            generated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        INSERT OR IGNORE INTO meta (id, schema_version, revision_id, generated_at)
        VALUES (1, 1, 0, datetime('now'));
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS wallet_session (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            address TEXT NOT NULL,
            connected_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    // i128 amounts and timestamps are stored as decimal TEXT
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS market_projects (
            id INTEGER PRIMARY KEY,
            owner TEXT NOT NULL,
            name TEXT NOT NULL,
            deadline_ts TEXT NOT NULL,
            current_amount TEXT NOT NULL DEFAULT '0',
            target_amount TEXT NOT NULL,
            problem_statement TEXT NOT NULL,
            impact_area TEXT NOT NULL,
            location TEXT NOT NULL,
            milestones TEXT NOT NULL,
            updates TEXT NOT NULL,
            impacted_people TEXT,
            donation_seq INTEGER NOT NULL DEFAULT 0
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS market_donations (
            project_id INTEGER NOT NULL,
            seq INTEGER NOT NULL,
            donor TEXT NOT NULL,
            amount TEXT NOT NULL,
            timestamp TEXT NOT NULL,
            PRIMARY KEY (project_id, seq)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS market_donor_marks (
            donor TEXT NOT NULL,
            project_id INTEGER NOT NULL,
            PRIMARY KEY (donor, project_id)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_market_projects_owner ON market_projects(owner);
        CREATE INDEX IF NOT EXISTS idx_market_donor_marks_donor ON market_donor_marks(donor);
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
