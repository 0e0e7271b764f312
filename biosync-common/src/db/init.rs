//! Database initialization
//!
//! Creates the registry schema on first run and opens existing databases
//! idempotently. All child tables cascade from their owning aggregate root
//! so a specimen tree can be replaced wholesale inside one transaction.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Initialize database connection and create tables if needed.
///
/// Connection options rather than one-shot PRAGMA statements: foreign-key
/// enforcement is per-connection and the cascade deletes on tree
/// replacement depend on it holding for every pooled connection.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        // WAL allows concurrent readers with one writer
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(5000));

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_all_tables(&pool).await?;

    // Versioned migrations run after baseline table creation
    crate::db::migrations::run_migrations(&pool).await?;

    Ok(pool)
}

/// Open an in-memory database with the full schema, for tests and tooling.
/// Single connection: each sqlite::memory: connection is its own database.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .in_memory(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    create_all_tables(&pool).await?;
    crate::db::migrations::run_migrations(&pool).await?;

    Ok(pool)
}

async fn create_all_tables(pool: &SqlitePool) -> Result<()> {
    create_schema_version_table(pool).await?;
    create_participants_table(pool).await?;
    create_specimens_table(pool).await?;
    create_specimen_attributes_table(pool).await?;
    create_aliquots_table(pool).await?;
    create_datasets_table(pool).await?;
    create_dataset_items_table(pool).await?;
    create_stored_samples_table(pool).await?;
    Ok(())
}

async fn create_schema_version_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_participants_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS participants (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            biobank_id  TEXT NOT NULL UNIQUE,
            created_at  INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_specimens_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS specimens (
            id                       INTEGER PRIMARY KEY AUTOINCREMENT,
            rlims_id                 TEXT NOT NULL UNIQUE,
            participant_id           INTEGER NOT NULL REFERENCES participants(id),
            order_id                 TEXT NOT NULL,
            test_code                TEXT NOT NULL,
            repository_id            TEXT,
            study_id                 TEXT,
            cohort_id                TEXT,
            collection_date          TEXT,
            confirmed_date           TEXT,
            status                   TEXT NOT NULL DEFAULT '',
            freeze_thaw_count        INTEGER,
            location                 TEXT,
            quantity                 REAL,
            quantity_units           TEXT,
            processing_complete_date TEXT,
            deviations               TEXT,
            disposal_reason          TEXT NOT NULL DEFAULT '',
            disposal_date            TEXT,
            created_at               INTEGER NOT NULL,
            updated_at               INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_specimen_attributes_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS specimen_attributes (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            specimen_id INTEGER NOT NULL REFERENCES specimens(id) ON DELETE CASCADE,
            name        TEXT NOT NULL,
            value       TEXT NOT NULL DEFAULT '',
            UNIQUE(specimen_id, name)
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_aliquots_table(pool: &SqlitePool) -> Result<()> {
    // Exactly one of specimen_id / parent_aliquot_id is set.
    // root_specimen_rlims_id is denormalized so a whole subtree can be
    // addressed without walking the parent chain.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS aliquots (
            id                       INTEGER PRIMARY KEY AUTOINCREMENT,
            rlims_id                 TEXT NOT NULL UNIQUE,
            specimen_id              INTEGER REFERENCES specimens(id) ON DELETE CASCADE,
            parent_aliquot_id        INTEGER REFERENCES aliquots(id) ON DELETE CASCADE,
            root_specimen_rlims_id   TEXT NOT NULL,
            sample_type              TEXT,
            child_plan_service       TEXT,
            initial_treatment        TEXT,
            container_type           TEXT,
            status                   TEXT NOT NULL DEFAULT '',
            freeze_thaw_count        INTEGER,
            location                 TEXT,
            quantity                 REAL,
            quantity_units           TEXT,
            processing_complete_date TEXT,
            deviations               TEXT,
            disposal_reason          TEXT NOT NULL DEFAULT '',
            disposal_date            TEXT,
            created_at               INTEGER NOT NULL,
            updated_at               INTEGER NOT NULL,
            CHECK (
                (specimen_id IS NOT NULL AND parent_aliquot_id IS NULL) OR
                (specimen_id IS NULL AND parent_aliquot_id IS NOT NULL)
            )
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_aliquots_root ON aliquots(root_specimen_rlims_id)",
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_datasets_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS datasets (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            rlims_id   TEXT NOT NULL UNIQUE,
            aliquot_id INTEGER NOT NULL REFERENCES aliquots(id) ON DELETE CASCADE,
            name       TEXT NOT NULL DEFAULT '',
            status     TEXT NOT NULL DEFAULT ''
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_dataset_items_table(pool: &SqlitePool) -> Result<()> {
    // param_id is only unique within its dataset
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS dataset_items (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            dataset_id    INTEGER NOT NULL REFERENCES datasets(id) ON DELETE CASCADE,
            param_id      TEXT NOT NULL,
            display_value TEXT,
            display_units TEXT,
            UNIQUE(dataset_id, param_id)
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_stored_samples_table(pool: &SqlitePool) -> Result<()> {
    // Lab inventory report side. Written by the manifest ingestion path,
    // read by reconciliation. Timestamps are unix seconds.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS stored_samples (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            sample_id    TEXT NOT NULL UNIQUE,
            biobank_id   TEXT NOT NULL,
            test_code    TEXT NOT NULL,
            order_id     TEXT NOT NULL,
            status       TEXT NOT NULL,
            confirmed_at INTEGER,
            created_at   INTEGER NOT NULL,
            disposed_at  INTEGER
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}
