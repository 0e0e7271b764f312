//! Database schema migrations
//!
//! Versioned, idempotent migrations tracked in the schema_version table.
//! Never modify an existing migration; add a new one and bump
//! CURRENT_SCHEMA_VERSION.

use crate::Result;
use sqlx::SqlitePool;
use tracing::info;

/// Current schema version
const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Get current schema version from database
///
/// Returns 0 if schema_version has no rows (fresh database)
async fn get_schema_version(pool: &SqlitePool) -> Result<i32> {
    let version: Option<i32> = sqlx::query_scalar("SELECT MAX(version) FROM schema_version")
        .fetch_one(pool)
        .await?;
    Ok(version.unwrap_or(0))
}

async fn set_schema_version(pool: &SqlitePool, version: i32) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO schema_version (version) VALUES (?)")
        .bind(version)
        .execute(pool)
        .await?;
    Ok(())
}

/// Run all outstanding migrations (safe to call multiple times)
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    let version = get_schema_version(pool).await?;

    if version < 1 {
        migrate_v1(pool).await?;
        set_schema_version(pool, 1).await?;
    }

    if version < CURRENT_SCHEMA_VERSION {
        info!(
            "Database migrated from v{} to v{}",
            version, CURRENT_SCHEMA_VERSION
        );
    }

    Ok(())
}

/// v1: baseline schema, created by init; nothing to transform
async fn migrate_v1(_pool: &SqlitePool) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init::init_memory_database;

    #[tokio::test]
    async fn test_migrations_idempotent() {
        let pool = init_memory_database().await.unwrap();

        // init already ran migrations once; running again must be a no-op
        run_migrations(&pool).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let version = get_schema_version(&pool).await.unwrap();
        assert_eq!(version, CURRENT_SCHEMA_VERSION);
    }
}
