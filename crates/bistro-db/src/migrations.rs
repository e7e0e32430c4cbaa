//! # Schema Migrations
//!
//! The schema is a single key-value table; record layouts live in the JSON
//! values, so most changes to the data model need no migration at all.
//!
//! ```text
//! migrations/sqlite/
//! └── 001_kv_store.sql    kv_store(key PK, value, updated_at)
//! ```
//!
//! Files are embedded at compile time and applied in name order. sqlx
//! records each applied file in `_sqlx_migrations` with its checksum, so an
//! edited migration is rejected at startup. Add a new numbered file instead.

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Embedded migrations versus those recorded in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationStatus {
    pub embedded: usize,
    pub applied: usize,
}

impl MigrationStatus {
    pub fn is_current(&self) -> bool {
        self.applied >= self.embedded
    }
}

/// Applies every pending migration.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    debug!(embedded = MIGRATOR.migrations.len(), "Applying migrations");
    MIGRATOR.run(pool).await?;
    info!("Store schema is current");
    Ok(())
}

pub async fn migration_status(pool: &SqlitePool) -> DbResult<MigrationStatus> {
    let applied: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
            .fetch_one(pool)
            .await?;

    Ok(MigrationStatus {
        embedded: MIGRATOR.migrations.len(),
        applied: usize::try_from(applied).unwrap_or(0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.run_migrations().await.unwrap();

        let status = migration_status(db.pool()).await.unwrap();
        assert_eq!(status, MigrationStatus { embedded: 1, applied: 1 });
        assert!(status.is_current());
    }

    #[tokio::test]
    async fn test_kv_store_table_exists() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let tables: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'kv_store'",
        )
        .fetch_one(db.pool())
        .await
        .unwrap();
        assert_eq!(tables, 1);
    }
}
