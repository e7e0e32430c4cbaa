//! # SQLite Store
//!
//! [`Database`] keeps every record as one row of the `kv_store` table.
//!
//! ## Opening a Store
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Opening the SQLite Store                           │
//! │                                                                         │
//! │  DbConfig::new("bistro.db")          DbConfig::in_memory()             │
//! │       │                                   │                             │
//! │       └───────────────┬───────────────────┘                             │
//! │                       ▼                                                 │
//! │  Database::new(config)                                                 │
//! │       ├── journal: WAL, synchronous: NORMAL                            │
//! │       ├── busy_timeout: wait for another terminal's write              │
//! │       ├── pool of up to max_connections                                │
//! │       └── migrations (001_kv_store.sql)                                │
//! │                       │                                                 │
//! │                       ▼                                                 │
//! │  ┌───────────────────────────────────────────────────────────┐         │
//! │  │ kv_store                                                  │         │
//! │  │  key (PK)        value (JSON)            updated_at       │         │
//! │  │  "menuItems"     [{"id":..}, ..]         2026-03-05T..    │         │
//! │  │  "orders"        [{"orderNumber":..}]    2026-03-05T..    │         │
//! │  └───────────────────────────────────────────────────────────┘         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Two CLI invocations may open the same file at once. WAL keeps readers
//! off the writer's lock; the busy timeout makes a second writer wait
//! instead of failing with `SQLITE_BUSY`.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::store::{KeyValueStore, WriteBatch};

/// Path that selects a private in-memory database.
const IN_MEMORY_PATH: &str = ":memory:";

const UPSERT_SQL: &str = r#"
    INSERT INTO kv_store (key, value, updated_at)
    VALUES (?1, ?2, ?3)
    ON CONFLICT(key) DO UPDATE SET
        value = excluded.value,
        updated_at = excluded.updated_at
"#;

// =============================================================================
// Configuration
// =============================================================================

/// How to open the SQLite store.
///
/// ```rust,ignore
/// let config = DbConfig::new(data_dir.join("bistro.db"))
///     .busy_timeout(Duration::from_secs(10));
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// SQLite file, created on first open. `:memory:` for a private
    /// in-memory database.
    pub database_path: PathBuf,

    /// Pool size. A single terminal rarely needs more than a couple.
    pub max_connections: u32,

    /// How long to wait for a free pooled connection.
    pub acquire_timeout: Duration,

    /// How long a write waits on a lock held by another process.
    pub busy_timeout: Duration,

    /// Pooled connections idle this long are closed. Not applied to
    /// in-memory databases, which vanish with their last connection.
    pub idle_timeout: Duration,

    /// Apply pending migrations when opening.
    pub run_migrations: bool,
}

impl DbConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 4,
            acquire_timeout: Duration::from_secs(30),
            busy_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
        }
    }

    /// A private database that lives as long as the returned [`Database`].
    ///
    /// Limited to one connection: every new connection to `:memory:`
    /// would see its own empty database.
    pub fn in_memory() -> Self {
        DbConfig {
            max_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            ..DbConfig::new(IN_MEMORY_PATH)
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path == Path::new(IN_MEMORY_PATH)
    }
}

// =============================================================================
// Database
// =============================================================================

/// SQLite-backed store. Clones share the pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens (or creates) the store described by `config`.
    ///
    /// ## Errors
    /// - `DbError::ConnectionFailed` if the file cannot be opened
    /// - `DbError::MigrationFailed` if the schema cannot be brought up to date
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            in_memory = config.is_in_memory(),
            "Opening store"
        );

        let target = if config.is_in_memory() {
            SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
        } else {
            SqliteConnectOptions::new().filename(&config.database_path)
        };

        let connect_options = target
            .journal_mode(SqliteJournalMode::Wal)
            // NORMAL: the last commit may be lost on power failure, the
            // file is never corrupted
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(config.busy_timeout)
            .foreign_keys(true)
            .create_if_missing(true);

        let pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout);

        let pool_options = if config.is_in_memory() {
            pool_options.idle_timeout(None).max_lifetime(None)
        } else {
            pool_options.idle_timeout(Some(config.idle_timeout))
        };

        let pool = pool_options
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        debug!(max_connections = config.max_connections, "Store pool ready");

        let db = Database { pool };
        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Brings the schema up to date. Safe to repeat.
    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Closes the pool. Store operations fail afterwards.
    pub async fn close(&self) {
        debug!("Closing store");
        self.pool.close().await;
    }

    /// `true` if a trivial query succeeds.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

#[async_trait]
impl KeyValueStore for Database {
    async fn get(&self, key: &str) -> DbResult<Option<String>> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM kv_store WHERE key = ?1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> DbResult<()> {
        debug!(key, bytes = value.len(), "Writing record");

        sqlx::query(UPSERT_SQL)
            .bind(key)
            .bind(value)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Runs the whole batch in one transaction. Dropping the transaction on
    /// an early return rolls it back.
    async fn commit(&self, batch: WriteBatch) -> DbResult<()> {
        if batch.is_empty() {
            return Ok(());
        }

        debug!(writes = batch.len(), "Committing write batch");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let now = Utc::now();
        for (key, value) in batch.into_writes() {
            sqlx::query(UPSERT_SQL)
                .bind(&key)
                .bind(&value)
                .bind(now)
                .execute(&mut *tx)
                .await
                .map_err(|e| DbError::TransactionFailed(format!("{}: {}", key, e)))?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
