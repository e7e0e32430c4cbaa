//! # Store Errors
//!
//! [`DbError`] describes what went wrong below the session: the SQLite
//! file, the pool, or the JSON inside a record. [`SessionError`] is what
//! session operations return, pairing store failures with business-rule
//! failures from `bistro-core`.
//!
//! ```text
//! sqlx::Error ─────────┐
//! MigrateError ────────┼──► DbError ──┐
//! serde_json::Error ───┘              ├──► SessionError ──► AppError (bistro-cli)
//! CoreError (EmptyCart, ...) ─────────┘
//! ```

use bistro_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    /// A lookup by key or order number found nothing.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// The store could not be opened or has been closed.
    ///
    /// ## When This Occurs
    /// - The database directory is not writable
    /// - The file is not an SQLite database
    /// - An operation ran after `Database::close`
    #[error("Store unavailable: {0}")]
    ConnectionFailed(String),

    #[error("Schema migration failed: {0}")]
    MigrationFailed(String),

    /// SQLite rejected a statement.
    #[error("Store query failed: {0}")]
    QueryFailed(String),

    /// A write batch could not be committed.
    ///
    /// ## When This Occurs
    /// Disk full, or a lock held by another process past the busy timeout.
    /// None of the batch's writes are visible afterwards.
    #[error("Write batch failed: {0}")]
    TransactionFailed(String),

    /// No pooled connection became free in time.
    #[error("Store busy: no free connection")]
    PoolExhausted,

    /// A stored record could not be decoded.
    ///
    /// ## When This Occurs
    /// ```text
    /// store["orders"] = "{not json"      (corrupt write, older schema,
    ///        │                             hand edit)
    ///        ▼
    /// decode_record::<Vec<Order>>()
    ///        │
    ///        ▼
    /// MalformedRecord ──► repository logs WARN, uses the default
    /// ```
    #[error("Malformed record '{key}': {reason}")]
    MalformedRecord { key: String, reason: String },

    /// A value could not be encoded for storage.
    #[error("Could not encode record: {0}")]
    Serialization(String),

    #[error("Store error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// A `MalformedRecord` for the value stored under `key`.
    pub fn malformed(key: impl Into<String>, reason: impl ToString) -> Self {
        DbError::MalformedRecord {
            key: key.into(),
            reason: reason.to_string(),
        }
    }
}

/// ```text
/// Database(e)     → QueryFailed (SQLite's message)
/// PoolTimedOut    → PoolExhausted
/// PoolClosed      → ConnectionFailed
/// Io(e)           → ConnectionFailed
/// RowNotFound     → NotFound
/// anything else   → Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => DbError::QueryFailed(db_err.message().to_string()),
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("store is closed".to_string()),
            sqlx::Error::Io(io_err) => DbError::ConnectionFailed(io_err.to_string()),
            sqlx::Error::RowNotFound => DbError::not_found("row", "query returned no rows"),
            other => DbError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        DbError::Serialization(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Session Error
// =============================================================================

/// Errors surfaced by [`crate::session::Session`] operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Business rule violation (empty cart, invalid menu fields, ...).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The store failed; the in-memory state was left unchanged.
    #[error(transparent)]
    Db(#[from] DbError),
}

impl SessionError {
    /// Whether this is the "cart is empty" condition shown to the operator.
    pub fn is_empty_cart(&self) -> bool {
        matches!(self, SessionError::Core(CoreError::EmptyCart))
    }
}

pub type SessionResult<T> = Result<T, SessionError>;
