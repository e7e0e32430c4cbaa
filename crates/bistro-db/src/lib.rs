//! # bistro-db: Persistence Layer for Bistro POS
//!
//! This crate persists the menu, the open cart and the order ledger, and
//! wraps them into a [`Session`].
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bistro POS Data Flow                             │
//! │                                                                         │
//! │  CLI command (checkout)                                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     bistro-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Session     │    │ Repositories  │    │ KeyValueStore│  │   │
//! │  │   │ (session.rs)  │───►│ MenuRepo      │───►│ Database     │  │   │
//! │  │   │ menu + cart   │    │ CartRepo      │    │ MemoryStore  │  │   │
//! │  │   │ notifications │    │ OrderLedger   │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   <platform data dir>/bistro.db  (table kv_store)               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`store`] - The key-value contract, write batches, memory store
//! - [`pool`] - SQLite pool creation and the SQLite store
//! - [`migrations`] - Embedded database migrations
//! - [`repository`] - Menu, cart and ledger records
//! - [`session`] - The session context object
//! - [`error`] - Database and session error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bistro_db::{Database, DbConfig, Session, SessionOptions};
//!
//! let db = Database::new(DbConfig::new("bistro.db")).await?;
//! let mut session = Session::open(db, SessionOptions::default()).await?;
//!
//! let first = session.menu().list()[0].id.clone();
//! session.add_item(&first).await?;
//! let order = session.checkout().await?;
//! println!("Recorded {}", order.order_number);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod session;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult, SessionError, SessionResult};
pub use pool::{Database, DbConfig};
pub use session::{Session, SessionOptions, StateChange};
pub use store::{KeyValueStore, MemoryStore, WriteBatch};

// Repository re-exports for convenience
pub use repository::cart::CartRepository;
pub use repository::ledger::OrderLedger;
pub use repository::menu::MenuRepository;
