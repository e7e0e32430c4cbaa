//! # Repository Module
//!
//! Typed access to the records in a [`KeyValueStore`](crate::store::KeyValueStore).
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repositories Over One Store                          │
//! │                                                                         │
//! │  Session                                                               │
//! │       │                                                                 │
//! │       ├── MenuRepository   ──► "menuItems"                             │
//! │       ├── CartRepository   ──► "cart"                                  │
//! │       └── OrderLedger      ──► "orders" + "orderCounter"               │
//! │                 │                                                       │
//! │                 ▼                                                       │
//! │  KeyValueStore (Database | MemoryStore)                                │
//! │                                                                         │
//! │  Every repository:                                                     │
//! │  • owns the encoding of its record                                     │
//! │  • reads a malformed record as the default (logged at WARN)            │
//! │  • can stage its write into a WriteBatch instead of writing directly   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`MenuRepository`] - Menu Catalog persistence
//! - [`CartRepository`] - open cart persistence
//! - [`OrderLedger`] - append-only order history and the order counter

pub mod cart;
pub mod ledger;
pub mod menu;

pub use cart::CartRepository;
pub use ledger::OrderLedger;
pub use menu::MenuRepository;
