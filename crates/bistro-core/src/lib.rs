//! # bistro-core: Pure Business Logic for Bistro POS
//!
//! This crate holds the order lifecycle of a single-counter restaurant POS
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bistro POS Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    bistro-cli (operator surface)                │   │
//! │  │    menu ──► cart ──► checkout / bill ──► orders ──► report     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    bistro-db (Session + storage)                │   │
//! │  │    key-value records, order ledger, change notifications       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ bistro-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐  ┌─────────┐  ┌─────────┐  ┌─────────┐           │   │
//! │  │   │  menu   │  │  cart   │  │  order  │  │ report  │           │   │
//! │  │   │ Catalog │─►│  Cart   │─►│  Order  │─►│ Sales   │           │   │
//! │  │   └─────────┘  └─────────┘  └─────────┘  └─────────┘           │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain records (MenuItem, CartLine, Order, OrderItem)
//! - [`money`] - Money type with integer arithmetic
//! - [`menu`] - Menu Catalog
//! - [`cart`] - Cart Engine
//! - [`order`] - Order construction and numbering
//! - [`report`] - Sales Aggregator
//! - [`display`] - Currency, payment summary and receipt text
//! - [`error`] - Domain error types
//! - [`validation`] - Input rules
//!
//! ## Example Usage
//!
//! ```rust
//! use bistro_core::{Cart, Menu, Money};
//! use bistro_core::menu::Catalog;
//!
//! let mut menu = Menu::new();
//! let tea = menu.add("Masala Chai", Money::from_major(60), "chai.jpg").unwrap();
//!
//! let mut cart = Cart::new();
//! cart.add_item(&menu, &tea.id);
//! cart.add_item(&menu, &tea.id);
//!
//! assert_eq!(cart.item_count(), 1);
//! assert_eq!(cart.total(), Money::from_major(120));
//! assert_eq!(menu.list().len(), 1);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod display;
pub mod error;
pub mod menu;
pub mod money;
pub mod order;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use bistro_core::Money` instead of
// `use bistro_core::money::Money`

pub use cart::{Cart, CartSummary, Confirm};
pub use error::{CoreError, CoreResult, ValidationError};
pub use menu::{Catalog, Menu};
pub use money::Money;
pub use report::{report_for_month, ReportPeriod, SalesReport};
pub use types::*;
