//! # Domain Types
//!
//! Core domain types used throughout Bistro POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    MenuItem     │   │    CartLine     │   │     Order       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │──►│  item_id        │   │  order_number   │       │
//! │  │  name           │   │  name  (copy)   │   │  date_time      │       │
//! │  │  price          │   │  price (copy)   │──►│  items[]        │       │
//! │  │  image          │   │  image (copy)   │   │  total          │       │
//! │  └─────────────────┘   │  quantity ≥ 1   │   └────────┬────────┘       │
//! │                        └─────────────────┘            │                 │
//! │                                               ┌───────▼────────┐        │
//! │                                               │   OrderItem    │        │
//! │                                               │  name, price,  │        │
//! │                                               │  quantity      │        │
//! │                                               └────────────────┘        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! A cart line copies the menu item's name, price and image when it is
//! created, and an order item copies the cart line at checkout. Editing the
//! menu afterwards never changes an open cart or a recorded order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Menu Item
// =============================================================================

/// A dish or drink offered on the menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MenuItem {
    /// Opaque unique identifier (UUID v4 for items created here).
    pub id: String,

    /// Display name shown on the menu card, cart, receipt and report.
    pub name: String,

    /// Unit price in minor units.
    pub price: Money,

    /// Image URI for the menu card.
    pub image: String,
}

// =============================================================================
// Cart Line
// =============================================================================

/// One line of the open cart.
///
/// ## Invariant
/// `quantity` is always at least 1. A line whose quantity would reach zero
/// is removed from the cart instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartLine {
    /// Menu item this line was created from.
    #[serde(rename = "id")]
    pub item_id: String,

    /// Name at time of adding (frozen).
    pub name: String,

    /// Unit price at time of adding (frozen).
    pub price: Money,

    /// Image at time of adding (frozen).
    pub image: String,

    /// Quantity in cart.
    pub quantity: u32,
}

impl CartLine {
    /// Creates a quantity-1 line from a menu item.
    pub fn from_menu_item(item: &MenuItem) -> Self {
        CartLine {
            item_id: item.id.clone(),
            name: item.name.clone(),
            price: item.price,
            image: item.image.clone(),
            quantity: 1,
        }
    }

    /// Calculates the line total (unit price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        self.price * self.quantity
    }
}

// =============================================================================
// Order Item
// =============================================================================

/// A line of a recorded order, frozen at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderItem {
    pub name: String,
    pub price: Money,
    pub quantity: u32,
}

impl OrderItem {
    /// Returns price × quantity for this line.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.price * self.quantity
    }
}

impl From<&CartLine> for OrderItem {
    fn from(line: &CartLine) -> Self {
        OrderItem {
            name: line.name.clone(),
            price: line.price,
            quantity: line.quantity,
        }
    }
}

// =============================================================================
// Order
// =============================================================================

/// A completed order in the ledger.
///
/// Immutable after creation: the ledger appends orders and never edits or
/// removes them. Build one with [`Order::from_lines`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Order {
    /// "ORD-" followed by the zero-padded sequence, e.g. `ORD-007`.
    pub order_number: String,

    /// When the order was placed (stored as a UTC instant).
    #[ts(as = "String")]
    pub date_time: DateTime<Utc>,

    /// Frozen line items in cart order.
    pub items: Vec<OrderItem>,

    /// Sum of price × quantity over `items`.
    pub total: Money,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn pasta() -> MenuItem {
        MenuItem {
            id: "pasta".to_string(),
            name: "Pesto Pasta".to_string(),
            price: Money::from_major(320),
            image: "https://example.com/pasta.jpg".to_string(),
        }
    }

    #[test]
    fn test_cart_line_copies_menu_fields() {
        let line = CartLine::from_menu_item(&pasta());
        assert_eq!(line.item_id, "pasta");
        assert_eq!(line.name, "Pesto Pasta");
        assert_eq!(line.price, Money::from_major(320));
        assert_eq!(line.quantity, 1);
    }

    #[test]
    fn test_cart_line_serializes_with_stored_field_names() {
        let line = CartLine::from_menu_item(&pasta());
        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(json["id"], "pasta");
        assert_eq!(json["price"], 32000);
        assert_eq!(json["quantity"], 1);
    }

    #[test]
    fn test_order_item_line_total() {
        let mut line = CartLine::from_menu_item(&pasta());
        line.quantity = 3;
        let item = OrderItem::from(&line);
        assert_eq!(item.line_total(), Money::from_major(960));
    }
}
