//! # Cart Engine
//!
//! The open shopping cart: a multiset of menu items with quantities.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Operator Action          Engine Call              Cart Change          │
//! │  ───────────────          ───────────              ───────────          │
//! │                                                                         │
//! │  Tap menu card ──────────► add_item() ───────────► qty += 1 or push    │
//! │                                                                         │
//! │  Tap + / - ──────────────► change_quantity() ────► qty += delta        │
//! │                                                    (≤ 0 removes line)  │
//! │                                                                         │
//! │  Remove line ────────────► remove_item() ────────► retain(id != x)     │
//! │                                                                         │
//! │  Clear (confirmed) ──────► clear_confirmed() ────► lines.clear()       │
//! │                                                                         │
//! │  Pay / Print bill ───────► snapshot() + total() ─► Order (order.rs)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - At most one line per item id (adding the same item increases quantity)
//! - Every line has quantity ≥ 1; a line is removed, never left at zero
//! - Line order is the order items were first added

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::menu::Catalog;
use crate::money::Money;
use crate::types::{CartLine, MenuItem, OrderItem};

// =============================================================================
// Confirmation
// =============================================================================

/// Supplies the operator's answer to a yes/no question, such as
/// "Are you sure you want to clear the cart?".
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

/// An answer the caller already holds (e.g. a `--yes` flag).
impl Confirm for bool {
    fn confirm(&self, _prompt: &str) -> bool {
        *self
    }
}

/// Prompt shown before emptying the cart.
pub const CLEAR_CART_PROMPT: &str = "Are you sure you want to clear the cart?";

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { lines: Vec::new() }
    }

    /// Rebuilds a cart from stored lines, restoring the invariants: lines at
    /// quantity zero are dropped and repeated item ids are merged into the
    /// first occurrence.
    pub fn from_lines(stored: Vec<CartLine>) -> Self {
        let mut cart = Cart::new();
        for line in stored {
            if line.quantity == 0 {
                continue;
            }
            match cart.line_mut(&line.item_id) {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(line.quantity);
                }
                None => cart.lines.push(line),
            }
        }
        cart
    }

    /// Adds one unit of a catalog item.
    ///
    /// ## Behavior
    /// - Item unknown to the catalog: no-op, returns `false`
    /// - Item already in cart: quantity + 1
    /// - Otherwise: new line with quantity 1, copying name/price/image now
    pub fn add_item<C: Catalog + ?Sized>(&mut self, catalog: &C, item_id: &str) -> bool {
        match catalog.lookup(item_id) {
            Some(item) => {
                self.add_menu_item(item);
                true
            }
            None => false,
        }
    }

    /// Adds one unit of an already looked-up menu item.
    pub fn add_menu_item(&mut self, item: &MenuItem) {
        if let Some(line) = self.line_mut(&item.id) {
            line.quantity = line.quantity.saturating_add(1);
            return;
        }
        self.lines.push(CartLine::from_menu_item(item));
    }

    /// Removes the line for `item_id`. Idempotent: returns whether a line
    /// was removed.
    pub fn remove_item(&mut self, item_id: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.item_id != item_id);
        self.lines.len() != before
    }

    /// Adds a signed `delta` to a line's quantity.
    ///
    /// ## Behavior
    /// - Item not in cart: no-op, returns `false`
    /// - Resulting quantity ≤ 0: the line is removed
    /// - Otherwise the quantity is updated
    ///
    /// ## Example
    /// ```rust
    /// use bistro_core::{Cart, Menu, Money};
    ///
    /// let mut menu = Menu::new();
    /// let fries = menu.add("Cheesy Fries", Money::from_major(150), "fries.jpg").unwrap();
    ///
    /// let mut cart = Cart::new();
    /// cart.add_item(&menu, &fries.id);
    /// cart.change_quantity(&fries.id, 2);
    /// assert_eq!(cart.total_quantity(), 3);
    ///
    /// cart.change_quantity(&fries.id, -3);
    /// assert!(cart.is_empty());
    /// ```
    pub fn change_quantity(&mut self, item_id: &str, delta: i64) -> bool {
        let Some(line) = self.line_mut(item_id) else {
            return false;
        };

        let next = i64::from(line.quantity).saturating_add(delta);
        if next <= 0 {
            self.remove_item(item_id);
        } else {
            line.quantity = u32::try_from(next).unwrap_or(u32::MAX);
        }
        true
    }

    /// Empties the cart unconditionally.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Empties the cart if the operator confirms. Returns whether it was
    /// cleared.
    pub fn clear_confirmed<C: Confirm + ?Sized>(&mut self, confirm: &C) -> bool {
        if !confirm.confirm(CLEAR_CART_PROMPT) {
            return false;
        }
        self.clear();
        true
    }

    /// Sum of price × quantity over all lines. No rounding is applied.
    pub fn total(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Frozen order items for checkout, in cart order.
    pub fn snapshot(&self) -> Vec<OrderItem> {
        self.lines.iter().map(OrderItem::from).collect()
    }

    /// The lines in the order they were first added.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Returns the line for an item, if present.
    pub fn line(&self, item_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.item_id == item_id)
    }

    /// Returns the number of distinct lines.
    pub fn item_count(&self) -> usize {
        self.lines.len()
    }

    /// Returns the total quantity of all lines (the cart badge count).
    pub fn total_quantity(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn line_mut(&mut self, item_id: &str) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|line| line.item_id == item_id)
    }
}

// =============================================================================
// Cart Summary
// =============================================================================

/// Cart totals summary for the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartSummary {
    pub item_count: usize,
    #[ts(type = "number")]
    pub total_quantity: u64,
    pub total: Money,
}

impl From<&Cart> for CartSummary {
    fn from(cart: &Cart) -> Self {
        CartSummary {
            item_count: cart.item_count(),
            total_quantity: cart.total_quantity(),
            total: cart.total(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
