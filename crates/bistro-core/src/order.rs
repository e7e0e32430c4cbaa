//! # Orders
//!
//! Turning a cart snapshot into an immutable [`Order`].
//!
//! ## Order Numbers
//! ```text
//! sequence    order number
//! ────────    ────────────
//!        1    ORD-001
//!       42    ORD-042
//!      999    ORD-999
//!     1000    ORD-1000     ← never truncated, simply longer
//! ```
//!
//! Allocation of the sequence belongs to the Order Ledger (bistro-db); this
//! module only formats it and builds the record.

use chrono::{DateTime, TimeZone, Utc};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{CartLine, Order, OrderItem};

/// Prefix of every order number.
pub const ORDER_NUMBER_PREFIX: &str = "ORD-";

/// Minimum number of digits after the prefix.
pub const ORDER_NUMBER_MIN_DIGITS: usize = 3;

/// First sequence ever issued.
pub const FIRST_ORDER_SEQUENCE: u64 = 1;

/// Formats a sequence as an order number.
///
/// ## Example
/// ```rust
/// use bistro_core::order::format_order_number;
///
/// assert_eq!(format_order_number(7), "ORD-007");
/// assert_eq!(format_order_number(1234), "ORD-1234");
/// ```
pub fn format_order_number(sequence: u64) -> String {
    format!(
        "{}{:0width$}",
        ORDER_NUMBER_PREFIX,
        sequence,
        width = ORDER_NUMBER_MIN_DIGITS
    )
}

/// Recovers the sequence from an order number, if it is well formed.
pub fn parse_order_number(order_number: &str) -> Option<u64> {
    let digits = order_number.strip_prefix(ORDER_NUMBER_PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Sum of price × quantity over order items.
pub fn items_total(items: &[OrderItem]) -> Money {
    items.iter().map(OrderItem::line_total).sum()
}

impl Order {
    /// Builds the order record for one checkout.
    ///
    /// ## What This Does
    /// 1. Formats `sequence` as the order number
    /// 2. Stamps `placed_at`
    /// 3. Copies every cart line into a frozen [`OrderItem`]
    /// 4. Computes the total from those copies, so `total` always equals
    ///    sum(price × quantity) of `items` whatever the caller believes
    ///
    /// ## Errors
    /// `CoreError::EmptyCart` when `lines` is empty; an order always has at
    /// least one item.
    pub fn from_lines(
        sequence: u64,
        placed_at: DateTime<Utc>,
        lines: &[CartLine],
    ) -> CoreResult<Order> {
        if lines.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        let items: Vec<OrderItem> = lines.iter().map(OrderItem::from).collect();
        let total = items_total(&items);

        Ok(Order {
            order_number: format_order_number(sequence),
            date_time: placed_at,
            items,
            total,
        })
    }

    /// The sequence encoded in the order number.
    pub fn sequence(&self) -> Option<u64> {
        parse_order_number(&self.order_number)
    }

    /// Total recomputed from the items.
    pub fn recomputed_total(&self) -> Money {
        items_total(&self.items)
    }

    /// The order's timestamp in the given time zone.
    pub fn placed_at_in<Tz: TimeZone>(&self, tz: &Tz) -> DateTime<Tz> {
        self.date_time.with_timezone(tz)
    }

    /// Total number of units across all items.
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
