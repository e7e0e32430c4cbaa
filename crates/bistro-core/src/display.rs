//! # Display Helpers
//!
//! Text meant for people: currency amounts, the payment summary encoded
//! into the payment QR code, and the printable receipt.

use chrono::TimeZone;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::Order;

/// Currency symbol used when none is configured.
pub const DEFAULT_CURRENCY_SYMBOL: &str = "₹";

/// Timestamp layout on receipts and payment summaries.
pub const DATE_TIME_FORMAT: &str = "%d/%m/%Y, %H:%M:%S";

/// Formats an amount for the operator: symbol plus whole currency units,
/// e.g. `₹321` for 320.50.
///
/// Rounding happens here and nowhere else on the display path; stored and
/// computed totals keep their minor units.
///
/// ## Example
/// ```rust
/// use bistro_core::display::format_currency;
/// use bistro_core::Money;
///
/// assert_eq!(format_currency(Money::from_minor(32050), "₹"), "₹321");
/// assert_eq!(format_currency(Money::from_major(250), "$"), "$250");
/// assert_eq!(format_currency(Money::from_minor(-250), "$"), "-$2");
/// ```
pub fn format_currency(amount: Money, symbol: &str) -> String {
    let whole = amount.rounded_major();
    if whole < 0 {
        format!("-{}{}", symbol, -whole)
    } else {
        format!("{}{}", symbol, whole)
    }
}

/// The text encoded into the payment QR code for an order.
///
/// ```text
/// Order #ORD-007
/// Total: ₹470
/// Date: 05/03/2026, 18:00:00
/// ```
///
/// The total is rounded to whole currency units.
pub fn payment_summary<Tz>(order: &Order, tz: &Tz, symbol: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!(
        "Order #{}\nTotal: {}\nDate: {}",
        order.order_number,
        format_currency(order.total, symbol),
        order.placed_at_in(tz).format(DATE_TIME_FORMAT)
    )
}

// =============================================================================
// Receipt
// =============================================================================

/// One printed receipt line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ReceiptLine {
    pub name: String,
    pub quantity: u32,
    pub unit_price: Money,
    pub line_total: Money,
}

/// A printable bill for one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Receipt {
    pub order_number: String,
    /// Local timestamp, already formatted.
    pub placed_at: String,
    pub lines: Vec<ReceiptLine>,
    pub total: Money,
}

impl Receipt {
    pub fn from_order<Tz>(order: &Order, tz: &Tz) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        Receipt {
            order_number: order.order_number.clone(),
            placed_at: order.placed_at_in(tz).format(DATE_TIME_FORMAT).to_string(),
            lines: order
                .items
                .iter()
                .map(|item| ReceiptLine {
                    name: item.name.clone(),
                    quantity: item.quantity,
                    unit_price: item.price,
                    line_total: item.line_total(),
                })
                .collect(),
            total: order.total,
        }
    }

    /// Renders the receipt as fixed-width text.
    pub fn render(&self, symbol: &str) -> String {
        const WIDTH: usize = 40;
        let rule = "-".repeat(WIDTH);
        let mut out = String::new();

        out.push_str(&format!("Order #{}\n", self.order_number));
        out.push_str(&format!("{}\n", self.placed_at));
        out.push_str(&rule);
        out.push('\n');

        for line in &self.lines {
            let amount = format_currency(line.line_total, symbol);
            let label = format!(
                "{} x{} @ {}",
                line.name,
                line.quantity,
                format_currency(line.unit_price, symbol)
            );
            out.push_str(&pad_between(&label, &amount, WIDTH));
            out.push('\n');
        }

        out.push_str(&rule);
        out.push('\n');
        out.push_str(&pad_between(
            "TOTAL",
            &format_currency(self.total, symbol),
            WIDTH,
        ));
        out.push('\n');
        out
    }
}

/// `left` and `right` separated by enough spaces to fill `width` columns,
/// with at least one space between them.
fn pad_between(left: &str, right: &str, width: usize) -> String {
    let used = left.chars().count() + right.chars().count();
    let gap = width.saturating_sub(used).max(1);
    format!("{}{}{}", left, " ".repeat(gap), right)
}
