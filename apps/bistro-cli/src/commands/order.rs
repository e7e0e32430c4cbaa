//! # Order Commands
//!
//! Checkout and the order history.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Checkout                                             │
//! │                                                                         │
//! │  bistro checkout                    bistro bill                        │
//! │  ("Pay now")                        ("Print bill")                     │
//! │        │                                  │                            │
//! │        └────────────┬─────────────────────┘                            │
//! │                     ▼                                                  │
//! │        Session::checkout()                                             │
//! │          ├── empty cart ──► error, nothing recorded                    │
//! │          └── order + counter + empty cart, one batch                   │
//! │                     │                                                  │
//! │        ┌────────────┴─────────────────────┐                            │
//! │        ▼                                  ▼                            │
//! │  payment summary (QR text)          printable receipt                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use bistro_db::{KeyValueStore, Session};
use tracing::info;

use super::Terminal;
use crate::error::AppResult;

/// Records the cart and shows the text a payment QR code would carry.
pub(super) async fn pay_now<S>(session: &mut Session<S>, terminal: &Terminal) -> AppResult<String>
where
    S: KeyValueStore + Clone,
{
    let order = session.checkout().await?;
    info!(order_number = %order.order_number, total = %order.total, "Payment recorded");

    Ok(format!(
        "Order placed successfully!\n\n{}",
        terminal.payment_summary(&order)
    ))
}

/// Records the cart and renders its receipt.
pub(super) async fn print_bill<S>(
    session: &mut Session<S>,
    terminal: &Terminal,
) -> AppResult<String>
where
    S: KeyValueStore + Clone,
{
    let order = session.checkout().await?;
    info!(order_number = %order.order_number, total = %order.total, "Bill printed");

    Ok(terminal.receipt(&order).render(&terminal.currency_symbol))
}

pub(super) async fn list<S>(session: &Session<S>, terminal: &Terminal) -> AppResult<String>
where
    S: KeyValueStore + Clone,
{
    let orders = session.orders().await?;
    if orders.is_empty() {
        return Ok("No orders recorded yet".to_string());
    }

    let mut out: Vec<String> = orders
        .iter()
        .map(|order| {
            format!(
                "{}  {}  {:>4} unit(s)  {:>9}",
                order.order_number,
                terminal.placed_at(order),
                order.total_quantity(),
                terminal.money(order.total)
            )
        })
        .collect();
    out.push(format!("{} order(s)", orders.len()));
    Ok(out.join("\n"))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::commands::{execute, Command, Terminal};
    use crate::config::DisplayZone;
    use crate::error::AppError;
    use bistro_core::{Catalog, CoreError, Money};
    use bistro_db::{MemoryStore, Session, SessionError, SessionOptions};
    use chrono::FixedOffset;

    fn terminal() -> Terminal {
        let ist = FixedOffset::east_opt(330 * 60).unwrap();
        Terminal::new("₹", DisplayZone::Fixed(ist))
    }

    async fn session_with_cart() -> Session<MemoryStore> {
        let options = SessionOptions {
            seed_default_menu: false,
        };
        let mut session = Session::open(MemoryStore::new(), options).await.unwrap();
        let tea = session
            .add_menu_item("Tea", Money::from_major(20), "tea.jpg")
            .await
            .unwrap();
        session.add_item(&tea.id).await.unwrap();
        session.add_item(&tea.id).await.unwrap();
        session
    }

    #[tokio::test]
    async fn test_pay_now_shows_payment_summary() {
        let mut session = session_with_cart().await;

        let out = execute(&mut session, &Command::Checkout, &terminal(), &false)
            .await
            .unwrap();

        assert!(out.starts_with("Order placed successfully!"));
        assert!(out.contains("Order #ORD-001\nTotal: ₹40\nDate: "));
        assert!(session.cart().is_empty());
    }

    #[tokio::test]
    async fn test_bill_prints_receipt_and_numbers_continue() {
        let mut session = session_with_cart().await;
        execute(&mut session, &Command::Checkout, &terminal(), &false)
            .await
            .unwrap();

        let tea = session.menu().list()[0].id.clone();
        session.add_item(&tea).await.unwrap();
        let receipt = execute(&mut session, &Command::Bill, &terminal(), &false)
            .await
            .unwrap();

        assert!(receipt.contains("Order #ORD-002"));
        assert!(receipt.contains("TOTAL"));
        assert!(receipt.contains("₹20"));

        let history = execute(&mut session, &Command::Orders, &terminal(), &false)
            .await
            .unwrap();
        let lines: Vec<&str> = history.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("ORD-001"));
        assert!(lines[1].starts_with("ORD-002"));
        assert_eq!(lines[2], "2 order(s)");
    }

    #[tokio::test]
    async fn test_checkout_empty_cart_fails() {
        let options = SessionOptions {
            seed_default_menu: false,
        };
        let mut session = Session::open(MemoryStore::new(), options).await.unwrap();

        for command in [Command::Checkout, Command::Bill] {
            let err = execute(&mut session, &command, &terminal(), &false)
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                AppError::Session(SessionError::Core(CoreError::EmptyCart))
            ));
        }

        let history = execute(&mut session, &Command::Orders, &terminal(), &false)
            .await
            .unwrap();
        assert_eq!(history, "No orders recorded yet");
    }
}
