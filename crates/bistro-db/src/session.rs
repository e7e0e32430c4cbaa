//! # Session
//!
//! The one active POS session: loaded menu, open cart, order ledger and the
//! change notifications a rendering layer listens to.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Session Lifecycle                                 │
//! │                                                                         │
//! │  Session::open(store, options)                                         │
//! │     ├── load menu  (malformed → empty, optionally seed defaults)       │
//! │     └── load cart  (malformed → empty)                                 │
//! │                                                                         │
//! │  add_item / remove_item / change_quantity / clear_cart                 │
//! │     └── mutate a copy ──► persist "cart" ──► swap in ──► CartUpdated   │
//! │                                                                         │
//! │  checkout                                                              │
//! │     └── ledger.append_with(lines, now, cart reset)                     │
//! │            └── one batch: "orders" + "orderCounter" + "cart"           │
//! │         ──► OrderRecorded + CartUpdated                                │
//! │                                                                         │
//! │  close()                                                               │
//! │     └── persist "cart" one last time                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Failure Semantics
//! Every mutation is persisted before it becomes visible in memory. When
//! the store fails the session keeps its previous state and the error is
//! returned.

use bistro_core::cart::CartSummary;
use bistro_core::{
    report_for_month, Cart, Confirm, Menu, MenuItem, Money, Order, ReportPeriod, SalesReport,
};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::error::SessionResult;
use crate::repository::{CartRepository, MenuRepository, OrderLedger};
use crate::store::{KeyValueStore, WriteBatch};

/// Capacity of the notification channel. Slow subscribers miss the oldest
/// notifications, never block the session.
const NOTIFY_CAPACITY: usize = 64;

/// "State changed" notifications for the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StateChange {
    /// Cart contents changed; carries the new header totals.
    CartUpdated { summary: CartSummary },
    /// A menu item was added, edited or removed.
    MenuUpdated,
    /// A checkout recorded an order.
    OrderRecorded { order_number: String, total: Money },
}

/// Options for [`Session::open`].
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Write the default menu when the stored one is empty.
    pub seed_default_menu: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        SessionOptions {
            seed_default_menu: true,
        }
    }
}

/// A session over one store.
pub struct Session<S: KeyValueStore + Clone> {
    menu_repo: MenuRepository<S>,
    cart_repo: CartRepository<S>,
    ledger: OrderLedger<S>,
    menu: Menu,
    cart: Cart,
    events: broadcast::Sender<StateChange>,
}

impl<S: KeyValueStore + Clone> Session<S> {
    /// Opens a session: loads the menu and the cart.
    pub async fn open(store: S, options: SessionOptions) -> SessionResult<Self> {
        let menu_repo = MenuRepository::new(store.clone());
        let cart_repo = CartRepository::new(store.clone());
        let ledger = OrderLedger::new(store);

        let menu = if options.seed_default_menu {
            menu_repo.load_or_seed().await?
        } else {
            menu_repo.load().await?
        };
        let cart = cart_repo.load().await?;

        let (events, _) = broadcast::channel(NOTIFY_CAPACITY);

        info!(
            menu_items = menu.len(),
            cart_lines = cart.item_count(),
            "Session opened"
        );

        Ok(Session {
            menu_repo,
            cart_repo,
            ledger,
            menu,
            cart,
            events,
        })
    }

    /// Subscribes to state change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.events.subscribe()
    }

    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn ledger(&self) -> &OrderLedger<S> {
        &self.ledger
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Adds one unit of a menu item. `Ok(false)` if the id is not on the menu.
    pub async fn add_item(&mut self, item_id: &str) -> SessionResult<bool> {
        let mut next = self.cart.clone();
        let changed = next.add_item(&self.menu, item_id);
        self.commit_cart("add_item", item_id, changed, next).await
    }

    /// Removes a cart line. `Ok(false)` if there was none.
    pub async fn remove_item(&mut self, item_id: &str) -> SessionResult<bool> {
        let mut next = self.cart.clone();
        let changed = next.remove_item(item_id);
        self.commit_cart("remove_item", item_id, changed, next).await
    }

    /// Changes a line's quantity by `delta`, removing it at zero or below.
    pub async fn change_quantity(&mut self, item_id: &str, delta: i64) -> SessionResult<bool> {
        let mut next = self.cart.clone();
        let changed = next.change_quantity(item_id, delta);
        self.commit_cart("change_quantity", item_id, changed, next).await
    }

    /// Empties the cart if `confirm` agrees. `Ok(false)` when declined.
    pub async fn clear_cart<C: Confirm + ?Sized>(&mut self, confirm: &C) -> SessionResult<bool> {
        let mut next = self.cart.clone();
        let changed = next.clear_confirmed(confirm);
        self.commit_cart("clear", "*", changed, next).await
    }

    /// Persists and publishes `next` if the operation changed anything.
    async fn commit_cart(
        &mut self,
        op: &str,
        item_id: &str,
        changed: bool,
        next: Cart,
    ) -> SessionResult<bool> {
        if !changed {
            debug!(op, item_id, "Cart unchanged");
            return Ok(false);
        }

        self.cart_repo.save(&next).await?;
        self.cart = next;
        debug!(op, item_id, lines = self.cart.item_count(), "Cart updated");
        self.notify_cart();
        Ok(true)
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Records the cart as an order and empties the cart.
    ///
    /// Both "Pay now" and "Print bill" end here.
    ///
    /// ## Errors
    /// - `CoreError::EmptyCart` when the cart is empty (nothing changes)
    /// - `DbError` when the store fails (nothing changes)
    pub async fn checkout(&mut self) -> SessionResult<Order> {
        self.checkout_at(Utc::now()).await
    }

    /// [`checkout`](Self::checkout) with an explicit timestamp.
    pub async fn checkout_at(&mut self, placed_at: DateTime<Utc>) -> SessionResult<Order> {
        let mut cart_reset = WriteBatch::new();
        self.cart_repo.stage(&mut cart_reset, &Cart::new())?;

        let order = self
            .ledger
            .append_with(self.cart.lines(), placed_at, cart_reset)
            .await?;

        self.cart.clear();
        self.notify(StateChange::OrderRecorded {
            order_number: order.order_number.clone(),
            total: order.total,
        });
        self.notify_cart();

        Ok(order)
    }

    // =========================================================================
    // Ledger & Reports
    // =========================================================================

    /// All recorded orders, oldest first.
    pub async fn orders(&self) -> SessionResult<Vec<Order>> {
        Ok(self.ledger.list_all().await?)
    }

    /// The monthly sales report, with calendar days taken in `tz`.
    pub async fn report<Tz: TimeZone>(
        &self,
        period: ReportPeriod,
        tz: &Tz,
    ) -> SessionResult<SalesReport> {
        let orders = self.ledger.list_all().await?;
        let report = report_for_month(&orders, period, tz);
        debug!(
            period = %period,
            orders = report.total_orders,
            revenue = %report.total_revenue,
            "Report generated"
        );
        Ok(report)
    }

    // =========================================================================
    // Menu
    // =========================================================================

    /// Adds a menu item.
    pub async fn add_menu_item(
        &mut self,
        name: &str,
        price: Money,
        image: &str,
    ) -> SessionResult<MenuItem> {
        let mut next = self.menu.clone();
        let item = next.add(name, price, image)?;
        self.commit_menu(next).await?;
        info!(id = %item.id, name = %item.name, "Menu item added");
        Ok(item)
    }

    /// Edits a menu item. Open carts keep the values they captured.
    pub async fn update_menu_item(
        &mut self,
        id: &str,
        name: &str,
        price: Money,
        image: &str,
    ) -> SessionResult<MenuItem> {
        let mut next = self.menu.clone();
        let item = next.update(id, name, price, image)?;
        self.commit_menu(next).await?;
        info!(id = %item.id, name = %item.name, "Menu item updated");
        Ok(item)
    }

    /// Removes a menu item. `Ok(false)` if the id was unknown.
    pub async fn remove_menu_item(&mut self, id: &str) -> SessionResult<bool> {
        let mut next = self.menu.clone();
        if !next.remove(id) {
            debug!(id, "Menu item not found, nothing removed");
            return Ok(false);
        }
        self.commit_menu(next).await?;
        info!(id, "Menu item removed");
        Ok(true)
    }

    async fn commit_menu(&mut self, next: Menu) -> SessionResult<()> {
        self.menu_repo.save(&next).await?;
        self.menu = next;
        self.notify(StateChange::MenuUpdated);
        Ok(())
    }

    // =========================================================================
    // Teardown
    // =========================================================================

    /// Ends the session, persisting the cart one final time.
    pub async fn close(self) -> SessionResult<()> {
        self.cart_repo.save(&self.cart).await?;
        info!(cart_lines = self.cart.item_count(), "Session closed");
        Ok(())
    }

    fn notify_cart(&self) {
        self.notify(StateChange::CartUpdated {
            summary: CartSummary::from(&self.cart),
        });
    }

    fn notify(&self, change: StateChange) {
        // Err only means nobody is subscribed
        let _ = self.events.send(change);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DbError, DbResult, SessionError};
    use crate::pool::{Database, DbConfig};
    use crate::store::{keys, MemoryStore};
    use async_trait::async_trait;
    use bistro_core::menu::Catalog;
    use bistro_core::CoreError;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    /// Memory store whose batches fail while `fail_commits` is set.
    #[derive(Clone, Default)]
    struct FlakyStore {
        inner: MemoryStore,
        fail_commits: Arc<AtomicBool>,
    }

    #[async_trait]
    impl KeyValueStore for FlakyStore {
        async fn get(&self, key: &str) -> DbResult<Option<String>> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: &str) -> DbResult<()> {
            self.inner.set(key, value).await
        }

        async fn commit(&self, batch: WriteBatch) -> DbResult<()> {
            if self.fail_commits.load(Ordering::SeqCst) {
                return Err(DbError::TransactionFailed("disk full".to_string()));
            }
            self.inner.commit(batch).await
        }
    }

    /// Session over an empty menu holding A (100) and B (50).
    async fn session_with_ab<S: KeyValueStore + Clone>(store: S) -> (Session<S>, String, String) {
        let options = SessionOptions {
            seed_default_menu: false,
        };
        let mut session = Session::open(store, options).await.unwrap();
        let a = session
            .add_menu_item("A", Money::from_major(100), "a.jpg")
            .await
            .unwrap();
        let b = session
            .add_menu_item("B", Money::from_major(50), "b.jpg")
            .await
            .unwrap();
        (session, a.id, b.id)
    }

    fn march(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_open_seeds_default_menu() {
        let session = Session::open(MemoryStore::new(), SessionOptions::default())
            .await
            .unwrap();
        assert_eq!(session.menu().len(), 10);
        assert!(session.cart().is_empty());
    }

    #[tokio::test]
    async fn test_checkout_example() {
        let store = MemoryStore::new();
        let (mut session, a, b) = session_with_ab(store.clone()).await;

        assert!(session.add_item(&a).await.unwrap());
        assert!(session.add_item(&a).await.unwrap());
        assert!(session.add_item(&b).await.unwrap());
        assert_eq!(session.cart().total(), Money::from_major(250));

        let order = session.checkout_at(march(5)).await.unwrap();

        assert_eq!(order.order_number, "ORD-001");
        assert_eq!(order.total, Money::from_major(250));
        assert_eq!(order.total, order.recomputed_total());
        assert_eq!(order.items.len(), 2);
        assert_eq!((order.items[0].name.as_str(), order.items[0].quantity), ("A", 2));
        assert_eq!((order.items[1].name.as_str(), order.items[1].quantity), ("B", 1));

        assert!(session.cart().is_empty());
        assert_eq!(store.get(keys::CART).await.unwrap().as_deref(), Some("[]"));
        assert_eq!(
            store.get(keys::ORDER_COUNTER).await.unwrap().as_deref(),
            Some("2")
        );
    }

    #[tokio::test]
    async fn test_checkout_empty_cart_changes_nothing() {
        let store = MemoryStore::new();
        let (mut session, _, _) = session_with_ab(store.clone()).await;

        let err = session.checkout().await.unwrap_err();
        assert!(matches!(err, SessionError::Core(CoreError::EmptyCart)));
        assert_eq!(store.get(keys::ORDERS).await.unwrap(), None);
        assert_eq!(store.get(keys::ORDER_COUNTER).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_unknown_items_are_noops() {
        let (mut session, a, _) = session_with_ab(MemoryStore::new()).await;
        session.add_item(&a).await.unwrap();

        assert!(!session.add_item("ghost").await.unwrap());
        assert!(!session.remove_item("ghost").await.unwrap());
        assert!(!session.change_quantity("ghost", 3).await.unwrap());
        assert_eq!(session.cart().item_count(), 1);
    }

    #[tokio::test]
    async fn test_quantity_to_zero_removes_line() {
        let (mut session, a, b) = session_with_ab(MemoryStore::new()).await;
        session.add_item(&a).await.unwrap();
        session.add_item(&b).await.unwrap();

        assert!(session.change_quantity(&a, 4).await.unwrap());
        assert_eq!(session.cart().line(&a).map(|l| l.quantity), Some(5));

        assert!(session.change_quantity(&a, -5).await.unwrap());
        assert!(session.cart().line(&a).is_none());
        assert_eq!(session.cart().item_count(), 1);
    }

    #[tokio::test]
    async fn test_clear_requires_confirmation() {
        let (mut session, a, _) = session_with_ab(MemoryStore::new()).await;
        session.add_item(&a).await.unwrap();

        assert!(!session.clear_cart(&false).await.unwrap());
        assert!(!session.cart().is_empty());

        assert!(session.clear_cart(&true).await.unwrap());
        assert!(session.cart().is_empty());
    }

    #[tokio::test]
    async fn test_numbers_continue_after_reopen() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        {
            let (mut session, a, _) = session_with_ab(db.clone()).await;
            for day in 1..=2 {
                session.add_item(&a).await.unwrap();
                session.checkout_at(march(day)).await.unwrap();
            }
            session.close().await.unwrap();
        }

        let mut session = Session::open(db, SessionOptions::default()).await.unwrap();
        let a = session.menu().list()[0].id.clone();
        session.add_item(&a).await.unwrap();
        let order = session.checkout_at(march(3)).await.unwrap();

        assert_eq!(order.order_number, "ORD-003");
        let numbers: Vec<String> = session
            .orders()
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.order_number)
            .collect();
        assert_eq!(numbers, vec!["ORD-001", "ORD-002", "ORD-003"]);
    }

    #[tokio::test]
    async fn test_cart_survives_reopen() {
        let store = MemoryStore::new();
        let (mut session, a, _) = session_with_ab(store.clone()).await;
        session.add_item(&a).await.unwrap();
        session.add_item(&a).await.unwrap();
        session.close().await.unwrap();

        let reopened = Session::open(store, SessionOptions::default()).await.unwrap();
        assert_eq!(reopened.cart().line(&a).map(|l| l.quantity), Some(2));
        // The stored menu was not empty, so nothing was seeded
        assert_eq!(reopened.menu().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_checkout_keeps_cart_and_counter() {
        let store = FlakyStore::default();
        let (mut session, a, _) = session_with_ab(store.clone()).await;
        session.add_item(&a).await.unwrap();

        store.fail_commits.store(true, Ordering::SeqCst);
        let err = session.checkout_at(march(1)).await.unwrap_err();
        assert!(matches!(err, SessionError::Db(DbError::TransactionFailed(_))));

        assert_eq!(session.cart().item_count(), 1);
        assert_eq!(store.get(keys::ORDERS).await.unwrap(), None);
        assert_eq!(store.get(keys::ORDER_COUNTER).await.unwrap(), None);

        store.fail_commits.store(false, Ordering::SeqCst);
        let order = session.checkout_at(march(1)).await.unwrap();
        assert_eq!(order.order_number, "ORD-001");
    }

    #[tokio::test]
    async fn test_failed_cart_write_keeps_previous_cart() {
        let store = FlakyStore::default();
        let (mut session, a, _) = session_with_ab(store.clone()).await;

        store.fail_commits.store(true, Ordering::SeqCst);
        assert!(session.add_item(&a).await.is_err());
        assert!(session.cart().is_empty());
    }

    #[tokio::test]
    async fn test_menu_edit_does_not_touch_cart() {
        let (mut session, a, _) = session_with_ab(MemoryStore::new()).await;
        session.add_item(&a).await.unwrap();

        session
            .update_menu_item(&a, "A2", Money::from_major(999), "a2.jpg")
            .await
            .unwrap();
        session.remove_menu_item(&a).await.unwrap();

        let line = session.cart().line(&a).unwrap();
        assert_eq!(line.name, "A");
        assert_eq!(line.price, Money::from_major(100));
        assert!(session.menu().lookup(&a).is_none());
    }

    #[tokio::test]
    async fn test_notifications() {
        let (mut session, a, _) = session_with_ab(MemoryStore::new()).await;
        let mut rx = session.subscribe();

        session.add_item(&a).await.unwrap();
        session.checkout_at(march(1)).await.unwrap();
        session.remove_menu_item(&a).await.unwrap();

        assert!(matches!(
            rx.recv().await.unwrap(),
            StateChange::CartUpdated { summary } if summary.total_quantity == 1
        ));
        assert_eq!(
            rx.recv().await.unwrap(),
            StateChange::OrderRecorded {
                order_number: "ORD-001".to_string(),
                total: Money::from_major(100),
            }
        );
        assert!(matches!(
            rx.recv().await.unwrap(),
            StateChange::CartUpdated { summary } if summary.item_count == 0
        ));
        assert_eq!(rx.recv().await.unwrap(), StateChange::MenuUpdated);
    }

    #[tokio::test]
    async fn test_report_through_session() {
        let (mut session, a, b) = session_with_ab(MemoryStore::new()).await;

        session.add_item(&a).await.unwrap();
        session.checkout_at(march(2)).await.unwrap();
        session.add_item(&a).await.unwrap();
        session.add_item(&a).await.unwrap();
        session.checkout_at(march(20)).await.unwrap();
        session.add_item(&b).await.unwrap();
        session
            .checkout_at(Utc.with_ymd_and_hms(2026, 4, 1, 12, 0, 0).unwrap())
            .await
            .unwrap();

        let period = ReportPeriod::new(2026, 3).unwrap();
        let report = session.report(period, &Utc).await.unwrap();
        assert_eq!(report.total_revenue, Money::from_major(300));
        assert_eq!(report.total_orders, 2);
        assert_eq!(report.avg_order_value, Money::from_major(150));

        // Re-running without new orders gives the same report
        assert_eq!(session.report(period, &Utc).await.unwrap(), report);
    }
}
