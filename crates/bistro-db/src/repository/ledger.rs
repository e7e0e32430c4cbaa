//! # Order Ledger
//!
//! Append-only history of completed orders, plus the order counter.
//!
//! ## Append
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       append_with(lines, placed_at, extra)              │
//! │                                                                         │
//! │  1. take append lock            (one append at a time per ledger)      │
//! │  2. read "orders", "orderCounter"                                      │
//! │  3. sequence = max(counter, highest issued + 1)                        │
//! │  4. Order::from_lines(sequence, placed_at, lines)                      │
//! │  5. one WriteBatch:                                                    │
//! │       "orders"       ← orders + [order]                                │
//! │       "orderCounter" ← sequence + 1                                    │
//! │       + extra writes (the checkout's cart reset)                       │
//! │  6. commit ── fails? nothing was written, counter unchanged            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Counter Semantics
//! `"orderCounter"` holds the next sequence to issue and starts at 1.
//! Taking the maximum with the ledger in step 3 means a lost or stale
//! counter can never hand out a number twice.
//!
//! There is no update or delete. Recorded orders are history.

use std::sync::Arc;

use bistro_core::order::FIRST_ORDER_SEQUENCE;
use bistro_core::{CartLine, Order};
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult, SessionResult};
use crate::store::{decode_record, keys, read_record_or_default, KeyValueStore, WriteBatch};

/// The Order Ledger. Clones share the store and the append lock.
#[derive(Debug, Clone)]
pub struct OrderLedger<S> {
    store: S,
    append_lock: Arc<Mutex<()>>,
}

/// What was found under `"orders"` when preparing an append.
struct StoredLedger {
    orders: Vec<Order>,
    /// Raw value that failed to decode, kept so it is not overwritten.
    malformed: Option<String>,
}

impl<S: KeyValueStore> OrderLedger<S> {
    pub fn new(store: S) -> Self {
        OrderLedger {
            store,
            append_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Records an order for `lines`.
    pub async fn append(&self, lines: &[CartLine], placed_at: DateTime<Utc>) -> SessionResult<Order> {
        self.append_with(lines, placed_at, WriteBatch::new()).await
    }

    /// Records an order for `lines`, committing `extra` in the same batch.
    ///
    /// ## Errors
    /// - `CoreError::EmptyCart` if `lines` is empty (nothing is written)
    /// - `DbError` if the store fails (nothing is written)
    ///
    /// ## Malformed Ledger
    /// An undecodable `"orders"` value is treated as an empty ledger, as
    /// reads are. Its raw text is first copied to an
    /// `orders.malformed.<timestamp>` key in the same batch.
    pub async fn append_with(
        &self,
        lines: &[CartLine],
        placed_at: DateTime<Utc>,
        extra: WriteBatch,
    ) -> SessionResult<Order> {
        let _guard = self.append_lock.lock().await;

        let stored = self.load_for_append().await?;
        let sequence = self.next_sequence_after(&stored.orders).await?;
        let order = Order::from_lines(sequence, placed_at, lines)?;

        let mut orders = stored.orders;
        orders.push(order.clone());

        let mut batch = WriteBatch::new();
        if let Some(raw) = stored.malformed {
            let quarantine = format!(
                "{}{}",
                keys::MALFORMED_ORDERS_PREFIX,
                placed_at.timestamp_millis()
            );
            warn!(key = %quarantine, "Preserving malformed order ledger before append");
            batch.set(quarantine, raw);
        }
        batch.put_record(keys::ORDERS, &orders)?;
        batch.put_record(keys::ORDER_COUNTER, &(sequence + 1))?;
        batch.merge(extra);

        self.store.commit(batch).await?;

        info!(
            order_number = %order.order_number,
            items = order.items.len(),
            total = %order.total,
            "Order recorded"
        );

        Ok(order)
    }

    /// All orders in append order. A malformed ledger reads as empty.
    pub async fn list_all(&self) -> DbResult<Vec<Order>> {
        let orders: Vec<Order> = read_record_or_default(&self.store, keys::ORDERS).await?;
        debug!(orders = orders.len(), "Ledger loaded");
        Ok(orders)
    }

    /// Finds an order by its number.
    pub async fn find(&self, order_number: &str) -> DbResult<Option<Order>> {
        Ok(self
            .list_all()
            .await?
            .into_iter()
            .find(|order| order.order_number == order_number))
    }

    /// Like [`find`](Self::find), but absence is an error.
    pub async fn get(&self, order_number: &str) -> DbResult<Order> {
        self.find(order_number)
            .await?
            .ok_or_else(|| DbError::not_found("Order", order_number))
    }

    pub async fn count(&self) -> DbResult<usize> {
        Ok(self.list_all().await?.len())
    }

    /// The sequence the next append will use.
    pub async fn next_sequence(&self) -> DbResult<u64> {
        let orders = self.list_all().await?;
        self.next_sequence_after(&orders).await
    }

    async fn next_sequence_after(&self, orders: &[Order]) -> DbResult<u64> {
        let stored: u64 = read_record_or_default(&self.store, keys::ORDER_COUNTER).await?;
        let counter = stored.max(FIRST_ORDER_SEQUENCE);

        let after_ledger = orders
            .iter()
            .filter_map(Order::sequence)
            .max()
            .map_or(FIRST_ORDER_SEQUENCE, |highest| highest.saturating_add(1));

        if after_ledger > counter {
            warn!(
                counter,
                after_ledger, "Order counter behind the ledger, skipping ahead"
            );
        }

        Ok(counter.max(after_ledger))
    }

    async fn load_for_append(&self) -> DbResult<StoredLedger> {
        let Some(raw) = self.store.get(keys::ORDERS).await? else {
            return Ok(StoredLedger {
                orders: Vec::new(),
                malformed: None,
            });
        };

        match decode_record::<Vec<Order>>(keys::ORDERS, &raw) {
            Ok(orders) => Ok(StoredLedger {
                orders,
                malformed: None,
            }),
            Err(DbError::MalformedRecord { reason, .. }) => {
                warn!(%reason, "Malformed order ledger, appending to an empty one");
                Ok(StoredLedger {
                    orders: Vec::new(),
                    malformed: Some(raw),
                })
            }
            Err(e) => Err(e),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
