//! # Key-Value Store
//!
//! The persistence contract every repository is written against.
//!
//! ## Records
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  key             value (JSON)                 owner                     │
//! │  ──────────────  ───────────────────────────  ───────────────────────   │
//! │  "menuItems"     [MenuItem, ...]              MenuRepository            │
//! │  "cart"          [CartLine, ...]              CartRepository            │
//! │  "orders"        [Order, ...] (append order)  OrderLedger               │
//! │  "orderCounter"  next sequence number         OrderLedger               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Implementations
//! - [`crate::pool::Database`] - SQLite `kv_store` table, batches run in
//!   one transaction
//! - [`MemoryStore`] - a shared `HashMap`, batches applied under one lock
//!
//! ## Atomicity
//! A [`WriteBatch`] is all-or-nothing. The ledger relies on this to write
//! the order, the counter and the cart reset together.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};

/// Store keys, named as they have always been stored.
pub mod keys {
    pub const MENU_ITEMS: &str = "menuItems";
    pub const CART: &str = "cart";
    pub const ORDERS: &str = "orders";
    pub const ORDER_COUNTER: &str = "orderCounter";

    /// Prefix for copies of a ledger value that failed to decode.
    pub const MALFORMED_ORDERS_PREFIX: &str = "orders.malformed.";

    /// Prefix for copies of a menu value that failed to decode.
    pub const MALFORMED_MENU_PREFIX: &str = "menuItems.malformed.";
}

// =============================================================================
// Store Trait
// =============================================================================

/// A string-keyed store of serialized records.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads a value. `Ok(None)` when the key was never written.
    async fn get(&self, key: &str) -> DbResult<Option<String>>;

    /// Writes one value, replacing any previous one.
    async fn set(&self, key: &str, value: &str) -> DbResult<()>;

    /// Applies every write in `batch`, or none of them.
    async fn commit(&self, batch: WriteBatch) -> DbResult<()>;
}

// =============================================================================
// Write Batch
// =============================================================================

/// A group of writes committed atomically.
///
/// Setting a key twice keeps only the last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    writes: Vec<(String, String)>,
}

impl WriteBatch {
    pub fn new() -> Self {
        WriteBatch { writes: Vec::new() }
    }

    /// Stages a raw value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        match self.writes.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.writes.push((key, value)),
        }
        self
    }

    /// Stages a record, encoded as JSON.
    pub fn put_record<T: Serialize + ?Sized>(
        &mut self,
        key: impl Into<String>,
        value: &T,
    ) -> DbResult<&mut Self> {
        let encoded = encode_record(value)?;
        Ok(self.set(key, encoded))
    }

    /// Value staged for `key`, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.writes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Moves every write of `other` into this batch.
    pub fn merge(&mut self, other: WriteBatch) -> &mut Self {
        for (key, value) in other.writes {
            self.set(key, value);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.writes.iter().map(|(k, _)| k.as_str())
    }

    pub fn into_writes(self) -> Vec<(String, String)> {
        self.writes
    }
}

// =============================================================================
// Record Encoding
// =============================================================================

/// Encodes a record for storage.
pub fn encode_record<T: Serialize + ?Sized>(value: &T) -> DbResult<String> {
    Ok(serde_json::to_string(value)?)
}

/// Decodes a stored record.
///
/// ## Errors
/// `DbError::MalformedRecord` naming `key` when `raw` is not a valid
/// encoding of `T`.
pub fn decode_record<T: DeserializeOwned>(key: &str, raw: &str) -> DbResult<T> {
    serde_json::from_str(raw).map_err(|e| DbError::malformed(key, e))
}

/// Reads and decodes a record, strictly.
///
/// `Ok(None)` when the key is absent; a malformed value is an error.
pub async fn read_record<S, T>(store: &S, key: &str) -> DbResult<Option<T>>
where
    S: KeyValueStore + ?Sized,
    T: DeserializeOwned,
{
    match store.get(key).await? {
        Some(raw) => decode_record(key, &raw).map(Some),
        None => Ok(None),
    }
}

/// Reads a record, substituting the default when it is absent or malformed.
///
/// Store failures still propagate; only undecodable data is recovered from.
pub async fn read_record_or_default<S, T>(store: &S, key: &str) -> DbResult<T>
where
    S: KeyValueStore + ?Sized,
    T: DeserializeOwned + Default,
{
    match read_record(store, key).await {
        Ok(Some(value)) => Ok(value),
        Ok(None) => {
            debug!(key, "Record absent, using default");
            Ok(T::default())
        }
        Err(DbError::MalformedRecord { key, reason }) => {
            warn!(%key, %reason, "Malformed record, using default");
            Ok(T::default())
        }
        Err(e) => Err(e),
    }
}

// =============================================================================
// Memory Store
// =============================================================================

/// In-process store for tests and throwaway sessions.
///
/// Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> DbResult<usize> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> DbResult<bool> {
        Ok(self.lock()?.is_empty())
    }

    /// Stored keys starting with `prefix`, sorted.
    pub fn keys_with_prefix(&self, prefix: &str) -> DbResult<Vec<String>> {
        let mut keys: Vec<String> = self
            .lock()?
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }

    fn lock(&self) -> DbResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| DbError::Internal("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> DbResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> DbResult<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn commit(&self, batch: WriteBatch) -> DbResult<()> {
        let mut entries = self.lock()?;
        for (key, value) in batch.into_writes() {
            entries.insert(key, value);
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_last_write_wins() {
        let mut batch = WriteBatch::new();
        batch.set("a", "1").set("b", "2").set("a", "3");

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.get("a"), Some("3"));
        assert_eq!(batch.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_batch_merge() {
        let mut first = WriteBatch::new();
        first.set("a", "1");
        let mut second = WriteBatch::new();
        second.set("a", "2").set("c", "3");

        first.merge(second);
        assert_eq!(first.get("a"), Some("2"));
        assert_eq!(first.get("c"), Some("3"));
    }

    #[tokio::test]
    async fn test_memory_store_get_set() {
        let store = MemoryStore::new();
        assert_eq!(store.get("cart").await.unwrap(), None);

        store.set("cart", "[]").await.unwrap();
        assert_eq!(store.get("cart").await.unwrap().as_deref(), Some("[]"));

        // Clones share data
        let other = store.clone();
        other.set("cart", "[1]").await.unwrap();
        assert_eq!(store.get("cart").await.unwrap().as_deref(), Some("[1]"));
    }

    #[tokio::test]
    async fn test_memory_store_commit() {
        let store = MemoryStore::new();
        let mut batch = WriteBatch::new();
        batch.put_record(keys::ORDER_COUNTER, &7u64).unwrap();
        batch.put_record(keys::CART, &Vec::<u32>::new()).unwrap();

        store.commit(batch).await.unwrap();

        assert_eq!(store.len().unwrap(), 2);
        assert_eq!(
            store.get(keys::ORDER_COUNTER).await.unwrap().as_deref(),
            Some("7")
        );
    }

    #[tokio::test]
    async fn test_read_record_or_default_recovers_malformed() {
        let store = MemoryStore::new();
        store.set(keys::ORDER_COUNTER, "not a number").await.unwrap();

        let strict: DbResult<Option<u64>> = read_record(&store, keys::ORDER_COUNTER).await;
        assert!(matches!(strict, Err(DbError::MalformedRecord { key, .. }) if key == "orderCounter"));

        let lenient: u64 = read_record_or_default(&store, keys::ORDER_COUNTER)
            .await
            .unwrap();
        assert_eq!(lenient, 0);

        let absent: Vec<String> = read_record_or_default(&store, keys::CART).await.unwrap();
        assert!(absent.is_empty());
    }
}
