//! # Cart Repository
//!
//! Stores the open cart under `"cart"` as an array of lines.

use bistro_core::{Cart, CartLine};
use tracing::debug;

use crate::error::DbResult;
use crate::store::{keys, read_record_or_default, KeyValueStore, WriteBatch};

/// Repository for the open cart.
#[derive(Debug, Clone)]
pub struct CartRepository<S> {
    store: S,
}

impl<S: KeyValueStore> CartRepository<S> {
    pub fn new(store: S) -> Self {
        CartRepository { store }
    }

    /// Loads the cart. An absent or malformed record loads as empty; lines
    /// with quantity 0 or duplicate ids are normalised away.
    pub async fn load(&self) -> DbResult<Cart> {
        let lines: Vec<CartLine> = read_record_or_default(&self.store, keys::CART).await?;
        let cart = Cart::from_lines(lines);
        debug!(lines = cart.item_count(), "Cart loaded");
        Ok(cart)
    }

    /// Replaces the stored cart.
    pub async fn save(&self, cart: &Cart) -> DbResult<()> {
        let mut batch = WriteBatch::new();
        self.stage(&mut batch, cart)?;
        self.store.commit(batch).await
    }

    /// Stages the cart record into `batch`.
    pub fn stage(&self, batch: &mut WriteBatch, cart: &Cart) -> DbResult<()> {
        batch.put_record(keys::CART, cart.lines())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use bistro_core::{Menu, Money};

    #[tokio::test]
    async fn test_save_and_load() {
        let store = MemoryStore::new();
        let repo = CartRepository::new(store.clone());

        let mut menu = Menu::new();
        let tea = menu.add("Tea", Money::from_major(40), "tea.jpg").unwrap();
        let mut cart = Cart::new();
        cart.add_item(&menu, &tea.id);
        cart.add_item(&menu, &tea.id);

        repo.save(&cart).await.unwrap();
        let loaded = repo.load().await.unwrap();

        assert_eq!(loaded.lines(), cart.lines());
        assert_eq!(loaded.total(), Money::from_major(80));

        // Stored with the established field names
        let raw = store.get(keys::CART).await.unwrap().unwrap();
        assert!(raw.contains("\"id\":"));
        assert!(raw.contains("\"quantity\":2"));
    }

    #[tokio::test]
    async fn test_load_normalises_stored_lines() {
        let store = MemoryStore::new();
        store
            .set(
                keys::CART,
                r#"[
                    {"id":"a","name":"A","price":100,"image":"a","quantity":0},
                    {"id":"b","name":"B","price":50,"image":"b","quantity":1},
                    {"id":"b","name":"B","price":50,"image":"b","quantity":2}
                ]"#,
            )
            .await
            .unwrap();

        let cart = CartRepository::new(store).load().await.unwrap();
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.line("b").map(|l| l.quantity), Some(3));
    }

    #[tokio::test]
    async fn test_malformed_cart_loads_empty() {
        let store = MemoryStore::new();
        store.set(keys::CART, "[{\"id\":1}]").await.unwrap();

        let cart = CartRepository::new(store).load().await.unwrap();
        assert!(cart.is_empty());
    }
}
