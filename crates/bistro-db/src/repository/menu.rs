//! # Menu Repository
//!
//! Stores the catalog under `"menuItems"` as an array of items.

use bistro_core::menu::Catalog;
use bistro_core::{Menu, MenuItem};
use chrono::Utc;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::store::{decode_record, keys, read_record_or_default, KeyValueStore, WriteBatch};

/// Repository for the Menu Catalog.
#[derive(Debug, Clone)]
pub struct MenuRepository<S> {
    store: S,
}

impl<S: KeyValueStore> MenuRepository<S> {
    pub fn new(store: S) -> Self {
        MenuRepository { store }
    }

    /// Loads the menu. An absent or malformed record loads as empty.
    pub async fn load(&self) -> DbResult<Menu> {
        let items: Vec<MenuItem> = read_record_or_default(&self.store, keys::MENU_ITEMS).await?;
        let menu = Menu::from_items(items);
        debug!(items = menu.len(), "Menu loaded");
        Ok(menu)
    }

    /// Loads the menu, writing the default items first if it is empty.
    ///
    /// A malformed record counts as empty. Its raw text is copied to a
    /// `menuItems.malformed.<timestamp>` key in the same batch as the seed.
    pub async fn load_or_seed(&self) -> DbResult<Menu> {
        let mut batch = WriteBatch::new();

        if let Some(raw) = self.store.get(keys::MENU_ITEMS).await? {
            match decode_record::<Vec<MenuItem>>(keys::MENU_ITEMS, &raw) {
                Ok(items) if !items.is_empty() => {
                    let menu = Menu::from_items(items);
                    debug!(items = menu.len(), "Menu loaded");
                    return Ok(menu);
                }
                Ok(_) => {}
                Err(DbError::MalformedRecord { reason, .. }) => {
                    let quarantine = format!(
                        "{}{}",
                        keys::MALFORMED_MENU_PREFIX,
                        Utc::now().timestamp_millis()
                    );
                    warn!(key = %quarantine, %reason, "Preserving malformed menu before seeding");
                    batch.set(quarantine, raw);
                }
                Err(e) => return Err(e),
            }
        }

        let seeded = Menu::with_default_items();
        self.stage(&mut batch, &seeded)?;
        self.store.commit(batch).await?;
        info!(items = seeded.len(), "Seeded default menu");
        Ok(seeded)
    }

    /// Replaces the stored menu.
    pub async fn save(&self, menu: &Menu) -> DbResult<()> {
        let mut batch = WriteBatch::new();
        self.stage(&mut batch, menu)?;
        self.store.commit(batch).await
    }

    /// Stages the menu record into `batch`.
    pub fn stage(&self, batch: &mut WriteBatch, menu: &Menu) -> DbResult<()> {
        batch.put_record(keys::MENU_ITEMS, menu.list())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use bistro_core::Money;

    #[tokio::test]
    async fn test_save_and_load() {
        let repo = MenuRepository::new(MemoryStore::new());
        let mut menu = Menu::new();
        let tea = menu.add("Tea", Money::from_major(40), "tea.jpg").unwrap();

        repo.save(&menu).await.unwrap();
        let loaded = repo.load().await.unwrap();

        assert_eq!(loaded, menu);
        assert_eq!(loaded.lookup(&tea.id).map(|i| i.price), Some(Money::from_major(40)));
    }

    #[tokio::test]
    async fn test_load_or_seed_only_seeds_empty_menu() {
        let store = MemoryStore::new();
        let repo = MenuRepository::new(store.clone());

        let first = repo.load_or_seed().await.unwrap();
        assert_eq!(first.len(), 10);

        let second = repo.load_or_seed().await.unwrap();
        assert_eq!(second, first);
    }

    #[tokio::test]
    async fn test_malformed_menu_loads_empty() {
        let store = MemoryStore::new();
        store.set(keys::MENU_ITEMS, "{\"oops\":").await.unwrap();

        let menu = MenuRepository::new(store).load().await.unwrap();
        assert!(menu.is_empty());
    }

    #[tokio::test]
    async fn test_seeding_keeps_copy_of_malformed_menu() {
        let store = MemoryStore::new();
        store.set(keys::MENU_ITEMS, "[{\"id\":\"1\",").await.unwrap();

        let menu = MenuRepository::new(store.clone()).load_or_seed().await.unwrap();
        assert_eq!(menu.len(), 10);

        let copies = store.keys_with_prefix(keys::MALFORMED_MENU_PREFIX).unwrap();
        assert_eq!(copies.len(), 1);
        assert_eq!(
            store.get(&copies[0]).await.unwrap().as_deref(),
            Some("[{\"id\":\"1\",")
        );

        // The seeded menu decodes, so a second open copies nothing
        MenuRepository::new(store.clone()).load_or_seed().await.unwrap();
        assert_eq!(store.keys_with_prefix(keys::MALFORMED_MENU_PREFIX).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_stored_format_matches_item_fields() {
        let store = MemoryStore::new();
        store
            .set(
                keys::MENU_ITEMS,
                r#"[{"id":"1","name":"Truffle Rice","price":39900,"image":"rice.jpg"}]"#,
            )
            .await
            .unwrap();

        let menu = MenuRepository::new(store).load().await.unwrap();
        assert_eq!(menu.list()[0].name, "Truffle Rice");
        assert_eq!(menu.list()[0].price, Money::from_major(399));
    }
}
