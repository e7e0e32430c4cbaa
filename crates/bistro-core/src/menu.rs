//! # Menu Catalog
//!
//! The catalog of [`MenuItem`]s the cart is filled from.
//!
//! The cart only ever reads from the catalog, through the [`Catalog`]
//! trait. Management (add / edit / remove dishes) happens on [`Menu`] and
//! never reaches into an open cart: cart lines carry their own copies.

use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::MenuItem;
use crate::validation::{validate_image, validate_item_name, validate_price};

// =============================================================================
// Catalog Interface
// =============================================================================

/// Read access to menu items, as needed by the Cart Engine.
pub trait Catalog {
    /// Finds a menu item by id.
    fn lookup(&self, item_id: &str) -> Option<&MenuItem>;

    /// All menu items in display order.
    fn list(&self) -> &[MenuItem];
}

// =============================================================================
// Menu
// =============================================================================

/// The loaded menu: an ordered list of items, unique by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Menu {
    items: Vec<MenuItem>,
}

impl Menu {
    /// Creates an empty menu.
    pub fn new() -> Self {
        Menu { items: Vec::new() }
    }

    /// Builds a menu from stored items. Later duplicates of an id are
    /// dropped so the uniqueness invariant holds for any input.
    pub fn from_items(items: Vec<MenuItem>) -> Self {
        let mut menu = Menu::new();
        for item in items {
            if menu.lookup(&item.id).is_none() {
                menu.items.push(item);
            }
        }
        menu
    }

    /// The starter menu a fresh install is seeded with.
    pub fn with_default_items() -> Self {
        let items = DEFAULT_ITEMS
            .iter()
            .map(|(name, price, image)| MenuItem {
                id: generate_item_id(),
                name: name.to_string(),
                price: Money::from_major(*price),
                image: image.to_string(),
            })
            .collect();
        Menu { items }
    }

    /// Adds a new item with a freshly generated id.
    ///
    /// ## Errors
    /// `CoreError::Validation` if the name, price or image is invalid.
    pub fn add(&mut self, name: &str, price: Money, image: &str) -> CoreResult<MenuItem> {
        validate_fields(name, price, image)?;

        let item = MenuItem {
            id: generate_item_id(),
            name: name.trim().to_string(),
            price,
            image: image.trim().to_string(),
        };
        self.items.push(item.clone());
        Ok(item)
    }

    /// Replaces the fields of an existing item, keeping its id and position.
    ///
    /// ## Errors
    /// - `CoreError::MenuItemNotFound` if `id` is not on the menu
    /// - `CoreError::Validation` if the new fields are invalid
    pub fn update(
        &mut self,
        id: &str,
        name: &str,
        price: Money,
        image: &str,
    ) -> CoreResult<MenuItem> {
        validate_fields(name, price, image)?;

        let item = self
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| CoreError::MenuItemNotFound(id.to_string()))?;

        item.name = name.trim().to_string();
        item.price = price;
        item.image = image.trim().to_string();
        Ok(item.clone())
    }

    /// Removes an item. Returns whether anything was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Catalog for Menu {
    fn lookup(&self, item_id: &str) -> Option<&MenuItem> {
        self.items.iter().find(|item| item.id == item_id)
    }

    fn list(&self) -> &[MenuItem] {
        &self.items
    }
}

fn validate_fields(name: &str, price: Money, image: &str) -> CoreResult<()> {
    validate_item_name(name)?;
    validate_price(price)?;
    validate_image(image)?;
    Ok(())
}

fn generate_item_id() -> String {
    Uuid::new_v4().to_string()
}

/// (name, price in whole rupees, image)
const DEFAULT_ITEMS: &[(&str, i64, &str)] = &[
    (
        "Truffle Rice",
        399,
        "https://images.unsplash.com/photo-1585937421612-70a008356fbe?w=400&h=300&fit=crop",
    ),
    (
        "Avo Toast",
        220,
        "https://images.unsplash.com/photo-1541519227354-08fa5d50c44d?w=400&h=300&fit=crop",
    ),
    (
        "Fire Chicken",
        360,
        "https://images.unsplash.com/photo-1606755962773-d324e0a13086?w=400&h=300&fit=crop",
    ),
    (
        "Pesto Pasta",
        320,
        "https://images.unsplash.com/photo-1621996346565-e3dbc646d9a9?w=400&h=300&fit=crop",
    ),
    (
        "Mini Margherita",
        180,
        "https://images.unsplash.com/photo-1574071318508-1cdbab80d002?w=400&h=300&fit=crop",
    ),
    (
        "Paneer Grill",
        310,
        "https://images.unsplash.com/photo-1555939594-58d7cb561ad1?w=400&h=300&fit=crop",
    ),
    (
        "Bett Bliss",
        240,
        "https://images.unsplash.com/photo-1551024506-0bccd828d307?w=400&h=300&fit=crop",
    ),
    (
        "Cheesy Fries",
        150,
        "https://images.unsplash.com/photo-1573080496219-bb080dd4f877?w=400&h=300&fit=crop",
    ),
    (
        "Teriyakki Bowl",
        340,
        "https://images.unsplash.com/photo-1546069901-ba9599a7e63c?w=400&h=300&fit=crop",
    ),
    (
        "Choco Lava",
        190,
        "https://images.unsplash.com/photo-1606313564200-e75d5e30476c?w=400&h=300&fit=crop",
    ),
];

// =============================================================================
// Unit Tests
// =============================================================================
