//! Shopper cart with derived totals and persistence.
//!
//! [`CartStore`] is a single-writer state object. It is created with a
//! [`CartStorage`] backend, loads the persisted items once, and writes the
//! full item list back after every mutation. Views subscribe to a
//! [`watch`] channel of [`CartSnapshot`]s instead of polling.
//!
//! # Example
//!
//! ```rust
//! use marketplace_core::cart::{CartProduct, CartStore, MemoryCartStorage};
//! use marketplace_core::ProductId;
//! use rust_decimal::Decimal;
//!
//! let mut cart = CartStore::open(MemoryCartStorage::new());
//! cart.add_item(CartProduct::new(ProductId::new("p1"), "Mug", Decimal::new(1000, 2)), 2);
//! assert_eq!(cart.item_count(), 2);
//! assert_eq!(cart.subtotal(), Decimal::new(2000, 2));
//! ```

pub mod format;
pub mod storage;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::types::price::tax_on;
use crate::{ProductId, SellerId};

pub use format::{CART_FORMAT_VERSION, CartFormatError};
pub use storage::{
    CartStorage, MemoryCartStorage, SharedCartHandle, SharedCartStorage, StorageError,
    StorageEvent, WriterId,
};

/// Storage key the cart is persisted under.
pub const CART_STORAGE_KEY: &str = "marketplace-cart";

/// A product as offered for adding to the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartProduct {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller_id: Option<SellerId>,
}

impl CartProduct {
    #[must_use]
    pub fn new(id: ProductId, name: impl Into<String>, price: Decimal) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            image: None,
            seller_id: None,
        }
    }
}

/// A line in the cart. `quantity` is at least 1 while the line exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller_id: Option<SellerId>,
}

impl CartItem {
    /// Price of the whole line.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Totals derived from the current items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CartTotals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub item_count: u64,
}

impl CartTotals {
    /// Compute totals for `items`.
    #[must_use]
    pub fn of(items: &[CartItem]) -> Self {
        let subtotal: Decimal = items.iter().map(CartItem::line_total).sum();
        let tax = tax_on(subtotal);
        Self {
            subtotal,
            tax,
            total: subtotal + tax,
            item_count: items.iter().map(|item| u64::from(item.quantity)).sum(),
        }
    }
}

/// What subscribers see after each change.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CartSnapshot {
    pub items: Vec<CartItem>,
    pub is_open: bool,
    pub totals: CartTotals,
}

/// Owned cart state backed by a [`CartStorage`].
pub struct CartStore<S: CartStorage> {
    key: String,
    items: Vec<CartItem>,
    is_open: bool,
    storage: S,
    snapshots: watch::Sender<CartSnapshot>,
}

impl<S: CartStorage> CartStore<S> {
    /// Open the cart stored under [`CART_STORAGE_KEY`].
    pub fn open(storage: S) -> Self {
        Self::open_with_key(storage, CART_STORAGE_KEY)
    }

    /// Open the cart stored under `key`.
    ///
    /// Unreadable or undecodable data yields an empty cart; the stored value
    /// is left alone until the next mutation overwrites it.
    pub fn open_with_key(storage: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let items = read_items(&storage, &key);
        let (snapshots, _) = watch::channel(CartSnapshot::default());
        let store = Self {
            key,
            items,
            is_open: false,
            storage,
            snapshots,
        };
        store.publish();
        store
    }

    /// Add `quantity` of `product`, merging with an existing line.
    ///
    /// A quantity of zero is treated as one.
    pub fn add_item(&mut self, product: CartProduct, quantity: u32) {
        let quantity = quantity.max(1);
        if let Some(line) = self.items.iter_mut().find(|line| line.id == product.id) {
            line.quantity = line.quantity.saturating_add(quantity);
        } else {
            self.items.push(CartItem {
                id: product.id,
                name: product.name,
                price: product.price,
                quantity,
                image: product.image,
                seller_id: product.seller_id,
            });
        }
        self.commit();
    }

    /// Remove the line for `id`. No-op if absent.
    pub fn remove_item(&mut self, id: &ProductId) {
        let before = self.items.len();
        self.items.retain(|line| &line.id != id);
        if self.items.len() != before {
            self.commit();
        }
    }

    /// Set the quantity of the line for `id`; zero or less removes it.
    pub fn update_quantity(&mut self, id: &ProductId, quantity: i64) {
        if quantity <= 0 {
            self.remove_item(id);
            return;
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        if let Some(line) = self.items.iter_mut().find(|line| &line.id == id) {
            line.quantity = quantity;
            self.commit();
        }
    }

    /// Remove every line.
    pub fn clear_cart(&mut self) {
        self.items.clear();
        self.commit();
    }

    pub fn toggle_cart(&mut self) {
        self.is_open = !self.is_open;
        self.publish();
    }

    pub fn set_cart_open(&mut self, open: bool) {
        self.is_open = open;
        self.publish();
    }

    #[must_use]
    pub fn is_in_cart(&self, id: &ProductId) -> bool {
        self.items.iter().any(|line| &line.id == id)
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.is_open
    }

    #[must_use]
    pub fn totals(&self) -> CartTotals {
        CartTotals::of(&self.items)
    }

    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.totals().subtotal
    }

    #[must_use]
    pub fn tax(&self) -> Decimal {
        self.totals().tax
    }

    #[must_use]
    pub fn total(&self) -> Decimal {
        self.totals().total
    }

    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.totals().item_count
    }

    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            items: self.items.clone(),
            is_open: self.is_open,
            totals: self.totals(),
        }
    }

    /// Receive a snapshot after every change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
        self.snapshots.subscribe()
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Reload items after another writer changed shared storage.
    ///
    /// Returns `true` if the event applied to this cart and the items were
    /// reloaded. Events for other keys, and echoes of this store's own
    /// writes, are ignored.
    pub fn sync_from_storage(&mut self, event: &StorageEvent) -> bool {
        if event.key != self.key || self.storage.is_own_event(event) {
            return false;
        }
        self.items = read_items(&self.storage, &self.key);
        tracing::debug!(key = %self.key, items = self.items.len(), "cart reloaded from storage");
        self.publish();
        true
    }

    fn commit(&self) {
        self.persist();
        self.publish();
    }

    fn persist(&self) {
        let result = format::encode(&self.items)
            .map_err(|e| e.to_string())
            .and_then(|raw| {
                self.storage
                    .save(&self.key, &raw)
                    .map_err(|e| e.to_string())
            });
        if let Err(error) = result {
            tracing::warn!(key = %self.key, %error, "failed to persist cart");
        }
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.snapshot());
    }
}

fn read_items(storage: &impl CartStorage, key: &str) -> Vec<CartItem> {
    match storage.load(key) {
        Ok(Some(raw)) => format::decode(&raw).unwrap_or_else(|error| {
            tracing::warn!(key, %error, "discarding unreadable stored cart");
            Vec::new()
        }),
        Ok(None) => Vec::new(),
        Err(error) => {
            tracing::warn!(key, %error, "failed to read stored cart");
            Vec::new()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(id: &str, cents: i64) -> CartProduct {
        CartProduct::new(ProductId::new(id), format!("Product {id}"), Decimal::new(cents, 2))
    }

    #[test]
    fn test_adding_same_id_merges_quantities() {
        let mut cart = CartStore::open(MemoryCartStorage::new());
        cart.add_item(product("a", 1000), 1);
        cart.add_item(product("a", 1000), 2);
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 3);
    }

    #[test]
    fn test_add_defaults_zero_quantity_to_one() {
        let mut cart = CartStore::open(MemoryCartStorage::new());
        cart.add_item(product("a", 1000), 0);
        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn test_update_quantity_zero_removes() {
        let mut cart = CartStore::open(MemoryCartStorage::new());
        cart.add_item(product("a", 1000), 2);
        cart.update_quantity(&ProductId::new("a"), 0);
        assert!(!cart.is_in_cart(&ProductId::new("a")));

        cart.add_item(product("b", 1000), 2);
        cart.update_quantity(&ProductId::new("b"), -3);
        assert!(cart.items().is_empty());
    }

    #[test]
    fn test_update_quantity_replaces() {
        let mut cart = CartStore::open(MemoryCartStorage::new());
        cart.add_item(product("a", 1000), 2);
        cart.update_quantity(&ProductId::new("a"), 5);
        assert_eq!(cart.item_count(), 5);

        // Unknown id is ignored
        cart.update_quantity(&ProductId::new("zzz"), 4);
        assert_eq!(cart.items().len(), 1);
    }

    #[test]
    fn test_totals() {
        let mut cart = CartStore::open(MemoryCartStorage::new());
        cart.add_item(product("a", 1000), 2);
        cart.add_item(product("b", 500), 1);

        assert_eq!(cart.subtotal(), Decimal::new(2500, 2));
        assert_eq!(cart.tax(), Decimal::new(200, 2));
        assert_eq!(cart.total(), Decimal::new(2700, 2));
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut cart = CartStore::open(MemoryCartStorage::new());
        cart.add_item(product("a", 100), 1);
        cart.remove_item(&ProductId::new("nope"));
        assert_eq!(cart.items().len(), 1);
    }

    #[test]
    fn test_clear_cart_is_idempotent() {
        let mut cart = CartStore::open(MemoryCartStorage::new());
        cart.add_item(product("a", 100), 1);
        cart.clear_cart();
        let once = cart.snapshot();
        cart.clear_cart();
        assert_eq!(cart.snapshot(), once);
        assert_eq!(once.totals, CartTotals::default());
    }

    #[test]
    fn test_mutations_persist_and_reopen() {
        let storage = std::sync::Arc::new(MemoryCartStorage::new());
        let mut cart = CartStore::open(std::sync::Arc::clone(&storage));
        cart.add_item(product("a", 1000), 2);
        drop(cart);

        let reopened = CartStore::open(storage);
        assert_eq!(reopened.item_count(), 2);
        assert!(!reopened.is_open());
    }

    #[test]
    fn test_corrupt_storage_opens_empty() {
        let storage = MemoryCartStorage::with_entry(CART_STORAGE_KEY, "{broken");
        let cart = CartStore::open(storage);
        assert!(cart.items().is_empty());
        // Left untouched until the next write
        assert_eq!(
            cart.storage().load(CART_STORAGE_KEY).unwrap().as_deref(),
            Some("{broken")
        );
    }

    #[test]
    fn test_open_flag_is_not_persisted() {
        let storage = std::sync::Arc::new(MemoryCartStorage::new());
        let mut cart = CartStore::open(std::sync::Arc::clone(&storage));
        cart.toggle_cart();
        assert!(cart.is_open());
        cart.set_cart_open(false);
        assert!(!cart.is_open());
        assert!(storage.load(CART_STORAGE_KEY).unwrap().is_none());
    }

    #[test]
    fn test_subscribers_see_changes() {
        let mut cart = CartStore::open(MemoryCartStorage::new());
        let mut rx = cart.subscribe();
        assert!(!rx.has_changed().unwrap());

        cart.add_item(product("a", 250), 4);
        assert!(rx.has_changed().unwrap());
        let snapshot = rx.borrow_and_update().clone();
        assert_eq!(snapshot.totals.item_count, 4);
        assert_eq!(snapshot.totals.subtotal, Decimal::new(1000, 2));
    }

    #[test]
    fn test_sync_between_shared_handles() {
        let shared = SharedCartStorage::new();
        let mut events = shared.subscribe();
        let mut tab_a = CartStore::open(shared.handle());
        let mut tab_b = CartStore::open(shared.handle());

        tab_a.add_item(product("a", 1000), 1);
        let event = events.try_recv().unwrap();

        assert!(!tab_a.sync_from_storage(&event));
        assert!(tab_b.items().is_empty());
        assert!(tab_b.sync_from_storage(&event));
        assert_eq!(tab_b.items(), tab_a.items());
    }

    #[test]
    fn test_sync_ignores_other_keys() {
        let shared = SharedCartStorage::new();
        let mut events = shared.subscribe();
        let other = shared.handle();
        let mut cart = CartStore::open(shared.handle());

        other.save("wishlist", "[]").unwrap();
        let event = events.try_recv().unwrap();
        assert!(!cart.sync_from_storage(&event));
    }
}
