//! Shopping cart state store.
//!
//! Holds the ordered cart in memory, applies add/increment/decrement, and
//! writes the full list to a [`KeyValueStore`] after every mutation.

use chrono::{DateTime, Utc};
use gomarket_core::{CartItem, KeyValueStore, NewCartItem};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::StoreConfig;
use crate::error::StoreError;

// ============================================================================
// Mutation Rules
// ============================================================================

/// Adds a candidate to the list.
///
/// An existing entry with the same id is replaced in place by the candidate's
/// fields with its quantity bumped by one; otherwise the candidate is
/// appended with quantity 1.
fn add_item(items: &[CartItem], item: NewCartItem) -> Vec<CartItem> {
    if items.iter().any(|p| p.id == item.id) {
        items
            .iter()
            .map(|p| {
                if p.id == item.id {
                    CartItem::from_new(item.clone(), p.quantity.saturating_add(1))
                } else {
                    p.clone()
                }
            })
            .collect()
    } else {
        let mut next = items.to_vec();
        next.push(item.into_cart_item(1));
        next
    }
}

fn increment_item(items: &[CartItem], id: &str) -> Vec<CartItem> {
    items
        .iter()
        .map(|p| {
            if p.id == id {
                p.with_quantity(p.quantity.saturating_add(1))
            } else {
                p.clone()
            }
        })
        .collect()
}

/// Decrements the matching item, then drops the first item left below 1.
///
/// Only one item is removed per call. An item already sitting at zero is
/// pruned by any decrement, whichever id it targets.
fn decrement_item(items: &[CartItem], id: &str) -> Vec<CartItem> {
    let mut next: Vec<CartItem> = items
        .iter()
        .map(|p| {
            if p.id == id && p.quantity > 0 {
                p.with_quantity(p.quantity - 1)
            } else {
                p.clone()
            }
        })
        .collect();

    if let Some(pos) = next.iter().position(|p| p.quantity < 1) {
        let removed = next.remove(pos);
        debug!(id = %removed.id, "Removed item with zero quantity");
    }
    next
}

// ============================================================================
// Inner State
// ============================================================================

struct CartStoreInner {
    /// Current cart, authoritative for the session.
    items: RwLock<Vec<CartItem>>,
    /// Held for a whole compute + persist cycle so mutations never interleave.
    mutation: Mutex<()>,
    storage: Arc<dyn KeyValueStore>,
    key: String,
    strict_snapshots: bool,
    notify: watch::Sender<u64>,
    version: RwLock<u64>,
    /// Set when the last write failed; cleared by the next successful one.
    dirty: AtomicBool,
    last_saved_at: RwLock<Option<DateTime<Utc>>>,
}

// ============================================================================
// Cart Store
// ============================================================================

/// Persistent shopping cart.
///
/// Cheap to clone; clones share the same cart. Pass it to whatever needs the
/// cart, or install it for a task with [`CartScope`](crate::CartScope).
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("key", &self.inner.key)
            .field("strict_snapshots", &self.inner.strict_snapshots)
            .field("dirty", &self.is_dirty())
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Creates an empty store. Nothing is read until [`hydrate`](Self::hydrate).
    pub fn new(storage: Arc<dyn KeyValueStore>, config: &StoreConfig) -> Self {
        let (notify, _) = watch::channel(0);
        Self {
            inner: Arc::new(CartStoreInner {
                items: RwLock::new(Vec::new()),
                mutation: Mutex::new(()),
                storage,
                key: config.storage_key.clone(),
                strict_snapshots: config.strict_snapshots,
                notify,
                version: RwLock::new(0),
                dirty: AtomicBool::new(false),
                last_saved_at: RwLock::new(None),
            }),
        }
    }

    /// Creates a store and loads the persisted cart.
    ///
    /// # Errors
    ///
    /// See [`hydrate`](Self::hydrate).
    pub async fn open(
        storage: Arc<dyn KeyValueStore>,
        config: &StoreConfig,
    ) -> Result<Self, StoreError> {
        let store = Self::new(storage, config);
        store.hydrate().await?;
        Ok(store)
    }

    /// Creates a store and loads the persisted cart in a background task.
    ///
    /// The store is usable immediately; until the task finishes readers see
    /// an empty cart.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn spawn_open(
        storage: Arc<dyn KeyValueStore>,
        config: &StoreConfig,
    ) -> (Self, JoinHandle<Result<(), StoreError>>) {
        let store = Self::new(storage, config);
        let loader = store.clone();
        let handle = tokio::spawn(async move { loader.hydrate().await });
        (store, handle)
    }

    /// Loads the persisted snapshot, replacing the in-memory cart.
    ///
    /// A missing snapshot leaves the cart as it is. A malformed one is logged
    /// and ignored unless `strict_snapshots` is set.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Storage`] if the backend read fails
    /// - [`StoreError::Deserialization`] for a malformed snapshot in strict mode
    pub async fn hydrate(&self) -> Result<(), StoreError> {
        let _guard = self.inner.mutation.lock().await;
        let key = &self.inner.key;

        let raw = self.inner.storage.get(key).await.map_err(|e| {
            warn!(key = %key, error = %e, "Failed to read cart snapshot");
            StoreError::Storage(e.to_string())
        })?;

        let Some(raw) = raw else {
            debug!(key = %key, "No cart snapshot stored");
            return Ok(());
        };

        match serde_json::from_str::<Vec<CartItem>>(&raw) {
            Ok(items) => {
                let count = items.len();
                *self.inner.items.write().await = items;
                self.notify_change().await;
                info!(key = %key, items = count, "Cart loaded");
                Ok(())
            }
            Err(e) if self.inner.strict_snapshots => {
                warn!(key = %key, error = %e, "Malformed cart snapshot");
                Err(StoreError::Deserialization(e))
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Malformed cart snapshot, starting with an empty cart");
                Ok(())
            }
        }
    }

    // ========================================================================
    // Access
    // ========================================================================

    /// Returns the current cart in order.
    pub async fn products(&self) -> Vec<CartItem> {
        self.inner.items.read().await.clone()
    }

    /// Gets the item with the given id.
    pub async fn get(&self, id: &str) -> Option<CartItem> {
        self.inner
            .items
            .read()
            .await
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    /// Number of distinct items.
    pub async fn len(&self) -> usize {
        self.inner.items.read().await.len()
    }

    /// Returns true if the cart has no items.
    pub async fn is_empty(&self) -> bool {
        self.inner.items.read().await.is_empty()
    }

    /// Sum of all quantities.
    pub async fn total_quantity(&self) -> u64 {
        self.inner
            .items
            .read()
            .await
            .iter()
            .map(|p| u64::from(p.quantity))
            .sum()
    }

    /// Storage key the snapshot is written under.
    pub fn storage_key(&self) -> &str {
        &self.inner.key
    }

    /// Returns true if the last persistence attempt failed.
    pub fn is_dirty(&self) -> bool {
        self.inner.dirty.load(Ordering::Acquire)
    }

    /// Time of the last successful write.
    pub async fn last_saved_at(&self) -> Option<DateTime<Utc>> {
        *self.inner.last_saved_at.read().await
    }

    /// Subscribes to cart changes. The value is a change counter.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.notify.subscribe()
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Adds an item, or bumps its quantity and refreshes its fields if the id
    /// is already in the cart.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidItem`] for an empty id or a negative or
    /// non-finite price; the cart is left untouched. Returns
    /// [`StoreError::Storage`] if the snapshot could not be written. The
    /// in-memory cart is updated either way.
    pub async fn add_to_cart(&self, item: NewCartItem) -> Result<(), StoreError> {
        item.validate()?;
        let id = item.id.clone();
        debug!(id = %id, "Adding item to cart");
        self.mutate(|items| add_item(items, item)).await
    }

    /// Increases the quantity of an item by one. Unknown ids leave the cart
    /// unchanged but still write the snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Storage`] if the snapshot could not be written.
    pub async fn increment(&self, id: &str) -> Result<(), StoreError> {
        debug!(id = %id, "Incrementing item");
        self.mutate(|items| increment_item(items, id)).await
    }

    /// Decreases the quantity of an item by one, removing it at zero.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Storage`] if the snapshot could not be written.
    pub async fn decrement(&self, id: &str) -> Result<(), StoreError> {
        debug!(id = %id, "Decrementing item");
        self.mutate(|items| decrement_item(items, id)).await
    }

    /// Empties the cart.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Storage`] if the snapshot could not be written.
    pub async fn clear(&self) -> Result<(), StoreError> {
        debug!("Clearing cart");
        self.mutate(|_| Vec::new()).await
    }

    /// Writes the current cart again without changing it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Storage`] if the snapshot could not be written.
    pub async fn flush(&self) -> Result<(), StoreError> {
        let _guard = self.inner.mutation.lock().await;
        let snapshot = self.inner.items.read().await.clone();
        self.persist(&snapshot).await
    }

    async fn mutate<F>(&self, f: F) -> Result<(), StoreError>
    where
        F: FnOnce(&[CartItem]) -> Vec<CartItem>,
    {
        let _guard = self.inner.mutation.lock().await;
        let snapshot = {
            let mut items = self.inner.items.write().await;
            let next = f(items.as_slice());
            *items = next;
            items.clone()
        };
        self.notify_change().await;
        self.persist(&snapshot).await
    }

    async fn persist(&self, items: &[CartItem]) -> Result<(), StoreError> {
        let key = &self.inner.key;
        if self.is_dirty() {
            info!(key = %key, "Retrying write of unsaved cart");
        }

        let json = serde_json::to_string(items)?;
        match self.inner.storage.set(key, &json).await {
            Ok(()) => {
                self.inner.dirty.store(false, Ordering::Release);
                *self.inner.last_saved_at.write().await = Some(Utc::now());
                debug!(key = %key, items = items.len(), "Cart persisted");
                Ok(())
            }
            Err(e) => {
                self.inner.dirty.store(true, Ordering::Release);
                warn!(key = %key, error = %e, "Failed to persist cart, keeping in-memory changes");
                Err(StoreError::Storage(e.to_string()))
            }
        }
    }

    async fn notify_change(&self) {
        let mut version = self.inner.version.write().await;
        *version += 1;
        let _ = self.inner.notify.send(*version);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn candidate(id: &str, title: &str, price: f64) -> NewCartItem {
        NewCartItem::new(id, title, format!("https://img/{id}.png"), price)
    }

    fn item(id: &str, quantity: u32) -> CartItem {
        candidate(id, id, 10.0).into_cart_item(quantity)
    }

    fn ids(items: &[CartItem]) -> Vec<&str> {
        items.iter().map(|p| p.id.as_str()).collect()
    }

    fn memory_store() -> (CartStore, MemoryStorage) {
        let storage = MemoryStorage::new();
        let store = CartStore::new(Arc::new(storage.clone()), &StoreConfig::default());
        (store, storage)
    }

    async fn persisted(storage: &MemoryStorage) -> Vec<CartItem> {
        let raw = storage.value(crate::CART_STORAGE_KEY).await.unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    // ------------------------------------------------------------------------
    // Rules
    // ------------------------------------------------------------------------

    #[test]
    fn test_add_item_appends_with_quantity_one() {
        let next = add_item(&[item("a", 2)], candidate("b", "B", 5.0));
        assert_eq!(ids(&next), ["a", "b"]);
        assert_eq!(next[1].quantity, 1);
    }

    #[test]
    fn test_add_item_existing_refreshes_fields_in_place() {
        let items = vec![item("a", 2), item("b", 1)];
        let next = add_item(&items, candidate("a", "New title", 99.0));

        assert_eq!(ids(&next), ["a", "b"]);
        assert_eq!(next[0].quantity, 3);
        assert_eq!(next[0].title, "New title");
        assert_eq!(next[0].price, 99.0);
        assert_eq!(next[1], items[1]);
    }

    #[test]
    fn test_increment_item_unknown_id_is_noop() {
        let items = vec![item("a", 1)];
        assert_eq!(increment_item(&items, "zzz"), items);
    }

    #[test]
    fn test_increment_saturates() {
        let next = increment_item(&[item("a", u32::MAX)], "a");
        assert_eq!(next[0].quantity, u32::MAX);
    }

    #[test]
    fn test_decrement_item_keeps_item_above_one() {
        let next = decrement_item(&[item("a", 3)], "a");
        assert_eq!(next[0].quantity, 2);
    }

    #[test]
    fn test_decrement_item_removes_at_zero() {
        let next = decrement_item(&[item("a", 1), item("b", 2)], "a");
        assert_eq!(ids(&next), ["b"]);
    }

    #[test]
    fn test_decrement_prunes_preexisting_zero_item_for_any_id() {
        let items = vec![item("a", 2), item("zero", 0), item("c", 1)];
        let next = decrement_item(&items, "a");

        assert_eq!(ids(&next), ["a", "c"]);
        assert_eq!(next[0].quantity, 1);
    }

    #[test]
    fn test_decrement_removes_only_first_item_below_one() {
        let items = vec![item("z1", 0), item("z2", 0), item("a", 1)];
        let next = decrement_item(&items, "a");

        // "a" reaches zero too, but only the first zero item goes.
        assert_eq!(ids(&next), ["z2", "a"]);
        assert_eq!(next[1].quantity, 0);
    }

    #[test]
    fn test_decrement_unknown_id_keeps_contents() {
        let items = vec![item("a", 1), item("b", 4)];
        assert_eq!(decrement_item(&items, "missing"), items);
    }

    // ------------------------------------------------------------------------
    // Store
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_new_store_is_empty() {
        let (store, storage) = memory_store();
        assert!(store.is_empty().await);
        assert_eq!(store.total_quantity().await, 0);
        assert_eq!(storage.write_count().await, 0);
        assert!(store.last_saved_at().await.is_none());
    }

    #[tokio::test]
    async fn test_add_to_empty_cart() {
        let (store, storage) = memory_store();
        store.add_to_cart(candidate("1", "Shirt", 49.9)).await.unwrap();

        let products = store.products().await;
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].quantity, 1);
        assert_eq!(persisted(&storage).await, products);
        assert!(store.last_saved_at().await.is_some());
    }

    #[tokio::test]
    async fn test_add_twice_uses_second_fields() {
        let (store, _) = memory_store();
        store.add_to_cart(candidate("1", "Old", 10.0)).await.unwrap();
        store.add_to_cart(candidate("1", "New", 12.0)).await.unwrap();

        let products = store.products().await;
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].quantity, 2);
        assert_eq!(products[0].title, "New");
        assert_eq!(products[0].price, 12.0);
    }

    #[tokio::test]
    async fn test_increment_touches_only_target() {
        let (store, _) = memory_store();
        store.add_to_cart(candidate("a", "A", 1.0)).await.unwrap();
        store.add_to_cart(candidate("b", "B", 2.0)).await.unwrap();

        store.increment("b").await.unwrap();

        assert_eq!(store.get("a").await.unwrap().quantity, 1);
        assert_eq!(store.get("b").await.unwrap().quantity, 2);
        assert_eq!(store.total_quantity().await, 3);
    }

    #[tokio::test]
    async fn test_unknown_id_still_persists() {
        let (store, storage) = memory_store();
        store.add_to_cart(candidate("a", "A", 1.0)).await.unwrap();
        let before = store.products().await;

        store.increment("nope").await.unwrap();
        store.decrement("nope").await.unwrap();

        assert_eq!(store.products().await, before);
        assert_eq!(storage.write_count().await, 3);
    }

    #[tokio::test]
    async fn test_add_increment_decrement_sequence() {
        let (store, storage) = memory_store();
        let product = candidate("p", "Product", 5.0);

        store.add_to_cart(product.clone()).await.unwrap();
        store.increment(&product.id).await.unwrap();
        store.decrement(&product.id).await.unwrap();
        store.decrement(&product.id).await.unwrap();

        assert!(store.is_empty().await);

        let quantities: Vec<Vec<u32>> = storage
            .writes()
            .await
            .iter()
            .map(|(_, raw)| {
                serde_json::from_str::<Vec<CartItem>>(raw)
                    .unwrap()
                    .iter()
                    .map(|p| p.quantity)
                    .collect()
            })
            .collect();
        assert_eq!(quantities, vec![vec![1], vec![2], vec![1], vec![]]);
    }

    #[tokio::test]
    async fn test_clear_persists_empty_list() {
        let (store, storage) = memory_store();
        store.add_to_cart(candidate("a", "A", 1.0)).await.unwrap();
        store.clear().await.unwrap();

        assert!(store.is_empty().await);
        assert_eq!(storage.value(crate::CART_STORAGE_KEY).await.as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_write_failure_keeps_memory_and_marks_dirty() {
        let (store, storage) = memory_store();
        storage.set_fail_writes(true);

        let err = store.add_to_cart(candidate("a", "A", 1.0)).await.unwrap_err();
        assert!(matches!(err, StoreError::Storage(_)));
        assert!(err.is_recoverable());
        assert_eq!(store.len().await, 1);
        assert!(store.is_dirty());
        assert_eq!(storage.value(crate::CART_STORAGE_KEY).await, None);

        storage.set_fail_writes(false);
        store.increment("a").await.unwrap();

        assert!(!store.is_dirty());
        assert_eq!(persisted(&storage).await[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_flush_retries_failed_write() {
        let (store, storage) = memory_store();
        storage.set_fail_writes(true);
        let _ = store.add_to_cart(candidate("a", "A", 1.0)).await;
        assert!(store.is_dirty());

        storage.set_fail_writes(false);
        store.flush().await.unwrap();

        assert!(!store.is_dirty());
        assert_eq!(persisted(&storage).await, store.products().await);
    }

    #[tokio::test]
    async fn test_subscribe_sees_changes() {
        let (store, _) = memory_store();
        let mut rx = store.subscribe();
        assert_eq!(*rx.borrow(), 0);

        store.add_to_cart(candidate("a", "A", 1.0)).await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), 1);

        store.increment("a").await.unwrap();
        assert_eq!(*rx.borrow_and_update(), 2);
    }

    #[tokio::test]
    async fn test_clones_share_cart() {
        let (store, _) = memory_store();
        let other = store.clone();
        other.add_to_cart(candidate("a", "A", 1.0)).await.unwrap();
        assert_eq!(store.len().await, 1);
    }
}
