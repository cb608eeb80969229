//! Persisted cart store.
//!
//! Lines keep insertion order and a cart never holds two lines for the
//! same product. The total is recomputed from the lines after every
//! mutation, never patched incrementally, and the snapshot is persisted
//! within the same mutation step. The sidebar visibility flag is view
//! state and is not persisted.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rust_decimal::Decimal;

use shopfront_core::{CartLine, Product, ProductId, cart_total};

use crate::storage::{Storage, StorageError, keys};

#[derive(Debug)]
struct CartState {
    lines: Vec<CartLine>,
    total: Decimal,
    visible: bool,
}

/// Shared handle to the persisted cart.
///
/// Cloning is cheap; all clones share the same state.
#[derive(Debug, Clone)]
pub struct CartStore {
    inner: Arc<CartInner>,
}

#[derive(Debug)]
struct CartInner {
    state: RwLock<CartState>,
    storage: Storage,
}

impl CartStore {
    /// Restore the cart from the persisted snapshot.
    ///
    /// A missing or malformed snapshot yields an empty cart. The total is
    /// always recomputed from the restored lines, never read from storage,
    /// so a stale or tampered total cannot survive a restart.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on filesystem failure.
    pub(crate) fn open(storage: Storage) -> Result<Self, StorageError> {
        let lines: Vec<CartLine> = storage.read_or_discard(keys::CART)?.unwrap_or_default();
        let total = cart_total(&lines);
        Ok(Self {
            inner: Arc::new(CartInner {
                state: RwLock::new(CartState {
                    lines,
                    total,
                    visible: false,
                }),
                storage,
            }),
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, CartState> {
        self.inner.state.read().expect("cart lock poisoned")
    }

    fn write(&self) -> RwLockWriteGuard<'_, CartState> {
        self.inner.state.write().expect("cart lock poisoned")
    }

    /// Apply `mutation` to the lines, recompute the total, and persist the
    /// snapshot, all under one write lock.
    fn mutate(&self, mutation: impl FnOnce(&mut Vec<CartLine>)) -> Result<(), StorageError> {
        let mut state = self.write();
        mutation(&mut state.lines);
        state.total = cart_total(&state.lines);
        self.inner.storage.write(keys::CART, &state.lines)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add one unit of `product`: an existing line increments its quantity,
    /// otherwise a new line with quantity 1 is appended.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the snapshot cannot be persisted; the
    /// in-memory cart keeps the mutation in that case.
    pub fn add_line(&self, product: Product) -> Result<(), StorageError> {
        self.mutate(|lines| {
            if let Some(line) = lines.iter_mut().find(|line| line.id == product.id) {
                line.quantity += 1;
                return;
            }
            lines.push(CartLine::new(product));
        })
    }

    /// Remove the line for `id`. Removing an absent id is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the snapshot cannot be persisted.
    pub fn remove_line(&self, id: &ProductId) -> Result<(), StorageError> {
        self.mutate(|lines| lines.retain(|line| &line.id != id))
    }

    /// Set the quantity for `id` exactly. A quantity of zero removes the
    /// line; an absent id with a non-zero quantity is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the snapshot cannot be persisted.
    pub fn set_quantity(&self, id: &ProductId, quantity: u32) -> Result<(), StorageError> {
        self.mutate(|lines| {
            if quantity == 0 {
                lines.retain(|line| &line.id != id);
                return;
            }
            if let Some(line) = lines.iter_mut().find(|line| &line.id == id) {
                line.quantity = quantity;
            }
        })
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the snapshot cannot be persisted.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.mutate(Vec::clear)
    }

    // =========================================================================
    // Sidebar visibility (view state, not persisted)
    // =========================================================================

    /// Flip the sidebar visibility.
    pub fn toggle_visible(&self) {
        let mut state = self.write();
        state.visible = !state.visible;
    }

    /// Show or hide the sidebar.
    pub fn set_visible(&self, visible: bool) {
        self.write().visible = visible;
    }

    /// Hide the sidebar.
    pub fn close(&self) {
        self.set_visible(false);
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Snapshot of the cart lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> Vec<CartLine> {
        self.read().lines.clone()
    }

    /// Current total (always equals the recomputed sum over the lines).
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.read().total
    }

    /// Number of lines (not units) in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().lines.len()
    }

    /// Whether the cart holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().lines.is_empty()
    }

    /// Whether the sidebar is currently shown.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.read().visible
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use shopfront_core::{Category, CategoryId};

    fn product(id: &str, price: &str) -> Product {
        Product {
            id: ProductId::new(id),
            title: format!("Product {id}"),
            description: String::new(),
            price: price.parse().unwrap(),
            image: String::new(),
            category: Category {
                id: CategoryId::new(1),
                name: "General".to_owned(),
            },
            stock: 10,
            rating: 0.0,
            reviews: 0,
        }
    }

    fn open_cart() -> (tempfile::TempDir, CartStore) {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::open(dir.path()).unwrap();
        let cart = CartStore::open(storage).unwrap();
        (dir, cart)
    }

    fn decimal(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_adding_same_product_twice_merges_into_one_line() {
        let (_dir, cart) = open_cart();
        let lamp = product("p-1", "99.99");

        cart.add_line(lamp.clone()).unwrap();
        cart.add_line(lamp).unwrap();

        let lines = cart.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines.first().unwrap().quantity, 2);
        assert_eq!(cart.total(), decimal("199.98"));
    }

    #[test]
    fn test_removing_last_line_leaves_empty_cart_with_zero_total() {
        let (_dir, cart) = open_cart();
        let lamp = product("p-1", "99.99");
        cart.add_line(lamp.clone()).unwrap();
        cart.add_line(lamp).unwrap();

        cart.remove_line(&ProductId::new("p-1")).unwrap();

        assert!(cart.is_empty());
        assert_eq!(cart.total(), Decimal::ZERO);
    }

    #[test]
    fn test_removing_one_line_keeps_the_others() {
        let (_dir, cart) = open_cart();
        cart.add_line(product("p-1", "99.99")).unwrap();
        cart.add_line(product("p-2", "50.00")).unwrap();

        cart.remove_line(&ProductId::new("p-1")).unwrap();

        let lines = cart.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines.first().unwrap().id, ProductId::new("p-2"));
        assert_eq!(cart.total(), decimal("50.00"));
    }

    #[test]
    fn test_removing_absent_id_is_a_noop() {
        let (_dir, cart) = open_cart();
        cart.add_line(product("p-1", "10.00")).unwrap();

        cart.remove_line(&ProductId::new("p-404")).unwrap();

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.total(), decimal("10.00"));
    }

    #[test]
    fn test_set_quantity_zero_equals_remove() {
        let (_dir, cart) = open_cart();
        let lamp = product("p-1", "25.00");
        cart.add_line(lamp.clone()).unwrap();
        cart.add_line(lamp).unwrap();

        cart.set_quantity(&ProductId::new("p-1"), 0).unwrap();

        assert!(cart.is_empty());
        assert_eq!(cart.total(), Decimal::ZERO);
    }

    #[test]
    fn test_set_quantity_replaces_rather_than_accumulates() {
        let (_dir, cart) = open_cart();
        cart.add_line(product("p-1", "3.50")).unwrap();

        cart.set_quantity(&ProductId::new("p-1"), 5).unwrap();
        cart.set_quantity(&ProductId::new("p-1"), 2).unwrap();

        assert_eq!(cart.lines().first().unwrap().quantity, 2);
        assert_eq!(cart.total(), decimal("7.00"));
    }

    #[test]
    fn test_set_quantity_for_absent_id_adds_nothing() {
        let (_dir, cart) = open_cart();
        cart.set_quantity(&ProductId::new("p-404"), 3).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_lines_keep_insertion_order() {
        let (_dir, cart) = open_cart();
        cart.add_line(product("p-1", "1.00")).unwrap();
        cart.add_line(product("p-2", "2.00")).unwrap();
        cart.add_line(product("p-3", "3.00")).unwrap();
        // Bumping an existing line must not move it.
        cart.add_line(product("p-2", "2.00")).unwrap();

        let ids: Vec<String> = cart
            .lines()
            .iter()
            .map(|line| line.id.to_string())
            .collect();
        assert_eq!(ids, vec!["p-1", "p-2", "p-3"]);
    }

    #[test]
    fn test_total_is_exact_decimal_arithmetic() {
        let (_dir, cart) = open_cart();
        cart.add_line(product("p-1", "0.10")).unwrap();
        cart.add_line(product("p-2", "0.20")).unwrap();

        assert_eq!(cart.total(), decimal("0.30"));
    }

    #[test]
    fn test_restore_recomputes_total_from_lines() {
        let dir = tempfile::tempdir().unwrap();
        {
            let storage = Storage::open(dir.path()).unwrap();
            let cart = CartStore::open(storage).unwrap();
            let lamp = product("p-1", "99.99");
            cart.add_line(lamp.clone()).unwrap();
            cart.add_line(lamp).unwrap();
            cart.add_line(product("p-2", "0.01")).unwrap();
        }

        let storage = Storage::open(dir.path()).unwrap();
        let restored = CartStore::open(storage).unwrap();

        assert_eq!(restored.len(), 2);
        assert_eq!(restored.total(), decimal("199.99"));
    }

    #[test]
    fn test_corrupt_snapshot_yields_empty_cart() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("cart.json"), b"{definitely not json").unwrap();

        let storage = Storage::open(dir.path()).unwrap();
        let cart = CartStore::open(storage).unwrap();

        assert!(cart.is_empty());
        assert_eq!(cart.total(), Decimal::ZERO);
    }

    #[test]
    fn test_mutations_persist_in_the_same_step() {
        let (dir, cart) = open_cart();
        cart.add_line(product("p-1", "5.00")).unwrap();

        let snapshot = std::fs::read_to_string(dir.path().join("cart.json")).unwrap();
        assert!(snapshot.contains("p-1"));

        cart.clear().unwrap();
        let snapshot = std::fs::read_to_string(dir.path().join("cart.json")).unwrap();
        assert_eq!(snapshot, "[]");
    }

    #[test]
    fn test_visibility_toggles_but_is_not_persisted() {
        let dir = tempfile::tempdir().unwrap();
        {
            let storage = Storage::open(dir.path()).unwrap();
            let cart = CartStore::open(storage).unwrap();
            cart.add_line(product("p-1", "5.00")).unwrap();

            assert!(!cart.is_visible());
            cart.toggle_visible();
            assert!(cart.is_visible());
            cart.close();
            assert!(!cart.is_visible());
            cart.toggle_visible();
        }

        let storage = Storage::open(dir.path()).unwrap();
        let restored = CartStore::open(storage).unwrap();
        assert!(!restored.is_visible());
    }
}
