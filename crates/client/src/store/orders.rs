//! Orders slice: checkout, local history, status updates.
//!
//! Orders are recorded locally: checkout builds the order from the cart
//! snapshot and appends it to the persisted `orders` collection. Status
//! updates are in-memory only; the list entry and the current-order
//! reference are updated together so they can never diverge.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rust_decimal::Decimal;
use tracing::instrument;
use uuid::Uuid;

use shopfront_core::{CartLine, Order, OrderId, OrderStatus, ShippingAddress};

use crate::error::SliceError;
use crate::session::SessionHandle;
use crate::storage::{Storage, StorageError, keys};
use crate::store::OpState;

#[derive(Debug, Default)]
struct OrdersState {
    orders: Vec<Order>,
    current: Option<Order>,
    op: OpState,
}

/// Shared handle to the orders state.
#[derive(Clone)]
pub struct OrdersSlice {
    inner: Arc<OrdersInner>,
}

struct OrdersInner {
    state: RwLock<OrdersState>,
    storage: Storage,
    session: SessionHandle,
}

impl OrdersSlice {
    pub(crate) fn new(storage: Storage, session: SessionHandle) -> Self {
        Self {
            inner: Arc::new(OrdersInner {
                state: RwLock::new(OrdersState::default()),
                storage,
                session,
            }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, OrdersState> {
        self.inner.state.read().expect("orders lock poisoned")
    }

    fn write(&self) -> RwLockWriteGuard<'_, OrdersState> {
        self.inner.state.write().expect("orders lock poisoned")
    }

    fn begin(&self) {
        self.write().op.begin();
    }

    fn reject(&self, error: SliceError) -> SliceError {
        self.write().op.reject(error.clone());
        error
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Create an order from a cart snapshot.
    ///
    /// The order is owned by the signed-in user, gets a fresh id and a
    /// `pending` status, is appended to the persisted history, and becomes
    /// the current order.
    ///
    /// # Errors
    ///
    /// Returns `SliceError::NotAuthenticated` when no user is signed in,
    /// or `SliceError::Storage` when the history cannot be persisted.
    #[instrument(skip(self, items, shipping, payment_method), fields(total = %total))]
    pub fn create(
        &self,
        items: Vec<CartLine>,
        total: Decimal,
        shipping: ShippingAddress,
        payment_method: &str,
    ) -> Result<Order, SliceError> {
        self.begin();

        let Some(user) = self.inner.session.user() else {
            return Err(self.reject(SliceError::NotAuthenticated));
        };

        let order = Order {
            id: OrderId::new(Uuid::new_v4().to_string()),
            user_id: user.id,
            items,
            total,
            status: OrderStatus::Pending,
            shipping_address: shipping,
            payment_method: payment_method.to_owned(),
            created_at: chrono::Utc::now(),
        };

        let mut saved = match self.read_history() {
            Ok(saved) => saved,
            Err(err) => return Err(self.reject(err.into())),
        };
        saved.push(order.clone());
        if let Err(err) = self.inner.storage.write(keys::ORDERS, &saved) {
            return Err(self.reject(err.into()));
        }

        let mut state = self.write();
        state.op.fulfill();
        state.orders.push(order.clone());
        state.current = Some(order.clone());
        Ok(order)
    }

    /// Load the persisted order history, replacing the held collection.
    ///
    /// # Errors
    ///
    /// Returns `SliceError::Storage` on filesystem failure. A malformed
    /// history snapshot is discarded and yields an empty collection.
    #[instrument(skip(self))]
    pub fn fetch_all(&self) -> Result<Vec<Order>, SliceError> {
        self.begin();
        match self.read_history() {
            Ok(orders) => {
                let mut state = self.write();
                state.op.fulfill();
                state.orders.clone_from(&orders);
                Ok(orders)
            }
            Err(err) => Err(self.reject(err.into())),
        }
    }

    /// Update the status of the order with the given id.
    ///
    /// Both the list entry and, when it is the same order, the current
    /// order reference are updated. An unknown id is a no-op. The change
    /// is in-memory only; no persistence round-trip is made.
    pub fn update_status(&self, id: &OrderId, status: OrderStatus) {
        let mut state = self.write();
        if let Some(order) = state.orders.iter_mut().find(|order| &order.id == id) {
            order.status = status;
        }
        if let Some(current) = state.current.as_mut()
            && &current.id == id
        {
            current.status = status;
        }
    }

    /// Drop the current-order reference.
    pub fn clear_current(&self) {
        self.write().current = None;
    }

    fn read_history(&self) -> Result<Vec<Order>, StorageError> {
        Ok(self
            .inner
            .storage
            .read_or_discard(keys::ORDERS)?
            .unwrap_or_default())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Snapshot of the held order collection.
    #[must_use]
    pub fn orders(&self) -> Vec<Order> {
        self.read().orders.clone()
    }

    /// The order created by the most recent checkout, if any.
    #[must_use]
    pub fn current(&self) -> Option<Order> {
        self.read().current.clone()
    }

    /// Whether an order operation is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.read().op.is_loading()
    }

    /// The most recent order failure, until the next operation starts.
    #[must_use]
    pub fn error(&self) -> Option<SliceError> {
        self.read().op.error().cloned()
    }
}
