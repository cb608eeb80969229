//! Merchant dashboard statistics slice.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::instrument;

use shopfront_core::DashboardStats;

use crate::api::ApiClient;
use crate::error::SliceError;
use crate::store::OpState;

#[derive(Debug, Default)]
struct DashboardState {
    stats: Option<DashboardStats>,
    op: OpState,
}

/// Shared handle to the dashboard state.
#[derive(Clone)]
pub struct DashboardSlice {
    inner: Arc<DashboardInner>,
}

struct DashboardInner {
    state: RwLock<DashboardState>,
    api: ApiClient,
}

impl DashboardSlice {
    pub(crate) fn new(api: ApiClient) -> Self {
        Self {
            inner: Arc::new(DashboardInner {
                state: RwLock::new(DashboardState::default()),
                api,
            }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, DashboardState> {
        self.inner.state.read().expect("dashboard lock poisoned")
    }

    fn write(&self) -> RwLockWriteGuard<'_, DashboardState> {
        self.inner.state.write().expect("dashboard lock poisoned")
    }

    /// Fetch the aggregate dashboard figures, replacing the held value.
    ///
    /// # Errors
    ///
    /// Returns `SliceError` when the request fails; a previously held
    /// value is left untouched.
    #[instrument(skip(self))]
    pub async fn fetch(&self) -> Result<DashboardStats, SliceError> {
        self.write().op.begin();
        match self
            .inner
            .api
            .get_json::<DashboardStats>("orders/merchant/dashboard-stats/")
            .await
        {
            Ok(stats) => {
                let mut state = self.write();
                state.op.fulfill();
                state.stats = Some(stats.clone());
                Ok(stats)
            }
            Err(err) => {
                let err: SliceError = err.into();
                self.write().op.reject(err.clone());
                Err(err)
            }
        }
    }

    /// The most recently fetched figures, if any.
    #[must_use]
    pub fn stats(&self) -> Option<DashboardStats> {
        self.read().stats.clone()
    }

    /// Whether a fetch is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.read().op.is_loading()
    }

    /// The most recent failure, until the next operation starts.
    #[must_use]
    pub fn error(&self) -> Option<SliceError> {
        self.read().op.error().cloned()
    }
}
