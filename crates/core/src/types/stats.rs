//! Merchant dashboard statistics.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Aggregate figures shown on the merchant dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_revenue: Decimal,
    pub total_orders: u64,
    pub total_products: u64,
    pub pending_orders: u64,
}
