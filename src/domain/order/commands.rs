use uuid::Uuid;

use crate::domain::payment::PaymentMethod;
use crate::pricing::ItemSelection;
use super::value_objects::{CustomerInfo, OrderStatus};

// ============================================================================
// Order Commands - Represent user intent
// ============================================================================

/// Place a new order. Guest orders are allowed (no account reference).
#[derive(Debug, Clone)]
pub struct CreateOrder {
    pub customer: CustomerInfo,
    pub payment_method: PaymentMethod,
    pub items: Vec<ItemSelection>,
    pub account_id: Option<Uuid>,
    /// Identity recorded on the initial history row.
    pub placed_by: String,
}

/// Advance the order one step along the fulfillment chain.
#[derive(Debug, Clone)]
pub struct SetOrderStatus {
    pub order_id: String,
    pub status: OrderStatus,
    pub notes: Option<String>,
    pub changed_by: String,
}

/// Cancel the order (a status change, not a deletion).
#[derive(Debug, Clone)]
pub struct CancelOrder {
    pub order_id: String,
    pub reason: Option<String>,
    pub cancelled_by: String,
}
