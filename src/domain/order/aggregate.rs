use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::payment::{PaymentMethod, PaymentStatus};
use super::errors::OrderError;
use super::value_objects::{CustomerInfo, OrderStatus};

// ============================================================================
// Order Aggregate - Domain Logic
// ============================================================================
//
// The order owns two columns driven by two separate machines:
// - status:          the fulfillment chain, advanced one step at a time
// - payment_status:  mirrors the decision on the order's payment
//
// Leaving AwaitingPayment is reserved to the payment confirmation step, and
// entering Cancelled is reserved to cancel(); set-status requests may only
// walk the forward chain.
//
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    // Identity
    pub id: String,
    pub account_id: Option<Uuid>,

    // Customer snapshot (independent of any linked account)
    pub customer: CustomerInfo,

    // Intent
    pub payment_method: PaymentMethod,

    // Money (2-dp fixed point; total = subtotal + tax)
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,

    // State
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,

    // Audit
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Create a new order in its initial state.
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        id: String,
        customer: CustomerInfo,
        payment_method: PaymentMethod,
        account_id: Option<Uuid>,
        subtotal: Decimal,
        tax: Decimal,
        total: Decimal,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            account_id,
            customer,
            payment_method,
            subtotal,
            tax,
            total,
            status: OrderStatus::AwaitingPayment,
            payment_status: PaymentStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Validate a requested fulfillment transition.
    ///
    /// Only single-step moves along the forward chain are allowed here.
    /// AwaitingPayment → Preparing goes through payment confirmation, and
    /// Cancelled goes through cancel(), so both are rejected.
    pub fn ensure_can_advance_to(&self, to: &OrderStatus) -> Result<(), OrderError> {
        let legal = match self.status.forward_successor() {
            Some(ref next) => next == to,
            None => false,
        };

        if !legal || *to == OrderStatus::Cancelled || self.status == OrderStatus::AwaitingPayment {
            return Err(OrderError::InvalidTransition {
                from: self.status.clone(),
                to: to.clone(),
            });
        }
        Ok(())
    }

    /// Guard: fulfillment may start (payment confirmation path).
    pub fn ensure_awaiting_payment(&self) -> Result<(), OrderError> {
        match self.status {
            OrderStatus::AwaitingPayment => Ok(()),
            ref other => Err(OrderError::NotAwaitingPayment(other.clone())),
        }
    }

    /// Guard: the order can still be cancelled.
    pub fn ensure_cancellable(&self) -> Result<(), OrderError> {
        match self.status {
            OrderStatus::Cancelled => Err(OrderError::AlreadyCancelled),
            OrderStatus::Delivered => Err(OrderError::AlreadyDelivered),
            _ => Ok(()),
        }
    }

    /// Copy of this order with a new fulfillment status.
    pub fn with_status(&self, status: OrderStatus) -> Order {
        let mut updated = self.clone();
        updated.status = status;
        updated.updated_at = Utc::now();
        updated
    }

    /// Copy of this order with a new payment status.
    pub fn with_payment_status(&self, payment_status: PaymentStatus) -> Order {
        let mut updated = self.clone();
        updated.payment_status = payment_status;
        updated.updated_at = Utc::now();
        updated
    }
}

// ============================================================================
// Order Status History - append-only audit trail
// ============================================================================

/// One row of the order's audit trail. Written atomically with every status
/// change; never mutated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusHistory {
    pub id: Uuid,
    pub order_id: String,
    pub status: OrderStatus,
    pub notes: Option<String>,
    pub changed_by: String,
    pub created_at: DateTime<Utc>,
}

impl OrderStatusHistory {
    pub fn record(
        order_id: &str,
        status: OrderStatus,
        notes: Option<String>,
        changed_by: &str,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id: order_id.to_string(),
            status,
            notes,
            changed_by: changed_by.to_string(),
            created_at: Utc::now(),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
