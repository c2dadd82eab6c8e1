use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::catalog::{Presentation, Product};
use crate::domain::order::{Order, OrderItem, OrderStatus, OrderStatusHistory};
use crate::domain::payment::{Payment, PaymentStatus};

// ============================================================================
// Gateway Trait + Write Batch
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("{entity} {id} already exists")]
    Duplicate { entity: &'static str, id: String },

    #[error("order {order_id} already has payment {payment_id}")]
    PaymentExists { order_id: String, payment_id: String },

    #[error("{entity} {id} changed concurrently, expected {expected}")]
    Conflict {
        entity: &'static str,
        id: String,
        expected: String,
    },

    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Expected current state of an order row, checked before the row is
/// replaced. Captures both status columns from the copy the caller read.
#[derive(Debug, Clone)]
pub struct OrderGuard {
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
}

impl OrderGuard {
    pub fn of(order: &Order) -> Self {
        Self {
            status: order.status.clone(),
            payment_status: order.payment_status.clone(),
        }
    }
}

/// One row operation inside an atomic batch.
#[derive(Debug, Clone)]
pub enum WriteOp {
    InsertOrder(Order),
    InsertOrderItems(Vec<OrderItem>),
    InsertHistory(OrderStatusHistory),
    InsertPayment(Payment),
    /// Replace the order row iff the stored row still matches the guard.
    UpdateOrder { order: Order, guard: OrderGuard },
    /// Replace the payment row iff the stored status still matches.
    UpdatePayment {
        payment: Payment,
        expect_status: PaymentStatus,
    },
}

/// An all-or-nothing group of writes. Built up statement by statement and
/// handed to the gateway in one call.
#[derive(Debug, Default)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, op: WriteOp) {
        self.ops.push(op);
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }
}

/// Persistence gateway consumed by the workflow services.
///
/// Catalog rows are read-only here; seeding them is an implementation
/// concern of the concrete store.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn order(&self, id: &str) -> Result<Option<Order>, StoreError>;

    async fn order_items(&self, order_id: &str) -> Result<Vec<OrderItem>, StoreError>;

    /// History rows for an order, newest first.
    async fn order_history(&self, order_id: &str)
        -> Result<Vec<OrderStatusHistory>, StoreError>;

    async fn payment(&self, id: &str) -> Result<Option<Payment>, StoreError>;

    async fn payment_for_order(&self, order_id: &str) -> Result<Option<Payment>, StoreError>;

    async fn product(&self, id: Uuid) -> Result<Option<Product>, StoreError>;

    async fn presentation(&self, id: Uuid) -> Result<Option<Presentation>, StoreError>;

    /// Apply every operation in the batch, or none of them.
    ///
    /// Uniqueness (order/payment ids, one payment per order) and the
    /// compare-and-swap guards on updates are enforced here; a violation
    /// fails the whole batch.
    async fn execute(&self, batch: WriteBatch) -> Result<(), StoreError>;
}
