use super::value_objects::OrderStatus;

// ============================================================================
// Order Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("customer {0} is required")]
    MissingCustomerField(&'static str),

    #[error("order items cannot be empty")]
    EmptyItems,

    #[error("order is already cancelled")]
    AlreadyCancelled,

    #[error("order was delivered and can no longer be cancelled")]
    AlreadyDelivered,

    #[error("cannot move order from {from:?} to {to:?}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("order must be awaiting payment to begin preparation, current status: {0:?}")]
    NotAwaitingPayment(OrderStatus),

    #[error("unknown order status: {0}")]
    UnknownStatus(String),
}
