use rust_decimal::Decimal;

use super::value_objects::PaymentStatus;

// ============================================================================
// Payment Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("order already has a payment")]
    AlreadyExists,

    #[error("payment amount {actual} does not match order total {expected}")]
    AmountMismatch { expected: Decimal, actual: Decimal },

    #[error("payment was already processed with status {0:?}")]
    AlreadyProcessed(PaymentStatus),

    #[error("payment must be verified before confirmation, current status: {0:?}")]
    NotVerified(PaymentStatus),

    #[error("a rejection reason is required when rejecting a payment")]
    MissingRejectionReason,

    #[error("unknown payment method: {0}")]
    UnknownMethod(String),
}
