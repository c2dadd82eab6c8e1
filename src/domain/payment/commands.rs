use rust_decimal::Decimal;

use super::value_objects::{PaymentMethod, VerificationDecision};

// ============================================================================
// Payment Commands - Represent user intent
// ============================================================================

/// Register a claimed payment against an order. When `amount` is omitted the
/// order total is claimed.
#[derive(Debug, Clone)]
pub struct CreatePayment {
    pub order_id: String,
    pub method: PaymentMethod,
    pub reference_number: Option<String>,
    pub amount: Option<Decimal>,
}

/// Record the reviewer's decision on a pending payment proof.
#[derive(Debug, Clone)]
pub struct VerifyPayment {
    pub payment_id: String,
    pub decision: VerificationDecision,
    pub notes: Option<String>,
    /// Required when the decision is Rejected.
    pub rejection_reason: Option<String>,
    pub verified_by: String,
}

/// Authorize fulfillment of the order behind a verified payment.
#[derive(Debug, Clone)]
pub struct ConfirmPayment {
    pub payment_id: String,
    pub notes: Option<String>,
    pub confirmed_by: String,
}
