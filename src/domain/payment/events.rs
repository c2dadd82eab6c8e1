use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ============================================================================
// Payment Events - Published after a verification decision commits
// ============================================================================

/// Payment Event - Union type for all payment events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PaymentEvent {
    Verified(PaymentVerified),
    Rejected(PaymentRejected),
}

/// Payment Verified - proof of payment accepted by a reviewer
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PaymentVerified {
    pub payment_id: String,
    pub order_id: String,
    pub amount: Decimal,
    pub verified_by: String,
    pub timestamp: DateTime<Utc>,
}

/// Payment Rejected - proof of payment refused with a reason
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PaymentRejected {
    pub payment_id: String,
    pub order_id: String,
    pub reason: String,
    pub verified_by: String,
    pub timestamp: DateTime<Utc>,
}
