use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::order::Order;
use super::errors::PaymentError;
use super::value_objects::{amount_tolerance, PaymentMethod, PaymentStatus};

// ============================================================================
// Payment Aggregate - Domain Logic
// ============================================================================
//
// A payment is a claimed payment attempt against exactly one order. It is
// created Pending and moves to Verified or Rejected exactly once; terminal
// states never revert. The aggregate validates those rules; the workflow
// layer persists the results atomically.
//
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    // Identity
    pub id: String,
    pub order_id: String,

    // Claim
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub reference_number: Option<String>,

    // State
    pub status: PaymentStatus,

    // Verification metadata
    pub verified_by: Option<String>,
    pub verified_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub rejection_reason: Option<String>,

    // Audit
    pub created_at: DateTime<Utc>,
}

impl Payment {
    /// Create a pending payment against an order.
    ///
    /// When no amount is supplied the order total is claimed. A supplied
    /// amount must match the order total within the accepted tolerance.
    pub fn new(
        id: String,
        order: &Order,
        method: PaymentMethod,
        reference_number: Option<String>,
        amount: Option<Decimal>,
    ) -> Result<Self, PaymentError> {
        let amount = amount.unwrap_or(order.total);

        let difference = (amount - order.total).abs();
        if difference > amount_tolerance() {
            return Err(PaymentError::AmountMismatch {
                expected: order.total,
                actual: amount,
            });
        }

        Ok(Self {
            id,
            order_id: order.id.clone(),
            amount,
            method,
            reference_number,
            status: PaymentStatus::Pending,
            verified_by: None,
            verified_at: None,
            notes: None,
            rejection_reason: None,
            created_at: Utc::now(),
        })
    }

    /// Guard: the payment has not been processed yet.
    pub fn ensure_pending(&self) -> Result<(), PaymentError> {
        match self.status {
            PaymentStatus::Pending => Ok(()),
            ref other => Err(PaymentError::AlreadyProcessed(other.clone())),
        }
    }

    /// Guard: the payment proof has been verified.
    pub fn ensure_verified(&self) -> Result<(), PaymentError> {
        match self.status {
            PaymentStatus::Verified => Ok(()),
            ref other => Err(PaymentError::NotVerified(other.clone())),
        }
    }

    /// Produce the verified copy of this payment.
    pub fn verified(&self, verified_by: &str, notes: Option<String>) -> Result<Payment, PaymentError> {
        self.ensure_pending()?;

        let mut updated = self.clone();
        updated.status = PaymentStatus::Verified;
        updated.verified_by = Some(verified_by.to_string());
        updated.verified_at = Some(Utc::now());
        updated.notes = notes;
        Ok(updated)
    }

    /// Produce the rejected copy of this payment. A non-blank reason is
    /// required.
    pub fn rejected(
        &self,
        verified_by: &str,
        reason: Option<String>,
        notes: Option<String>,
    ) -> Result<Payment, PaymentError> {
        self.ensure_pending()?;

        let reason = match reason {
            Some(r) if !r.trim().is_empty() => r,
            _ => return Err(PaymentError::MissingRejectionReason),
        };

        let mut updated = self.clone();
        updated.status = PaymentStatus::Rejected;
        updated.verified_by = Some(verified_by.to_string());
        updated.verified_at = Some(Utc::now());
        updated.notes = notes;
        updated.rejection_reason = Some(reason);
        Ok(updated)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
