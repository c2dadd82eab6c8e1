use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::PaymentError;

// ============================================================================
// Payment Value Objects
// ============================================================================

/// How the customer claims to have paid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Transfer,
    Yape,
    Plin,
    Cash,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaymentMethod::Transfer => "TRANSFER",
            PaymentMethod::Yape => "YAPE",
            PaymentMethod::Plin => "PLIN",
            PaymentMethod::Cash => "CASH",
        };
        f.write_str(s)
    }
}

impl FromStr for PaymentMethod {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TRANSFER" => Ok(PaymentMethod::Transfer),
            "YAPE" => Ok(PaymentMethod::Yape),
            "PLIN" => Ok(PaymentMethod::Plin),
            "CASH" => Ok(PaymentMethod::Cash),
            other => Err(PaymentError::UnknownMethod(other.to_string())),
        }
    }
}

/// Lifecycle of a payment attempt. Pending transitions to Verified or
/// Rejected exactly once; both are terminal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Verified,
    Rejected,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Verified => "VERIFIED",
            PaymentStatus::Rejected => "REJECTED",
        };
        f.write_str(s)
    }
}

/// Outcome requested by the reviewer of a payment proof.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationDecision {
    Verified,
    Rejected,
}

/// Largest accepted difference between a claimed payment amount and the
/// order total.
pub fn amount_tolerance() -> Decimal {
    Decimal::new(1, 2) // 0.01
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_method_parsing() {
        assert_eq!("yape".parse::<PaymentMethod>().unwrap(), PaymentMethod::Yape);
        assert_eq!(
            " TRANSFER ".parse::<PaymentMethod>().unwrap(),
            PaymentMethod::Transfer
        );
        assert!("paypal".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_payment_method_roundtrip_display() {
        for method in [
            PaymentMethod::Transfer,
            PaymentMethod::Yape,
            PaymentMethod::Plin,
            PaymentMethod::Cash,
        ] {
            let parsed: PaymentMethod = method.to_string().parse().unwrap();
            assert_eq!(parsed, method);
        }
    }

    #[test]
    fn test_payment_status_serialization() {
        let json = serde_json::to_string(&PaymentStatus::Verified).unwrap();
        assert_eq!(json, "\"VERIFIED\"");
        let back: PaymentStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, PaymentStatus::Verified);
    }

    #[test]
    fn test_amount_tolerance_is_one_cent() {
        assert_eq!(amount_tolerance(), "0.01".parse().unwrap());
    }
}
