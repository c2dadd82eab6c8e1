use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::errors::OrderError;

// ============================================================================
// Order Value Objects
// ============================================================================

/// Fulfillment lifecycle of an order. The forward chain is
/// AwaitingPayment → Preparing → ReadyForShipping → Shipped → Delivered;
/// Cancelled is a terminal side branch reachable from any non-terminal state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    AwaitingPayment,
    Preparing,
    ReadyForShipping,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Next state in the forward fulfillment chain, if any.
    pub fn forward_successor(&self) -> Option<OrderStatus> {
        match self {
            OrderStatus::AwaitingPayment => Some(OrderStatus::Preparing),
            OrderStatus::Preparing => Some(OrderStatus::ReadyForShipping),
            OrderStatus::ReadyForShipping => Some(OrderStatus::Shipped),
            OrderStatus::Shipped => Some(OrderStatus::Delivered),
            OrderStatus::Delivered | OrderStatus::Cancelled => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderStatus::AwaitingPayment => "AWAITING_PAYMENT",
            OrderStatus::Preparing => "PREPARING",
            OrderStatus::ReadyForShipping => "READY_FOR_SHIPPING",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        };
        f.write_str(s)
    }
}

impl FromStr for OrderStatus {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AWAITING_PAYMENT" => Ok(OrderStatus::AwaitingPayment),
            "PREPARING" => Ok(OrderStatus::Preparing),
            "READY_FOR_SHIPPING" => Ok(OrderStatus::ReadyForShipping),
            "SHIPPED" => Ok(OrderStatus::Shipped),
            "DELIVERED" => Ok(OrderStatus::Delivered),
            "CANCELLED" => Ok(OrderStatus::Cancelled),
            other => Err(OrderError::UnknownStatus(other.to_string())),
        }
    }
}

/// Customer contact details, denormalized onto the order at creation time so
/// the order stays stable even if a linked account later changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub email: Option<String>,
    pub reference: Option<String>,
}

impl CustomerInfo {
    pub fn validate(&self) -> Result<(), OrderError> {
        if self.name.trim().is_empty() {
            return Err(OrderError::MissingCustomerField("name"));
        }
        if self.phone.trim().is_empty() {
            return Err(OrderError::MissingCustomerField("phone"));
        }
        if self.address.trim().is_empty() {
            return Err(OrderError::MissingCustomerField("address"));
        }
        Ok(())
    }
}

/// Snapshot of the presentation used to price a line, kept on the line so
/// later catalog edits don't rewrite history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresentationSnapshot {
    pub name: String,
    pub unit: String,
}

/// One priced line of an order. Immutable once created; owned by its order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: String,
    pub product_id: Uuid,
    pub presentation_id: Option<Uuid>,
    pub product_name: String,
    pub presentation: Option<PresentationSnapshot>,
    pub unit_price: Decimal,
    /// Supports fractional units, e.g. 1.5 kg.
    pub quantity: Decimal,
    pub line_total: Decimal,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Unit Tests
// ============================================================================
