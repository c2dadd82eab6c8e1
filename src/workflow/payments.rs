use chrono::Utc;
use std::sync::Arc;

use crate::domain::order::{Order, OrderEvent, OrderStatus, OrderStatusChanged, OrderStatusHistory};
use crate::domain::payment::{
    ConfirmPayment, CreatePayment, Payment, PaymentError, PaymentEvent, PaymentRejected,
    PaymentStatus, PaymentVerified, VerificationDecision, VerifyPayment,
};
use crate::error::WorkflowError;
use crate::events::{DomainEvent, EventSink};
use crate::store::{Gateway, OrderGuard, WriteBatch, WriteOp};
use crate::utils::ids;

// ============================================================================
// Payment Service
// ============================================================================
//
// Drives the PENDING → {VERIFIED, REJECTED} machine and mirrors the decision
// onto the order. Verification alone never starts fulfillment; the separate
// confirm step is the only path from AwaitingPayment to Preparing, so a
// reviewer can attest a proof without committing prep resources.
//
// ============================================================================

pub struct PaymentService {
    store: Arc<dyn Gateway>,
    events: Arc<dyn EventSink>,
}

impl PaymentService {
    pub fn new(store: Arc<dyn Gateway>, events: Arc<dyn EventSink>) -> Self {
        Self { store, events }
    }

    /// Register a claimed payment for an order. One payment per order; the
    /// claimed amount must match the order total within tolerance.
    pub async fn create(&self, cmd: CreatePayment) -> Result<Payment, WorkflowError> {
        let order = self.load_order(&cmd.order_id).await?;

        if self.store.payment_for_order(&order.id).await?.is_some() {
            return Err(PaymentError::AlreadyExists.into());
        }

        let payment = Payment::new(
            ids::payment_id(),
            &order,
            cmd.method,
            cmd.reference_number,
            cmd.amount,
        )?;

        let mut batch = WriteBatch::new();
        batch.append(WriteOp::InsertPayment(payment.clone()));
        self.store.execute(batch).await?;

        tracing::info!(
            payment_id = %payment.id,
            order_id = %order.id,
            amount = %payment.amount,
            method = %payment.method,
            "payment registered"
        );

        Ok(payment)
    }

    /// Record the reviewer's decision. Exactly once per payment: the batch
    /// carries a compare-and-swap on PENDING, so a concurrent second call
    /// fails even if it read the payment before this one committed.
    pub async fn verify(&self, cmd: VerifyPayment) -> Result<Payment, WorkflowError> {
        let payment = self.load_payment(&cmd.payment_id).await?;
        payment.ensure_pending()?;
        let order = self.load_order(&payment.order_id).await?;

        let mut batch = WriteBatch::new();
        let updated = match cmd.decision {
            VerificationDecision::Verified => {
                let updated = payment.verified(&cmd.verified_by, cmd.notes)?;

                // Verification does not advance order.status; fulfillment
                // waits for the confirm step.
                batch.append(WriteOp::UpdatePayment {
                    payment: updated.clone(),
                    expect_status: PaymentStatus::Pending,
                });
                batch.append(WriteOp::UpdateOrder {
                    order: order.with_payment_status(PaymentStatus::Verified),
                    guard: OrderGuard::of(&order),
                });
                batch.append(WriteOp::InsertHistory(OrderStatusHistory::record(
                    &order.id,
                    order.status.clone(),
                    Some("Payment verified, awaiting confirmation".to_string()),
                    &cmd.verified_by,
                )));
                updated
            }
            VerificationDecision::Rejected => {
                let updated =
                    payment.rejected(&cmd.verified_by, cmd.rejection_reason, cmd.notes)?;

                // Rejection records everything on the payment row itself; the
                // order only mirrors payment_status.
                batch.append(WriteOp::UpdatePayment {
                    payment: updated.clone(),
                    expect_status: PaymentStatus::Pending,
                });
                batch.append(WriteOp::UpdateOrder {
                    order: order.with_payment_status(PaymentStatus::Rejected),
                    guard: OrderGuard::of(&order),
                });
                updated
            }
        };
        self.store.execute(batch).await?;

        tracing::info!(
            payment_id = %updated.id,
            order_id = %order.id,
            status = %updated.status,
            "✅ payment decision recorded"
        );

        let event = match updated.status {
            PaymentStatus::Verified => DomainEvent::Payment(PaymentEvent::Verified(
                PaymentVerified {
                    payment_id: updated.id.clone(),
                    order_id: order.id.clone(),
                    amount: updated.amount,
                    verified_by: cmd.verified_by.clone(),
                    timestamp: Utc::now(),
                },
            )),
            _ => DomainEvent::Payment(PaymentEvent::Rejected(PaymentRejected {
                payment_id: updated.id.clone(),
                order_id: order.id.clone(),
                reason: updated.rejection_reason.clone().unwrap_or_default(),
                verified_by: cmd.verified_by.clone(),
                timestamp: Utc::now(),
            })),
        };
        self.events.publish(event).await;

        Ok(updated)
    }

    /// Authorize fulfillment: the only transition out of AwaitingPayment.
    /// Requires a verified payment and an order still awaiting payment.
    pub async fn confirm(&self, cmd: ConfirmPayment) -> Result<Order, WorkflowError> {
        let payment = self.load_payment(&cmd.payment_id).await?;
        payment.ensure_verified()?;
        let order = self.load_order(&payment.order_id).await?;
        order.ensure_awaiting_payment()?;

        let updated = order.with_status(OrderStatus::Preparing);
        let notes = cmd
            .notes
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| "Payment confirmed, preparation started".to_string());

        let mut batch = WriteBatch::new();
        batch.append(WriteOp::UpdateOrder {
            order: updated.clone(),
            guard: OrderGuard::of(&order),
        });
        batch.append(WriteOp::InsertHistory(OrderStatusHistory::record(
            &order.id,
            OrderStatus::Preparing,
            Some(notes),
            &cmd.confirmed_by,
        )));
        self.store.execute(batch).await?;

        tracing::info!(
            payment_id = %payment.id,
            order_id = %order.id,
            "✅ payment confirmed, fulfillment started"
        );

        self.events
            .publish(DomainEvent::Order(OrderEvent::StatusChanged(
                OrderStatusChanged {
                    order_id: updated.id.clone(),
                    from: OrderStatus::AwaitingPayment,
                    to: OrderStatus::Preparing,
                    timestamp: Utc::now(),
                },
            )))
            .await;

        Ok(updated)
    }

    async fn load_order(&self, order_id: &str) -> Result<Order, WorkflowError> {
        self.store
            .order(order_id)
            .await?
            .ok_or_else(|| WorkflowError::OrderNotFound(order_id.to_string()))
    }

    async fn load_payment(&self, payment_id: &str) -> Result<Payment, WorkflowError> {
        self.store
            .payment(payment_id)
            .await?
            .ok_or_else(|| WorkflowError::PaymentNotFound(payment_id.to_string()))
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
