use async_trait::async_trait;
use serde::Serialize;

use crate::domain::order::OrderEvent;
use crate::domain::payment::PaymentEvent;

// ============================================================================
// Domain Event Fan-Out
// ============================================================================
//
// The workflow publishes one event per committed operation so external
// collaborators (notifications, cache invalidation) can react. Publishing
// happens after the owning write commits and can never fail the workflow.
//
// ============================================================================

/// Union of everything the workflow publishes.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "aggregate", content = "event")]
pub enum DomainEvent {
    Order(OrderEvent),
    Payment(PaymentEvent),
}

/// Consumer hook for domain events.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn publish(&self, event: DomainEvent);
}

/// Sink that logs every event as structured JSON.
#[derive(Debug, Default)]
pub struct LogSink;

#[async_trait]
impl EventSink for LogSink {
    async fn publish(&self, event: DomainEvent) {
        match serde_json::to_string(&event) {
            Ok(payload) => tracing::info!(event = %payload, "domain event published"),
            Err(e) => tracing::warn!(error = %e, "failed to serialize domain event"),
        }
    }
}

/// Sink that drops everything. Useful in tests.
#[derive(Debug, Default)]
pub struct NullSink;

#[async_trait]
impl EventSink for NullSink {
    async fn publish(&self, _event: DomainEvent) {}
}
