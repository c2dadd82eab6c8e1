use chrono::Utc;
use std::sync::Arc;

use crate::domain::order::{
    CancelOrder, CreateOrder, Order, OrderCreated, OrderEvent, OrderItem, OrderStatus,
    OrderStatusChanged, OrderStatusHistory, SetOrderStatus,
};
use crate::error::WorkflowError;
use crate::events::{DomainEvent, EventSink};
use crate::pricing::{self, CatalogSnapshot, Quote};
use crate::store::{Gateway, OrderGuard, WriteBatch, WriteOp};
use crate::utils::ids;
use uuid::Uuid;

// ============================================================================
// Order Service
// ============================================================================

pub struct OrderService {
    store: Arc<dyn Gateway>,
    events: Arc<dyn EventSink>,
}

impl OrderService {
    pub fn new(store: Arc<dyn Gateway>, events: Arc<dyn EventSink>) -> Self {
        Self { store, events }
    }

    /// Place a new order: validate input, price the items, and persist the
    /// order, its lines and the initial history row in one batch.
    pub async fn create(&self, cmd: CreateOrder) -> Result<Order, WorkflowError> {
        cmd.customer.validate()?;
        if cmd.items.is_empty() {
            return Err(crate::domain::order::OrderError::EmptyItems.into());
        }

        let catalog = self.snapshot_for(&cmd).await?;
        let quote = pricing::price_items(&catalog, &cmd.items)?;

        let order = Order::create(
            ids::order_id(),
            cmd.customer.clone(),
            cmd.payment_method.clone(),
            cmd.account_id,
            quote.subtotal,
            quote.tax,
            quote.total,
        );
        let items = attach_lines(&order.id, &quote);
        let history = OrderStatusHistory::record(
            &order.id,
            OrderStatus::AwaitingPayment,
            Some("Order created".to_string()),
            &cmd.placed_by,
        );

        let mut batch = WriteBatch::new();
        batch.append(WriteOp::InsertOrder(order.clone()));
        batch.append(WriteOp::InsertOrderItems(items));
        batch.append(WriteOp::InsertHistory(history));
        self.store.execute(batch).await?;

        tracing::info!(
            order_id = %order.id,
            total = %order.total,
            item_count = quote.lines.len(),
            "✅ order created"
        );

        self.events
            .publish(DomainEvent::Order(OrderEvent::Created(OrderCreated {
                order_id: order.id.clone(),
                total: order.total,
                item_count: quote.lines.len(),
                timestamp: Utc::now(),
            })))
            .await;

        Ok(order)
    }

    /// Advance the order one step along the fulfillment chain.
    pub async fn set_status(&self, cmd: SetOrderStatus) -> Result<Order, WorkflowError> {
        let order = self.load(&cmd.order_id).await?;
        order.ensure_can_advance_to(&cmd.status)?;

        let updated = order.with_status(cmd.status.clone());
        let history = OrderStatusHistory::record(
            &order.id,
            cmd.status.clone(),
            cmd.notes,
            &cmd.changed_by,
        );

        let mut batch = WriteBatch::new();
        batch.append(WriteOp::UpdateOrder {
            order: updated.clone(),
            guard: OrderGuard::of(&order),
        });
        batch.append(WriteOp::InsertHistory(history));
        self.store.execute(batch).await?;

        tracing::info!(
            order_id = %order.id,
            from = %order.status,
            to = %updated.status,
            "order status advanced"
        );

        self.publish_status_change(&order, &updated).await;
        Ok(updated)
    }

    /// Cancel the order, recording the reason in the history trail.
    pub async fn cancel(&self, cmd: CancelOrder) -> Result<Order, WorkflowError> {
        let order = self.load(&cmd.order_id).await?;
        order.ensure_cancellable()?;

        let updated = order.with_status(OrderStatus::Cancelled);
        let notes = cmd
            .reason
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| "Order cancelled".to_string());
        let history = OrderStatusHistory::record(
            &order.id,
            OrderStatus::Cancelled,
            Some(notes),
            &cmd.cancelled_by,
        );

        let mut batch = WriteBatch::new();
        batch.append(WriteOp::UpdateOrder {
            order: updated.clone(),
            guard: OrderGuard::of(&order),
        });
        batch.append(WriteOp::InsertHistory(history));
        self.store.execute(batch).await?;

        tracing::info!(order_id = %order.id, from = %order.status, "order cancelled");

        self.publish_status_change(&order, &updated).await;
        Ok(updated)
    }

    /// Audit trail for an order, newest first.
    pub async fn history(
        &self,
        order_id: &str,
    ) -> Result<Vec<OrderStatusHistory>, WorkflowError> {
        self.load(order_id).await?;
        Ok(self.store.order_history(order_id).await?)
    }

    async fn load(&self, order_id: &str) -> Result<Order, WorkflowError> {
        self.store
            .order(order_id)
            .await?
            .ok_or_else(|| WorkflowError::OrderNotFound(order_id.to_string()))
    }

    /// Fetch the catalog rows the pricing run will consult. Missing rows are
    /// simply absent from the snapshot; pricing reports them precisely.
    async fn snapshot_for(&self, cmd: &CreateOrder) -> Result<CatalogSnapshot, WorkflowError> {
        let mut catalog = CatalogSnapshot::new();
        for selection in &cmd.items {
            if let Some(product) = self.store.product(selection.product_id).await? {
                catalog.add_product(product);
            }
            if let Some(presentation_id) = selection.presentation_id {
                if let Some(presentation) = self.store.presentation(presentation_id).await? {
                    catalog.add_presentation(presentation);
                }
            }
        }
        Ok(catalog)
    }

    async fn publish_status_change(&self, before: &Order, after: &Order) {
        self.events
            .publish(DomainEvent::Order(OrderEvent::StatusChanged(
                OrderStatusChanged {
                    order_id: after.id.clone(),
                    from: before.status.clone(),
                    to: after.status.clone(),
                    timestamp: Utc::now(),
                },
            )))
            .await;
    }
}

fn attach_lines(order_id: &str, quote: &Quote) -> Vec<OrderItem> {
    quote
        .lines
        .iter()
        .map(|line| OrderItem {
            id: Uuid::new_v4(),
            order_id: order_id.to_string(),
            product_id: line.product_id,
            presentation_id: line.presentation_id,
            product_name: line.product_name.clone(),
            presentation: line.presentation.clone(),
            unit_price: line.unit_price,
            quantity: line.quantity,
            line_total: line.line_total,
            created_at: Utc::now(),
        })
        .collect()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::Product;
    use crate::domain::order::CustomerInfo;
    use crate::domain::payment::PaymentMethod;
    use crate::error::ErrorKind;
    use crate::events::NullSink;
    use crate::pricing::ItemSelection;
    use crate::store::InMemoryStore;

    async fn service_with_catalog() -> (OrderService, Arc<InMemoryStore>, Product, Product) {
        let store = Arc::new(InMemoryStore::new());
        let apples = Product {
            id: Uuid::new_v4(),
            name: "Apples".to_string(),
            price: "2.50".parse().unwrap(),
            unit: "kg".to_string(),
            active: true,
            category_id: None,
        };
        let discontinued = Product {
            id: Uuid::new_v4(),
            name: "Old stock".to_string(),
            price: "9.99".parse().unwrap(),
            unit: "unit".to_string(),
            active: false,
            category_id: None,
        };
        store.seed_product(apples.clone()).await;
        store.seed_product(discontinued.clone()).await;

        let service = OrderService::new(store.clone(), Arc::new(NullSink));
        (service, store, apples, discontinued)
    }

    fn customer() -> CustomerInfo {
        CustomerInfo {
            name: "Ana Torres".to_string(),
            phone: "987654321".to_string(),
            address: "Av. Los Olivos 123".to_string(),
            email: None,
            reference: None,
        }
    }

    fn create_cmd(product: &Product, quantity: &str) -> CreateOrder {
        CreateOrder {
            customer: customer(),
            payment_method: PaymentMethod::Yape,
            items: vec![ItemSelection {
                product_id: product.id,
                presentation_id: None,
                quantity: quantity.parse().unwrap(),
            }],
            account_id: None,
            placed_by: "admin".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_persists_order_items_and_history() {
        let (service, store, apples, _) = service_with_catalog().await;

        let order = service.create(create_cmd(&apples, "2")).await.unwrap();

        assert!(order.id.starts_with("ORD-"));
        assert_eq!(order.subtotal, "5.00".parse().unwrap());
        assert_eq!(order.tax, "0.90".parse().unwrap());
        assert_eq!(order.total, "5.90".parse().unwrap());

        let items = store.order_items(&order.id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_name, "Apples");

        let history = store.order_history(&order.id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].status, OrderStatus::AwaitingPayment);
        assert_eq!(history[0].notes.as_deref(), Some("Order created"));
        assert_eq!(history[0].changed_by, "admin");
    }

    #[tokio::test]
    async fn test_create_with_inactive_product_persists_nothing() {
        let (service, store, _, discontinued) = service_with_catalog().await;

        let err = service
            .create(create_cmd(&discontinued, "1"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        // All-or-nothing: no order rows at all.
        let history = store.order_history("ORD-missing").await.unwrap();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_create_requires_customer_and_items() {
        let (service, _, apples, _) = service_with_catalog().await;

        let mut cmd = create_cmd(&apples, "1");
        cmd.customer.address = String::new();
        let err = service.create(cmd).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let mut cmd = create_cmd(&apples, "1");
        cmd.items.clear();
        let err = service.create(cmd).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn test_set_status_rejects_jump_and_unknown_order() {
        let (service, _, apples, _) = service_with_catalog().await;
        let order = service.create(create_cmd(&apples, "1")).await.unwrap();

        // AwaitingPayment → Shipped is a jump.
        let err = service
            .set_status(SetOrderStatus {
                order_id: order.id.clone(),
                status: OrderStatus::Shipped,
                notes: None,
                changed_by: "admin".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);

        let err = service
            .set_status(SetOrderStatus {
                order_id: "ORD-000000000000".to_string(),
                status: OrderStatus::Preparing,
                notes: None,
                changed_by: "admin".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_cancel_appends_exactly_one_history_row() {
        let (service, store, apples, _) = service_with_catalog().await;
        let order = service.create(create_cmd(&apples, "1")).await.unwrap();

        let cancelled = service
            .cancel(CancelOrder {
                order_id: order.id.clone(),
                reason: Some("Customer asked to".to_string()),
                cancelled_by: "admin".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);

        let history = store.order_history(&order.id).await.unwrap();
        assert_eq!(history.len(), 2); // creation + cancellation
        assert_eq!(history[0].status, OrderStatus::Cancelled);
        assert_eq!(history[0].notes.as_deref(), Some("Customer asked to"));

        // Second cancel is a conflict and appends nothing.
        let err = service
            .cancel(CancelOrder {
                order_id: order.id.clone(),
                reason: None,
                cancelled_by: "admin".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(store.order_history(&order.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_cancel_reason_defaults() {
        let (service, store, apples, _) = service_with_catalog().await;
        let order = service.create(create_cmd(&apples, "1")).await.unwrap();

        service
            .cancel(CancelOrder {
                order_id: order.id.clone(),
                reason: Some("  ".to_string()),
                cancelled_by: "admin".to_string(),
            })
            .await
            .unwrap();

        let history = store.order_history(&order.id).await.unwrap();
        assert_eq!(history[0].notes.as_deref(), Some("Order cancelled"));
    }
}
