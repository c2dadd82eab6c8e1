use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::catalog::{Category, Presentation, Product};
use crate::domain::order::{Order, OrderItem, OrderStatusHistory};
use crate::domain::payment::Payment;

use super::gateway::{Gateway, StoreError, WriteBatch, WriteOp};

// ============================================================================
// In-Memory Store
// ============================================================================
//
// Backs tests and the demo binary. All tables live under one RwLock, so a
// batch executes under a single write guard: guards and uniqueness are
// validated against current state first, and rows are touched only after
// every operation has passed. That gives the same all-or-nothing and
// compare-and-swap semantics a transactional database would.
//
// ============================================================================

#[derive(Debug, Default)]
struct Tables {
    orders: HashMap<String, Order>,
    order_items: HashMap<String, Vec<OrderItem>>,
    history: HashMap<String, Vec<OrderStatusHistory>>,
    payments: HashMap<String, Payment>,
    /// Unique index: order id -> payment id.
    payment_by_order: HashMap<String, String>,
    products: HashMap<Uuid, Product>,
    presentations: HashMap<Uuid, Presentation>,
    categories: HashMap<Uuid, Category>,
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Catalog seeding (reference data is read-only from the workflow's
    // perspective, so these live on the concrete store, not the trait).

    pub async fn seed_category(&self, category: Category) {
        self.tables
            .write()
            .await
            .categories
            .insert(category.id, category);
    }

    pub async fn seed_product(&self, product: Product) {
        self.tables.write().await.products.insert(product.id, product);
    }

    pub async fn seed_presentation(&self, presentation: Presentation) {
        self.tables
            .write()
            .await
            .presentations
            .insert(presentation.id, presentation);
    }

    /// Validate one op against current state. Nothing is mutated here.
    fn check(tables: &Tables, op: &WriteOp) -> Result<(), StoreError> {
        match op {
            WriteOp::InsertOrder(order) => {
                if tables.orders.contains_key(&order.id) {
                    return Err(StoreError::Duplicate {
                        entity: "order",
                        id: order.id.clone(),
                    });
                }
            }
            WriteOp::InsertOrderItems(_) | WriteOp::InsertHistory(_) => {}
            WriteOp::InsertPayment(payment) => {
                if tables.payments.contains_key(&payment.id) {
                    return Err(StoreError::Duplicate {
                        entity: "payment",
                        id: payment.id.clone(),
                    });
                }
                if let Some(existing) = tables.payment_by_order.get(&payment.order_id) {
                    return Err(StoreError::PaymentExists {
                        order_id: payment.order_id.clone(),
                        payment_id: existing.clone(),
                    });
                }
            }
            WriteOp::UpdateOrder { order, guard } => {
                let current = tables.orders.get(&order.id).ok_or(StoreError::NotFound {
                    entity: "order",
                    id: order.id.clone(),
                })?;
                if current.status != guard.status
                    || current.payment_status != guard.payment_status
                {
                    return Err(StoreError::Conflict {
                        entity: "order",
                        id: order.id.clone(),
                        expected: format!("{}/{}", guard.status, guard.payment_status),
                    });
                }
            }
            WriteOp::UpdatePayment {
                payment,
                expect_status,
            } => {
                let current =
                    tables
                        .payments
                        .get(&payment.id)
                        .ok_or(StoreError::NotFound {
                            entity: "payment",
                            id: payment.id.clone(),
                        })?;
                if current.status != *expect_status {
                    return Err(StoreError::Conflict {
                        entity: "payment",
                        id: payment.id.clone(),
                        expected: expect_status.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    fn apply(tables: &mut Tables, op: WriteOp) {
        match op {
            WriteOp::InsertOrder(order) => {
                tables.orders.insert(order.id.clone(), order);
            }
            WriteOp::InsertOrderItems(items) => {
                for item in items {
                    tables
                        .order_items
                        .entry(item.order_id.clone())
                        .or_default()
                        .push(item);
                }
            }
            WriteOp::InsertHistory(entry) => {
                tables
                    .history
                    .entry(entry.order_id.clone())
                    .or_default()
                    .push(entry);
            }
            WriteOp::InsertPayment(payment) => {
                tables
                    .payment_by_order
                    .insert(payment.order_id.clone(), payment.id.clone());
                tables.payments.insert(payment.id.clone(), payment);
            }
            WriteOp::UpdateOrder { order, .. } => {
                tables.orders.insert(order.id.clone(), order);
            }
            WriteOp::UpdatePayment { payment, .. } => {
                tables.payments.insert(payment.id.clone(), payment);
            }
        }
    }
}

#[async_trait]
impl Gateway for InMemoryStore {
    async fn order(&self, id: &str) -> Result<Option<Order>, StoreError> {
        Ok(self.tables.read().await.orders.get(id).cloned())
    }

    async fn order_items(&self, order_id: &str) -> Result<Vec<OrderItem>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .order_items
            .get(order_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn order_history(
        &self,
        order_id: &str,
    ) -> Result<Vec<OrderStatusHistory>, StoreError> {
        let mut rows = self
            .tables
            .read()
            .await
            .history
            .get(order_id)
            .cloned()
            .unwrap_or_default();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn payment(&self, id: &str) -> Result<Option<Payment>, StoreError> {
        Ok(self.tables.read().await.payments.get(id).cloned())
    }

    async fn payment_for_order(&self, order_id: &str) -> Result<Option<Payment>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .payment_by_order
            .get(order_id)
            .and_then(|payment_id| tables.payments.get(payment_id))
            .cloned())
    }

    async fn product(&self, id: Uuid) -> Result<Option<Product>, StoreError> {
        Ok(self.tables.read().await.products.get(&id).cloned())
    }

    async fn presentation(&self, id: Uuid) -> Result<Option<Presentation>, StoreError> {
        Ok(self.tables.read().await.presentations.get(&id).cloned())
    }

    async fn execute(&self, batch: WriteBatch) -> Result<(), StoreError> {
        let ops = batch.into_ops();
        let mut tables = self.tables.write().await;

        // Two phases under one guard: fail before anything lands.
        for op in &ops {
            Self::check(&tables, op)?;
        }
        for op in ops {
            Self::apply(&mut tables, op);
        }
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{CustomerInfo, OrderStatus, OrderStatusHistory};
    use crate::domain::payment::{PaymentMethod, PaymentStatus};
    use crate::store::gateway::OrderGuard;
    use rust_decimal::Decimal;

    fn order(id: &str) -> Order {
        Order::create(
            id.to_string(),
            CustomerInfo {
                name: "Rosa Diaz".to_string(),
                phone: "955555555".to_string(),
                address: "Calle Sol 88".to_string(),
                email: None,
                reference: None,
            },
            PaymentMethod::Cash,
            None,
            "10.00".parse().unwrap(),
            "1.80".parse().unwrap(),
            "11.80".parse().unwrap(),
        )
    }

    #[tokio::test]
    async fn test_batch_is_all_or_nothing() {
        let store = InMemoryStore::new();
        let existing = order("ORD-000000000001");

        let mut seed = WriteBatch::new();
        seed.append(WriteOp::InsertOrder(existing.clone()));
        store.execute(seed).await.unwrap();

        // Second batch: a fresh history row plus a duplicate order insert.
        // The duplicate must sink the history row with it.
        let mut batch = WriteBatch::new();
        batch.append(WriteOp::InsertHistory(OrderStatusHistory::record(
            &existing.id,
            OrderStatus::AwaitingPayment,
            None,
            "admin",
        )));
        batch.append(WriteOp::InsertOrder(existing.clone()));

        let err = store.execute(batch).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { .. }));
        assert!(store.order_history(&existing.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_order_guard_detects_concurrent_change() {
        let store = InMemoryStore::new();
        let created = order("ORD-000000000002");

        let mut seed = WriteBatch::new();
        seed.append(WriteOp::InsertOrder(created.clone()));
        store.execute(seed).await.unwrap();

        // Both callers read the same row.
        let stale_guard = OrderGuard::of(&created);

        let mut first = WriteBatch::new();
        first.append(WriteOp::UpdateOrder {
            order: created.with_payment_status(PaymentStatus::Verified),
            guard: stale_guard.clone(),
        });
        store.execute(first).await.unwrap();

        // The second write still carries the stale guard and must fail.
        let mut second = WriteBatch::new();
        second.append(WriteOp::UpdateOrder {
            order: created.with_payment_status(PaymentStatus::Rejected),
            guard: stale_guard,
        });
        let err = store.execute(second).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));

        let stored = store.order(&created.id).await.unwrap().unwrap();
        assert_eq!(stored.payment_status, PaymentStatus::Verified);
    }

    #[tokio::test]
    async fn test_one_payment_per_order() {
        let store = InMemoryStore::new();
        let created = order("ORD-000000000003");

        let mut seed = WriteBatch::new();
        seed.append(WriteOp::InsertOrder(created.clone()));
        store.execute(seed).await.unwrap();

        let first = Payment::new(
            "PAY-000000000001".to_string(),
            &created,
            PaymentMethod::Yape,
            None,
            None,
        )
        .unwrap();
        let second = Payment::new(
            "PAY-000000000002".to_string(),
            &created,
            PaymentMethod::Cash,
            None,
            None,
        )
        .unwrap();

        let mut batch = WriteBatch::new();
        batch.append(WriteOp::InsertPayment(first.clone()));
        store.execute(batch).await.unwrap();

        let mut batch = WriteBatch::new();
        batch.append(WriteOp::InsertPayment(second));
        let err = store.execute(batch).await.unwrap_err();
        assert!(matches!(err, StoreError::PaymentExists { .. }));

        let found = store.payment_for_order(&created.id).await.unwrap().unwrap();
        assert_eq!(found.id, first.id);
    }

    #[tokio::test]
    async fn test_history_is_returned_newest_first() {
        let store = InMemoryStore::new();
        let created = order("ORD-000000000004");

        let mut batch = WriteBatch::new();
        batch.append(WriteOp::InsertOrder(created.clone()));
        batch.append(WriteOp::InsertHistory(OrderStatusHistory::record(
            &created.id,
            OrderStatus::AwaitingPayment,
            Some("Order created".to_string()),
            "admin",
        )));
        store.execute(batch).await.unwrap();

        let mut batch = WriteBatch::new();
        batch.append(WriteOp::InsertHistory(OrderStatusHistory::record(
            &created.id,
            OrderStatus::Preparing,
            None,
            "admin",
        )));
        store.execute(batch).await.unwrap();

        let rows = store.order_history(&created.id).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].created_at >= rows[1].created_at);
        assert_eq!(rows[0].status, OrderStatus::Preparing);
    }

    #[tokio::test]
    async fn test_catalog_seeding_and_lookup() {
        let store = InMemoryStore::new();
        let product = Product {
            id: Uuid::new_v4(),
            name: "Apples".to_string(),
            price: Decimal::new(250, 2),
            unit: "kg".to_string(),
            active: true,
            category_id: None,
        };
        store.seed_product(product.clone()).await;

        let found = store.product(product.id).await.unwrap().unwrap();
        assert_eq!(found.name, "Apples");
        assert!(store.product(Uuid::new_v4()).await.unwrap().is_none());
    }
}
