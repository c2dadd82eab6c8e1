use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

use orderflow::domain::catalog::{Presentation, Product};
use orderflow::domain::order::{CreateOrder, CustomerInfo, OrderStatus, SetOrderStatus};
use orderflow::domain::payment::{
    ConfirmPayment, CreatePayment, PaymentMethod, VerificationDecision, VerifyPayment,
};
use orderflow::events::LogSink;
use orderflow::pricing::ItemSelection;
use orderflow::store::InMemoryStore;
use orderflow::workflow::{OrderService, PaymentService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging with environment-based filtering
    // Default to INFO level, can be overridden with RUST_LOG env var
    // Example: RUST_LOG=debug cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,orderflow=debug")),
        )
        .init();

    tracing::info!("🚀 Starting order workflow demo");

    // === 1. Seed a small catalog ===
    let store = Arc::new(InMemoryStore::new());

    let apples = Product {
        id: Uuid::new_v4(),
        name: "Apples".to_string(),
        price: "2.50".parse()?,
        unit: "kg".to_string(),
        active: true,
        category_id: None,
    };
    let milk = Product {
        id: Uuid::new_v4(),
        name: "Milk".to_string(),
        price: "3.80".parse()?,
        unit: "L".to_string(),
        active: true,
        category_id: None,
    };
    let apple_bag = Presentation {
        id: Uuid::new_v4(),
        product_id: apples.id,
        name: "5kg bag".to_string(),
        unit: "bag".to_string(),
        price: "11.00".parse()?,
        sort_order: 1,
    };
    store.seed_product(apples.clone()).await;
    store.seed_product(milk.clone()).await;
    store.seed_presentation(apple_bag).await;

    // === 2. Wire the services ===
    let events = Arc::new(LogSink);
    let orders = OrderService::new(store.clone(), events.clone());
    let payments = PaymentService::new(store.clone(), events);

    // === 3. Place an order ===
    let order = orders
        .create(CreateOrder {
            customer: CustomerInfo {
                name: "Ana Torres".to_string(),
                phone: "987654321".to_string(),
                address: "Av. Los Olivos 123, Lima".to_string(),
                email: Some("ana@example.com".to_string()),
                reference: Some("Blue door, second floor".to_string()),
            },
            payment_method: PaymentMethod::Yape,
            items: vec![
                ItemSelection {
                    product_id: apples.id,
                    presentation_id: None,
                    quantity: "2".parse()?,
                },
                ItemSelection {
                    product_id: milk.id,
                    presentation_id: None,
                    quantity: "1".parse()?,
                },
            ],
            account_id: None,
            placed_by: "demo".to_string(),
        })
        .await?;

    tracing::info!(
        order_id = %order.id,
        subtotal = %order.subtotal,
        tax = %order.tax,
        total = %order.total,
        "order placed"
    );

    // === 4. Register and verify the payment ===
    let payment = payments
        .create(CreatePayment {
            order_id: order.id.clone(),
            method: PaymentMethod::Yape,
            reference_number: Some("YPE-88217745".to_string()),
            amount: None, // claim the order total
        })
        .await?;

    payments
        .verify(VerifyPayment {
            payment_id: payment.id.clone(),
            decision: VerificationDecision::Verified,
            notes: Some("Voucher matches".to_string()),
            rejection_reason: None,
            verified_by: "reviewer".to_string(),
        })
        .await?;

    // === 5. Confirm: fulfillment starts here, not at verification ===
    payments
        .confirm(ConfirmPayment {
            payment_id: payment.id.clone(),
            notes: None,
            confirmed_by: "reviewer".to_string(),
        })
        .await?;

    // === 6. Walk the fulfillment chain ===
    for status in [
        OrderStatus::ReadyForShipping,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
    ] {
        orders
            .set_status(SetOrderStatus {
                order_id: order.id.clone(),
                status,
                notes: None,
                changed_by: "demo".to_string(),
            })
            .await?;
    }

    // === 7. Show the audit trail ===
    for entry in orders.history(&order.id).await? {
        tracing::info!(
            status = %entry.status,
            notes = ?entry.notes,
            changed_by = %entry.changed_by,
            at = %entry.created_at,
            "history"
        );
    }

    tracing::info!("🎉 Demo complete!");

    Ok(())
}
