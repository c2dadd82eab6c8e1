use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Catalog Reference Data
// ============================================================================
//
// Products, presentations and categories are read-only from the order
// workflow's perspective. They are plain attribute bags; the workflow only
// looks at prices, units and the product's active flag.
//
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    /// Base unit price, in the store currency.
    pub price: Decimal,
    /// Selling unit for the base price, e.g. "kg" or "unit".
    pub unit: String,
    pub active: bool,
    pub category_id: Option<Uuid>,
}

/// An alternate sellable packaging of a product (e.g. a "5kg bag") with its
/// own price and unit, sorted for display under the product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Presentation {
    pub id: Uuid,
    pub product_id: Uuid,
    pub name: String,
    pub unit: String,
    pub price: Decimal,
    pub sort_order: i32,
}
