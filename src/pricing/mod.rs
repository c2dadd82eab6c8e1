use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::catalog::{Presentation, Product};
use crate::domain::order::PresentationSnapshot;

// ============================================================================
// Pricing Engine
// ============================================================================
//
// Pure pricing over a catalog snapshot: resolve the unit price (product base
// price, or the presentation's price when one is selected), validate the
// product's active flag and the quantity, and accumulate line totals into
// subtotal / tax / total. No side effects; the caller fetches the snapshot.
//
// ============================================================================

/// Tax applied to the order subtotal.
pub fn tax_rate() -> Decimal {
    Decimal::new(18, 2) // 0.18
}

/// Round to 2-dp money, away from zero on midpoints.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// One requested line: a product, an optional presentation of that product,
/// and a quantity (fractional quantities are allowed, e.g. 1.5 kg).
#[derive(Debug, Clone)]
pub struct ItemSelection {
    pub product_id: Uuid,
    pub presentation_id: Option<Uuid>,
    pub quantity: Decimal,
}

/// The catalog rows a pricing run may consult.
#[derive(Debug, Default)]
pub struct CatalogSnapshot {
    products: HashMap<Uuid, Product>,
    presentations: HashMap<Uuid, Presentation>,
}

impl CatalogSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_product(&mut self, product: Product) {
        self.products.insert(product.id, product);
    }

    pub fn add_presentation(&mut self, presentation: Presentation) {
        self.presentations.insert(presentation.id, presentation);
    }

    pub fn product(&self, id: &Uuid) -> Option<&Product> {
        self.products.get(id)
    }

    pub fn presentation(&self, id: &Uuid) -> Option<&Presentation> {
        self.presentations.get(id)
    }
}

/// A priced line, not yet attached to an order.
#[derive(Debug, Clone)]
pub struct PricedLine {
    pub product_id: Uuid,
    pub presentation_id: Option<Uuid>,
    pub product_name: String,
    pub presentation: Option<PresentationSnapshot>,
    pub unit_price: Decimal,
    pub quantity: Decimal,
    pub line_total: Decimal,
}

/// Result of pricing a full item list.
#[derive(Debug, Clone)]
pub struct Quote {
    pub lines: Vec<PricedLine>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

#[derive(Debug, thiserror::Error)]
pub enum PricingError {
    #[error("product {0} not found")]
    ProductNotFound(Uuid),

    #[error("product \"{0}\" is not active")]
    ProductInactive(String),

    #[error("presentation {presentation} does not belong to product {product}")]
    PresentationNotFound { product: Uuid, presentation: Uuid },

    #[error("quantity must be positive, got {0}")]
    InvalidQuantity(Decimal),
}

/// Price every selection against the snapshot.
///
/// line_total = round(unit_price * quantity, 2)
/// subtotal   = Σ line totals
/// tax        = round(subtotal * 0.18, 2)
/// total      = subtotal + tax
pub fn price_items(
    catalog: &CatalogSnapshot,
    selections: &[ItemSelection],
) -> Result<Quote, PricingError> {
    let mut lines = Vec::with_capacity(selections.len());
    let mut subtotal = Decimal::ZERO;

    for selection in selections {
        let product = catalog
            .product(&selection.product_id)
            .ok_or(PricingError::ProductNotFound(selection.product_id))?;

        if !product.active {
            return Err(PricingError::ProductInactive(product.name.clone()));
        }

        if selection.quantity <= Decimal::ZERO {
            return Err(PricingError::InvalidQuantity(selection.quantity));
        }

        // Presentation price wins over the product's base price, but only for
        // presentations that actually hang off the resolved product.
        let (unit_price, presentation) = match selection.presentation_id {
            Some(presentation_id) => {
                let presentation = catalog
                    .presentation(&presentation_id)
                    .filter(|p| p.product_id == product.id)
                    .ok_or(PricingError::PresentationNotFound {
                        product: product.id,
                        presentation: presentation_id,
                    })?;
                (
                    presentation.price,
                    Some(PresentationSnapshot {
                        name: presentation.name.clone(),
                        unit: presentation.unit.clone(),
                    }),
                )
            }
            None => (product.price, None),
        };

        let line_total = round_money(unit_price * selection.quantity);
        subtotal += line_total;

        lines.push(PricedLine {
            product_id: product.id,
            presentation_id: selection.presentation_id,
            product_name: product.name.clone(),
            presentation,
            unit_price,
            quantity: selection.quantity,
            line_total,
        });
    }

    let tax = round_money(subtotal * tax_rate());
    let total = subtotal + tax;

    Ok(Quote {
        lines,
        subtotal,
        tax,
        total,
    })
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(name: &str, price: &str, unit: &str, active: bool) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: name.to_string(),
            price: price.parse().unwrap(),
            unit: unit.to_string(),
            active,
            category_id: None,
        }
    }

    fn selection(product: &Product, quantity: &str) -> ItemSelection {
        ItemSelection {
            product_id: product.id,
            presentation_id: None,
            quantity: quantity.parse().unwrap(),
        }
    }

    #[test]
    fn test_worked_example_totals() {
        // 2 kg apples at 2.50 plus 1 L milk at 3.80
        let apples = product("Apples", "2.50", "kg", true);
        let milk = product("Milk", "3.80", "L", true);

        let mut catalog = CatalogSnapshot::new();
        catalog.add_product(apples.clone());
        catalog.add_product(milk.clone());

        let quote = price_items(
            &catalog,
            &[selection(&apples, "2"), selection(&milk, "1")],
        )
        .unwrap();

        assert_eq!(quote.subtotal, "8.80".parse().unwrap());
        assert_eq!(quote.tax, "1.58".parse().unwrap());
        assert_eq!(quote.total, "10.38".parse().unwrap());
        assert_eq!(quote.lines.len(), 2);
    }

    #[test]
    fn test_subtotal_is_sum_of_line_totals() {
        let a = product("A", "1.99", "unit", true);
        let b = product("B", "0.45", "unit", true);
        let c = product("C", "12.10", "kg", true);

        let mut catalog = CatalogSnapshot::new();
        for p in [&a, &b, &c] {
            catalog.add_product((*p).clone());
        }

        let quote = price_items(
            &catalog,
            &[
                selection(&a, "3"),
                selection(&b, "7"),
                selection(&c, "0.5"),
            ],
        )
        .unwrap();

        let summed: Decimal = quote.lines.iter().map(|l| l.line_total).sum();
        assert_eq!(quote.subtotal, summed);
        assert_eq!(quote.total, quote.subtotal + quote.tax);
    }

    #[test]
    fn test_fractional_quantity() {
        let rice = product("Rice", "3.20", "kg", true);
        let mut catalog = CatalogSnapshot::new();
        catalog.add_product(rice.clone());

        let quote = price_items(&catalog, &[selection(&rice, "1.5")]).unwrap();
        assert_eq!(quote.lines[0].line_total, "4.80".parse().unwrap());
    }

    #[test]
    fn test_presentation_price_wins() {
        let apples = product("Apples", "2.50", "kg", true);
        let bag = Presentation {
            id: Uuid::new_v4(),
            product_id: apples.id,
            name: "5kg bag".to_string(),
            unit: "bag".to_string(),
            price: "11.00".parse().unwrap(),
            sort_order: 1,
        };

        let mut catalog = CatalogSnapshot::new();
        catalog.add_product(apples.clone());
        catalog.add_presentation(bag.clone());

        let quote = price_items(
            &catalog,
            &[ItemSelection {
                product_id: apples.id,
                presentation_id: Some(bag.id),
                quantity: "2".parse().unwrap(),
            }],
        )
        .unwrap();

        assert_eq!(quote.lines[0].unit_price, "11.00".parse().unwrap());
        assert_eq!(quote.lines[0].line_total, "22.00".parse().unwrap());
        assert_eq!(
            quote.lines[0].presentation.as_ref().unwrap().name,
            "5kg bag"
        );
    }

    #[test]
    fn test_presentation_of_other_product_is_rejected() {
        let apples = product("Apples", "2.50", "kg", true);
        let milk = product("Milk", "3.80", "L", true);
        let bag = Presentation {
            id: Uuid::new_v4(),
            product_id: milk.id,
            name: "6-pack".to_string(),
            unit: "pack".to_string(),
            price: "21.00".parse().unwrap(),
            sort_order: 1,
        };

        let mut catalog = CatalogSnapshot::new();
        catalog.add_product(apples.clone());
        catalog.add_product(milk);
        catalog.add_presentation(bag.clone());

        let err = price_items(
            &catalog,
            &[ItemSelection {
                product_id: apples.id,
                presentation_id: Some(bag.id),
                quantity: "1".parse().unwrap(),
            }],
        )
        .unwrap_err();

        assert!(matches!(err, PricingError::PresentationNotFound { .. }));
    }

    #[test]
    fn test_missing_product() {
        let catalog = CatalogSnapshot::new();
        let err = price_items(
            &catalog,
            &[ItemSelection {
                product_id: Uuid::new_v4(),
                presentation_id: None,
                quantity: "1".parse().unwrap(),
            }],
        )
        .unwrap_err();

        assert!(matches!(err, PricingError::ProductNotFound(_)));
    }

    #[test]
    fn test_inactive_product() {
        let discontinued = product("Old stock", "9.99", "unit", false);
        let mut catalog = CatalogSnapshot::new();
        catalog.add_product(discontinued.clone());

        let err = price_items(&catalog, &[selection(&discontinued, "1")]).unwrap_err();
        assert!(matches!(err, PricingError::ProductInactive(_)));
    }

    #[test]
    fn test_zero_and_negative_quantities() {
        let apples = product("Apples", "2.50", "kg", true);
        let mut catalog = CatalogSnapshot::new();
        catalog.add_product(apples.clone());

        for qty in ["0", "-1.5"] {
            let err = price_items(&catalog, &[selection(&apples, qty)]).unwrap_err();
            assert!(matches!(err, PricingError::InvalidQuantity(_)));
        }
    }

    #[test]
    fn test_rounding_away_from_zero_on_midpoint() {
        // 0.125 * 1 rounds to 0.13, not 0.12
        let p = product("Penny candy", "0.125", "unit", true);
        let mut catalog = CatalogSnapshot::new();
        catalog.add_product(p.clone());

        let quote = price_items(&catalog, &[selection(&p, "1")]).unwrap();
        assert_eq!(quote.lines[0].line_total, "0.13".parse().unwrap());
    }
}
