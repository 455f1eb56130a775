use serde::{Deserialize, Serialize};

use shoploom_core::CategoryId;

use crate::Product;

/// Conjunctive product-list filter (the query-parameter surface of the
/// product list endpoint). Unset fields match everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductFilter {
    pub category_id: Option<CategoryId>,
    pub min_price_cents: Option<i64>,
    pub max_price_cents: Option<i64>,
    /// `Some(true)` keeps only products with stock, `Some(false)` only
    /// products without.
    pub in_stock: Option<bool>,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(category_id) = self.category_id {
            if product.category_id() != Some(category_id) {
                return false;
            }
        }
        if let Some(min) = self.min_price_cents {
            if product.price_cents() < min {
                return false;
            }
        }
        if let Some(max) = self.max_price_cents {
            if product.price_cents() > max {
                return false;
            }
        }
        if let Some(in_stock) = self.in_stock {
            if in_stock == product.is_out_of_stock() {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NewProduct;
    use chrono::Utc;
    use shoploom_core::{ProductId, TenantId};

    fn product(price_cents: i64, category_id: Option<CategoryId>, quantity: i64) -> Product {
        let mut p = Product::create(
            ProductId::new(),
            TenantId::new(),
            NewProduct {
                name: "Shirt".to_string(),
                description: String::new(),
                category_id,
                price_cents,
                low_stock_threshold: None,
                sku: String::new(),
            },
            Utc::now(),
        )
        .unwrap();
        p.apply_stock(quantity, Utc::now());
        p
    }

    #[test]
    fn default_filter_matches_everything() {
        assert!(ProductFilter::default().matches(&product(100, None, 0)));
    }

    #[test]
    fn price_range_is_inclusive() {
        let filter = ProductFilter {
            min_price_cents: Some(100),
            max_price_cents: Some(200),
            ..ProductFilter::default()
        };
        assert!(filter.matches(&product(100, None, 1)));
        assert!(filter.matches(&product(200, None, 1)));
        assert!(!filter.matches(&product(99, None, 1)));
        assert!(!filter.matches(&product(201, None, 1)));
    }

    #[test]
    fn category_filter_requires_exact_match() {
        let category = CategoryId::new();
        let filter = ProductFilter {
            category_id: Some(category),
            ..ProductFilter::default()
        };
        assert!(filter.matches(&product(100, Some(category), 1)));
        assert!(!filter.matches(&product(100, None, 1)));
        assert!(!filter.matches(&product(100, Some(CategoryId::new()), 1)));
    }

    #[test]
    fn in_stock_filter_splits_on_zero_quantity() {
        let in_stock = ProductFilter {
            in_stock: Some(true),
            ..ProductFilter::default()
        };
        let out_of_stock = ProductFilter {
            in_stock: Some(false),
            ..ProductFilter::default()
        };

        assert!(in_stock.matches(&product(100, None, 3)));
        assert!(!in_stock.matches(&product(100, None, 0)));
        assert!(out_of_stock.matches(&product(100, None, 0)));
        assert!(!out_of_stock.matches(&product(100, None, 3)));
    }
}
