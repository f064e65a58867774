//! Derived views over a set of products (filters and stock summaries).
//!
//! Pure functions over already-loaded data; the presentation layer renders
//! what these return and never classifies stock itself.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::product::{Category, Product};
use crate::status::StockStatus;

/// Threshold filter against the advisory `min_stock` / `max_stock` fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockLevel {
    #[default]
    All,
    /// `store_stock <= min_stock`
    Low,
    /// `store_stock >= max_stock`
    High,
}

/// Inventory screen filter. Every unset criterion matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductFilter {
    /// Case-insensitive substring match against name, sku or ean.
    pub search: Option<String>,
    pub category: Option<Category>,
    pub status: Option<StockStatus>,
    #[serde(default)]
    pub level: StockLevel,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        let d = &product.details;

        let matches_search = match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                d.name.to_lowercase().contains(&term)
                    || d.sku.to_lowercase().contains(&term)
                    || d.ean.to_lowercase().contains(&term)
            }
        };

        let matches_category = self.category.is_none_or(|c| c == d.category);
        let matches_status = self.status.is_none_or(|s| s == product.status());
        let matches_level = match self.level {
            StockLevel::All => true,
            StockLevel::Low => d.store_stock <= d.min_stock,
            StockLevel::High => d.store_stock >= d.max_stock,
        };

        matches_search && matches_category && matches_status && matches_level
    }

    pub fn apply<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        products.iter().filter(|p| self.matches(p)).collect()
    }
}

/// Headline stock figures for a set of products.
///
/// Totals saturate instead of overflowing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockSummary {
    pub critical: usize,
    pub warning: usize,
    pub optimal: usize,
    pub total_products: usize,
    pub total_store_stock: i64,
    pub total_warehouse_stock: i64,
    /// Σ `price × store_stock`.
    pub total_value: Decimal,
}

impl StockSummary {
    pub fn of<'a>(products: impl IntoIterator<Item = &'a Product>) -> Self {
        let mut summary = StockSummary::default();
        for p in products {
            match p.status() {
                StockStatus::Critical => summary.critical += 1,
                StockStatus::Warning => summary.warning += 1,
                StockStatus::Optimal => summary.optimal += 1,
            }
            summary.total_products += 1;
            summary.total_store_stock = summary
                .total_store_stock
                .saturating_add(p.details.store_stock);
            summary.total_warehouse_stock = summary
                .total_warehouse_stock
                .saturating_add(p.details.warehouse_stock);
            summary.total_value = summary.total_value.saturating_add(p.floor_value());
        }
        summary
    }
}

/// Status counts for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryBreakdown {
    pub category: Category,
    pub count: usize,
    pub critical: usize,
    pub warning: usize,
    pub optimal: usize,
}

impl CategoryBreakdown {
    /// One entry per category present in `products`, in category order.
    pub fn of<'a>(products: impl IntoIterator<Item = &'a Product>) -> Vec<CategoryBreakdown> {
        let mut by_category: BTreeMap<Category, CategoryBreakdown> = BTreeMap::new();
        for p in products {
            let entry = by_category
                .entry(p.details.category)
                .or_insert_with(|| CategoryBreakdown {
                    category: p.details.category,
                    count: 0,
                    critical: 0,
                    warning: 0,
                    optimal: 0,
                });
            entry.count += 1;
            match p.status() {
                StockStatus::Critical => entry.critical += 1,
                StockStatus::Warning => entry.warning += 1,
                StockStatus::Optimal => entry.optimal += 1,
            }
        }
        by_category.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::{ProductDraft, ProductId};
    use rust_decimal_macros::dec;
    use storeops_core::DocumentId;

    fn product(name: &str, category: Category, store_stock: i64, price: Decimal) -> Product {
        Product::new(
            ProductId::new(DocumentId::new()),
            ProductDraft {
                name: name.to_string(),
                category,
                sku: format!("SKU-{name}"),
                ean: format!("EAN{store_stock}"),
                store_stock,
                warehouse_stock: 2,
                min_stock: 6,
                max_stock: 20,
                price,
                image_url: String::new(),
            },
        )
    }

    fn sample() -> Vec<Product> {
        vec![
            product("iPhone 16", Category::IPhone, 3, dec!(979)),
            product("iPhone 15", Category::IPhone, 12, dec!(879)),
            product("Mac mini M4", Category::Mac, 25, dec!(719)),
            product("AirPods Pro", Category::Audio, 6, dec!(279)),
        ]
    }

    #[test]
    fn summary_counts_and_totals() {
        let products = sample();
        let summary = StockSummary::of(&products);
        assert_eq!(summary.critical, 1);
        assert_eq!(summary.warning, 2);
        assert_eq!(summary.optimal, 1);
        assert_eq!(summary.total_products, 4);
        assert_eq!(summary.total_store_stock, 46);
        assert_eq!(summary.total_warehouse_stock, 8);
        assert_eq!(
            summary.total_value,
            dec!(979) * dec!(3) + dec!(879) * dec!(12) + dec!(719) * dec!(25) + dec!(279) * dec!(6)
        );
    }

    #[test]
    fn oversized_stock_and_value_saturate() {
        let half = i64::MAX / 2 + 1;
        let products = vec![
            product("Mac Pro", Category::Mac, half, dec!(100000000000000000000)),
            product("Mac Studio", Category::Mac, half, dec!(1)),
        ];
        assert_eq!(products[0].floor_value(), Decimal::MAX);

        let summary = StockSummary::of(&products);
        assert_eq!(summary.total_store_stock, i64::MAX);
        assert_eq!(summary.total_value, Decimal::MAX);
        assert_eq!(summary.optimal, 2);
    }

    #[test]
    fn empty_summary_is_zero() {
        assert_eq!(StockSummary::of(&Vec::<Product>::new()), StockSummary::default());
    }

    #[test]
    fn search_is_case_insensitive_over_name_sku_and_ean() {
        let products = sample();
        let filter = ProductFilter {
            search: Some("IPHONE".to_string()),
            ..ProductFilter::default()
        };
        assert_eq!(filter.apply(&products).len(), 2);

        let filter = ProductFilter {
            search: Some("ean25".to_string()),
            ..ProductFilter::default()
        };
        let hits = filter.apply(&products);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].details.name, "Mac mini M4");
    }

    #[test]
    fn level_filters_use_advisory_thresholds() {
        let products = sample();
        let low = ProductFilter {
            level: StockLevel::Low,
            ..ProductFilter::default()
        };
        let names: Vec<_> = low.apply(&products).into_iter().map(|p| p.details.name.as_str()).collect();
        assert_eq!(names, vec!["iPhone 16", "AirPods Pro"]);

        let high = ProductFilter {
            level: StockLevel::High,
            ..ProductFilter::default()
        };
        assert_eq!(high.apply(&products).len(), 1);
    }

    #[test]
    fn filters_combine() {
        let products = sample();
        let filter = ProductFilter {
            category: Some(Category::IPhone),
            status: Some(StockStatus::Warning),
            ..ProductFilter::default()
        };
        let hits = filter.apply(&products);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].details.name, "iPhone 15");
    }

    #[test]
    fn breakdown_groups_by_category() {
        let products = sample();
        let breakdown = CategoryBreakdown::of(&products);
        assert_eq!(breakdown.len(), 3);
        let iphone = &breakdown[0];
        assert_eq!(iphone.category, Category::IPhone);
        assert_eq!(iphone.count, 2);
        assert_eq!(iphone.critical, 1);
        assert_eq!(iphone.warning, 1);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: the status buckets always add up to the product count.
            #[test]
            fn buckets_sum_to_total(stocks in proptest::collection::vec(0i64..200, 0..50)) {
                let products: Vec<Product> = stocks
                    .iter()
                    .map(|s| product("p", Category::Accessories, *s, dec!(1)))
                    .collect();
                let summary = StockSummary::of(&products);
                prop_assert_eq!(summary.critical + summary.warning + summary.optimal, products.len());
                prop_assert_eq!(summary.total_store_stock, stocks.iter().sum::<i64>());
                prop_assert_eq!(summary.total_value, Decimal::from(stocks.iter().sum::<i64>()));
            }
        }
    }
}
