use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use storeops_core::error::require_non_empty;
use storeops_core::{DomainError, DomainResult, Record};

/// Reporting family for sales and market-share comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SalesCategory {
    Smartphones,
    Computers,
}

impl SalesCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            SalesCategory::Smartphones => "Smartphones",
            SalesCategory::Computers => "Computers",
        }
    }

    /// Competitor brands tracked for this category, in display order.
    pub fn competitor_brands(&self) -> &'static [&'static str] {
        match self {
            SalesCategory::Smartphones => &["Samsung", "Oppo", "Xiaomi", "Huawei"],
            SalesCategory::Computers => &["Asus", "HP", "Acer", "Lenovo", "Microsoft", "Google"],
        }
    }
}

impl core::str::FromStr for SalesCategory {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "smartphones" => Ok(SalesCategory::Smartphones),
            "computers" => Ok(SalesCategory::Computers),
            other => Err(DomainError::validation(format!(
                "unknown sales category '{other}'"
            ))),
        }
    }
}

/// One recorded in-house sale line.
///
/// Recording a sale does not touch stock; callers that want the floor
/// quantity to follow must call the ledger's sale decrement explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub date: NaiveDate,
    pub product: String,
    pub category: SalesCategory,
    pub quantity: i64,
    pub seller: String,
    pub total_price: Decimal,
}

impl Record for Sale {
    const COLLECTION: &'static str = "sales";

    fn validate(&self) -> DomainResult<()> {
        require_non_empty("product", &self.product)?;
        require_non_empty("seller", &self.seller)?;
        if self.quantity <= 0 {
            return Err(DomainError::validation(format!(
                "quantity must be positive (got {})",
                self.quantity
            )));
        }
        if self.total_price < Decimal::ZERO {
            return Err(DomainError::validation("totalPrice cannot be negative"));
        }
        Ok(())
    }

    fn listing_order(a: &Self, b: &Self) -> core::cmp::Ordering {
        b.date.cmp(&a.date)
    }
}

/// Units sold by a competitor brand, as reported for market-share tracking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitorSale {
    pub brand: String,
    pub units: i64,
    pub category: SalesCategory,
    pub date: NaiveDate,
}

impl Record for CompetitorSale {
    const COLLECTION: &'static str = "competitorSales";

    fn validate(&self) -> DomainResult<()> {
        require_non_empty("brand", &self.brand)?;
        if self.units < 0 {
            return Err(DomainError::validation(format!(
                "units cannot be negative (got {})",
                self.units
            )));
        }
        Ok(())
    }

    fn listing_order(a: &Self, b: &Self) -> core::cmp::Ordering {
        b.date.cmp(&a.date)
    }
}
