//! Stock status classification.

use serde::{Deserialize, Serialize};

/// Highest store stock still classified as critical.
pub const CRITICAL_MAX: i64 = 5;

/// Highest store stock still classified as warning.
pub const WARNING_MAX: i64 = 15;

/// Derived restock urgency of a product's floor quantity.
///
/// Always a pure function of `store_stock`. The per-product `min_stock` /
/// `max_stock` fields do not participate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    Critical,
    Warning,
    Optimal,
}

impl StockStatus {
    pub fn classify(store_stock: i64) -> Self {
        if store_stock <= CRITICAL_MAX {
            StockStatus::Critical
        } else if store_stock <= WARNING_MAX {
            StockStatus::Warning
        } else {
            StockStatus::Optimal
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::Critical => "critical",
            StockStatus::Warning => "warning",
            StockStatus::Optimal => "optimal",
        }
    }
}

impl core::str::FromStr for StockStatus {
    type Err = storeops_core::DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "critical" => Ok(StockStatus::Critical),
            "warning" => Ok(StockStatus::Warning),
            "optimal" => Ok(StockStatus::Optimal),
            other => Err(storeops_core::DomainError::validation(format!(
                "unknown stock status '{other}'"
            ))),
        }
    }
}
