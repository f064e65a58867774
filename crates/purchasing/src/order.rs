use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use storeops_core::error::require_non_empty;
use storeops_core::{DomainError, DomainResult, Record};

/// Purchase order status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    #[serde(rename = "In Transit")]
    InTransit,
    Delivered,
    Cancelled,
}

/// One product line on a purchase order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub name: String,
    pub quantity: i64,
    /// Unit cost.
    pub price: Decimal,
}

impl OrderLine {
    /// `price × quantity`, saturating at the `Decimal` bounds.
    pub fn subtotal(&self) -> Decimal {
        self.price.saturating_mul(Decimal::from(self.quantity))
    }
}

/// Order fields supplied by the operator. The number and total are derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    pub supplier: String,
    pub products: Vec<OrderLine>,
    pub order_date: NaiveDate,
    pub expected_delivery: NaiveDate,
    pub status: OrderStatus,
}

impl OrderDraft {
    /// Sum of line subtotals.
    pub fn total(&self) -> Decimal {
        self.products
            .iter()
            .map(OrderLine::subtotal)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    /// Assign the order number and compute the total.
    pub fn into_order(self, order_number: String) -> Order {
        let total = self.total();
        Order {
            order_number,
            supplier: self.supplier,
            products: self.products,
            order_date: self.order_date,
            expected_delivery: self.expected_delivery,
            status: self.status,
            total,
        }
    }
}

/// A purchase order document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_number: String,
    pub supplier: String,
    pub products: Vec<OrderLine>,
    pub order_date: NaiveDate,
    pub expected_delivery: NaiveDate,
    pub status: OrderStatus,
    pub total: Decimal,
}

impl Record for Order {
    const COLLECTION: &'static str = "orders";

    fn validate(&self) -> DomainResult<()> {
        require_non_empty("orderNumber", &self.order_number)?;
        require_non_empty("supplier", &self.supplier)?;
        if self.products.is_empty() {
            return Err(DomainError::validation("order needs at least one product"));
        }
        for line in &self.products {
            require_non_empty("product name", &line.name)?;
            if line.quantity <= 0 {
                return Err(DomainError::validation(format!(
                    "quantity for '{}' must be positive",
                    line.name
                )));
            }
            if line.price < Decimal::ZERO {
                return Err(DomainError::validation(format!(
                    "price for '{}' cannot be negative",
                    line.name
                )));
            }
        }
        if self.expected_delivery < self.order_date {
            return Err(DomainError::validation(
                "expectedDelivery cannot precede orderDate",
            ));
        }
        Ok(())
    }

    fn listing_order(a: &Self, b: &Self) -> core::cmp::Ordering {
        b.order_date.cmp(&a.order_date)
    }
}

/// Sequential order number for the `existing + 1`-th order of `year`,
/// e.g. `ORD-2026-007`.
pub fn order_number(year: i32, existing: usize) -> String {
    format!("ORD-{year}-{:03}", existing + 1)
}
