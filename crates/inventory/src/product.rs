use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use storeops_core::error::{require_non_empty, require_non_negative};
use storeops_core::{DocumentId, DomainError, DomainResult, Entity, Record};

use crate::status::StockStatus;

/// Product identifier, assigned by the persistent store on creation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub DocumentId);

impl ProductId {
    pub fn new(id: DocumentId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl core::str::FromStr for ProductId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// Product family. Used for grouping and filtering only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "iPhone")]
    IPhone,
    #[serde(rename = "iPad")]
    IPad,
    Mac,
    Watch,
    Audio,
    Accessories,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::IPhone,
        Category::IPad,
        Category::Mac,
        Category::Watch,
        Category::Audio,
        Category::Accessories,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::IPhone => "iPhone",
            Category::IPad => "iPad",
            Category::Mac => "Mac",
            Category::Watch => "Watch",
            Category::Audio => "Audio",
            Category::Accessories => "Accessories",
        }
    }
}

impl core::str::FromStr for Category {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| DomainError::validation(format!("unknown category '{s}'")))
    }
}

/// Operator-supplied product fields (everything except `id` and `status`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: String,
    pub category: Category,
    pub sku: String,
    pub ean: String,
    pub store_stock: i64,
    pub warehouse_stock: i64,
    /// Advisory threshold; only the low/high stock filters read it.
    pub min_stock: i64,
    /// Advisory threshold; only the low/high stock filters read it.
    pub max_stock: i64,
    pub price: Decimal,
    #[serde(default)]
    pub image_url: String,
}

impl ProductDraft {
    /// Check every field constraint. Runs before any store write.
    ///
    /// `min_stock <= max_stock` is not enforced.
    pub fn validate(&self) -> DomainResult<()> {
        require_non_empty("name", &self.name)?;
        require_non_empty("sku", &self.sku)?;
        require_non_empty("ean", &self.ean)?;
        require_non_negative("storeStock", self.store_stock)?;
        require_non_negative("warehouseStock", self.warehouse_stock)?;
        require_non_negative("minStock", self.min_stock)?;
        require_non_negative("maxStock", self.max_stock)?;
        if self.price < Decimal::ZERO {
            return Err(DomainError::validation(format!(
                "price cannot be negative (got {})",
                self.price
            )));
        }
        Ok(())
    }
}

/// A product as held by the stock ledger.
///
/// `status` has no setter: it is derived from `store_stock` whenever a
/// product is built, so edits to `details` must go back through the ledger
/// to become visible with a fresh status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    #[serde(flatten)]
    pub details: ProductDraft,
    status: StockStatus,
}

impl Product {
    pub fn new(id: ProductId, details: ProductDraft) -> Self {
        let status = StockStatus::classify(details.store_stock);
        Self {
            id,
            details,
            status,
        }
    }

    /// Rebuild from a stored document. The stored status is ignored.
    pub fn from_document(id: ProductId, document: ProductDocument) -> Self {
        Self::new(id, document.details)
    }

    pub fn status(&self) -> StockStatus {
        self.status
    }

    pub fn store_stock(&self) -> i64 {
        self.details.store_stock
    }

    pub fn to_document(&self) -> ProductDocument {
        ProductDocument {
            details: self.details.clone(),
            status: self.status,
        }
    }

    /// Stock value on the sales floor (`price × store_stock`), saturating
    /// at `Decimal::MAX`.
    pub fn floor_value(&self) -> Decimal {
        self.details
            .price
            .saturating_mul(Decimal::from(self.details.store_stock))
    }

    /// Product after selling `quantity` units from the floor.
    ///
    /// Fails with `InsufficientStock` rather than clamping at zero.
    pub fn sell(&self, quantity: i64) -> DomainResult<Product> {
        if quantity <= 0 {
            return Err(DomainError::validation(format!(
                "quantity must be positive (got {quantity})"
            )));
        }
        let remaining = self.details.store_stock - quantity;
        if remaining < 0 {
            return Err(DomainError::insufficient_stock(
                quantity,
                self.details.store_stock,
            ));
        }
        let mut details = self.details.clone();
        details.store_stock = remaining;
        Ok(Product::new(self.id, details))
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Persisted shape of a product document.
///
/// The status is materialised for other readers of the store but is never
/// trusted on the way back in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDocument {
    #[serde(flatten)]
    pub details: ProductDraft,
    pub status: StockStatus,
}

impl Record for ProductDocument {
    const COLLECTION: &'static str = "products";

    fn validate(&self) -> DomainResult<()> {
        self.details.validate()
    }
}
