//! Stock ledger: the authoritative product collection and its one atomic
//! mutation path.
//!
//! The ledger loads the `products` collection once on [`StockLedger::init`]
//! and afterwards moves its in-memory view only on confirmed store writes.
//! Consumers read snapshots with [`StockLedger::products`] and follow
//! changes through [`StockLedger::subscribe`].
//!
//! Only [`StockLedger::decrement_on_sale`] uses a read-modify-write cycle.
//! `create`, `update` and `delete` on the same id are last-writer-wins.

mod error;
mod view;

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;
use serde_json::Value as JsonValue;
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

use storeops_core::{ExpectedVersion, Record};
use storeops_inventory::{
    CategoryBreakdown, Product, ProductDocument, ProductDraft, ProductFilter, ProductId, StockStatus,
    StockSummary,
};

use crate::document_store::{DocumentStore, StoredDocument, TransactionError, read_modify_write};

pub use error::LedgerError;
use view::{ProductView, Versioned};

const PRODUCTS: &str = ProductDocument::COLLECTION;

/// Tuning knobs for a [`StockLedger`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Attempts per sale decrement before reporting `Conflict`.
    pub max_attempts: u32,
    /// Capacity of the change broadcast channel.
    pub change_buffer: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            change_buffer: 256,
        }
    }
}

/// Notification emitted after a confirmed store write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LedgerChange {
    Created { product: Product },
    Updated { product: Product },
    Deleted { id: ProductId },
    Reloaded { count: usize },
}

/// Owned stock ledger service over a document store.
pub struct StockLedger<S> {
    store: S,
    config: LedgerConfig,
    view: RwLock<ProductView>,
    changes: broadcast::Sender<LedgerChange>,
}

impl<S> std::fmt::Debug for StockLedger<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StockLedger")
            .field("config", &self.config)
            .field("products", &self.read_view().len())
            .finish_non_exhaustive()
    }
}

impl<S> StockLedger<S> {
    fn read_view(&self) -> RwLockReadGuard<'_, ProductView> {
        self.view.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_view(&self) -> RwLockWriteGuard<'_, ProductView> {
        self.view.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S> StockLedger<S>
where
    S: DocumentStore,
{
    /// Load the product collection and start the ledger.
    #[instrument(skip(store), err(level = "warn"))]
    pub async fn init(store: S, config: LedgerConfig) -> Result<Self, LedgerError> {
        let entries = load_products(&store).await?;
        info!(products = entries.len(), "stock ledger loaded");

        let (changes, _) = broadcast::channel(config.change_buffer.max(1));
        Ok(Self {
            store,
            config,
            view: RwLock::new(ProductView::from_entries(entries)),
            changes,
        })
    }

    /// Shut the ledger down. Subscribers see their channel close.
    pub fn dispose(self) {
        info!(products = self.read_view().len(), "stock ledger disposed");
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LedgerChange> {
        self.changes.subscribe()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> LedgerConfig {
        self.config
    }

    /// Snapshot of every product, in creation order.
    pub fn products(&self) -> Vec<Product> {
        self.read_view().products()
    }

    pub fn get(&self, id: ProductId) -> Option<Product> {
        self.read_view().get(id).cloned()
    }

    /// Headline stock figures over the products matching `filter`.
    pub fn summary(&self, filter: &ProductFilter) -> StockSummary {
        let products = self.products();
        StockSummary::of(filter.apply(&products))
    }

    pub fn category_breakdown(&self) -> Vec<CategoryBreakdown> {
        CategoryBreakdown::of(&self.products())
    }

    /// Reload the view from the store.
    #[instrument(skip(self), err(level = "warn"))]
    pub async fn refresh(&self) -> Result<usize, LedgerError> {
        let entries = load_products(&self.store).await?;
        let count = entries.len();
        self.write_view().replace_all(entries);
        self.notify(LedgerChange::Reloaded { count });
        debug!(count, "stock ledger reloaded");
        Ok(count)
    }

    /// Persist a new product. Its status is derived from `store_stock`.
    #[instrument(skip(self, draft), fields(sku = %draft.sku), err(level = "warn"))]
    pub async fn create(&self, draft: ProductDraft) -> Result<Product, LedgerError> {
        draft.validate()?;

        let status = StockStatus::classify(draft.store_stock);
        let data = encode(&ProductDocument {
            details: draft,
            status,
        })?;
        let stored = self.store.insert(PRODUCTS, data).await?;
        let product = self.accept(stored)?;

        info!(product_id = %product.id, status = product.status().as_str(), "product created");
        self.notify(LedgerChange::Created {
            product: product.clone(),
        });
        Ok(product)
    }

    /// Replace a product's fields. The status is recomputed from the new
    /// `store_stock`; nothing the caller sends can override it.
    #[instrument(skip(self, draft), fields(product_id = %id), err(level = "warn"))]
    pub async fn update(&self, id: ProductId, draft: ProductDraft) -> Result<Product, LedgerError> {
        draft.validate()?;

        let status = StockStatus::classify(draft.store_stock);
        let data = encode(&ProductDocument {
            details: draft,
            status,
        })?;
        let stored = self
            .store
            .replace(PRODUCTS, id.0, data, ExpectedVersion::Any)
            .await?;
        let product = self.accept(stored)?;

        info!(product_id = %id, status = product.status().as_str(), "product updated");
        self.notify(LedgerChange::Updated {
            product: product.clone(),
        });
        Ok(product)
    }

    /// Remove a product for good. Deleting an absent id is `NotFound`.
    #[instrument(skip(self), fields(product_id = %id), err(level = "warn"))]
    pub async fn delete(&self, id: ProductId) -> Result<(), LedgerError> {
        self.store.delete(PRODUCTS, id.0).await?;
        self.write_view().remove(id);

        info!(product_id = %id, "product deleted");
        self.notify(LedgerChange::Deleted { id });
        Ok(())
    }

    /// First product (in creation order) whose EAN equals `ean`.
    #[instrument(skip(self), err(level = "warn"))]
    pub async fn find_by_barcode(&self, ean: &str) -> Result<Option<Product>, LedgerError> {
        let hits = self
            .store
            .find_by_field(PRODUCTS, "ean", &JsonValue::String(ean.to_string()))
            .await?;

        hits.into_iter()
            .next()
            .map(|doc| decode(doc).map(|entry| entry.product))
            .transpose()
    }

    /// Take `quantity` units off the sales floor after a sale.
    ///
    /// Runs as a read-modify-write on the product document: a concurrent
    /// write makes the cycle restart from a fresh read, so two sales never
    /// both subtract from the same starting stock. Each call is a distinct
    /// sale; repeating it decrements again.
    #[instrument(skip(self), fields(product_id = %id), err(level = "warn"))]
    pub async fn decrement_on_sale(&self, id: ProductId, quantity: i64) -> Result<Product, LedgerError> {
        if quantity <= 0 {
            return Err(LedgerError::Validation(format!(
                "quantity must be positive (got {quantity})"
            )));
        }

        let (_, stored) = read_modify_write(
            &self.store,
            PRODUCTS,
            id.0,
            self.config.max_attempts,
            |doc: ProductDocument| {
                Product::from_document(id, doc)
                    .sell(quantity)
                    .map(|sold| sold.to_document())
            },
        )
        .await
        .map_err(|e| match e {
            TransactionError::NotFound => LedgerError::NotFound(id.to_string()),
            TransactionError::Aborted(domain) => LedgerError::from(domain),
            TransactionError::Contended { attempts } => LedgerError::Conflict(format!(
                "product {id} changed on each of {attempts} attempts"
            )),
            TransactionError::Store(store) => LedgerError::from(store),
        })?;
        let product = self.accept(stored)?;

        info!(
            product_id = %id,
            remaining = product.store_stock(),
            status = product.status().as_str(),
            "sale decremented stock"
        );
        self.notify(LedgerChange::Updated {
            product: product.clone(),
        });
        Ok(product)
    }

    /// Decode a confirmed write and fold it into the view.
    fn accept(&self, stored: StoredDocument) -> Result<Product, LedgerError> {
        let entry = decode(stored)?;
        let product = entry.product.clone();
        if !self.write_view().apply(entry) {
            debug!(product_id = %product.id, "stale write completion ignored by view");
        }
        Ok(product)
    }

    fn notify(&self, change: LedgerChange) {
        // No subscribers is fine.
        let _ = self.changes.send(change);
    }
}

async fn load_products<S: DocumentStore>(store: &S) -> Result<Vec<Versioned>, LedgerError> {
    store
        .list(PRODUCTS)
        .await?
        .into_iter()
        .map(decode)
        .collect()
}

fn encode(document: &ProductDocument) -> Result<JsonValue, LedgerError> {
    serde_json::to_value(document).map_err(|e| LedgerError::Corrupt(e.to_string()))
}

fn decode(stored: StoredDocument) -> Result<Versioned, LedgerError> {
    let id = ProductId::new(stored.id);
    let document: ProductDocument = serde_json::from_value(stored.data)
        .map_err(|e| LedgerError::Corrupt(format!("product {id}: {e}")))?;
    // Only undecodable documents are `Corrupt`. Out-of-range values written
    // outside the ledger still load so `update` can correct them.
    if let Err(e) = document.validate() {
        warn!(product_id = %id, error = %e, "stored product violates field constraints");
    }
    Ok(Versioned {
        product: Product::from_document(id, document),
        version: stored.version,
        sequence: stored.sequence,
    })
}
