//! Live CRUD registries for the ledger's collaborators (sales, competitor
//! sales, orders, team, tasks).
//!
//! A registry owns one collection. After each confirmed write it re-lists
//! the collection and pushes the full, sorted snapshot on a
//! `tokio::sync::watch` channel, so subscribers always see a whole list and
//! never a partial diff.

use std::marker::PhantomData;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{Mutex, watch};
use tracing::{info, instrument, warn};

use storeops_core::{DocumentId, DomainError, ExpectedVersion, Record};

use crate::document_store::{DocumentStore, StoreError, StoredDocument};

/// A record together with its store-assigned identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry<T> {
    pub id: DocumentId,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub record: T,
}

/// Full, ordered contents of a collection.
pub type Snapshot<T> = Arc<Vec<Entry<T>>>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("record not found: {0}")]
    NotFound(String),

    #[error("write conflict: {0}")]
    Conflict(String),

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("corrupt document: {0}")]
    Corrupt(String),
}

impl From<DomainError> for RegistryError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound => Self::NotFound("record".to_string()),
            other => Self::Validation(other.to_string()),
        }
    }
}

impl From<StoreError> for RegistryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { id, .. } => Self::NotFound(id.to_string()),
            StoreError::Concurrency(msg) => Self::Conflict(msg),
            StoreError::Unavailable(msg) => Self::StoreUnavailable(msg),
            StoreError::Serialization(msg) => Self::Corrupt(msg),
        }
    }
}

/// CRUD registry over the `T::COLLECTION` collection.
pub struct Registry<S, T: Record> {
    store: S,
    snapshot: watch::Sender<Snapshot<T>>,
    /// Keeps re-list + publish in write order.
    publish: Mutex<()>,
    _record: PhantomData<fn() -> T>,
}

impl<S, T: Record> std::fmt::Debug for Registry<S, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("collection", &T::COLLECTION)
            .field("entries", &self.snapshot.borrow().len())
            .finish_non_exhaustive()
    }
}

impl<S, T> Registry<S, T>
where
    S: DocumentStore,
    T: Record,
{
    /// Load the collection and start publishing snapshots.
    #[instrument(skip(store), fields(collection = T::COLLECTION), err(level = "warn"))]
    pub async fn load(store: S) -> Result<Self, RegistryError> {
        let entries = list_sorted::<S, T>(&store).await?;
        info!(entries = entries.len(), "registry loaded");
        let (snapshot, _) = watch::channel(Arc::new(entries));
        Ok(Self {
            store,
            snapshot,
            publish: Mutex::new(()),
            _record: PhantomData,
        })
    }

    pub fn snapshot(&self) -> Snapshot<T> {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot<T>> {
        self.snapshot.subscribe()
    }

    pub fn get(&self, id: DocumentId) -> Option<Entry<T>> {
        self.snapshot.borrow().iter().find(|e| e.id == id).cloned()
    }

    #[instrument(skip(self, record), fields(collection = T::COLLECTION), err(level = "warn"))]
    pub async fn add(&self, record: T) -> Result<Entry<T>, RegistryError> {
        record.validate()?;
        let data = encode(&record)?;
        let stored = self.store.insert(T::COLLECTION, data).await?;
        let entry = decode::<T>(stored)?;

        info!(id = %entry.id, "record added");
        self.publish().await;
        Ok(entry)
    }

    #[instrument(skip(self, record), fields(collection = T::COLLECTION), err(level = "warn"))]
    pub async fn update(&self, id: DocumentId, record: T) -> Result<Entry<T>, RegistryError> {
        record.validate()?;
        let data = encode(&record)?;
        let stored = self
            .store
            .replace(T::COLLECTION, id, data, ExpectedVersion::Any)
            .await?;
        let entry = decode::<T>(stored)?;

        info!(%id, "record updated");
        self.publish().await;
        Ok(entry)
    }

    #[instrument(skip(self), fields(collection = T::COLLECTION), err(level = "warn"))]
    pub async fn delete(&self, id: DocumentId) -> Result<(), RegistryError> {
        self.store.delete(T::COLLECTION, id).await?;

        info!(%id, "record deleted");
        self.publish().await;
        Ok(())
    }

    /// Delete every record in the collection.
    #[instrument(skip(self), fields(collection = T::COLLECTION), err(level = "warn"))]
    pub async fn reset(&self) -> Result<usize, RegistryError> {
        let removed = self.store.clear(T::COLLECTION).await?;

        info!(removed, "registry reset");
        self.publish().await;
        Ok(removed)
    }

    /// Re-list and push a fresh snapshot. A failed re-list keeps the
    /// previous snapshot; the write itself already succeeded.
    async fn publish(&self) {
        let _guard = self.publish.lock().await;
        match list_sorted::<S, T>(&self.store).await {
            Ok(entries) => {
                self.snapshot.send_replace(Arc::new(entries));
            }
            Err(e) => warn!(error = %e, "snapshot refresh failed; keeping previous snapshot"),
        }
    }
}

async fn list_sorted<S, T>(store: &S) -> Result<Vec<Entry<T>>, RegistryError>
where
    S: DocumentStore,
    T: Record,
{
    let mut entries = store
        .list(T::COLLECTION)
        .await?
        .into_iter()
        .map(decode::<T>)
        .collect::<Result<Vec<_>, _>>()?;
    // Stable: ties keep creation order.
    entries.sort_by(|a, b| T::listing_order(&a.record, &b.record));
    Ok(entries)
}

fn encode<T: Record>(record: &T) -> Result<serde_json::Value, RegistryError> {
    serde_json::to_value(record).map_err(|e| RegistryError::Corrupt(e.to_string()))
}

fn decode<T: Record>(stored: StoredDocument) -> Result<Entry<T>, RegistryError> {
    let record = serde_json::from_value(stored.data)
        .map_err(|e| RegistryError::Corrupt(format!("{}/{}: {e}", T::COLLECTION, stored.id)))?;
    Ok(Entry {
        id: stored.id,
        created_at: stored.created_at,
        record,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document_store::InMemoryDocumentStore;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use storeops_purchasing::{OrderDraft, OrderLine, OrderStatus, order_number};
    use storeops_sales::{Sale, SalesCategory};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    fn sale(date: NaiveDate, seller: &str) -> Sale {
        Sale {
            date,
            product: "MacBook Air".to_string(),
            category: SalesCategory::Computers,
            quantity: 1,
            seller: seller.to_string(),
            total_price: dec!(1199),
        }
    }

    async fn sales() -> (Arc<InMemoryDocumentStore>, Registry<Arc<InMemoryDocumentStore>, Sale>) {
        let store = Arc::new(InMemoryDocumentStore::new());
        let registry = Registry::load(store.clone()).await.unwrap();
        (store, registry)
    }

    #[tokio::test]
    async fn snapshots_are_sorted_newest_first() {
        let (_, registry) = sales().await;
        registry.add(sale(day(10), "Ana")).await.unwrap();
        registry.add(sale(day(18), "Rui")).await.unwrap();
        registry.add(sale(day(12), "Ana")).await.unwrap();

        let dates: Vec<_> = registry.snapshot().iter().map(|e| e.record.date).collect();
        assert_eq!(dates, vec![day(18), day(12), day(10)]);
    }

    #[tokio::test]
    async fn subscribers_receive_full_snapshots() {
        let (_, registry) = sales().await;
        let mut rx = registry.subscribe();

        let entry = registry.add(sale(day(19), "Ana")).await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().len(), 1);

        let mut edited = entry.record.clone();
        edited.quantity = 3;
        registry.update(entry.id, edited).await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update()[0].record.quantity, 3);

        registry.delete(entry.id).await.unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_empty());
    }

    #[tokio::test]
    async fn invalid_records_are_rejected_before_writing() {
        let (store, registry) = sales().await;
        let mut bad = sale(day(1), "Ana");
        bad.quantity = 0;

        assert!(matches!(registry.add(bad).await, Err(RegistryError::Validation(_))));
        assert!(store.list(Sale::COLLECTION).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn reset_clears_collection() {
        let (_, registry) = sales().await;
        registry.add(sale(day(1), "Ana")).await.unwrap();
        registry.add(sale(day(2), "Rui")).await.unwrap();

        assert_eq!(registry.reset().await.unwrap(), 2);
        assert!(registry.snapshot().is_empty());
    }

    #[tokio::test]
    async fn missing_ids_and_outages_surface_as_errors() {
        let (store, registry) = sales().await;
        assert!(matches!(
            registry.delete(DocumentId::new()).await,
            Err(RegistryError::NotFound(_))
        ));

        store.set_unavailable(true);
        assert!(matches!(
            registry.add(sale(day(1), "Ana")).await,
            Err(RegistryError::StoreUnavailable(_))
        ));
        store.set_unavailable(false);
        assert!(registry.snapshot().is_empty());
    }

    #[tokio::test]
    async fn orders_round_trip_through_registry() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let orders = Registry::load(store).await.unwrap();

        let draft = OrderDraft {
            supplier: "Apple Distribution".to_string(),
            products: vec![OrderLine {
                name: "iPad mini".to_string(),
                quantity: 5,
                price: dec!(450),
            }],
            order_date: day(3),
            expected_delivery: day(9),
            status: OrderStatus::InTransit,
        };
        let entry = orders
            .add(draft.into_order(order_number(2026, 0)))
            .await
            .unwrap();

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["orderNumber"], "ORD-2026-001");
        assert_eq!(json["status"], "In Transit");
        assert!(json.get("createdAt").is_some());
        assert_eq!(orders.get(entry.id).unwrap().record.total, dec!(2250));
    }
}
