use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value as JsonValue;

use storeops_core::{DocumentId, ExpectedVersion};

use super::r#trait::{DocumentStore, StoreError, StoredDocument};

#[derive(Debug, Default)]
struct Collections {
    /// Documents per collection, kept in sequence order.
    docs: HashMap<String, Vec<StoredDocument>>,
    next_sequence: u64,
}

/// In-memory document store.
///
/// Intended for tests/dev. Not optimized for performance. Every operation
/// yields to the scheduler once before touching state, so concurrent callers
/// interleave the way they would around a real network round-trip.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    inner: RwLock<Collections>,
    unavailable: AtomicBool,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a connectivity outage: while set, every call fails with
    /// `StoreError::Unavailable` and leaves state untouched.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    async fn round_trip(&self) -> Result<(), StoreError> {
        tokio::task::yield_now().await;
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("in-memory store marked unavailable".to_string()));
        }
        Ok(())
    }

    fn poisoned() -> StoreError {
        StoreError::Unavailable("lock poisoned".to_string())
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn insert(&self, collection: &str, data: JsonValue) -> Result<StoredDocument, StoreError> {
        self.round_trip().await?;
        let mut inner = self.inner.write().map_err(|_| Self::poisoned())?;

        inner.next_sequence += 1;
        let now = Utc::now();
        let doc = StoredDocument {
            id: DocumentId::new(),
            collection: collection.to_string(),
            version: 1,
            sequence: inner.next_sequence,
            data,
            created_at: now,
            updated_at: now,
        };
        inner
            .docs
            .entry(collection.to_string())
            .or_default()
            .push(doc.clone());
        Ok(doc)
    }

    async fn get(&self, collection: &str, id: DocumentId) -> Result<Option<StoredDocument>, StoreError> {
        self.round_trip().await?;
        let inner = self.inner.read().map_err(|_| Self::poisoned())?;
        Ok(inner
            .docs
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| d.id == id))
            .cloned())
    }

    async fn replace(
        &self,
        collection: &str,
        id: DocumentId,
        data: JsonValue,
        expected_version: ExpectedVersion,
    ) -> Result<StoredDocument, StoreError> {
        self.round_trip().await?;
        let mut inner = self.inner.write().map_err(|_| Self::poisoned())?;

        let doc = inner
            .docs
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
            .ok_or_else(|| StoreError::not_found(collection, id))?;

        if !expected_version.matches(doc.version) {
            return Err(StoreError::Concurrency(format!(
                "{collection}/{id}: expected {expected_version:?}, found {}",
                doc.version
            )));
        }

        doc.data = data;
        doc.version += 1;
        doc.updated_at = Utc::now();
        Ok(doc.clone())
    }

    async fn delete(&self, collection: &str, id: DocumentId) -> Result<(), StoreError> {
        self.round_trip().await?;
        let mut inner = self.inner.write().map_err(|_| Self::poisoned())?;

        let docs = inner
            .docs
            .get_mut(collection)
            .ok_or_else(|| StoreError::not_found(collection, id))?;
        let before = docs.len();
        docs.retain(|d| d.id != id);
        if docs.len() == before {
            return Err(StoreError::not_found(collection, id));
        }
        Ok(())
    }

    async fn list(&self, collection: &str) -> Result<Vec<StoredDocument>, StoreError> {
        self.round_trip().await?;
        let inner = self.inner.read().map_err(|_| Self::poisoned())?;
        Ok(inner.docs.get(collection).cloned().unwrap_or_default())
    }

    async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &JsonValue,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        self.round_trip().await?;
        let inner = self.inner.read().map_err(|_| Self::poisoned())?;
        Ok(inner
            .docs
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| d.data.get(field) == Some(value))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn clear(&self, collection: &str) -> Result<usize, StoreError> {
        self.round_trip().await?;
        let mut inner = self.inner.write().map_err(|_| Self::poisoned())?;
        Ok(inner.docs.remove(collection).map(|docs| docs.len()).unwrap_or(0))
    }
}
