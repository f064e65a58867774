use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use thiserror::Error;

use storeops_core::{DocumentId, ExpectedVersion};

/// A document as persisted in a collection.
///
/// ## Versions
///
/// Every successful write bumps `version` by one, starting at 1 on insert.
/// Writers that must not lose a concurrent update pass
/// `ExpectedVersion::Exact(version)` back to `replace()`.
///
/// ## Ordering
///
/// `sequence` is assigned once on insert and increases monotonically across
/// the whole store. Listing and field queries return documents in sequence
/// order, so "first match" always means "first created".
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: DocumentId,
    pub collection: String,
    pub version: u64,
    pub sequence: u64,
    pub data: JsonValue,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Document store operation error.
///
/// These are **infrastructure errors** (missing documents, version races,
/// connectivity) as opposed to domain errors (validation, stock rules).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document not found: {collection}/{id}")]
    NotFound { collection: String, id: DocumentId },

    #[error("optimistic concurrency check failed: {0}")]
    Concurrency(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("document serialization failed: {0}")]
    Serialization(String),
}

impl StoreError {
    pub fn not_found(collection: &str, id: DocumentId) -> Self {
        Self::NotFound {
            collection: collection.to_string(),
            id,
        }
    }
}

/// Collection-oriented JSON document store.
///
/// ## Design Principles
///
/// - **No storage assumptions**: works with the in-memory implementation
///   (tests/dev) and SQL backends (production)
/// - **Store-assigned identity**: ids come from `insert()`, never from callers
/// - **Single-document atomicity**: each call touches one document (except
///   `clear()`); multi-step updates go through
///   [`read_modify_write`](super::read_modify_write)
///
/// Implementations must:
/// - bump the version on every successful write
/// - reject `replace()` with a mismatched `ExpectedVersion::Exact`
/// - report backend/connectivity failures as `StoreError::Unavailable`
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create a document; the store assigns its id.
    async fn insert(&self, collection: &str, data: JsonValue) -> Result<StoredDocument, StoreError>;

    async fn get(&self, collection: &str, id: DocumentId) -> Result<Option<StoredDocument>, StoreError>;

    /// Replace a document's body wholesale.
    async fn replace(
        &self,
        collection: &str,
        id: DocumentId,
        data: JsonValue,
        expected_version: ExpectedVersion,
    ) -> Result<StoredDocument, StoreError>;

    async fn delete(&self, collection: &str, id: DocumentId) -> Result<(), StoreError>;

    /// All documents of a collection in creation order.
    async fn list(&self, collection: &str) -> Result<Vec<StoredDocument>, StoreError>;

    /// Documents whose top-level `field` equals `value`, in creation order.
    async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &JsonValue,
    ) -> Result<Vec<StoredDocument>, StoreError>;

    /// Delete every document in a collection; returns how many were removed.
    async fn clear(&self, collection: &str) -> Result<usize, StoreError>;
}

#[async_trait]
impl<S> DocumentStore for Arc<S>
where
    S: DocumentStore + ?Sized,
{
    async fn insert(&self, collection: &str, data: JsonValue) -> Result<StoredDocument, StoreError> {
        (**self).insert(collection, data).await
    }

    async fn get(&self, collection: &str, id: DocumentId) -> Result<Option<StoredDocument>, StoreError> {
        (**self).get(collection, id).await
    }

    async fn replace(
        &self,
        collection: &str,
        id: DocumentId,
        data: JsonValue,
        expected_version: ExpectedVersion,
    ) -> Result<StoredDocument, StoreError> {
        (**self).replace(collection, id, data, expected_version).await
    }

    async fn delete(&self, collection: &str, id: DocumentId) -> Result<(), StoreError> {
        (**self).delete(collection, id).await
    }

    async fn list(&self, collection: &str) -> Result<Vec<StoredDocument>, StoreError> {
        (**self).list(collection).await
    }

    async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &JsonValue,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        (**self).find_by_field(collection, field, value).await
    }

    async fn clear(&self, collection: &str) -> Result<usize, StoreError> {
        (**self).clear(collection).await
    }
}
