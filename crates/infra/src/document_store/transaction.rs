//! Single-document read-modify-write on top of versioned replaces.
//!
//! This is the only transactional primitive the system uses. Swapping the
//! backend's native mechanism (serializable transaction, row lock) in here
//! leaves callers untouched.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use storeops_core::{DocumentId, ExpectedVersion};

use super::r#trait::{DocumentStore, StoreError, StoredDocument};

/// Why a read-modify-write did not commit.
#[derive(Debug)]
pub enum TransactionError<E> {
    /// The document does not exist.
    NotFound,
    /// The mutation itself refused the change; nothing was written.
    Aborted(E),
    /// Every attempt lost its version race.
    Contended { attempts: u32 },
    /// Any other store failure; nothing was retried.
    Store(StoreError),
}

/// Read a document, apply `mutate`, and write it back only if nobody else
/// wrote in between.
///
/// On a version conflict the whole cycle restarts from a fresh read, at most
/// `max_attempts` times. `mutate` must be pure: it can run once per attempt.
/// Errors returned by `mutate` abort immediately without writing.
pub async fn read_modify_write<S, T, E, F>(
    store: &S,
    collection: &str,
    id: DocumentId,
    max_attempts: u32,
    mut mutate: F,
) -> Result<(T, StoredDocument), TransactionError<E>>
where
    S: DocumentStore + ?Sized,
    T: Serialize + DeserializeOwned,
    F: FnMut(T) -> Result<T, E>,
{
    let max_attempts = max_attempts.max(1);

    for attempt in 1..=max_attempts {
        let current = store
            .get(collection, id)
            .await
            .map_err(TransactionError::Store)?
            .ok_or(TransactionError::NotFound)?;

        let value: T = serde_json::from_value(current.data)
            .map_err(|e| TransactionError::Store(StoreError::Serialization(e.to_string())))?;
        let next = mutate(value).map_err(TransactionError::Aborted)?;
        let data = serde_json::to_value(&next)
            .map_err(|e| TransactionError::Store(StoreError::Serialization(e.to_string())))?;

        match store
            .replace(collection, id, data, ExpectedVersion::Exact(current.version))
            .await
        {
            Ok(stored) => return Ok((next, stored)),
            Err(StoreError::Concurrency(msg)) => {
                debug!(%collection, %id, attempt, "read-modify-write lost version race: {msg}");
                continue;
            }
            Err(StoreError::NotFound { .. }) => return Err(TransactionError::NotFound),
            Err(e) => return Err(TransactionError::Store(e)),
        }
    }

    Err(TransactionError::Contended {
        attempts: max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document_store::InMemoryDocumentStore;
    use serde::Deserialize;
    use serde_json::json;
    use std::sync::Arc;

    #[derive(Debug, Serialize, Deserialize)]
    struct Counter {
        n: i64,
    }

    #[tokio::test]
    async fn applies_mutation_and_bumps_version() {
        let store = InMemoryDocumentStore::new();
        let doc = store.insert("counters", json!({"n": 10})).await.unwrap();

        let (value, stored) = read_modify_write(&store, "counters", doc.id, 3, |c: Counter| {
            Ok::<_, ()>(Counter { n: c.n - 4 })
        })
        .await
        .unwrap();

        assert_eq!(value.n, 6);
        assert_eq!(stored.version, 2);
    }

    #[tokio::test]
    async fn aborted_mutation_writes_nothing() {
        let store = InMemoryDocumentStore::new();
        let doc = store.insert("counters", json!({"n": 1})).await.unwrap();

        let err = read_modify_write(&store, "counters", doc.id, 3, |_c: Counter| Err::<Counter, _>("no"))
            .await
            .unwrap_err();

        assert!(matches!(err, TransactionError::Aborted("no")));
        assert_eq!(store.get("counters", doc.id).await.unwrap().unwrap().version, 1);
    }

    #[tokio::test]
    async fn missing_document_is_not_found() {
        let store = InMemoryDocumentStore::new();
        let err = read_modify_write(&store, "counters", DocumentId::new(), 3, |c: Counter| Ok::<_, ()>(c))
            .await
            .unwrap_err();
        assert!(matches!(err, TransactionError::NotFound));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_increments_are_not_lost() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let doc = store.insert("counters", json!({"n": 0})).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..20 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                read_modify_write(&*store, "counters", doc.id, 100, |c: Counter| {
                    Ok::<_, ()>(Counter { n: c.n + 1 })
                })
                .await
                .map(|_| ())
                .map_err(|e| format!("{e:?}"))
            }));
        }
        for h in handles {
            h.await.unwrap().unwrap();
        }

        let final_doc = store.get("counters", doc.id).await.unwrap().unwrap();
        assert_eq!(final_doc.data["n"], 20);
        assert_eq!(final_doc.version, 21);
    }
}
