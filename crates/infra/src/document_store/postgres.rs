//! Postgres-backed document store implementation.
//!
//! All collections share one `documents` table. The document body is a
//! `jsonb` column; `version` drives compare-and-swap replaces and `seq`
//! (a `bigserial`) gives the creation order used by listings and queries.
//!
//! ## Error Mapping
//!
//! | SQLx Error | StoreError | Scenario |
//! |------------|------------|----------|
//! | Database (unique violation `23505`) | `Concurrency` | Id collision on insert |
//! | Database (other) | `Unavailable` | Backend rejected the statement |
//! | PoolClosed / Io / Tls / PoolTimedOut | `Unavailable` | Connectivity |
//! | ColumnDecode / Decode | `Serialization` | Row did not decode |

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::{FromRow, PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use storeops_core::{DocumentId, ExpectedVersion};

use super::r#trait::{DocumentStore, StoreError, StoredDocument};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    collection TEXT NOT NULL,
    id UUID NOT NULL,
    seq BIGSERIAL NOT NULL,
    version BIGINT NOT NULL CHECK (version > 0),
    data JSONB NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    PRIMARY KEY (collection, id)
);
CREATE INDEX IF NOT EXISTS documents_collection_seq ON documents (collection, seq);
"#;

const COLUMNS: &str = "id, collection, version, seq, data, created_at, updated_at";

/// Postgres-backed document store.
///
/// Uses the SQLx connection pool, which is `Send + Sync` and shareable.
/// Versioned replaces are a single conditional `UPDATE`, so no explicit
/// transaction is needed for the compare-and-swap.
#[derive(Debug, Clone)]
pub struct PostgresDocumentStore {
    pool: Arc<PgPool>,
}

impl PostgresDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Connect and make sure the `documents` table exists.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        let store = Self::new(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    /// Create the table and index if missing. Idempotent.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }

    async fn exists(&self, collection: &str, id: DocumentId) -> Result<bool, StoreError> {
        let row = sqlx::query("SELECT 1 FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("exists", e))?;
        Ok(row.is_some())
    }
}

#[async_trait]
impl DocumentStore for PostgresDocumentStore {
    #[instrument(skip(self, data), err)]
    async fn insert(&self, collection: &str, data: JsonValue) -> Result<StoredDocument, StoreError> {
        let row = sqlx::query(&format!(
            "INSERT INTO documents (collection, id, version, data) VALUES ($1, $2, 1, $3) RETURNING {COLUMNS}"
        ))
        .bind(collection)
        .bind(Uuid::now_v7())
        .bind(&data)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert", e))?;

        decode(&row)
    }

    #[instrument(skip(self), err)]
    async fn get(&self, collection: &str, id: DocumentId) -> Result<Option<StoredDocument>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM documents WHERE collection = $1 AND id = $2"
        ))
        .bind(collection)
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get", e))?;

        row.as_ref().map(decode).transpose()
    }

    #[instrument(skip(self, data), err)]
    async fn replace(
        &self,
        collection: &str,
        id: DocumentId,
        data: JsonValue,
        expected_version: ExpectedVersion,
    ) -> Result<StoredDocument, StoreError> {
        let expected: Option<i64> = match expected_version {
            ExpectedVersion::Any => None,
            ExpectedVersion::Exact(v) => Some(v as i64),
        };

        let row = sqlx::query(&format!(
            r#"
            UPDATE documents
            SET data = $3, version = version + 1, updated_at = now()
            WHERE collection = $1 AND id = $2 AND ($4::BIGINT IS NULL OR version = $4)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(collection)
        .bind(id.as_uuid())
        .bind(&data)
        .bind(expected)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("replace", e))?;

        match row {
            Some(row) => decode(&row),
            // Nothing matched: either the document is gone or the version moved.
            None if self.exists(collection, id).await? => Err(StoreError::Concurrency(format!(
                "{collection}/{id}: expected {expected_version:?}"
            ))),
            None => Err(StoreError::not_found(collection, id)),
        }
    }

    #[instrument(skip(self), err)]
    async fn delete(&self, collection: &str, id: DocumentId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(collection, id));
        }
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn list(&self, collection: &str) -> Result<Vec<StoredDocument>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM documents WHERE collection = $1 ORDER BY seq ASC"
        ))
        .bind(collection)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list", e))?;

        rows.iter().map(decode).collect()
    }

    #[instrument(skip(self, value), err)]
    async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &JsonValue,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM documents WHERE collection = $1 AND data -> $2 = $3 ORDER BY seq ASC"
        ))
        .bind(collection)
        .bind(field)
        .bind(value)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_by_field", e))?;

        rows.iter().map(decode).collect()
    }

    #[instrument(skip(self), err)]
    async fn clear(&self, collection: &str) -> Result<usize, StoreError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1")
            .bind(collection)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("clear", e))?;
        Ok(result.rows_affected() as usize)
    }
}

/// Row shape of the `documents` table.
#[derive(Debug)]
struct DocumentRow {
    id: Uuid,
    collection: String,
    version: i64,
    seq: i64,
    data: JsonValue,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, sqlx::postgres::PgRow> for DocumentRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            collection: row.try_get("collection")?,
            version: row.try_get("version")?,
            seq: row.try_get("seq")?,
            data: row.try_get("data")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl From<DocumentRow> for StoredDocument {
    fn from(row: DocumentRow) -> Self {
        Self {
            id: DocumentId::from_uuid(row.id),
            collection: row.collection,
            version: row.version as u64,
            sequence: row.seq as u64,
            data: row.data,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn decode(row: &sqlx::postgres::PgRow) -> Result<StoredDocument, StoreError> {
    DocumentRow::from_row(row)
        .map(StoredDocument::from)
        .map_err(|e| StoreError::Serialization(format!("failed to decode document row: {e}")))
}

/// Map SQLx errors to `StoreError`.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::Concurrency(msg),
                _ => StoreError::Unavailable(msg),
            }
        }
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            StoreError::Serialization(format!("decode error in {operation}: {err}"))
        }
        _ => StoreError::Unavailable(format!("sqlx error in {operation}: {err}")),
    }
}
