use thiserror::Error;

use storeops_core::DomainError;

use crate::document_store::StoreError;

/// Failure of a stock ledger operation.
///
/// Every variant leaves the in-memory view untouched: the view only moves
/// after a confirmed store write.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Malformed input, rejected before any store write.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("product not found: {0}")]
    NotFound(String),

    /// A sale would drive store stock below zero; the record is unchanged.
    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: i64, available: i64 },

    /// The product kept changing under a read-modify-write.
    #[error("write conflict: {0}")]
    Conflict(String),

    /// Connectivity or backend failure; safe to resubmit.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// A stored product document could not be decoded.
    #[error("corrupt product document: {0}")]
    Corrupt(String),
}

impl From<DomainError> for LedgerError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => Self::Validation(msg),
            DomainError::NotFound => Self::NotFound("record".to_string()),
            DomainError::InsufficientStock {
                requested,
                available,
            } => Self::InsufficientStock {
                requested,
                available,
            },
        }
    }
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { id, .. } => Self::NotFound(id.to_string()),
            StoreError::Concurrency(msg) => Self::Conflict(msg),
            StoreError::Unavailable(msg) => Self::StoreUnavailable(msg),
            StoreError::Serialization(msg) => Self::Corrupt(msg),
        }
    }
}

impl LedgerError {
    /// Short machine-readable code, stable across messages.
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::Validation(_) => "validation_error",
            LedgerError::NotFound(_) => "not_found",
            LedgerError::InsufficientStock { .. } => "insufficient_stock",
            LedgerError::Conflict(_) => "conflict",
            LedgerError::StoreUnavailable(_) => "store_unavailable",
            LedgerError::Corrupt(_) => "corrupt_document",
        }
    }
}
