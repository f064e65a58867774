//! Infrastructure layer: document stores, the stock ledger service,
//! collaborator registries and configuration.

pub mod config;
pub mod document_store;
pub mod ledger;
pub mod registry;

pub use config::{ConfigError, StoreBackend, StoreOpsConfig};
pub use document_store::{DocumentStore, InMemoryDocumentStore, PostgresDocumentStore, StoreError};
pub use ledger::{LedgerChange, LedgerConfig, LedgerError, StockLedger};
pub use registry::{Entry, Registry, RegistryError, Snapshot};
