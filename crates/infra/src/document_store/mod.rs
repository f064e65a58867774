//! Collection-oriented document store boundary.
//!
//! The ledger and registries persist plain JSON documents through
//! [`DocumentStore`] without knowing which backend is behind it.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;
pub mod transaction;

pub use in_memory::InMemoryDocumentStore;
pub use postgres::PostgresDocumentStore;
pub use r#trait::{DocumentStore, StoreError, StoredDocument};
pub use transaction::{TransactionError, read_modify_write};
