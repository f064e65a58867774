//! Inventory domain module.
//!
//! This crate contains the stock ledger's record types and business rules,
//! implemented purely as deterministic domain logic (no IO, no HTTP, no storage).

pub mod product;
pub mod status;
pub mod summary;

pub use product::{Category, Product, ProductDocument, ProductDraft, ProductId};
pub use status::StockStatus;
pub use summary::{CategoryBreakdown, ProductFilter, StockLevel, StockSummary};
