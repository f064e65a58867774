//! HTTP API: router, handlers and request/response mapping for the stock
//! ledger, the collaborator registries and the analytics views.

pub mod app;
