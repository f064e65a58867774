//! Purchasing domain module.
//!
//! Supplier purchase orders. Orders are tracked on their own: receiving an
//! order does not credit warehouse stock.

pub mod order;

pub use order::{Order, OrderDraft, OrderLine, OrderStatus, order_number};
