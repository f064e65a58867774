//! Team roster and task assignment records.
//!
//! Neither record participates in stock invariants; they are plain
//! collections the console lists and edits.

pub mod member;
pub mod task;

pub use member::{MemberStatus, Reseller, TeamMember};
pub use task::{Task, TaskPriority, TaskStatus};
