//! Records with a store-assigned identity.

/// Something the ledger tracks by identifier across writes.
pub trait Entity {
    /// Typed identifier; ids are assigned once by the store and never reused.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;
}
