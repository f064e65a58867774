//! Optimistic concurrency expectations for single-document writes.

/// Version expectation attached to a document write.
///
/// Every stored document carries a version that the store bumps on each
/// successful write. A write tagged `Exact(v)` only lands if the document is
/// still at `v`; this is the compare-and-swap the stock ledger relies on.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExpectedVersion {
    /// Skip version checking (last writer wins).
    Any,
    /// Require the document to be at an exact version.
    Exact(u64),
}

impl ExpectedVersion {
    pub fn matches(self, actual: u64) -> bool {
        match self {
            ExpectedVersion::Any => true,
            ExpectedVersion::Exact(v) => v == actual,
        }
    }
}
