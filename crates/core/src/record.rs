//! Records kept in named document collections.

use core::cmp::Ordering;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::DomainResult;

/// A plain-data record persisted as one document in a collection.
///
/// The store owns the identifier; the record is only the document body.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection the record lives in.
    const COLLECTION: &'static str;

    /// Field constraints checked before any write.
    fn validate(&self) -> DomainResult<()> {
        Ok(())
    }

    /// Listing order for snapshots. Ties keep creation order.
    fn listing_order(_a: &Self, _b: &Self) -> Ordering {
        Ordering::Equal
    }
}
