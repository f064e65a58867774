use std::collections::{HashMap, HashSet};

use storeops_core::Entity;
use storeops_inventory::{Product, ProductId};

/// A product as last confirmed by the store.
#[derive(Debug, Clone)]
pub(crate) struct Versioned {
    pub product: Product,
    pub version: u64,
    pub sequence: u64,
}

/// In-memory view of the product collection.
///
/// Writes complete out of order when callers run concurrently, so an entry
/// is only replaced by a strictly newer document version. Store ids are
/// never reused, which lets deleted ids stay tombstoned for good.
#[derive(Debug, Default)]
pub(crate) struct ProductView {
    entries: HashMap<ProductId, Versioned>,
    deleted: HashSet<ProductId>,
}

impl ProductView {
    pub fn from_entries(entries: impl IntoIterator<Item = Versioned>) -> Self {
        let mut view = Self::default();
        view.replace_all(entries);
        view
    }

    /// Swap in a freshly loaded collection.
    pub fn replace_all(&mut self, entries: impl IntoIterator<Item = Versioned>) {
        self.entries = entries
            .into_iter()
            .map(|e| (*e.product.id(), e))
            .collect();
    }

    /// Apply a confirmed write. Returns false when it was stale.
    pub fn apply(&mut self, entry: Versioned) -> bool {
        let id = *entry.product.id();
        if self.deleted.contains(&id) {
            return false;
        }
        match self.entries.get(&id) {
            Some(current) if current.version >= entry.version => false,
            _ => {
                self.entries.insert(id, entry);
                true
            }
        }
    }

    pub fn remove(&mut self, id: ProductId) -> bool {
        self.deleted.insert(id);
        self.entries.remove(&id).is_some()
    }

    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.entries.get(&id).map(|e| &e.product)
    }

    /// All products in creation order.
    pub fn products(&self) -> Vec<Product> {
        let mut entries: Vec<&Versioned> = self.entries.values().collect();
        entries.sort_by_key(|e| e.sequence);
        entries.into_iter().map(|e| e.product.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
