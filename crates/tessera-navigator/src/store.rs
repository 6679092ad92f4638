//! Client-side fragment store.

use std::collections::HashMap;

/// A hydrated fragment kept for reuse.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredFragment {
    /// Server-issued content address.
    pub cache_key: String,
    /// Inner markup.
    pub content: String,
}

/// Fragments keyed by component id, scoped to one navigator session.
///
/// Protected fragments are never stored.
#[derive(Clone, Debug, Default)]
pub struct ClientStore {
    entries: HashMap<String, StoredFragment>,
}

impl ClientStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fragment stored for `id`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&StoredFragment> {
        self.entries.get(id)
    }

    /// Store a fragment, replacing any previous one for `id`.
    pub fn insert(&mut self, id: impl Into<String>, fragment: StoredFragment) {
        self.entries.insert(id.into(), fragment);
    }

    /// Number of stored fragments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every fragment.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
