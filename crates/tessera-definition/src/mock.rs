//! Mock definition store for testing.
//!
//! Provides [`MockDefinitionStore`] for unit testing without filesystem access.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::DefinitionError;
use crate::name::DefinitionName;
use crate::store::DefinitionStore;

/// In-memory definition store.
///
/// # Example
///
/// ```ignore
/// use tessera_definition::{DefinitionName, DefinitionStore, MockDefinitionStore};
///
/// let store = MockDefinitionStore::new()
///     .with_definition("index.json", r#"{"objects":[]}"#);
/// let def = store.load(&DefinitionName::parse("index.json").unwrap()).unwrap();
/// ```
#[derive(Debug, Default)]
pub struct MockDefinitionStore {
    definitions: RwLock<HashMap<String, String>>,
    reads: AtomicUsize,
}

impl MockDefinitionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a definition.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_definition(self, name: impl Into<String>, json: impl Into<String>) -> Self {
        self.definitions
            .write()
            .unwrap()
            .insert(name.into(), json.into());
        self
    }

    /// Number of `read` calls served so far, including misses.
    #[must_use]
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl DefinitionStore for MockDefinitionStore {
    fn read(&self, name: &DefinitionName) -> Result<String, DefinitionError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.definitions
            .read()
            .unwrap()
            .get(name.as_str())
            .cloned()
            .ok_or_else(|| DefinitionError::NotFound(name.to_string()))
    }

    fn list(&self) -> Result<Vec<DefinitionName>, DefinitionError> {
        let mut names: Vec<DefinitionName> = self
            .definitions
            .read()
            .unwrap()
            .keys()
            .filter_map(|k| DefinitionName::parse(k).ok())
            .collect();
        names.sort();
        Ok(names)
    }
}
