//! Definition error type.

use std::path::PathBuf;

/// Error loading, parsing, or validating a page definition.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DefinitionError {
    /// Definition file name does not match `[A-Za-z0-9_-]+.json`.
    #[error("Invalid page definition format")]
    InvalidName(String),

    /// Component or container spec does not match `type/version`.
    #[error("Invalid component specification format: {0:?}")]
    InvalidSpec(String),

    /// Named definition does not exist in the store.
    #[error("Page definition not found: {0}")]
    NotFound(String),

    /// Definition exists but could not be read.
    #[error("Failed to read page definition {}: {source}", path.display())]
    Io {
        /// File that failed to read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Definition is not valid JSON or has the wrong shape.
    #[error("Invalid JSON in page definition: {0}")]
    Json(#[from] serde_json::Error),

    /// Top level has no `objects` array.
    #[error("Page definition has no top-level objects array")]
    MissingObjects,

    /// A node has no `id`.
    #[error("Node at {0} has no id")]
    MissingId(String),

    /// A node has neither `component` nor `container`.
    #[error("Node {0} has neither a component nor a container spec")]
    MissingDiscriminant(String),

    /// A node has both `component` and `container`.
    #[error("Node {0} declares both a component and a container spec")]
    ConflictingDiscriminant(String),

    /// A nested container has no `objects` array.
    #[error("Container {0} has no objects array")]
    MissingChildren(String),

    /// Two nodes in one definition share an id.
    #[error("Duplicate node id in page definition: {0}")]
    DuplicateId(String),

    /// Flat-form node names a parent that is absent or unreachable from a root.
    #[error("Node {id} names parent {parent} which is not reachable from a root node")]
    UnknownParent {
        /// Child node id.
        id: String,
        /// Parent id it names.
        parent: String,
    },
}

impl DefinitionError {
    /// Whether the error is about the caller-supplied name rather than the file.
    #[must_use]
    pub fn is_invalid_name(&self) -> bool {
        matches!(self, Self::InvalidName(_))
    }
}
