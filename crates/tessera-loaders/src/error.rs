//! Loader error type.

use tessera_definition::ComponentSpec;

use crate::RenderMode;

/// Error produced by a loader.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum LoadError {
    /// Loader has no branch for the requested mode.
    #[error("Loader {spec} does not support {mode} mode")]
    UnsupportedMode {
        /// Loader spec.
        spec: ComponentSpec,
        /// Requested mode.
        mode: RenderMode,
    },

    /// Component data does not bind to the loader's data record.
    #[error("Invalid data for {spec}: {source}")]
    Data {
        /// Loader spec.
        spec: ComponentSpec,
        /// Binding error.
        source: serde_json::Error,
    },

    /// Navigation config or metadata could not be serialized into an attribute.
    #[error("Failed to serialize attribute: {0}")]
    Attribute(#[from] serde_json::Error),
}
