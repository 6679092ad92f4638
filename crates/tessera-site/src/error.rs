//! Builder and content resolver errors.

use tessera_definition::{ComponentSpec, DefinitionError};
use tessera_loaders::LoadError;

/// Error resolving a node to markup. Aborts the whole page build.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ResolveError {
    /// No loader is registered for the node's spec.
    #[error("No {kind} loader registered for {spec}")]
    LoaderNotFound {
        /// `component`, `container`, or `site`.
        kind: &'static str,
        /// Requested spec.
        spec: ComponentSpec,
    },

    /// A dynamically served component declares no `variant`.
    #[error("Missing 'variant' for component: {0}")]
    VariantRequired(String),

    /// `variant` is set but `data` is not an object.
    #[error("Missing or invalid 'data' map for component: {0}")]
    MissingData(String),

    /// `data[variant]` does not exist.
    #[error("Variant '{variant}' not found in data for component: {id}")]
    VariantMissing {
        /// Component id.
        id: String,
        /// Requested variant key.
        variant: String,
    },

    /// `data[variant]` exists but is not an object.
    #[error("Variant '{variant}' of component {id} is not an object")]
    VariantNotObject {
        /// Component id.
        id: String,
        /// Requested variant key.
        variant: String,
    },

    /// Protected content would be inlined into the page: a protected
    /// component that is not dynamic, or any protected container.
    #[error("Protected node {0} must be a dynamic component")]
    ProtectedInline(String),

    /// A container is marked `dynamic`; only components load lazily.
    #[error("Container {0} cannot be loaded dynamically")]
    DynamicContainer(String),

    /// A loader failed.
    #[error("Failed to load {id}: {source}")]
    Load {
        /// Node id.
        id: String,
        /// Loader error.
        source: LoadError,
    },

    /// The page definition could not be loaded.
    #[error(transparent)]
    Definition(#[from] DefinitionError),
}

/// Error class of a [`ContentError`], independent of transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed input shape or pattern.
    Validation,
    /// Definition or component absent.
    NotFound,
    /// Protected content requested without authentication.
    Authorization,
    /// Authoring bug: loader missing, mode unsupported, variant data missing.
    Resolution,
    /// Definition unreadable or corrupt.
    Io,
}

/// Error serving a dynamic content request.
///
/// Display strings are the human-readable `error` field of the response.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ContentError {
    /// A required request field is absent.
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    /// Request body is not a JSON object.
    #[error("Invalid JSON in request body")]
    InvalidBody,

    /// Page definition name fails the filename pattern.
    #[error("Invalid page definition format")]
    InvalidDefinitionName,

    /// Component spec fails the `type/version` pattern.
    #[error("Invalid component specification format")]
    InvalidSpec,

    /// Named definition does not exist.
    #[error("Page definition not found")]
    DefinitionNotFound,

    /// Definition exists but cannot be read or parsed.
    #[error("Invalid page definition: {0}")]
    InvalidDefinition(#[source] DefinitionError),

    /// No node with this id and spec.
    #[error("Component not found in page definition")]
    ComponentNotFound,

    /// Node exists but is not opted into lazy loading.
    #[error("Component is not configured for dynamic loading")]
    NotDynamic,

    /// Protected node, unauthenticated caller.
    #[error("Unauthorized")]
    Unauthorized,

    /// No loader is registered for the spec.
    #[error("Component loader not found")]
    LoaderNotFound,

    /// Loader has no content branch.
    #[error("Component loader does not support dynamic content loading")]
    UnsupportedLoadMode,

    /// Variant resolution or the loader itself failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

impl ContentError {
    /// Taxonomy class of this error.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingParameter(_)
            | Self::InvalidBody
            | Self::InvalidDefinitionName
            | Self::InvalidSpec
            | Self::NotDynamic => ErrorCategory::Validation,
            Self::DefinitionNotFound | Self::ComponentNotFound => ErrorCategory::NotFound,
            Self::Unauthorized => ErrorCategory::Authorization,
            Self::LoaderNotFound | Self::UnsupportedLoadMode | Self::Resolve(_) => {
                ErrorCategory::Resolution
            }
            Self::InvalidDefinition(_) => ErrorCategory::Io,
        }
    }
}

impl From<DefinitionError> for ContentError {
    fn from(e: DefinitionError) -> Self {
        match e {
            DefinitionError::InvalidName(_) => Self::InvalidDefinitionName,
            DefinitionError::InvalidSpec(_) => Self::InvalidSpec,
            DefinitionError::NotFound(_) => Self::DefinitionNotFound,
            other => Self::InvalidDefinition(other),
        }
    }
}
