//! Navigator error types.

/// Error parsing or mutating a document.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DomError {
    /// Markup is not well-formed.
    #[error("Markup parse error: {0}")]
    Parse(#[from] quick_xml::Error),

    /// An attribute could not be decoded.
    #[error("Markup attribute error: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    /// Bytes are not valid text in the document encoding.
    #[error("Markup encoding error: {0}")]
    Encoding(#[from] quick_xml::encoding::EncodingError),

    /// A closing tag has no matching opening tag.
    #[error("Unexpected closing tag </{0}>")]
    UnbalancedTag(String),
}

/// Error fetching a fragment from the dynamic content endpoint.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum FetchError {
    /// Request never produced a response (network error, timeout).
    #[error("HTTP request failed: {0}")]
    Transport(#[from] ureq::Error),

    /// Endpoint answered with `success: false`.
    #[error("Server rejected request ({status}): {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// `error` field of the response.
        message: String,
    },

    /// Response body is not a valid envelope.
    #[error("Invalid response from server: {0}")]
    Decode(String),

    /// The blocking request task panicked or was cancelled.
    #[error("Request task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Error applying a navigation instruction or hydrating an element.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum NavigationError {
    /// No element carries the id.
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// Element is not a dynamic shell.
    #[error("Element {0} is not a dynamic shell")]
    NotDynamic(String),

    /// Element already holds its content.
    #[error("Element {0} is already loaded")]
    AlreadyLoaded(String),

    /// `data-component-metadata` is absent or malformed.
    #[error("Invalid component metadata on {id}: {message}")]
    InvalidMetadata {
        /// Element id.
        id: String,
        /// What was wrong.
        message: String,
    },

    /// Shell has no `.dynamic-content-container`.
    #[error("Element {0} has no content container")]
    MissingContainer(String),

    /// Handler has no branch for the state.
    #[error("Handler for {id} does not support state {state}")]
    UnsupportedState {
        /// Element id.
        id: String,
        /// Requested state.
        state: String,
    },

    /// Injected markup could not be parsed.
    #[error(transparent)]
    Dom(#[from] DomError),

    /// Fetch failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),
}
