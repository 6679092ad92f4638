//! Error types for the HTTP server.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tessera_definition::DefinitionError;
use tessera_site::{ContentError, ErrorCategory, ResolveError};

/// Server error type.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ServerError {
    /// Page definition absent or its name invalid.
    #[error("Page not found: {0}")]
    PageNotFound(String),

    /// Page exists but failed to build.
    #[error("Failed to build page {name}: {source}")]
    Build {
        /// Page definition name.
        name: String,
        /// Builder error.
        source: ResolveError,
    },

    /// Dynamic content request rejected.
    #[error(transparent)]
    Content(#[from] ContentError),

    /// Dynamic content endpoint called with a method other than POST.
    #[error("Only POST requests are allowed")]
    MethodNotAllowed,

    /// Configured site chrome name is invalid.
    #[error("Invalid site configuration: {0}")]
    Config(#[from] DefinitionError),

    /// Bind address could not be parsed.
    #[error("Invalid bind address: {0}")]
    Address(#[from] std::net::AddrParseError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServerError {
    /// Classify a page build failure.
    pub(crate) fn from_build(name: &str, error: ResolveError) -> Self {
        match error {
            ResolveError::Definition(
                DefinitionError::InvalidName(_) | DefinitionError::NotFound(_),
            ) => Self::PageNotFound(name.to_owned()),
            source => Self::Build {
                name: name.to_owned(),
                source,
            },
        }
    }
}

/// Body of a failed dynamic content response.
fn content_failure(error: &str) -> serde_json::Value {
    json!({
        "success": false,
        "error": error,
        "timestamp": chrono::Utc::now().timestamp(),
    })
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::PageNotFound(name) => (
                StatusCode::NOT_FOUND,
                json!({"error": "Page not found", "page": name}),
            ),
            Self::Content(e) => {
                let status = match e.category() {
                    ErrorCategory::Authorization => StatusCode::UNAUTHORIZED,
                    _ => StatusCode::BAD_REQUEST,
                };
                (status, content_failure(&e.to_string()))
            }
            Self::MethodNotAllowed => (
                StatusCode::BAD_REQUEST,
                content_failure(&self.to_string()),
            ),
            Self::Build { .. } | Self::Config(_) | Self::Address(_) | Self::Io(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": self.to_string()}),
            ),
        };

        (status, Json(body)).into_response()
    }
}
