//! Application state.
//!
//! Shared state for all request handlers.

use tessera_site::Site;

use crate::auth::SessionAuth;

/// Application state shared across all handlers.
#[derive(Debug)]
pub(crate) struct AppState {
    /// Page builder and dynamic content resolver.
    pub(crate) site: Site,
    /// Page definition served at `/`.
    pub(crate) entry: String,
    /// Path of the dynamic content endpoint.
    pub(crate) content_endpoint: String,
    /// Session authentication.
    pub(crate) auth: SessionAuth,
    /// Application version for cache invalidation.
    pub(crate) version: String,
}
