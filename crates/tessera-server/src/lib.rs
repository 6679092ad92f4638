//! HTTP server for Tessera.
//!
//! This crate provides a native Rust HTTP server using axum, serving:
//! - built pages wrapped in site chrome (`GET /`, `GET /pages/{name}`)
//! - the dynamic content endpoint (`POST /api/dynamic-content`)
//!
//! # Quick Start
//!
//! ```ignore
//! use tessera_server::{ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig {
//!         definitions_dir: "definitions".into(),
//!         session_tokens: vec!["s3cret".to_owned()],
//!         ..ServerConfig::default()
//!     };
//!     run_server(config).await.unwrap();
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Browser ──HTTP──► axum server (tessera-server)
//!                        │
//!                        ├─► GET pages ──► Site::build_page (full + shells)
//!                        │
//!                        └─► POST dynamic content ──► Site::resolve_content
//!                                 │
//!                                 └─► session cookie ──► authenticated?
//! ```

mod app;
mod auth;
mod error;
mod handlers;
mod middleware;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use tessera_definition::{DefinitionName, FsDefinitionStore};
use tessera_loaders::LoaderRegistry;
use tessera_site::Site;

pub use error::ServerError;

use crate::auth::SessionAuth;
use crate::state::AppState;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Directory holding page definition files.
    pub definitions_dir: PathBuf,
    /// Page definition served at `/`.
    pub entry: String,
    /// Path of the dynamic content endpoint.
    pub content_endpoint: String,
    /// Site chrome definition for pages without inline chrome.
    pub site: Option<String>,
    /// Session cookie name.
    pub session_cookie: String,
    /// Accepted session tokens.
    pub session_tokens: Vec<String>,
    /// Application version (for cache invalidation).
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 7979,
            definitions_dir: PathBuf::from("definitions"),
            entry: "index.json".to_owned(),
            content_endpoint: "/api/dynamic-content".to_owned(),
            site: None,
            session_cookie: "tessera_session".to_owned(),
            session_tokens: Vec::new(),
            version: String::new(),
        }
    }
}

/// Create server configuration from Tessera config.
#[must_use]
pub fn server_config_from_tessera_config(
    config: &tessera_config::Config,
    version: String,
) -> ServerConfig {
    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        definitions_dir: config.site_resolved.definitions_dir.clone(),
        entry: config.site_resolved.entry.clone(),
        content_endpoint: config.client.endpoint.clone(),
        site: config.site_resolved.site.clone(),
        session_cookie: config.auth.session_cookie.clone(),
        session_tokens: config.auth.session_tokens.clone(),
        version,
    }
}

/// Run the server until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the site chrome name is invalid, the address cannot
/// be parsed, or the listener fails.
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let state = Arc::new(app_state(&config)?);
    let app = app::create_router(state);

    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))?;
    tracing::info!(
        address = %addr,
        definitions = %config.definitions_dir.display(),
        "Starting server"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn app_state(config: &ServerConfig) -> Result<AppState, ServerError> {
    let store = Arc::new(FsDefinitionStore::new(config.definitions_dir.clone()));
    let mut site = Site::new(store, Arc::new(LoaderRegistry::with_defaults()));
    if let Some(chrome) = &config.site {
        site = site.with_chrome(DefinitionName::parse(chrome)?);
    }
    if config.session_tokens.is_empty() {
        tracing::info!("No session tokens configured, protected content is unreachable");
    }

    Ok(AppState {
        site,
        entry: config.entry.clone(),
        content_endpoint: config.content_endpoint.clone(),
        auth: SessionAuth::new(&config.session_cookie, config.session_tokens.clone()),
        version: config.version.clone(),
    })
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}
