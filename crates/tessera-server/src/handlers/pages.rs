//! Page endpoints.
//!
//! Builds page definitions wrapped in site chrome and returns them as HTML.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use md5::{Digest, Md5};

use crate::error::ServerError;
use crate::state::AppState;

/// Handle GET / (configured entry page).
pub(crate) async fn get_entry(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    build_response(&state, &state.entry, &headers)
}

/// Handle GET /pages/{name}.
pub(crate) async fn get_page(
    Path(name): Path<String>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    build_response(&state, &name, &headers)
}

fn build_response(
    state: &AppState,
    name: &str,
    headers: &HeaderMap,
) -> Result<Response, ServerError> {
    let html = state.site.build_page(name, true).map_err(|e| {
        tracing::warn!(page = name, error = %e, "Page build failed");
        ServerError::from_build(name, e)
    })?;

    let etag = compute_etag(&state.version, &html);
    if let Some(if_none_match) = headers.get(header::IF_NONE_MATCH)
        && if_none_match.as_bytes() == etag.as_bytes()
    {
        return Ok(StatusCode::NOT_MODIFIED.into_response());
    }

    Ok((
        [
            (header::ETAG, etag),
            (header::CACHE_CONTROL, "private, max-age=60".to_owned()),
        ],
        Html(html),
    )
        .into_response())
}

/// Compute `ETag` from version and markup.
///
/// Uses MD5 hash truncated to 64 bits (16 hex chars).
fn compute_etag(version: &str, content: &str) -> String {
    let hash = Md5::digest(format!("{version}:{content}").as_bytes());
    format!("\"{}\"", &hex::encode(hash)[..16])
}
