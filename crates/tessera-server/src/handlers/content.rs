//! Dynamic content endpoint.
//!
//! `POST` resolves one dynamic node to its inner fragment. `OPTIONS` answers
//! CORS preflight; every other method is rejected with the failure envelope.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use serde::Serialize;
use tessera_site::{ContentFragment, ContentRequest};

use crate::error::ServerError;
use crate::state::AppState;

/// Response for a served fragment.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ContentResponse {
    success: bool,
    content: String,
    component_id: String,
    timestamp: i64,
    cache_key: String,
}

impl From<ContentFragment> for ContentResponse {
    fn from(fragment: ContentFragment) -> Self {
        Self {
            success: true,
            content: fragment.content,
            component_id: fragment.component_id,
            timestamp: fragment.timestamp,
            cache_key: fragment.cache_key,
        }
    }
}

/// Handle POST /api/dynamic-content.
pub(crate) async fn post_dynamic_content(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ContentResponse>, ServerError> {
    let authenticated = state.auth.is_authenticated(&headers);
    let result = ContentRequest::from_slice(&body)
        .and_then(|request| state.site.resolve_content(&request, authenticated));

    match result {
        Ok(fragment) => Ok(Json(fragment.into())),
        Err(e) => {
            tracing::warn!(error = %e, authenticated, "Dynamic content request failed");
            Err(e.into())
        }
    }
}

/// Handle OPTIONS /api/dynamic-content.
pub(crate) async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// Handle any other method on /api/dynamic-content.
pub(crate) async fn method_not_allowed() -> ServerError {
    ServerError::MethodNotAllowed
}
