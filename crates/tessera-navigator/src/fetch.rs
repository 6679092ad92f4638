//! Fetching fragments from the dynamic content endpoint.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use ureq::Agent;

use crate::FetchError;

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// Body posted to the dynamic content endpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HydrationRequest {
    /// `type/version` from the shell metadata.
    pub component_spec: String,
    /// Element id.
    pub component_id: String,
    /// Client-side data. Shells carry none, so this is usually `{}`.
    pub component_data: Value,
    /// Page definition the shell was built from.
    pub page_definition: String,
}

/// Successful endpoint response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentResponse {
    /// Inner markup.
    pub content: String,
    /// Element id the content belongs to.
    pub component_id: String,
    /// Content address for the client store.
    pub cache_key: String,
}

/// Response envelope, success or failure.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    success: bool,
    content: Option<String>,
    component_id: Option<String>,
    cache_key: Option<String>,
    error: Option<String>,
}

impl Envelope {
    fn into_response(self, status: u16) -> Result<ContentResponse, FetchError> {
        if !self.success {
            return Err(FetchError::Rejected {
                status,
                message: self.error.unwrap_or_else(|| "Unknown API error".to_owned()),
            });
        }
        match (self.content, self.component_id, self.cache_key) {
            (Some(content), Some(component_id), Some(cache_key)) => Ok(ContentResponse {
                content,
                component_id,
                cache_key,
            }),
            _ => Err(FetchError::Decode(
                "success response without content, componentId, or cacheKey".to_owned(),
            )),
        }
    }
}

/// Source of hydration fragments.
pub trait ContentFetcher: Send + Sync {
    /// Fetch the fragment for `request`.
    fn fetch(
        &self,
        request: &HydrationRequest,
    ) -> impl Future<Output = Result<ContentResponse, FetchError>> + Send;
}

/// Fetcher posting to a live endpoint.
///
/// Requests run on tokio's blocking pool so the navigator's event loop is
/// never blocked on the network.
#[derive(Clone, Debug)]
pub struct HttpContentFetcher {
    agent: Agent,
    url: String,
    cookie: Option<String>,
}

impl HttpContentFetcher {
    /// Create a fetcher for the endpoint at `url`.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT)))
            .http_status_as_error(false)
            .build()
            .into();
        Self {
            agent,
            url: url.into(),
            cookie: None,
        }
    }

    /// Send `name=token` as the session cookie.
    #[must_use]
    pub fn with_session(mut self, name: &str, token: &str) -> Self {
        self.cookie = Some(format!("{name}={token}"));
        self
    }

    fn fetch_blocking(&self, request: &HydrationRequest) -> Result<ContentResponse, FetchError> {
        tracing::debug!(url = %self.url, id = %request.component_id, "Fetching dynamic content");
        let mut call = self.agent.post(&self.url).header("Accept", "application/json");
        if let Some(cookie) = &self.cookie {
            call = call.header("Cookie", cookie);
        }
        let response = call.send_json(request)?;

        let status = response.status().as_u16();
        let envelope: Envelope = response
            .into_body()
            .read_json()
            .map_err(|e| FetchError::Decode(e.to_string()))?;
        envelope.into_response(status)
    }
}

impl ContentFetcher for HttpContentFetcher {
    async fn fetch(&self, request: &HydrationRequest) -> Result<ContentResponse, FetchError> {
        let fetcher = self.clone();
        let request = request.clone();
        tokio::task::spawn_blocking(move || fetcher.fetch_blocking(&request)).await?
    }
}
