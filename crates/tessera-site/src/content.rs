//! Dynamic content resolution.
//!
//! Serves the inner fragment of one lazily loaded node. Nothing the caller
//! sends is trusted: the definition is re-read, the node re-located, and its
//! protection re-checked on every request. Served nodes must select their
//! payload with a `variant`.

use std::sync::Arc;

use md5::{Digest, Md5};
use serde::Deserialize;
use serde_json::Value;
use tessera_definition::{ComponentSpec, DefinitionName, DefinitionStore, NodeBody};
use tessera_loaders::{
    ComponentMetadata, DEFAULT_TITLE, LoadError, LoadRequest, LoaderRegistry, RenderMode,
};

use crate::builder::{navigation_of, resolve_variant};
use crate::{ContentError, ResolveError};

/// Body of a dynamic content request.
///
/// All four fields are required; `null` counts as missing.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRequest {
    /// `type/version` of the node.
    pub component_spec: String,
    /// Node id.
    pub component_id: String,
    /// Client-side copy of the component data. Only consulted for a
    /// fallback title.
    pub component_data: Value,
    /// Page definition file name.
    pub page_definition: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawContentRequest {
    component_spec: Option<String>,
    component_id: Option<String>,
    component_data: Option<Value>,
    page_definition: Option<String>,
}

impl ContentRequest {
    /// Decode a request body.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::InvalidBody`] if `body` is not a JSON object
    /// with string fields, or [`ContentError::MissingParameter`] naming the
    /// first absent field.
    pub fn from_slice(body: &[u8]) -> Result<Self, ContentError> {
        let value: Value = serde_json::from_slice(body).map_err(|_| ContentError::InvalidBody)?;
        if !value.is_object() {
            return Err(ContentError::InvalidBody);
        }
        let raw: RawContentRequest =
            serde_json::from_value(value).map_err(|_| ContentError::InvalidBody)?;

        Ok(Self {
            component_spec: raw
                .component_spec
                .ok_or(ContentError::MissingParameter("componentSpec"))?,
            component_id: raw
                .component_id
                .ok_or(ContentError::MissingParameter("componentId"))?,
            component_data: raw
                .component_data
                .ok_or(ContentError::MissingParameter("componentData"))?,
            page_definition: raw
                .page_definition
                .ok_or(ContentError::MissingParameter("pageDefinition"))?,
        })
    }
}

/// A resolved fragment ready to be injected into its shell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentFragment {
    /// Inner markup.
    pub content: String,
    /// Node id the fragment belongs to.
    pub component_id: String,
    /// Unix timestamp the fragment was rendered at.
    pub timestamp: i64,
    /// MD5 of spec, id, and resolved data, hex encoded.
    pub cache_key: String,
}

/// Request-scoped resolver behind the dynamic content endpoint.
#[derive(Clone)]
pub struct ContentResolver {
    store: Arc<dyn DefinitionStore>,
    registry: Arc<LoaderRegistry>,
}

impl ContentResolver {
    /// Create a resolver reading definitions from `store`.
    pub fn new(store: Arc<dyn DefinitionStore>, registry: Arc<LoaderRegistry>) -> Self {
        Self { store, registry }
    }

    /// Resolve `request` for a caller whose session is `authenticated`.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError`]; see [`ContentError::category`] for how each
    /// variant maps onto a response class.
    pub fn resolve(
        &self,
        request: &ContentRequest,
        authenticated: bool,
    ) -> Result<ContentFragment, ContentError> {
        let result = self.resolve_inner(request, authenticated);
        match &result {
            Ok(fragment) => tracing::debug!(
                page = %request.page_definition,
                id = %fragment.component_id,
                cache_key = %fragment.cache_key,
                "Served dynamic content"
            ),
            Err(e) => tracing::warn!(
                page = %request.page_definition,
                spec = %request.component_spec,
                id = %request.component_id,
                category = ?e.category(),
                error = %e,
                "Rejected dynamic content request"
            ),
        }
        result
    }

    fn resolve_inner(
        &self,
        request: &ContentRequest,
        authenticated: bool,
    ) -> Result<ContentFragment, ContentError> {
        // Both identifiers are validated before the store is touched.
        let name = DefinitionName::parse(&request.page_definition)?;
        let spec: ComponentSpec = request.component_spec.parse()?;

        let page = self.store.load(&name)?;
        let node = page
            .find(&request.component_id, &spec)
            .ok_or(ContentError::ComponentNotFound)?;
        if !node.dynamic {
            return Err(ContentError::NotDynamic);
        }
        if node.is_protected() && !authenticated {
            return Err(ContentError::Unauthorized);
        }

        let NodeBody::Component { variant, data } = &node.body else {
            return Err(ContentError::UnsupportedLoadMode);
        };
        let loader = self
            .registry
            .component(&spec)
            .ok_or(ContentError::LoaderNotFound)?;
        if !loader.supports(RenderMode::Content) {
            return Err(ContentError::UnsupportedLoadMode);
        }

        let Some(variant) = variant.as_deref() else {
            return Err(ResolveError::VariantRequired(node.id.clone()).into());
        };
        let resolved = resolve_variant(&node.id, Some(variant), data.as_ref())?;
        let title = resolved
            .get("title")
            .and_then(Value::as_str)
            .or_else(|| request.component_data.get("title").and_then(Value::as_str))
            .unwrap_or(DEFAULT_TITLE)
            .to_owned();
        let cache_key = cache_key(&spec, &node.id, &resolved);
        let timestamp = chrono::Utc::now().timestamp();

        let metadata = ComponentMetadata {
            component_spec: spec,
            component_id: node.id.clone(),
            component_data: resolved,
            page_definition: name.to_string(),
            protected: node.is_protected(),
            build_time: Some(timestamp),
        };
        let navigation = navigation_of(node);
        let load = LoadRequest {
            id: &node.id,
            title: &title,
            navigation: &navigation,
            mode: RenderMode::Content,
            metadata: &metadata,
        };
        let content = loader.load(&load).map_err(|source| match source {
            LoadError::UnsupportedMode { .. } => ContentError::UnsupportedLoadMode,
            source => ContentError::Resolve(ResolveError::Load {
                id: node.id.clone(),
                source,
            }),
        })?;

        Ok(ContentFragment {
            content,
            component_id: node.id.clone(),
            timestamp,
            cache_key,
        })
    }
}

impl std::fmt::Debug for ContentResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentResolver")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

/// Content-addressed key: MD5 of spec, id, and serialized data, NUL-separated.
fn cache_key(spec: &ComponentSpec, id: &str, data: &Value) -> String {
    let mut hasher = Md5::new();
    hasher.update(spec.to_string().as_bytes());
    hasher.update(b"\0");
    hasher.update(id.as_bytes());
    hasher.update(b"\0");
    hasher.update(data.to_string().as_bytes());
    hex::encode(hasher.finalize())
}
