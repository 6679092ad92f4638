//! Tree resolver.
//!
//! Walks a parsed page definition and renders every node through the
//! [`LoaderRegistry`]. Containers render their children in full mode before
//! wrapping them; dynamic components become shells.

use std::sync::Arc;

use serde_json::Value;
use tessera_definition::{
    DefinitionName, NavigationConfig, Node, NodeBody, PageDefinition, SiteDefinition,
};
use tessera_loaders::{
    ComponentMetadata, LoadError, LoadRequest, LoaderRegistry, RenderMode, title_of,
};

use crate::ResolveError;

/// Renders page definitions to markup.
///
/// Stateless apart from the shared registry: the same node, mode, and data
/// always produce the same bytes.
#[derive(Clone, Debug)]
pub struct Builder {
    registry: Arc<LoaderRegistry>,
}

impl Builder {
    /// Create a builder over `registry`.
    #[must_use]
    pub fn new(registry: Arc<LoaderRegistry>) -> Self {
        Self { registry }
    }

    /// Loader registry.
    #[must_use]
    pub fn registry(&self) -> &LoaderRegistry {
        &self.registry
    }

    /// Render every root node of `page` in full mode, in document order.
    ///
    /// # Errors
    ///
    /// Returns the first [`ResolveError`] hit anywhere in the tree. No
    /// partial page is produced.
    pub fn build(
        &self,
        page: &PageDefinition,
        name: &DefinitionName,
    ) -> Result<String, ResolveError> {
        let mut out = String::new();
        for node in &page.objects {
            out.push_str(&self.resolve(node, RenderMode::Full, name)?);
            out.push('\n');
        }
        Ok(out)
    }

    /// Wrap built `content` in the chrome described by `site`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::LoaderNotFound`] if no site loader is
    /// registered for `site.site`, or [`ResolveError::Load`] if it fails.
    pub fn wrap_site(&self, site: &SiteDefinition, content: &str) -> Result<String, ResolveError> {
        let loader = self
            .registry
            .site(&site.site)
            .ok_or_else(|| ResolveError::LoaderNotFound {
                kind: "site",
                spec: site.site.clone(),
            })?;
        loader
            .render(site, content)
            .map_err(|source| ResolveError::Load {
                id: site.site.to_string(),
                source,
            })
    }

    /// Render a single node.
    ///
    /// `Full` on a dynamic component renders its shell instead. Containers
    /// have no shell or content branch of their own: `Shell` wraps children
    /// like `Full`, `Content` is an unsupported mode.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] if a loader is missing, variant data does not
    /// resolve, protected content would be inlined, a container is marked
    /// dynamic, or a loader fails.
    pub fn resolve(
        &self,
        node: &Node,
        mode: RenderMode,
        page: &DefinitionName,
    ) -> Result<String, ResolveError> {
        match &node.body {
            NodeBody::Container { objects } => self.resolve_container(node, objects, mode, page),
            NodeBody::Component { variant, data } => {
                self.resolve_component(node, variant.as_deref(), data.as_ref(), mode, page)
            }
        }
    }

    fn resolve_container(
        &self,
        node: &Node,
        objects: &[Node],
        mode: RenderMode,
        page: &DefinitionName,
    ) -> Result<String, ResolveError> {
        let loader = self
            .registry
            .container(&node.spec)
            .ok_or_else(|| ResolveError::LoaderNotFound {
                kind: "container",
                spec: node.spec.clone(),
            })?;
        // Containers have no shell, so their children would be inlined.
        if node.is_protected() {
            return Err(ResolveError::ProtectedInline(node.id.clone()));
        }
        if node.dynamic {
            return Err(ResolveError::DynamicContainer(node.id.clone()));
        }
        if mode == RenderMode::Content {
            return Err(ResolveError::Load {
                id: node.id.clone(),
                source: LoadError::UnsupportedMode {
                    spec: node.spec.clone(),
                    mode,
                },
            });
        }

        let children = objects
            .iter()
            .map(|child| self.resolve(child, RenderMode::Full, page))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            id = %node.id,
            spec = %node.spec,
            children = children.len(),
            "Wrapping container"
        );
        loader
            .wrap(&node.id, &children, &navigation_of(node))
            .map_err(|source| ResolveError::Load {
                id: node.id.clone(),
                source,
            })
    }

    fn resolve_component(
        &self,
        node: &Node,
        variant: Option<&str>,
        data: Option<&Value>,
        mode: RenderMode,
        page: &DefinitionName,
    ) -> Result<String, ResolveError> {
        let loader = self
            .registry
            .component(&node.spec)
            .ok_or_else(|| ResolveError::LoaderNotFound {
                kind: "component",
                spec: node.spec.clone(),
            })?;

        let mode = if node.dynamic && mode == RenderMode::Full {
            RenderMode::Shell
        } else {
            mode
        };
        if mode == RenderMode::Full && node.is_protected() {
            return Err(ResolveError::ProtectedInline(node.id.clone()));
        }

        let metadata = ComponentMetadata {
            component_spec: node.spec.clone(),
            component_id: node.id.clone(),
            component_data: resolve_variant(&node.id, variant, data)?,
            page_definition: page.to_string(),
            protected: node.is_protected(),
            build_time: None,
        };
        let navigation = navigation_of(node);
        let request = LoadRequest {
            id: &node.id,
            title: title_of(&metadata.component_data),
            navigation: &navigation,
            mode,
            metadata: &metadata,
        };

        tracing::debug!(id = %node.id, spec = %node.spec, %mode, "Resolving component");
        loader.load(&request).map_err(|source| ResolveError::Load {
            id: node.id.clone(),
            source,
        })
    }
}

/// Navigation config with node-level protection folded in.
pub(crate) fn navigation_of(node: &Node) -> NavigationConfig {
    let mut navigation = node.navigation.clone();
    navigation.protected |= node.protected;
    navigation
}

/// Select the payload a loader receives.
///
/// Without a variant, `data` passes through unchanged (`Null` when absent).
/// With one, `data[variant]` must exist and be an object.
pub(crate) fn resolve_variant(
    id: &str,
    variant: Option<&str>,
    data: Option<&Value>,
) -> Result<Value, ResolveError> {
    let Some(variant) = variant else {
        return Ok(data.cloned().unwrap_or(Value::Null));
    };
    let Some(Value::Object(map)) = data else {
        return Err(ResolveError::MissingData(id.to_owned()));
    };
    match map.get(variant) {
        Some(payload @ Value::Object(_)) => Ok(payload.clone()),
        Some(_) => Err(ResolveError::VariantNotObject {
            id: id.to_owned(),
            variant: variant.to_owned(),
        }),
        None => Err(ResolveError::VariantMissing {
            id: id.to_owned(),
            variant: variant.to_owned(),
        }),
    }
}
