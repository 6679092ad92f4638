//! Loader contract.

use serde::Serialize;
use serde_json::Value;
use tessera_definition::{ComponentSpec, NavigationConfig, SiteDefinition};

use crate::{LoadError, RenderMode};

/// Title used when component data carries none.
pub const DEFAULT_TITLE: &str = "Default Title";

/// Context handed to a component loader alongside the id and mode.
///
/// Serialized into a shell's `data-component-metadata` attribute. The
/// component data itself is never serialized, so protected content cannot
/// leak into a shell.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentMetadata {
    /// Spec the node was declared with.
    pub component_spec: ComponentSpec,
    /// Node id.
    pub component_id: String,
    /// Variant-resolved data (`Null` when the node has none).
    #[serde(skip)]
    pub component_data: Value,
    /// Page definition file the node lives in.
    pub page_definition: String,
    /// Node or navigation-level protection.
    pub protected: bool,
    /// Unix timestamp of a hydration request. Absent during page builds so
    /// built markup stays deterministic.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_time: Option<i64>,
}

/// A single component load: `(id, title, navigation, mode, metadata)`.
#[derive(Clone, Copy, Debug)]
pub struct LoadRequest<'a> {
    /// Element id.
    pub id: &'a str,
    /// Display title.
    pub title: &'a str,
    /// Normalized navigation config.
    pub navigation: &'a NavigationConfig,
    /// Requested mode.
    pub mode: RenderMode,
    /// Hydration metadata and data.
    pub metadata: &'a ComponentMetadata,
}

impl LoadRequest<'_> {
    /// Component data passed to the loader.
    #[must_use]
    pub fn data(&self) -> &Value {
        &self.metadata.component_data
    }

    /// Whether the element is protected at either level.
    #[must_use]
    pub fn is_protected(&self) -> bool {
        self.metadata.protected || self.navigation.protected
    }
}

/// Renders a component node.
///
/// Every loader answers every mode: either with markup or with
/// [`LoadError::UnsupportedMode`]. Branches are pure functions of the same
/// request, so identical requests yield identical markup.
pub trait ComponentLoader: Send + Sync {
    /// Render `request`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::UnsupportedMode`] for modes the loader has no
    /// branch for, or [`LoadError::Data`] if the data does not bind.
    fn load(&self, request: &LoadRequest<'_>) -> Result<String, LoadError>;

    /// Whether [`Self::load`] has a branch for `mode`.
    fn supports(&self, _mode: RenderMode) -> bool {
        true
    }
}

/// Wraps the already-rendered children of a container node.
pub trait ContainerLoader: Send + Sync {
    /// Wrap `children` (in document order) for container `id`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Attribute`] if the navigation config cannot be
    /// serialized.
    fn wrap(
        &self,
        id: &str,
        children: &[String],
        navigation: &NavigationConfig,
    ) -> Result<String, LoadError>;
}

/// Wraps a built page in site chrome.
pub trait SiteLoader: Send + Sync {
    /// Render the site document around `content`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] if the site definition cannot be rendered.
    fn render(&self, site: &SiteDefinition, content: &str) -> Result<String, LoadError>;
}

/// Title from `data.title`, or [`DEFAULT_TITLE`].
#[must_use]
pub fn title_of(data: &Value) -> &str {
    data.get("title")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_TITLE)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn metadata(data: Value) -> ComponentMetadata {
        ComponentMetadata {
            component_spec: "placeholder/type_1".parse().unwrap(),
            component_id: "p1".to_owned(),
            component_data: data,
            page_definition: "index.json".to_owned(),
            protected: true,
            build_time: None,
        }
    }

    #[test]
    fn test_metadata_never_serializes_data() {
        let json = serde_json::to_value(metadata(json!({"secret": "x"}))).unwrap();
        assert_eq!(
            json,
            json!({
                "componentSpec": "placeholder/type_1",
                "componentId": "p1",
                "pageDefinition": "index.json",
                "protected": true,
            })
        );
    }

    #[test]
    fn test_metadata_build_time_when_set() {
        let mut meta = metadata(Value::Null);
        meta.build_time = Some(1_700_000_000);
        let json = serde_json::to_value(meta).unwrap();
        assert_eq!(json["buildTime"], 1_700_000_000);
    }

    #[test]
    fn test_title_of() {
        assert_eq!(title_of(&json!({"title": "Hi"})), "Hi");
        assert_eq!(title_of(&json!({"title": 3})), DEFAULT_TITLE);
        assert_eq!(title_of(&Value::Null), DEFAULT_TITLE);
    }
}
