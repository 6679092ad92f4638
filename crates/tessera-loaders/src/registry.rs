//! Loader registry.

use std::collections::HashMap;

use tessera_definition::ComponentSpec;

use crate::builtin::{
    HeroLoader, HorizontalContainer, PlaceholderLoader, SectionTitleLoader, SummariesLoader,
    TextSectionLoader, TopBarSite, VerticalContainer,
};
use crate::{ComponentLoader, ContainerLoader, SiteLoader};

/// Explicit mapping from `type/version` to loader implementations.
///
/// Populated once at startup and shared read-only afterwards. Unknown specs
/// are reported by the caller, never guessed.
///
/// # Example
///
/// ```ignore
/// use tessera_loaders::{LoaderRegistry, PlaceholderLoader};
///
/// let registry = LoaderRegistry::new().with_component("placeholder/type_1", PlaceholderLoader);
/// assert!(registry.component(&"placeholder/type_1".parse()?).is_some());
/// ```
#[derive(Default)]
pub struct LoaderRegistry {
    components: HashMap<String, Box<dyn ComponentLoader>>,
    containers: HashMap<String, Box<dyn ContainerLoader>>,
    sites: HashMap<String, Box<dyn SiteLoader>>,
}

impl LoaderRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in loader.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new()
            .with_container("vertical/type_1", VerticalContainer)
            .with_container("horizontal/type_1", HorizontalContainer)
            .with_component("placeholder/type_1", PlaceholderLoader)
            .with_component("section_title/type_1", SectionTitleLoader)
            .with_component("text_section/type_1", TextSectionLoader)
            .with_component("summaries/type_1", SummariesLoader)
            .with_component("heros/type_1", HeroLoader)
            .with_site("top_bar/type_1", TopBarSite)
    }

    /// Register a component loader under `spec`.
    #[must_use]
    pub fn with_component<L: ComponentLoader + 'static>(mut self, spec: &str, loader: L) -> Self {
        self.components.insert(spec.to_owned(), Box::new(loader));
        self
    }

    /// Register a container loader under `spec`.
    #[must_use]
    pub fn with_container<L: ContainerLoader + 'static>(mut self, spec: &str, loader: L) -> Self {
        self.containers.insert(spec.to_owned(), Box::new(loader));
        self
    }

    /// Register a site loader under `spec`.
    #[must_use]
    pub fn with_site<L: SiteLoader + 'static>(mut self, spec: &str, loader: L) -> Self {
        self.sites.insert(spec.to_owned(), Box::new(loader));
        self
    }

    /// Component loader for `spec`.
    #[must_use]
    pub fn component(&self, spec: &ComponentSpec) -> Option<&dyn ComponentLoader> {
        self.components.get(&spec.to_string()).map(AsRef::as_ref)
    }

    /// Container loader for `spec`.
    #[must_use]
    pub fn container(&self, spec: &ComponentSpec) -> Option<&dyn ContainerLoader> {
        self.containers.get(&spec.to_string()).map(AsRef::as_ref)
    }

    /// Site loader for `spec`.
    #[must_use]
    pub fn site(&self, spec: &ComponentSpec) -> Option<&dyn SiteLoader> {
        self.sites.get(&spec.to_string()).map(AsRef::as_ref)
    }

    /// Registered component and container specs, sorted.
    #[must_use]
    pub fn specs(&self) -> Vec<&str> {
        let mut specs: Vec<&str> = self
            .components
            .keys()
            .chain(self.containers.keys())
            .chain(self.sites.keys())
            .map(String::as_str)
            .collect();
        specs.sort_unstable();
        specs
    }
}

impl std::fmt::Debug for LoaderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoaderRegistry")
            .field("specs", &self.specs())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::RenderMode;

    fn spec(s: &str) -> ComponentSpec {
        s.parse().unwrap()
    }

    #[test]
    fn test_defaults_registered() {
        let registry = LoaderRegistry::with_defaults();
        assert_eq!(
            registry.specs(),
            vec![
                "heros/type_1",
                "horizontal/type_1",
                "placeholder/type_1",
                "section_title/type_1",
                "summaries/type_1",
                "text_section/type_1",
                "top_bar/type_1",
                "vertical/type_1",
            ]
        );
    }

    #[test]
    fn test_lookup_is_per_kind() {
        let registry = LoaderRegistry::with_defaults();
        assert!(registry.component(&spec("placeholder/type_1")).is_some());
        assert!(registry.container(&spec("placeholder/type_1")).is_none());
        assert!(registry.container(&spec("vertical/type_1")).is_some());
        assert!(registry.site(&spec("top_bar/type_1")).is_some());
        assert!(registry.component(&spec("placeholder/type_2")).is_none());
    }

    #[test]
    fn test_capabilities() {
        let registry = LoaderRegistry::with_defaults();
        let hero = registry.component(&spec("heros/type_1")).unwrap();
        assert!(!hero.supports(RenderMode::Content));
        let placeholder = registry.component(&spec("placeholder/type_1")).unwrap();
        assert!(placeholder.supports(RenderMode::Content));
    }
}
