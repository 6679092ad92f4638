//! State handlers keyed by `data-nav-handler` name.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tessera_definition::NavigationConfig;
use tessera_loaders::NAV_HANDLERS;

use crate::NavigationError;
use crate::dom::{Document, DocumentExt, NodeId};

/// Applies a navigation state to one element.
///
/// Handlers only touch `element` and its subtree. Cross-element effects
/// come from the navigator issuing several instructions.
pub trait StateHandler: Send + Sync {
    /// Apply `state` with `parameters`.
    ///
    /// # Errors
    ///
    /// Returns [`NavigationError::UnsupportedState`] for states the handler
    /// has no branch for.
    fn apply(
        &self,
        document: &mut dyn Document,
        element: NodeId,
        state: &str,
        parameters: &BTreeMap<String, String>,
    ) -> Result<(), NavigationError>;
}

/// Show, hide, scroll, and toggle through `nav-visible`/`nav-hidden`
/// classes and inline `display`.
///
/// `toggle` selects the opposite of the element's default state from its
/// `data-nav-config`, so re-applying it leaves the element unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct VisibilityHandler;

impl VisibilityHandler {
    fn show(document: &mut dyn Document, element: NodeId) {
        document.remove_class(element, "nav-hidden");
        document.add_class(element, "nav-visible");
        document.set_display(element, None);
    }

    fn hide(document: &mut dyn Document, element: NodeId) {
        document.remove_class(element, "nav-visible");
        document.add_class(element, "nav-hidden");
        document.set_display(element, Some("none"));
    }

    fn starts_hidden(document: &dyn Document, element: NodeId) -> bool {
        document
            .attribute(element, "data-nav-config")
            .and_then(|raw| serde_json::from_str::<NavigationConfig>(raw).ok())
            .is_some_and(|config| config.normalized().starts_hidden())
    }
}

impl StateHandler for VisibilityHandler {
    fn apply(
        &self,
        document: &mut dyn Document,
        element: NodeId,
        state: &str,
        _parameters: &BTreeMap<String, String>,
    ) -> Result<(), NavigationError> {
        match state {
            "visible" => Self::show(document, element),
            "hidden" => Self::hide(document, element),
            "scrollTo" => {
                Self::show(document, element);
                document.scroll_into_view(element);
            }
            "toggle" => {
                if Self::starts_hidden(document, element) {
                    Self::show(document, element);
                } else {
                    Self::hide(document, element);
                }
            }
            other => {
                return Err(NavigationError::UnsupportedState {
                    id: document.id_of(element).unwrap_or_default().to_owned(),
                    state: other.to_owned(),
                });
            }
        }
        Ok(())
    }
}

/// Mapping from handler name to implementation.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn StateHandler>>,
}

impl HandlerRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with [`VisibilityHandler`] under every built-in handler name.
    #[must_use]
    pub fn with_defaults() -> Self {
        NAV_HANDLERS
            .iter()
            .fold(Self::new(), |registry, name| {
                registry.with_handler(name, VisibilityHandler)
            })
    }

    /// Register `handler` under `name`, replacing any previous one.
    #[must_use]
    pub fn with_handler<H: StateHandler + 'static>(mut self, name: &str, handler: H) -> Self {
        self.handlers.insert(name.to_owned(), Arc::new(handler));
        self
    }

    /// Handler registered under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn StateHandler> {
        self.handlers.get(name).map(AsRef::as_ref)
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("HandlerRegistry")
            .field("handlers", &names)
            .finish()
    }
}
