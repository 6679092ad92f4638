//! Navigation state machine.
//!
//! A [`Navigator`] turns URL fragments into per-element state changes:
//!
//! 1. dynamic shells the new instructions will reveal are hydrated,
//! 2. elements targeted by the previous fragment are restored to their
//!    default state, unless they share a page container with the first new
//!    target,
//! 3. each instruction is dispatched to its element's handler, followed by
//!    default states for untargeted navigable descendants,
//! 4. tab links are highlighted from the fragment's tab token.
//!
//! Protected elements are neither hydrated nor dispatched while the session
//! is unauthenticated. An empty fragment restores every element.

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;
use serde_json::Value;
use tessera_definition::{Fragment, NavInstruction, NavigationConfig, build_fragment};
use tessera_loaders::{HORIZONTAL_HANDLER, VERTICAL_HANDLER};

use crate::dom::{Document, DocumentExt, NodeId};
use crate::fetch::{ContentFetcher, ContentResponse, HydrationRequest};
use crate::handler::HandlerRegistry;
use crate::store::{ClientStore, StoredFragment};
use crate::{FetchError, NavigationError};

const LOAD_STATE: &str = "data-load-state";

/// Why an instruction was not applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// No element with the target id.
    Missing,
    /// Protected element, unauthenticated session.
    Protected,
    /// Element has no registered handler.
    NoHandler,
    /// State is not in the element's `allowedStates`.
    StateNotAllowed,
    /// Handler rejected the state.
    UnsupportedState,
}

/// An instruction the navigator did not apply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Skipped {
    /// Target id.
    pub target: String,
    /// Why.
    pub reason: SkipReason,
}

/// Result of hydrating one shell.
#[derive(Debug)]
pub enum HydrationOutcome {
    /// Content injected; the element is `loaded`.
    Injected {
        /// Element id.
        id: String,
        /// `data-init-hook` to run after injection.
        init_hook: Option<String>,
        /// Served from the [`ClientStore`] without a fetch.
        from_cache: bool,
    },
    /// Hydration failed; the element shows its error placeholder.
    Failed {
        /// Element id.
        id: String,
        /// Cause.
        error: NavigationError,
    },
    /// A newer hydration of the same element superseded this one.
    Discarded {
        /// Element id.
        id: String,
    },
}

impl HydrationOutcome {
    /// Element the outcome belongs to.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Injected { id, .. } | Self::Failed { id, .. } | Self::Discarded { id } => id,
        }
    }
}

/// What one navigation did.
#[derive(Debug, Default)]
pub struct NavigationReport {
    /// Targets dispatched, in fragment order.
    pub applied: Vec<String>,
    /// Targets not dispatched.
    pub skipped: Vec<Skipped>,
    /// Hydrations performed before dispatch.
    pub hydrations: Vec<HydrationOutcome>,
}

/// An in-flight hydration.
///
/// Only the most recently issued ticket for an element may complete it.
#[derive(Clone, Debug)]
pub struct HydrationTicket {
    id: String,
    generation: u64,
    request: HydrationRequest,
}

impl HydrationTicket {
    /// Element being hydrated.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Request to send to the endpoint.
    #[must_use]
    pub fn request(&self) -> &HydrationRequest {
        &self.request
    }
}

/// Shell metadata as embedded in `data-component-metadata`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShellMetadata {
    component_spec: String,
    component_id: String,
    page_definition: String,
}

#[derive(Clone, Debug)]
struct Registered {
    id: String,
    handler: String,
    config: NavigationConfig,
}

/// Headless navigation synchronizer over a [`Document`].
pub struct Navigator<D, F> {
    document: D,
    fetcher: F,
    handlers: HandlerRegistry,
    registered: Vec<Registered>,
    store: ClientStore,
    current: Vec<NavInstruction>,
    location: String,
    generations: HashMap<String, u64>,
    next_generation: u64,
    authenticated: bool,
}

impl<D: Document, F: ContentFetcher> Navigator<D, F> {
    /// Create a navigator with the built-in handlers.
    pub fn new(document: D, fetcher: F) -> Self {
        Self::with_handlers(document, fetcher, HandlerRegistry::with_defaults())
    }

    /// Create a navigator with custom handlers.
    pub fn with_handlers(document: D, fetcher: F, handlers: HandlerRegistry) -> Self {
        let mut navigator = Self {
            document,
            fetcher,
            handlers,
            registered: Vec::new(),
            store: ClientStore::new(),
            current: Vec::new(),
            location: String::new(),
            generations: HashMap::new(),
            next_generation: 0,
            authenticated: false,
        };
        navigator.discover();
        navigator
    }

    /// Start with a pre-populated client store.
    #[must_use]
    pub fn with_store(mut self, store: ClientStore) -> Self {
        self.store = store;
        self
    }

    /// Set whether the client session is authenticated.
    #[must_use]
    pub fn with_authenticated(mut self, authenticated: bool) -> Self {
        self.authenticated = authenticated;
        self
    }

    /// Update the session state after login or logout.
    pub fn set_authenticated(&mut self, authenticated: bool) {
        self.authenticated = authenticated;
    }

    /// The document.
    #[must_use]
    pub fn document(&self) -> &D {
        &self.document
    }

    /// Hydrated fragments.
    #[must_use]
    pub fn store(&self) -> &ClientStore {
        &self.store
    }

    /// Instructions of the last navigation.
    #[must_use]
    pub fn current_state(&self) -> &[NavInstruction] {
        &self.current
    }

    /// Normalized fragment of the last navigation, without `#`.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Whether the last navigation put `id` in `state`.
    #[must_use]
    pub fn is_in_state(&self, id: &str, state: &str) -> bool {
        self.current
            .iter()
            .any(|i| i.target == id && i.state == state)
    }

    /// Ids of elements with a usable handler, in document order.
    #[must_use]
    pub fn registered_ids(&self) -> Vec<&str> {
        self.registered.iter().map(|r| r.id.as_str()).collect()
    }

    /// Navigate to `raw` (with or without `#`), as on a fragment change.
    pub async fn apply_fragment(&mut self, raw: &str) -> NavigationReport {
        let raw = raw.strip_prefix('#').unwrap_or(raw);
        if raw.is_empty() {
            return self.restore_all();
        }

        let fragment = Fragment::parse(raw);
        let mut report = NavigationReport::default();
        let previous = std::mem::take(&mut self.current);

        for instruction in &fragment.instructions {
            if instruction.state == "hidden" {
                continue;
            }
            for id in self.hydration_targets(&instruction.target) {
                report.hydrations.push(self.hydrate(&id).await);
            }
        }

        self.restore_previous(&previous, &fragment.instructions);

        for instruction in &fragment.instructions {
            self.apply_instruction(instruction, &fragment.instructions, &mut report);
        }

        self.location = fragment.to_string();
        self.current = fragment.instructions;
        self.highlight_tab(fragment.tab.as_deref());
        report
    }

    /// Set one target's state on top of the current navigation.
    pub async fn navigate(
        &mut self,
        target: &str,
        state: &str,
        parameters: BTreeMap<String, String>,
        tab: Option<&str>,
    ) -> NavigationReport {
        let mut instructions = self.current.clone();
        let instruction = NavInstruction {
            target: target.to_owned(),
            state: state.to_owned(),
            parameters,
        };
        match instructions.iter_mut().find(|i| i.target == target) {
            Some(existing) => *existing = instruction,
            None => instructions.push(instruction),
        }
        let fragment = build_fragment(&instructions, tab);
        self.apply_fragment(&fragment).await
    }

    /// Replace the navigation with `instructions`, applied in the given order.
    ///
    /// List containers before their descendants so nothing is revealed
    /// inside a still-hidden container.
    pub async fn navigate_multiple(
        &mut self,
        instructions: &[NavInstruction],
        tab: Option<&str>,
    ) -> NavigationReport {
        let fragment = build_fragment(instructions, tab);
        self.apply_fragment(&fragment).await
    }

    /// Hydrate the shell `id` through the fetcher.
    ///
    /// Fragments already in the client store are injected without a fetch.
    pub async fn hydrate(&mut self, id: &str) -> HydrationOutcome {
        let cached = match self.shell(id) {
            Ok(_) => self.store.get(id).cloned(),
            Err(error) => {
                return HydrationOutcome::Failed {
                    id: id.to_owned(),
                    error,
                };
            }
        };
        if let Some(stored) = cached {
            self.supersede(id);
            return match self.inject(id, &stored.content, &stored.cache_key, true) {
                Ok(init_hook) => HydrationOutcome::Injected {
                    id: id.to_owned(),
                    init_hook,
                    from_cache: true,
                },
                Err(error) => self.fail(id, error),
            };
        }

        let ticket = match self.begin_hydration(id) {
            Ok(ticket) => ticket,
            Err(error) => {
                return HydrationOutcome::Failed {
                    id: id.to_owned(),
                    error,
                };
            }
        };
        let result = self.fetcher.fetch(&ticket.request).await;
        self.complete_hydration(ticket, result)
    }

    /// Mark `id` as loading and issue a ticket for it.
    ///
    /// Any earlier ticket for `id` becomes stale.
    ///
    /// # Errors
    ///
    /// Returns [`NavigationError`] if the element is missing, not a shell,
    /// already loaded, or carries unreadable metadata. Unreadable metadata
    /// also puts the element in its `failed` state.
    pub fn begin_hydration(&mut self, id: &str) -> Result<HydrationTicket, NavigationError> {
        let node = self.shell(id)?;
        let metadata = match self.read_metadata(node, id) {
            Ok(metadata) => metadata,
            Err(error) => {
                self.mark_failed(node);
                return Err(error);
            }
        };

        let request = HydrationRequest {
            component_spec: metadata.component_spec,
            component_id: metadata.component_id,
            component_data: Value::Object(serde_json::Map::new()),
            page_definition: metadata.page_definition,
        };
        let generation = self.supersede(id);

        self.document.set_attribute(node, LOAD_STATE, "loading");
        if let Some(indicator) = self.document.find_by_class(node, "loading-indicator") {
            self.document.set_display(indicator, Some("block"));
        }
        tracing::debug!(id, generation, "Hydration started");

        Ok(HydrationTicket {
            id: id.to_owned(),
            generation,
            request,
        })
    }

    /// Apply the response for `ticket`.
    ///
    /// A stale ticket is discarded without touching the document.
    pub fn complete_hydration(
        &mut self,
        ticket: HydrationTicket,
        result: Result<ContentResponse, FetchError>,
    ) -> HydrationOutcome {
        if self.generations.get(&ticket.id) != Some(&ticket.generation) {
            tracing::debug!(id = %ticket.id, generation = ticket.generation, "Discarded stale hydration");
            return HydrationOutcome::Discarded { id: ticket.id };
        }

        let response = match result {
            Ok(response) if response.component_id == ticket.id => response,
            Ok(response) => {
                let error = FetchError::Decode(format!(
                    "response for {}, expected {}",
                    response.component_id, ticket.id
                ));
                return self.fail(&ticket.id, error.into());
            }
            Err(error) => return self.fail(&ticket.id, error.into()),
        };

        match self.inject(&ticket.id, &response.content, &response.cache_key, false) {
            Ok(init_hook) => HydrationOutcome::Injected {
                id: ticket.id,
                init_hook,
                from_cache: false,
            },
            Err(error) => self.fail(&ticket.id, error),
        }
    }

    /// Record elements whose handler is registered, with their configs.
    fn discover(&mut self) {
        let mut registered = Vec::new();
        for node in self.document.elements() {
            let (Some(id), Some(handler)) = (
                self.document.id_of(node),
                self.document.attribute(node, "data-nav-handler"),
            ) else {
                continue;
            };
            if self.handlers.get(handler).is_none() {
                tracing::warn!(id, handler, "Handler not found");
                continue;
            }
            let config = match self.document.attribute(node, "data-nav-config") {
                Some(raw) => serde_json::from_str::<NavigationConfig>(raw)
                    .map(NavigationConfig::normalized)
                    .unwrap_or_else(|e| {
                        tracing::warn!(id, error = %e, "Invalid nav config");
                        NavigationConfig::default()
                    }),
                None => NavigationConfig::default(),
            };
            registered.push(Registered {
                id: id.to_owned(),
                handler: handler.to_owned(),
                config,
            });
        }
        tracing::debug!(count = registered.len(), "Discovered navigation handlers");
        self.registered = registered;
    }

    fn is_blocked(&self, node: NodeId) -> bool {
        !self.authenticated && self.document.attribute(node, "data-protected") == Some("true")
    }

    /// Shells to hydrate before revealing `target`: the target itself and
    /// its dynamic descendants, minus loaded and blocked ones.
    fn hydration_targets(&self, target: &str) -> Vec<String> {
        let Some(node) = self.document.element_by_id(target) else {
            return Vec::new();
        };
        if self.is_blocked(node) {
            return Vec::new();
        }
        std::iter::once(node)
            .chain(self.document.descendants(node))
            .filter(|&n| {
                self.document.attribute(n, "data-dynamic") == Some("true")
                    && self.document.attribute(n, LOAD_STATE) != Some("loaded")
                    && !self.is_blocked(n)
            })
            .filter_map(|n| self.document.id_of(n).map(str::to_owned))
            .collect()
    }

    /// Nearest vertical or horizontal container, `node` included.
    fn page_container(&self, node: NodeId) -> Option<NodeId> {
        self.document.closest(node, |doc, n| {
            matches!(
                doc.attribute(n, "data-nav-handler"),
                Some(VERTICAL_HANDLER | HORIZONTAL_HANDLER)
            )
        })
    }

    fn restore_previous(&mut self, previous: &[NavInstruction], next: &[NavInstruction]) {
        let next_container = next.iter().find_map(|i| {
            let node = self.document.element_by_id(&i.target)?;
            self.page_container(node)
        });

        for instruction in previous {
            if next.iter().any(|i| i.target == instruction.target) {
                continue;
            }
            if let Some(container) = next_container
                && let Some(node) = self.document.element_by_id(&instruction.target)
                && self.page_container(node) == Some(container)
            {
                continue;
            }
            self.restore_default(&instruction.target);
        }
    }

    fn restore_all(&mut self) -> NavigationReport {
        let ids: Vec<String> = self.registered.iter().map(|r| r.id.clone()).collect();
        for id in &ids {
            self.restore_default(id);
        }
        self.current.clear();
        self.location.clear();
        self.highlight_tab(None);
        NavigationReport::default()
    }

    fn restore_default(&mut self, id: &str) {
        let Some(entry) = self.registered.iter().find(|r| r.id == id) else {
            return;
        };
        let state = entry.config.default_state.clone();
        let parameters = entry.config.initial_parameters.clone();
        if let Err(reason) = self.dispatch(id, &state, &parameters) {
            tracing::debug!(id, state = %state, ?reason, "Default state not applied");
        }
    }

    fn apply_instruction(
        &mut self,
        instruction: &NavInstruction,
        all: &[NavInstruction],
        report: &mut NavigationReport,
    ) {
        let target = instruction.target.as_str();
        let skip = |reason| Skipped {
            target: target.to_owned(),
            reason,
        };

        let Some(node) = self.document.element_by_id(target) else {
            tracing::warn!(target, "Navigation target not found");
            report.skipped.push(skip(SkipReason::Missing));
            return;
        };
        if self.is_blocked(node) {
            tracing::warn!(target, "Blocked navigation to protected element without auth");
            report.skipped.push(skip(SkipReason::Protected));
            return;
        }
        if let Err(reason) = self.dispatch(target, &instruction.state, &instruction.parameters) {
            report.skipped.push(skip(reason));
            return;
        }
        report.applied.push(target.to_owned());

        let children: Vec<String> = self
            .document
            .descendants(node)
            .into_iter()
            .filter(|&n| !self.is_blocked(n))
            .filter_map(|n| self.document.id_of(n))
            .filter(|id| all.iter().all(|i| i.target != *id))
            .filter(|id| self.registered.iter().any(|r| r.id == *id))
            .map(str::to_owned)
            .collect();
        for child in &children {
            self.restore_default(child);
        }
    }

    fn dispatch(
        &mut self,
        id: &str,
        state: &str,
        parameters: &BTreeMap<String, String>,
    ) -> Result<(), SkipReason> {
        let Some(entry) = self.registered.iter().find(|r| r.id == id) else {
            tracing::warn!(id, "No handler registered for element");
            return Err(SkipReason::NoHandler);
        };
        if !entry.config.allows(state) {
            tracing::warn!(id, state, "State not allowed");
            return Err(SkipReason::StateNotAllowed);
        }
        let Some(handler) = self.handlers.get(&entry.handler) else {
            return Err(SkipReason::NoHandler);
        };
        let Some(node) = self.document.element_by_id(id) else {
            return Err(SkipReason::Missing);
        };
        match handler.apply(&mut self.document, node, state, parameters) {
            Ok(()) => {
                tracing::debug!(id, state, "Navigation applied");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(id, state, error = %e, "Handler rejected state");
                Err(SkipReason::UnsupportedState)
            }
        }
    }

    /// Mark the `nav-link` for `tab` active. Without a tab token, the
    /// `parentTab` of the first registered element that is not hidden
    /// decides.
    fn highlight_tab(&mut self, tab: Option<&str>) {
        let tab = tab.map(str::to_owned).or_else(|| self.visible_parent_tab());
        let tab = tab.as_deref();
        let links: Vec<NodeId> = self
            .document
            .elements()
            .into_iter()
            .filter(|&n| self.document.has_class(n, "nav-link"))
            .collect();
        for link in links {
            let tab_id = self
                .document
                .attribute(link, "data-tab-id")
                .or_else(|| self.document.attribute(link, "data-target"));
            if tab.is_some() && tab_id == tab {
                self.document.add_class(link, "active");
            } else {
                self.document.remove_class(link, "active");
            }
        }
    }

    fn visible_parent_tab(&self) -> Option<String> {
        self.registered.iter().find_map(|entry| {
            let tab = entry.config.parent_tab.as_deref()?;
            let node = self.document.element_by_id(&entry.id)?;
            (!self.document.has_class(node, "nav-hidden")).then(|| tab.to_owned())
        })
    }

    /// Invalidate outstanding tickets for `id` and return the new generation.
    fn supersede(&mut self, id: &str) -> u64 {
        self.next_generation += 1;
        self.generations.insert(id.to_owned(), self.next_generation);
        self.next_generation
    }

    /// Inject `content` into the shell's content container.
    fn inject(
        &mut self,
        id: &str,
        content: &str,
        cache_key: &str,
        from_cache: bool,
    ) -> Result<Option<String>, NavigationError> {
        let node = self
            .document
            .element_by_id(id)
            .ok_or_else(|| NavigationError::ElementNotFound(id.to_owned()))?;
        let container = self
            .document
            .find_by_class(node, "dynamic-content-container")
            .ok_or_else(|| NavigationError::MissingContainer(id.to_owned()))?;

        for class in ["loading-indicator", "error-placeholder"] {
            if let Some(slot) = self.document.find_by_class(node, class) {
                self.document.set_display(slot, Some("none"));
            }
        }
        self.document.set_inner_html(container, content)?;
        self.document.set_attribute(node, LOAD_STATE, "loaded");

        let protected = self.document.attribute(node, "data-protected") == Some("true");
        if !protected && !from_cache {
            self.store.insert(
                id,
                StoredFragment {
                    cache_key: cache_key.to_owned(),
                    content: content.to_owned(),
                },
            );
        }
        let init_hook = self
            .document
            .attribute(node, "data-init-hook")
            .map(str::to_owned);

        self.discover();
        tracing::debug!(id, from_cache, "Dynamic content injected");
        Ok(init_hook)
    }

    /// Log `error` and put the shell in its terminal error state.
    fn fail(&mut self, id: &str, error: NavigationError) -> HydrationOutcome {
        tracing::warn!(id, error = %error, "Failed to load dynamic content");
        if let Some(node) = self.document.element_by_id(id) {
            self.mark_failed(node);
        }
        HydrationOutcome::Failed {
            id: id.to_owned(),
            error,
        }
    }

    fn mark_failed(&mut self, node: NodeId) {
        self.document.set_attribute(node, LOAD_STATE, "failed");
        if let Some(indicator) = self.document.find_by_class(node, "loading-indicator") {
            self.document.set_display(indicator, Some("none"));
        }
        if let Some(placeholder) = self.document.find_by_class(node, "error-placeholder") {
            self.document.set_display(placeholder, Some("block"));
        }
    }

    /// A dynamic shell that is not yet loaded.
    fn shell(&self, id: &str) -> Result<NodeId, NavigationError> {
        let node = self
            .document
            .element_by_id(id)
            .ok_or_else(|| NavigationError::ElementNotFound(id.to_owned()))?;
        if self.document.attribute(node, "data-dynamic") != Some("true") {
            return Err(NavigationError::NotDynamic(id.to_owned()));
        }
        if self.document.attribute(node, LOAD_STATE) == Some("loaded") {
            return Err(NavigationError::AlreadyLoaded(id.to_owned()));
        }
        Ok(node)
    }

    fn read_metadata(&self, node: NodeId, id: &str) -> Result<ShellMetadata, NavigationError> {
        let invalid = |message: String| NavigationError::InvalidMetadata {
            id: id.to_owned(),
            message,
        };
        let raw = self
            .document
            .attribute(node, "data-component-metadata")
            .ok_or_else(|| invalid("attribute missing".to_owned()))?;
        serde_json::from_str(raw).map_err(|e| invalid(e.to_string()))
    }
}

impl<D, F> std::fmt::Debug for Navigator<D, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Navigator")
            .field("location", &self.location)
            .field("registered", &self.registered.len())
            .field("authenticated", &self.authenticated)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use pretty_assertions::assert_eq;
    use tessera_definition::{DefinitionName, MockDefinitionStore};
    use tessera_loaders::LoaderRegistry;
    use tessera_site::{ContentError, ContentRequest, Site};

    use super::*;
    use crate::MemoryDocument;

    const PAGE: &str = r#"{"objects":[
        {"id":"main","container":"vertical/type_1","parentTab":"main","objects":[
            {"id":"intro","component":"placeholder/type_1","data":{"title":"Intro"}},
            {"id":"about","component":"placeholder/type_1","dynamic":true,"variant":"en","data":{"en":{"title":"About"}}},
            {"id":"vault","component":"placeholder/type_1","dynamic":true,"protected":true,"variant":"en","data":{"en":{"title":"Vault"}}}
        ]},
        {"id":"side","container":"horizontal/type_1","parentTab":"side","objects":[
            {"id":"notes","component":"placeholder/type_1","navigation":{"defaultState":"hidden"},"data":{"title":"Notes"}},
            {"id":"summary","component":"summaries/type_1","dynamic":true,"variant":"en","data":{"en":{"highlightTitle":"Lead"}}}
        ]}
    ]}"#;

    const CHROME: &str = r#"{"site":"top_bar/type_1","title":"Portfolio","navigationTabs":[
        {"label":"Main","target":"main"},
        {"label":"Side","target":"side"}
    ]}"#;

    const EAGER: &str = r#"{"objects":[
        {"id":"about","component":"placeholder/type_1","variant":"en","data":{"en":{"title":"About"}}}
    ]}"#;

    /// Serves requests through a [`Site`], the way the endpoint does.
    struct ResolverFetcher {
        site: Site,
        authenticated: bool,
        calls: Arc<AtomicUsize>,
    }

    impl ContentFetcher for ResolverFetcher {
        async fn fetch(&self, request: &HydrationRequest) -> Result<ContentResponse, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let body = serde_json::to_vec(request).unwrap();
            let request = ContentRequest::from_slice(&body).map_err(rejected)?;
            let fragment = self
                .site
                .resolve_content(&request, self.authenticated)
                .map_err(rejected)?;
            Ok(ContentResponse {
                content: fragment.content,
                component_id: fragment.component_id,
                cache_key: fragment.cache_key,
            })
        }
    }

    fn rejected(error: ContentError) -> FetchError {
        FetchError::Rejected {
            status: 400,
            message: error.to_string(),
        }
    }

    struct FailingFetcher;

    impl ContentFetcher for FailingFetcher {
        async fn fetch(&self, _request: &HydrationRequest) -> Result<ContentResponse, FetchError> {
            Err(FetchError::Rejected {
                status: 500,
                message: "boom".to_owned(),
            })
        }
    }

    fn site() -> Site {
        let store = MockDefinitionStore::new()
            .with_definition("index.json", PAGE)
            .with_definition("eager.json", EAGER)
            .with_definition("site.json", CHROME);
        Site::new(Arc::new(store), Arc::new(LoaderRegistry::with_defaults()))
            .with_chrome(DefinitionName::parse("site.json").unwrap())
    }

    fn page(site: &Site, name: &str) -> MemoryDocument {
        MemoryDocument::parse(&site.build_page(name, false).unwrap()).unwrap()
    }

    fn navigator(authenticated: bool) -> (Navigator<MemoryDocument, ResolverFetcher>, Arc<AtomicUsize>) {
        let site = site();
        let calls = Arc::new(AtomicUsize::new(0));
        let fetcher = ResolverFetcher {
            site: site.clone(),
            authenticated,
            calls: Arc::clone(&calls),
        };
        let navigator =
            Navigator::new(page(&site, "index.json"), fetcher).with_authenticated(authenticated);
        (navigator, calls)
    }

    /// Navigator over the index page wrapped in its tab bar.
    fn chrome_navigator() -> Navigator<MemoryDocument, ResolverFetcher> {
        let site = site();
        let html = site.build_page("index.json", true).unwrap();
        let fetcher = ResolverFetcher {
            site,
            authenticated: false,
            calls: Arc::new(AtomicUsize::new(0)),
        };
        Navigator::new(MemoryDocument::parse(&html).unwrap(), fetcher)
    }

    fn active_tabs<F: ContentFetcher>(navigator: &Navigator<MemoryDocument, F>) -> Vec<&str> {
        let document = navigator.document();
        document
            .elements()
            .into_iter()
            .filter(|&n| document.has_class(n, "nav-link") && document.has_class(n, "active"))
            .filter_map(|n| document.attribute(n, "data-tab-id"))
            .collect()
    }

    fn node<D: Document, F: ContentFetcher>(navigator: &Navigator<D, F>, id: &str) -> NodeId {
        navigator.document().element_by_id(id).unwrap()
    }

    fn load_state<'a, F: ContentFetcher>(
        navigator: &'a Navigator<MemoryDocument, F>,
        id: &str,
    ) -> Option<&'a str> {
        navigator
            .document()
            .attribute(node(navigator, id), LOAD_STATE)
    }

    fn slot<F: ContentFetcher>(
        navigator: &Navigator<MemoryDocument, F>,
        id: &str,
        class: &str,
    ) -> NodeId {
        navigator
            .document()
            .find_by_class(node(navigator, id), class)
            .unwrap()
    }

    #[tokio::test]
    async fn test_scroll_target_hydrates_then_scrolls() {
        let (mut nav, calls) = navigator(false);
        let report = nav.apply_fragment("#about/scrollTo").await;

        assert_eq!(report.applied, vec!["about"]);
        assert!(report.skipped.is_empty());
        assert!(matches!(
            &report.hydrations[..],
            [HydrationOutcome::Injected { id, from_cache: false, .. }] if id == "about"
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let about = node(&nav, "about");
        let container = slot(&nav, "about", "dynamic-content-container");
        assert_eq!(nav.document().text_content(container), "About");
        assert_eq!(load_state(&nav, "about"), Some("loaded"));
        assert!(nav.document().is_display_none(slot(&nav, "about", "loading-indicator")));
        assert_eq!(nav.document().scrolled(), &[about]);
        assert_eq!(nav.location(), "about/scrollTo");
        assert!(nav.is_in_state("about", "scrollTo"));
        assert_eq!(nav.store().len(), 1);
    }

    #[tokio::test]
    async fn test_reapplying_fragment_is_idempotent() {
        let (mut nav, calls) = navigator(false);
        nav.apply_fragment("#about/visible|notes/visible").await;
        let first = nav.document().to_html();

        let report = nav.apply_fragment("#about/visible|notes/visible").await;
        assert!(report.hydrations.is_empty());
        assert_eq!(nav.document().to_html(), first);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_protected_target_blocked_without_auth() {
        let (mut nav, calls) = navigator(false);
        let report = nav.apply_fragment("#vault/visible").await;

        assert_eq!(
            report.skipped,
            vec![Skipped {
                target: "vault".to_owned(),
                reason: SkipReason::Protected,
            }]
        );
        assert!(report.hydrations.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(load_state(&nav, "vault"), Some("not-loaded"));
    }

    #[tokio::test]
    async fn test_protected_target_loads_with_auth_but_is_not_stored() {
        let (mut nav, _) = navigator(true);
        let report = nav.apply_fragment("#vault/visible").await;

        assert_eq!(report.applied, vec!["vault"]);
        assert_eq!(load_state(&nav, "vault"), Some("loaded"));
        assert!(nav.store().get("vault").is_none());
    }

    #[tokio::test]
    async fn test_failed_fetch_shows_error_placeholder() {
        let site = site();
        let mut nav = Navigator::new(page(&site, "index.json"), FailingFetcher);
        let report = nav.apply_fragment("#about/visible").await;

        assert!(matches!(
            &report.hydrations[..],
            [HydrationOutcome::Failed { id, error: NavigationError::Fetch(_) }] if id == "about"
        ));
        assert_eq!(report.applied, vec!["about"]);
        assert_eq!(load_state(&nav, "about"), Some("failed"));
        assert!(!nav.document().is_display_none(slot(&nav, "about", "error-placeholder")));
        assert!(nav.document().is_display_none(slot(&nav, "about", "loading-indicator")));
        assert!(nav.store().is_empty());
    }

    #[test]
    fn test_stale_ticket_is_discarded() {
        let site = site();
        let mut nav = Navigator::new(page(&site, "index.json"), FailingFetcher);
        let response = |content: &str| ContentResponse {
            content: content.to_owned(),
            component_id: "about".to_owned(),
            cache_key: "k".to_owned(),
        };

        let first = nav.begin_hydration("about").unwrap();
        let second = nav.begin_hydration("about").unwrap();
        assert_eq!(first.request().component_spec, "placeholder/type_1");
        assert_eq!(first.request().page_definition, "index.json");
        assert_eq!(load_state(&nav, "about"), Some("loading"));

        let outcome = nav.complete_hydration(first, Ok(response("<p>stale</p>")));
        assert!(matches!(outcome, HydrationOutcome::Discarded { .. }));
        assert_eq!(load_state(&nav, "about"), Some("loading"));

        let outcome = nav.complete_hydration(second, Ok(response("<p>fresh</p>")));
        assert!(matches!(outcome, HydrationOutcome::Injected { .. }));
        let container = slot(&nav, "about", "dynamic-content-container");
        assert_eq!(nav.document().inner_html(container), "<p>fresh</p>");
    }

    #[test]
    fn test_mismatched_response_fails() {
        let site = site();
        let mut nav = Navigator::new(page(&site, "index.json"), FailingFetcher);
        let ticket = nav.begin_hydration("about").unwrap();
        let outcome = nav.complete_hydration(
            ticket,
            Ok(ContentResponse {
                content: "<p>x</p>".to_owned(),
                component_id: "intro".to_owned(),
                cache_key: "k".to_owned(),
            }),
        );
        assert!(matches!(
            outcome,
            HydrationOutcome::Failed {
                error: NavigationError::Fetch(FetchError::Decode(_)),
                ..
            }
        ));
        assert_eq!(load_state(&nav, "about"), Some("failed"));
    }

    #[test]
    fn test_begin_hydration_rejects_non_shells() {
        let site = site();
        let mut nav = Navigator::new(page(&site, "index.json"), FailingFetcher);
        assert!(matches!(
            nav.begin_hydration("intro"),
            Err(NavigationError::NotDynamic(_))
        ));
        assert!(matches!(
            nav.begin_hydration("ghost"),
            Err(NavigationError::ElementNotFound(_))
        ));
    }

    #[test]
    fn test_invalid_metadata_marks_failed() {
        let doc = MemoryDocument::parse(
            r#"<div id="x" data-dynamic="true" data-nav-handler="handlePlaceholderNavigation" data-component-metadata="{oops"><div class="error-placeholder" style="display: none;"></div></div>"#,
        )
        .unwrap();
        let mut nav = Navigator::new(doc, FailingFetcher);
        let err = nav.begin_hydration("x").unwrap_err();
        assert!(matches!(err, NavigationError::InvalidMetadata { ref id, .. } if id == "x"));
        assert_eq!(load_state(&nav, "x"), Some("failed"));
        assert!(!nav.document().is_display_none(slot(&nav, "x", "error-placeholder")));
    }

    #[tokio::test]
    async fn test_previous_target_restored_across_containers() {
        let (mut nav, _) = navigator(false);
        nav.apply_fragment("#notes/visible").await;
        assert!(!nav.document().is_display_none(node(&nav, "notes")));

        nav.apply_fragment("#intro/visible").await;
        assert!(nav.document().is_display_none(node(&nav, "notes")));
        assert!(nav.document().has_class(node(&nav, "notes"), "nav-hidden"));
    }

    #[tokio::test]
    async fn test_previous_target_kept_within_same_container() {
        let (mut nav, _) = navigator(false);
        nav.apply_fragment("#notes/visible").await;
        nav.apply_fragment("#summary/visible").await;
        assert!(!nav.document().is_display_none(node(&nav, "notes")));
        assert_eq!(nav.current_state().len(), 1);
    }

    #[tokio::test]
    async fn test_container_target_resets_children() {
        let (mut nav, _) = navigator(false);
        nav.apply_fragment("#notes/visible").await;
        let report = nav.apply_fragment("#side/visible").await;

        assert_eq!(report.applied, vec!["side"]);
        assert!(nav.document().is_display_none(node(&nav, "notes")));
        // Dynamic descendants of the target are hydrated with it.
        assert_eq!(load_state(&nav, "summary"), Some("loaded"));
    }

    #[tokio::test]
    async fn test_hidden_target_is_not_hydrated() {
        let (mut nav, calls) = navigator(false);
        let report = nav.apply_fragment("#about/hidden").await;
        assert_eq!(report.applied, vec!["about"]);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(load_state(&nav, "about"), Some("not-loaded"));
    }

    #[tokio::test]
    async fn test_missing_target_skipped_others_applied() {
        let (mut nav, _) = navigator(false);
        let report = nav.apply_fragment("#ghost/visible|intro/hidden").await;
        assert_eq!(report.applied, vec!["intro"]);
        assert_eq!(
            report.skipped,
            vec![Skipped {
                target: "ghost".to_owned(),
                reason: SkipReason::Missing,
            }]
        );
        assert!(nav.document().is_display_none(node(&nav, "intro")));
    }

    #[tokio::test]
    async fn test_disallowed_and_unknown_states_skipped() {
        let doc = MemoryDocument::parse(
            r#"<div><div id="x" data-nav-handler="handlePlaceholderNavigation" data-nav-config="{&quot;allowedStates&quot;:[&quot;visible&quot;,&quot;hidden&quot;]}"></div><div id="y" data-nav-handler="handlePlaceholderNavigation" data-nav-config="{&quot;allowedStates&quot;:[&quot;visible&quot;,&quot;expand&quot;]}"></div><div id="z" data-nav-handler="handleMissingNavigation"></div></div>"#,
        )
        .unwrap();
        let mut nav = Navigator::new(doc, FailingFetcher);
        assert_eq!(nav.registered_ids(), vec!["x", "y"]);

        let report = nav.apply_fragment("x/toggle|y/expand|z/visible").await;
        let reasons: Vec<(&str, SkipReason)> = report
            .skipped
            .iter()
            .map(|s| (s.target.as_str(), s.reason))
            .collect();
        assert_eq!(
            reasons,
            vec![
                ("x", SkipReason::StateNotAllowed),
                ("y", SkipReason::UnsupportedState),
                ("z", SkipReason::NoHandler),
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_fragment_restores_everything() {
        let (mut nav, _) = navigator(false);
        nav.apply_fragment("#notes/visible|intro/hidden.about").await;
        assert_eq!(nav.location(), "notes/visible|intro/hidden.about");

        nav.apply_fragment("#").await;
        assert!(nav.document().is_display_none(node(&nav, "notes")));
        assert!(!nav.document().is_display_none(node(&nav, "intro")));
        assert!(nav.current_state().is_empty());
        assert_eq!(nav.location(), "");
    }

    #[tokio::test]
    async fn test_tab_links_highlighted() {
        let doc = MemoryDocument::parse(
            r#"<body><nav><a class="nav-link" data-tab-id="home">Home</a><a class="nav-link" data-target="work">Work</a></nav><div id="work" data-nav-handler="handlePlaceholderNavigation"></div></body>"#,
        )
        .unwrap();
        let mut nav = Navigator::new(doc, FailingFetcher);
        let links: Vec<NodeId> = nav
            .document()
            .elements()
            .into_iter()
            .filter(|&n| nav.document().has_class(n, "nav-link"))
            .collect();
        let active = |nav: &Navigator<MemoryDocument, FailingFetcher>| -> Vec<bool> {
            links
                .iter()
                .map(|&l| nav.document().has_class(l, "active"))
                .collect()
        };

        nav.apply_fragment("#work/visible.work").await;
        assert_eq!(active(&nav), vec![false, true]);

        nav.apply_fragment("#work/visible.home").await;
        assert_eq!(active(&nav), vec![true, false]);

        nav.apply_fragment("").await;
        assert_eq!(active(&nav), vec![false, false]);
    }

    #[tokio::test]
    async fn test_container_then_hidden_child_scrolled_into_view() {
        let mut nav = chrome_navigator();
        let notes = node(&nav, "notes");
        assert!(nav.document().is_display_none(notes));

        let report = nav.apply_fragment("#side/visible|notes/scrollTo.side").await;

        assert_eq!(report.applied, vec!["side", "notes"]);
        assert!(report.skipped.is_empty());
        let document = nav.document();
        assert!(document.has_class(node(&nav, "side"), "nav-visible"));
        assert!(document.has_class(notes, "nav-visible"));
        assert!(!document.has_class(notes, "nav-hidden"));
        assert!(!document.is_display_none(notes));
        assert_eq!(document.scrolled(), &[notes]);
        assert_eq!(active_tabs(&nav), vec!["side"]);
    }

    #[tokio::test]
    async fn test_tab_follows_visible_parent_tab_without_token() {
        let mut nav = chrome_navigator();

        nav.apply_fragment("#intro/visible").await;
        assert_eq!(active_tabs(&nav), vec!["main"]);

        nav.apply_fragment("#main/hidden|side/visible").await;
        assert_eq!(active_tabs(&nav), vec!["side"]);

        // An explicit token wins over the visible containers.
        nav.apply_fragment("#side/visible.main").await;
        assert_eq!(active_tabs(&nav), vec!["main"]);
    }

    #[tokio::test]
    async fn test_reapplied_toggle_is_stable() {
        let (mut nav, _) = navigator(false);
        let notes = node(&nav, "notes");
        for _ in 0..2 {
            let report = nav.apply_fragment("#notes/toggle").await;
            assert_eq!(report.applied, vec!["notes"]);
            assert!(nav.document().has_class(notes, "nav-visible"));
            assert!(!nav.document().is_display_none(notes));
        }
    }

    #[tokio::test]
    async fn test_navigate_merges_and_navigate_multiple_replaces() {
        let (mut nav, _) = navigator(false);
        nav.navigate("intro", "hidden", BTreeMap::new(), None).await;
        nav.navigate("notes", "visible", BTreeMap::new(), Some("side"))
            .await;
        assert_eq!(nav.location(), "intro/hidden|notes/visible.side");
        assert!(nav.is_in_state("intro", "hidden"));

        nav.navigate("intro", "visible", BTreeMap::new(), None).await;
        assert_eq!(nav.location(), "intro/visible|notes/visible");

        nav.navigate_multiple(&[NavInstruction::new("notes", "hidden")], None)
            .await;
        assert_eq!(nav.current_state(), &[NavInstruction::new("notes", "hidden")]);
    }

    #[tokio::test]
    async fn test_hydrated_content_matches_full_build() {
        let (mut nav, _) = navigator(false);
        nav.apply_fragment("#about/visible").await;
        let container = slot(&nav, "about", "dynamic-content-container");

        let eager = page(&site(), "eager.json");
        let full = eager.element_by_id("about").unwrap();
        assert_eq!(
            nav.document().inner_html(container),
            eager.inner_html(full)
        );
    }

    #[tokio::test]
    async fn test_stored_fragment_skips_fetch() {
        let (mut first, calls) = navigator(false);
        first.apply_fragment("#about/visible").await;
        let store = first.store().clone();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let (second, calls) = navigator(false);
        let mut second = second.with_store(store);
        let outcome = second.hydrate("about").await;
        assert!(matches!(outcome, HydrationOutcome::Injected { from_cache: true, .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(load_state(&second, "about"), Some("loaded"));
    }

    #[tokio::test]
    async fn test_init_hook_reported_after_injection() {
        let (mut nav, _) = navigator(false);
        let report = nav.apply_fragment("#summary/visible").await;
        let [HydrationOutcome::Injected { id, init_hook, .. }] = &report.hydrations[..] else {
            panic!("summary should be hydrated: {:?}", report.hydrations);
        };
        assert_eq!(id, "summary");
        assert_eq!(init_hook.as_deref(), Some("initSummaryComponent"));
    }
}
