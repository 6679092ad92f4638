//! Page definition data model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::name::ComponentSpec;

/// State names every navigable element accepts unless configured otherwise.
pub const DEFAULT_ALLOWED_STATES: [&str; 4] = ["visible", "hidden", "scrollTo", "toggle"];

/// Fallback state when `defaultState` is absent or not allowed.
pub const VISIBLE: &str = "visible";

/// Per-node navigation configuration, serialized into `data-nav-config`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NavigationConfig {
    /// State applied when no fragment targets the element.
    pub default_state: String,
    /// States the element's handler accepts.
    pub allowed_states: Vec<String>,
    /// Content requires an authenticated session.
    pub protected: bool,
    /// Tab the element belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_tab: Option<String>,
    /// Parameters applied with the default state.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub initial_parameters: BTreeMap<String, String>,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            default_state: VISIBLE.to_owned(),
            allowed_states: DEFAULT_ALLOWED_STATES.map(str::to_owned).to_vec(),
            protected: false,
            parent_tab: None,
            initial_parameters: BTreeMap::new(),
        }
    }
}

impl NavigationConfig {
    /// Deduplicate `allowed_states` (keeping first occurrence) and reset
    /// `default_state` to `visible` when it is not allowed.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        let mut seen = Vec::with_capacity(self.allowed_states.len());
        for state in self.allowed_states.drain(..) {
            if !seen.contains(&state) {
                seen.push(state);
            }
        }
        self.allowed_states = seen;

        if !self.allows(&self.default_state) {
            self.default_state = VISIBLE.to_owned();
        }
        self
    }

    /// Whether `state` is one of the allowed states.
    #[must_use]
    pub fn allows(&self, state: &str) -> bool {
        self.allowed_states.iter().any(|s| s == state)
    }

    /// Whether the element starts hidden.
    #[must_use]
    pub fn starts_hidden(&self) -> bool {
        self.default_state == "hidden"
    }
}

/// One node of a page definition tree.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    /// Unique id within the page definition.
    pub id: String,
    /// Value of the `component` or `container` discriminant.
    pub spec: ComponentSpec,
    /// Navigation configuration (normalized).
    pub navigation: NavigationConfig,
    /// Rendered as a shell and hydrated on demand.
    pub dynamic: bool,
    /// Node-level protection flag (alias of `navigation.protected`).
    pub protected: bool,
    /// Container children or component payload.
    pub body: NodeBody,
}

/// Variant part of a [`Node`].
#[derive(Clone, Debug, PartialEq)]
pub enum NodeBody {
    /// Node that wraps child nodes.
    Container {
        /// Children in document order.
        objects: Vec<Node>,
    },
    /// Leaf rendered by a component loader.
    Component {
        /// Key selecting the payload from `data`.
        variant: Option<String>,
        /// Variant map (or direct payload when no variant is set).
        data: Option<Value>,
    },
}

impl Node {
    /// Whether this node is a container.
    #[must_use]
    pub fn is_container(&self) -> bool {
        matches!(self.body, NodeBody::Container { .. })
    }

    /// Children of a container, empty for components.
    #[must_use]
    pub fn children(&self) -> &[Node] {
        match &self.body {
            NodeBody::Container { objects } => objects,
            NodeBody::Component { .. } => &[],
        }
    }

    /// Protected at either the node or navigation level.
    #[must_use]
    pub fn is_protected(&self) -> bool {
        self.protected || self.navigation.protected
    }

    /// Name of the discriminant key this node was declared with.
    #[must_use]
    pub fn discriminant(&self) -> &'static str {
        if self.is_container() {
            "container"
        } else {
            "component"
        }
    }
}

/// Site chrome wrapped around a built page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteDefinition {
    /// Site loader spec, e.g. `top_bar/type_1`.
    pub site: ComponentSpec,
    /// Document title.
    #[serde(default)]
    pub title: Option<String>,
    /// Navigation tabs in display order.
    #[serde(default)]
    pub navigation_tabs: Vec<NavigationTab>,
}

impl SiteDefinition {
    /// Parse a standalone site definition document.
    ///
    /// # Errors
    ///
    /// Returns [`crate::DefinitionError::Json`] if the document is malformed.
    pub fn from_json(json: &str) -> Result<Self, crate::DefinitionError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// A top-level navigation tab.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationTab {
    /// Visible label.
    pub label: String,
    /// Element id the tab navigates to.
    pub target: String,
    /// State requested for the target.
    #[serde(default = "default_tab_state")]
    pub state: String,
    /// Extra handler parameters.
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
}

fn default_tab_state() -> String {
    VISIBLE.to_owned()
}

/// A parsed page definition.
#[derive(Clone, Debug, PartialEq)]
pub struct PageDefinition {
    /// Optional site chrome declared inline.
    pub site: Option<SiteDefinition>,
    /// Root nodes in document order.
    pub objects: Vec<Node>,
}

impl PageDefinition {
    /// Depth-first search for the node with `id` declared with `spec`.
    ///
    /// Returns the first match in document order.
    #[must_use]
    pub fn find(&self, id: &str, spec: &ComponentSpec) -> Option<&Node> {
        find_in(&self.objects, id, spec)
    }

    /// Depth-first search for a node by id alone.
    #[must_use]
    pub fn find_by_id(&self, id: &str) -> Option<&Node> {
        self.walk().into_iter().find(|n| n.id == id)
    }

    /// All nodes in depth-first document order.
    #[must_use]
    pub fn walk(&self) -> Vec<&Node> {
        let mut out = Vec::new();
        let mut stack: Vec<&Node> = self.objects.iter().rev().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(node.children().iter().rev());
        }
        out
    }
}

fn find_in<'a>(nodes: &'a [Node], id: &str, spec: &ComponentSpec) -> Option<&'a Node> {
    for node in nodes {
        if node.id == id && &node.spec == spec {
            return Some(node);
        }
        if let Some(found) = find_in(node.children(), id, spec) {
            return Some(found);
        }
    }
    None
}
