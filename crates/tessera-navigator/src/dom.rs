//! Document abstraction the navigator drives.
//!
//! [`Document`] is the minimal surface a host DOM must expose: lookups,
//! attribute access, fragment injection, and scrolling. Class and style
//! manipulation is layered on top by [`DocumentExt`].

use crate::DomError;

/// Handle to an element of a [`Document`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

/// A mutable element tree.
///
/// Only elements attached to the document are visible through these
/// methods; content replaced by [`Document::set_inner_html`] disappears.
pub trait Document {
    /// First element in document order with `id`.
    fn element_by_id(&self, id: &str) -> Option<NodeId>;

    /// Every element in document order.
    fn elements(&self) -> Vec<NodeId>;

    /// Element descendants of `node` in document order, excluding `node`.
    fn descendants(&self, node: NodeId) -> Vec<NodeId>;

    /// Parent element, `None` at the top level.
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Attribute value.
    fn attribute(&self, node: NodeId, name: &str) -> Option<&str>;

    /// Set or replace an attribute.
    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str);

    /// Remove an attribute if present.
    fn remove_attribute(&mut self, node: NodeId, name: &str);

    /// Replace the children of `node` with parsed `html`.
    ///
    /// # Errors
    ///
    /// Returns [`DomError`] if `html` is not well-formed. The document is
    /// left unchanged in that case.
    fn set_inner_html(&mut self, node: NodeId, html: &str) -> Result<(), DomError>;

    /// Scroll `node` into view.
    fn scroll_into_view(&mut self, node: NodeId);
}

/// Class, style, and traversal helpers for any [`Document`].
pub trait DocumentExt: Document {
    /// The element's `id`.
    fn id_of(&self, node: NodeId) -> Option<&str> {
        self.attribute(node, "id")
    }

    /// Whether `class` appears in the element's class list.
    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.attribute(node, "class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    /// Add `class` unless already present.
    fn add_class(&mut self, node: NodeId, class: &str) {
        if self.has_class(node, class) {
            return;
        }
        let classes = match self.attribute(node, "class") {
            Some(existing) if !existing.trim().is_empty() => format!("{existing} {class}"),
            _ => class.to_owned(),
        };
        self.set_attribute(node, "class", &classes);
    }

    /// Remove every occurrence of `class`.
    fn remove_class(&mut self, node: NodeId, class: &str) {
        let Some(existing) = self.attribute(node, "class") else {
            return;
        };
        let classes: Vec<&str> = existing.split_whitespace().filter(|c| *c != class).collect();
        let classes = classes.join(" ");
        self.set_attribute(node, "class", &classes);
    }

    /// Set the inline `display` style, or clear it with `None`.
    fn set_display(&mut self, node: NodeId, display: Option<&str>) {
        match display {
            Some(value) => self.set_attribute(node, "style", &format!("display: {value};")),
            None => self.remove_attribute(node, "style"),
        }
    }

    /// Whether the element is hidden by an inline `display: none`.
    fn is_display_none(&self, node: NodeId) -> bool {
        self.attribute(node, "style").is_some_and(|style| {
            style
                .split(';')
                .filter_map(|decl| decl.split_once(':'))
                .any(|(prop, value)| prop.trim() == "display" && value.trim() == "none")
        })
    }

    /// First descendant carrying `class`.
    fn find_by_class(&self, node: NodeId, class: &str) -> Option<NodeId> {
        self.descendants(node)
            .into_iter()
            .find(|&n| self.has_class(n, class))
    }

    /// Nearest element, starting with `node` itself, matching `predicate`.
    fn closest(&self, node: NodeId, predicate: impl Fn(&Self, NodeId) -> bool) -> Option<NodeId>
    where
        Self: Sized,
    {
        let mut current = Some(node);
        while let Some(n) = current {
            if predicate(self, n) {
                return Some(n);
            }
            current = self.parent(n);
        }
        None
    }
}

impl<D: Document + ?Sized> DocumentExt for D {}
