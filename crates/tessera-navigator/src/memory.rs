//! In-memory [`Document`] parsed from well-formed markup.
//!
//! Built pages are XML-compatible (quoted attributes, self-closing void
//! elements), so they parse with `quick-xml` directly. The doctype,
//! comments, and processing instructions are dropped.

use std::fmt::Write as _;

use quick_xml::events::{BytesRef, BytesStart, Event};
use quick_xml::reader::Reader;

use crate::DomError;
use crate::dom::{Document, NodeId};

/// Elements serialized as self-closing when childless.
const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input", "link", "meta"];

#[derive(Clone, Debug)]
enum NodeKind {
    Root,
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Clone, Debug)]
struct NodeData {
    kind: NodeKind,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// Arena-backed element tree.
///
/// Replaced subtrees stay in the arena but are detached, so stale
/// [`NodeId`]s never alias new elements.
#[derive(Clone, Debug)]
pub struct MemoryDocument {
    nodes: Vec<NodeData>,
    scrolled: Vec<NodeId>,
}

const ROOT: usize = 0;

impl MemoryDocument {
    /// Parse a document or fragment.
    ///
    /// # Errors
    ///
    /// Returns [`DomError`] if `html` is not well-formed.
    pub fn parse(html: &str) -> Result<Self, DomError> {
        let mut doc = Self {
            nodes: vec![NodeData {
                kind: NodeKind::Root,
                parent: None,
                children: Vec::new(),
            }],
            scrolled: Vec::new(),
        };
        doc.parse_into(ROOT, html)?;
        Ok(doc)
    }

    /// Elements scrolled into view, oldest first.
    #[must_use]
    pub fn scrolled(&self) -> &[NodeId] {
        &self.scrolled
    }

    /// Serialized document.
    #[must_use]
    pub fn to_html(&self) -> String {
        self.inner_html(NodeId(ROOT))
    }

    /// Concatenated text of `node` and its descendants.
    #[must_use]
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node.0, &mut out);
        out
    }

    /// Serialized children of `node`.
    #[must_use]
    pub fn inner_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        for &child in &self.nodes[node.0].children {
            self.serialize(child, &mut out);
        }
        out
    }

    /// Serialized `node` including its own tag.
    #[must_use]
    pub fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.serialize(node.0, &mut out);
        out
    }

    fn push(&mut self, kind: NodeKind, parent: usize) -> usize {
        let index = self.nodes.len();
        self.nodes.push(NodeData {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent].children.push(index);
        index
    }

    /// Parse `html` and append the result under `parent`.
    ///
    /// On error the arena is truncated back, leaving `parent` untouched.
    fn parse_into(&mut self, parent: usize, html: &str) -> Result<(), DomError> {
        let arena_len = self.nodes.len();
        let child_count = self.nodes[parent].children.len();
        let result = self.parse_events(parent, html);
        if result.is_err() {
            self.nodes.truncate(arena_len);
            self.nodes[parent].children.truncate(child_count);
        }
        result
    }

    fn parse_events(&mut self, parent: usize, html: &str) -> Result<(), DomError> {
        let mut reader = Reader::from_str(html);
        reader.config_mut().trim_text(false);

        let mut stack = vec![parent];
        loop {
            let current = *stack.last().unwrap_or(&parent);
            match reader.read_event()? {
                Event::Start(e) => {
                    let kind = element_kind(&reader, &e)?;
                    stack.push(self.push(kind, current));
                }
                Event::Empty(e) => {
                    let kind = element_kind(&reader, &e)?;
                    self.push(kind, current);
                }
                Event::End(e) => {
                    if stack.len() == 1 {
                        let qname = e.name();
                        let name = reader.decoder().decode(qname.as_ref())?;
                        return Err(DomError::UnbalancedTag(name.into_owned()));
                    }
                    stack.pop();
                }
                Event::Text(e) => {
                    let text = reader.decoder().decode(&e)?;
                    self.append_text(current, &text);
                }
                Event::GeneralRef(e) => {
                    let text = resolve_reference(&reader, &e)?;
                    self.append_text(current, &text);
                }
                Event::CData(e) => {
                    let text = reader.decoder().decode(&e)?;
                    self.append_text(current, &text);
                }
                Event::Eof => return Ok(()),
                Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
            }
        }
    }

    /// Append text, merging with a preceding text node.
    fn append_text(&mut self, parent: usize, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(&last) = self.nodes[parent].children.last()
            && let NodeKind::Text(existing) = &mut self.nodes[last].kind
        {
            existing.push_str(text);
            return;
        }
        self.push(NodeKind::Text(text.to_owned()), parent);
    }

    fn collect_text(&self, index: usize, out: &mut String) {
        match &self.nodes[index].kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Root | NodeKind::Element { .. } => {
                for &child in &self.nodes[index].children {
                    self.collect_text(child, out);
                }
            }
        }
    }

    fn serialize(&self, index: usize, out: &mut String) {
        let node = &self.nodes[index];
        match &node.kind {
            NodeKind::Text(text) => out.push_str(&quick_xml::escape::partial_escape(text)),
            NodeKind::Root => {
                for &child in &node.children {
                    self.serialize(child, out);
                }
            }
            NodeKind::Element { tag, attrs } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attrs {
                    let _ = write!(out, " {name}=\"{}\"", quick_xml::escape::escape(value));
                }
                if node.children.is_empty() && VOID_ELEMENTS.contains(&tag.as_str()) {
                    out.push_str(" />");
                    return;
                }
                out.push('>');
                for &child in &node.children {
                    self.serialize(child, out);
                }
                let _ = write!(out, "</{tag}>");
            }
        }
    }

    fn is_element(&self, index: usize) -> bool {
        matches!(self.nodes[index].kind, NodeKind::Element { .. })
    }

    fn collect_elements(&self, index: usize, out: &mut Vec<NodeId>) {
        for &child in &self.nodes[index].children {
            if self.is_element(child) {
                out.push(NodeId(child));
                self.collect_elements(child, out);
            }
        }
    }

    fn attrs_mut(&mut self, node: NodeId) -> Option<&mut Vec<(String, String)>> {
        match &mut self.nodes.get_mut(node.0)?.kind {
            NodeKind::Element { attrs, .. } => Some(attrs),
            NodeKind::Root | NodeKind::Text(_) => None,
        }
    }
}

fn element_kind(reader: &Reader<&[u8]>, e: &BytesStart<'_>) -> Result<NodeKind, DomError> {
    let tag = reader.decoder().decode(e.name().as_ref())?.into_owned();
    let mut attrs = Vec::new();
    for attr in e.attributes() {
        let attr = attr?;
        let name = reader.decoder().decode(attr.key.as_ref())?.into_owned();
        let value = attr.unescape_value()?.into_owned();
        attrs.push((name, value));
    }
    Ok(NodeKind::Element { tag, attrs })
}

/// Text for an entity or character reference (`&amp;`, `&#39;`).
fn resolve_reference(reader: &Reader<&[u8]>, e: &BytesRef<'_>) -> Result<String, DomError> {
    if let Ok(Some(ch)) = e.resolve_char_ref() {
        return Ok(ch.to_string());
    }
    let name = reader.decoder().decode(e)?;
    let text = match name.as_ref() {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => "\u{a0}",
        other => return Ok(format!("&{other};")),
    };
    Ok(text.to_owned())
}

impl Document for MemoryDocument {
    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.elements()
            .into_iter()
            .find(|&n| self.attribute(n, "id") == Some(id))
    }

    fn elements(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_elements(ROOT, &mut out);
        out
    }

    fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_elements(node.0, &mut out);
        out
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.nodes.get(node.0)?.parent?;
        self.is_element(parent).then_some(NodeId(parent))
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        match &self.nodes.get(node.0)?.kind {
            NodeKind::Element { attrs, .. } => attrs
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_str()),
            NodeKind::Root | NodeKind::Text(_) => None,
        }
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        let Some(attrs) = self.attrs_mut(node) else {
            return;
        };
        match attrs.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => value.clone_into(existing),
            None => attrs.push((name.to_owned(), value.to_owned())),
        }
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) {
        if let Some(attrs) = self.attrs_mut(node) {
            attrs.retain(|(n, _)| n != name);
        }
    }

    fn set_inner_html(&mut self, node: NodeId, html: &str) -> Result<(), DomError> {
        let previous = std::mem::take(&mut self.nodes[node.0].children);
        if let Err(e) = self.parse_into(node.0, html) {
            self.nodes[node.0].children = previous;
            return Err(e);
        }
        for child in previous {
            self.nodes[child].parent = None;
        }
        Ok(())
    }

    fn scroll_into_view(&mut self, node: NodeId) {
        self.scrolled.push(node);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::dom::DocumentExt;

    const PAGE: &str = "<!DOCTYPE html>\n<html lang=\"en\"><head><meta charset=\"utf-8\" /></head>\
        <body><div class=\"box nav-visible\" id=\"a\" data-nav-config=\"{&quot;defaultState&quot;:&quot;visible&quot;}\">\
        <p>Tom &amp; Jerry&#39;s</p></div></body></html>";

    #[test]
    fn test_parse_page() {
        let doc = MemoryDocument::parse(PAGE).unwrap();
        let a = doc.element_by_id("a").unwrap();
        assert_eq!(
            doc.attribute(a, "data-nav-config"),
            Some(r#"{"defaultState":"visible"}"#)
        );
        assert_eq!(doc.text_content(a), "Tom & Jerry's");
        assert!(doc.has_class(a, "nav-visible"));
    }

    #[test]
    fn test_parent_and_descendants() {
        let doc = MemoryDocument::parse(r#"<div id="o"><section id="m"><p id="i"></p></section></div>"#)
            .unwrap();
        let o = doc.element_by_id("o").unwrap();
        let i = doc.element_by_id("i").unwrap();
        let ids: Vec<&str> = doc
            .descendants(o)
            .into_iter()
            .filter_map(|n| doc.id_of(n))
            .collect();
        assert_eq!(ids, vec!["m", "i"]);
        assert_eq!(doc.parent(o), None);
        assert_eq!(doc.id_of(doc.parent(i).unwrap()), Some("m"));
    }

    #[test]
    fn test_set_inner_html_detaches_old_children() {
        let mut doc = MemoryDocument::parse(r#"<div id="c"><span id="old"></span></div>"#).unwrap();
        let c = doc.element_by_id("c").unwrap();
        doc.set_inner_html(c, r#"<b id="new">hi</b>"#).unwrap();
        assert!(doc.element_by_id("old").is_none());
        assert!(doc.element_by_id("new").is_some());
        assert_eq!(doc.inner_html(c), r#"<b id="new">hi</b>"#);
    }

    #[test]
    fn test_set_inner_html_rejects_malformed() {
        let mut doc = MemoryDocument::parse(r#"<div id="c"><span id="old"></span></div>"#).unwrap();
        let c = doc.element_by_id("c").unwrap();
        assert!(doc.set_inner_html(c, "<b></i>").is_err());
        assert!(doc.element_by_id("old").is_some());
        assert_eq!(doc.descendants(c).len(), 1);
    }

    #[test]
    fn test_class_and_display_helpers() {
        let mut doc = MemoryDocument::parse(r#"<div id="x" class="a nav-visible"></div>"#).unwrap();
        let x = doc.element_by_id("x").unwrap();
        doc.remove_class(x, "nav-visible");
        doc.add_class(x, "nav-hidden");
        doc.add_class(x, "nav-hidden");
        doc.set_display(x, Some("none"));
        assert_eq!(doc.attribute(x, "class"), Some("a nav-hidden"));
        assert!(doc.is_display_none(x));
        doc.set_display(x, None);
        assert!(!doc.is_display_none(x));
    }

    #[test]
    fn test_serialize_round_trips_escapes() {
        let html = r#"<div title="a &quot;b&quot;"><meta charset="utf-8" /><p>1 &lt; 2</p></div>"#;
        let doc = MemoryDocument::parse(html).unwrap();
        let again = MemoryDocument::parse(&doc.to_html()).unwrap();
        assert_eq!(doc.to_html(), again.to_html());
        assert!(doc.to_html().contains(r#"<meta charset="utf-8" />"#));
    }

    #[test]
    fn test_unbalanced_close_is_error() {
        assert!(MemoryDocument::parse("</div>").is_err());
    }
}
