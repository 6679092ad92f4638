//! JSON page definition parser.
//!
//! Accepts two layouts:
//!
//! - **nested**: each container lists its children under `objects`;
//! - **flat**: every node sits in the top-level `objects` array and names its
//!   container through `parent` (`null` for roots).
//!
//! Nodes declare their spec either with a `component`/`container` key or with
//! the older `type: "component" | "container"` plus `component` form.

use std::collections::{HashMap, HashSet};

use serde_json::{Map, Value};

use crate::DefinitionError;
use crate::model::{NavigationConfig, Node, NodeBody, PageDefinition, SiteDefinition};
use crate::name::ComponentSpec;

type Object = Map<String, Value>;

/// Parse a page definition document.
///
/// # Errors
///
/// Returns [`DefinitionError`] for malformed JSON or any structural violation:
/// missing `objects`, missing id or discriminant, conflicting discriminants,
/// duplicate ids, or a `parent` that does not lead to a root.
pub fn parse_definition(json: &str) -> Result<PageDefinition, DefinitionError> {
    let root: Value = serde_json::from_str(json)?;
    let Some(root) = root.as_object() else {
        return Err(DefinitionError::MissingObjects);
    };
    let Some(objects) = root.get("objects").and_then(Value::as_array) else {
        return Err(DefinitionError::MissingObjects);
    };

    let site = match root.get("site") {
        Some(site @ Value::Object(_)) => {
            Some(serde_json::from_value::<SiteDefinition>(site.clone())?)
        }
        _ => None,
    };

    let flat = objects
        .iter()
        .any(|o| o.as_object().is_some_and(|o| o.contains_key("parent")));

    let nodes = if flat {
        parse_flat(objects)?
    } else {
        parse_nested(objects, "objects")?
    };

    let definition = PageDefinition {
        site,
        objects: nodes,
    };
    check_unique_ids(&definition)?;
    Ok(definition)
}

fn parse_nested(objects: &[Value], path: &str) -> Result<Vec<Node>, DefinitionError> {
    objects
        .iter()
        .enumerate()
        .map(|(i, value)| {
            let at = format!("{path}[{i}]");
            let object = value
                .as_object()
                .ok_or_else(|| DefinitionError::MissingId(at.clone()))?;
            let header = NodeHeader::read(object, &at)?;
            let body = if header.container {
                let children = object
                    .get("objects")
                    .and_then(Value::as_array)
                    .ok_or_else(|| DefinitionError::MissingChildren(header.id.clone()))?;
                NodeBody::Container {
                    objects: parse_nested(children, &format!("{at}.objects"))?,
                }
            } else {
                component_body(object)
            };
            Ok(header.into_node(body))
        })
        .collect()
}

fn parse_flat(objects: &[Value]) -> Result<Vec<Node>, DefinitionError> {
    let mut roots = Vec::new();
    let mut children: HashMap<String, Vec<(NodeHeader, &Object)>> = HashMap::new();

    for (i, value) in objects.iter().enumerate() {
        let at = format!("objects[{i}]");
        let object = value
            .as_object()
            .ok_or_else(|| DefinitionError::MissingId(at.clone()))?;
        let header = NodeHeader::read(object, &at)?;
        match object.get("parent").and_then(Value::as_str) {
            Some(parent) => children
                .entry(parent.to_owned())
                .or_default()
                .push((header, object)),
            None => roots.push((header, object)),
        }
    }

    let nodes = roots
        .into_iter()
        .map(|(header, object)| attach(header, object, &mut children))
        .collect::<Result<Vec<_>, _>>()?;

    // Anything left was never reached from a root.
    if let Some((parent, orphans)) = children.into_iter().min_by(|a, b| a.0.cmp(&b.0))
        && let Some((header, _)) = orphans.into_iter().next()
    {
        return Err(DefinitionError::UnknownParent {
            id: header.id,
            parent,
        });
    }

    Ok(nodes)
}

fn attach(
    header: NodeHeader,
    object: &Object,
    children: &mut HashMap<String, Vec<(NodeHeader, &Object)>>,
) -> Result<Node, DefinitionError> {
    let body = if header.container {
        let kids = children.remove(&header.id).unwrap_or_default();
        let objects = kids
            .into_iter()
            .map(|(h, o)| attach(h, o, children))
            .collect::<Result<Vec<_>, _>>()?;
        NodeBody::Container { objects }
    } else {
        component_body(object)
    };
    Ok(header.into_node(body))
}

fn component_body(object: &Object) -> NodeBody {
    NodeBody::Component {
        variant: object
            .get("variant")
            .and_then(Value::as_str)
            .map(str::to_owned),
        data: object.get("data").filter(|d| !d.is_null()).cloned(),
    }
}

/// Fields shared by containers and components.
struct NodeHeader {
    id: String,
    spec: ComponentSpec,
    container: bool,
    navigation: NavigationConfig,
    dynamic: bool,
    protected: bool,
}

impl NodeHeader {
    fn read(object: &Object, at: &str) -> Result<Self, DefinitionError> {
        let id = object
            .get("id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| DefinitionError::MissingId(at.to_owned()))?
            .to_owned();

        let component = object.get("component").and_then(Value::as_str);
        let container = object.get("container").and_then(Value::as_str);
        let (raw_spec, is_container) = match (component, container) {
            (Some(_), Some(_)) => return Err(DefinitionError::ConflictingDiscriminant(id)),
            (None, Some(spec)) => (spec, true),
            (Some(spec), None) => {
                let legacy_container =
                    object.get("type").and_then(Value::as_str) == Some("container");
                (spec, legacy_container)
            }
            (None, None) => return Err(DefinitionError::MissingDiscriminant(id)),
        };
        let spec: ComponentSpec = raw_spec.parse()?;

        let mut navigation: NavigationConfig = match object.get("navigation") {
            Some(nav @ Value::Object(_)) => serde_json::from_value(nav.clone())?,
            _ => NavigationConfig::default(),
        };
        if let Some(tab) = object.get("parentTab").and_then(Value::as_str) {
            navigation.parent_tab = Some(tab.to_owned());
        }

        Ok(Self {
            id,
            spec,
            container: is_container,
            navigation: navigation.normalized(),
            dynamic: flag(object, "dynamic"),
            protected: flag(object, "protected"),
        })
    }

    fn into_node(self, body: NodeBody) -> Node {
        Node {
            id: self.id,
            spec: self.spec,
            navigation: self.navigation,
            dynamic: self.dynamic,
            protected: self.protected,
            body,
        }
    }
}

fn flag(object: &Object, key: &str) -> bool {
    object.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn check_unique_ids(definition: &PageDefinition) -> Result<(), DefinitionError> {
    let mut seen = HashSet::new();
    for node in definition.walk() {
        if !seen.insert(node.id.as_str()) {
            return Err(DefinitionError::DuplicateId(node.id.clone()));
        }
    }
    Ok(())
}
