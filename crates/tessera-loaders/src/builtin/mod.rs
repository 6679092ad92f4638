//! Built-in loaders and the element frame they share.
//!
//! Every component renders its content once; `full` wraps that content in the
//! navigable frame, `shell` emits the frame around the hydration placeholder,
//! and `content` returns the content unwrapped. Hydrating a shell therefore
//! yields exactly what `full` would have inlined.

mod containers;
mod hero;
mod placeholder;
mod section_title;
mod summaries;
mod text_section;
mod top_bar;

pub use containers::{
    HORIZONTAL_HANDLER, HorizontalContainer, VERTICAL_HANDLER, VerticalContainer,
};
pub use hero::HeroLoader;
pub use placeholder::PlaceholderLoader;
pub use section_title::SectionTitleLoader;
pub use summaries::SummariesLoader;
pub use text_section::TextSectionLoader;
pub use top_bar::TopBarSite;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tessera_definition::NavigationConfig;

use crate::markup::Element;
use crate::{LoadError, LoadRequest, RenderMode};

/// `data-nav-handler` names emitted by the built-in loaders.
pub const NAV_HANDLERS: [&str; 7] = [
    VERTICAL_HANDLER,
    HORIZONTAL_HANDLER,
    placeholder::FRAME.handler,
    section_title::FRAME.handler,
    text_section::FRAME.handler,
    summaries::FRAME.handler,
    hero::FRAME.handler,
];

/// Navigable outer element of a component.
pub(crate) struct Frame {
    pub tag: &'static str,
    pub class: &'static str,
    pub handler: &'static str,
    pub init_hook: Option<&'static str>,
}

impl Frame {
    /// Dispatch on mode. `content` is only evaluated for `full` and `content`.
    pub fn render(
        &self,
        request: &LoadRequest<'_>,
        content: impl FnOnce() -> Result<String, LoadError>,
    ) -> Result<String, LoadError> {
        match request.mode {
            RenderMode::Full => self.full(request, content()?),
            RenderMode::Shell => self.shell(request),
            RenderMode::Content => content(),
        }
    }

    pub fn full(&self, request: &LoadRequest<'_>, content: String) -> Result<String, LoadError> {
        let element = self.open(request)?;
        Ok(self.close(element, request.navigation).raw(content).render())
    }

    fn shell(&self, request: &LoadRequest<'_>) -> Result<String, LoadError> {
        let element = self
            .open(request)?
            .attr("data-dynamic", "true")
            .attr("data-load-state", "not-loaded")
            .attr(
                "data-component-metadata",
                serde_json::to_string(request.metadata)?,
            );
        Ok(self
            .close(element, request.navigation)
            .child(hydration_placeholder())
            .render())
    }

    fn open(&self, request: &LoadRequest<'_>) -> Result<Element, LoadError> {
        Ok(Element::new(self.tag)
            .class(self.class)
            .class(state_class(request.navigation))
            .attr("id", request.id)
            .attr_if(request.is_protected(), "data-protected", "true")
            .attr("data-nav-handler", self.handler)
            .attr("data-nav-config", serde_json::to_string(request.navigation)?))
    }

    fn close(&self, element: Element, navigation: &NavigationConfig) -> Element {
        let element = match self.init_hook {
            Some(hook) => element.attr("data-init-hook", hook),
            None => element,
        };
        element.attr_if(navigation.starts_hidden(), "style", "display: none;")
    }
}

/// `nav-hidden` or `nav-visible` from the default state.
pub(crate) fn state_class(navigation: &NavigationConfig) -> &'static str {
    if navigation.starts_hidden() {
        "nav-hidden"
    } else {
        "nav-visible"
    }
}

/// Loading, error, and injection slots inside a shell.
fn hydration_placeholder() -> Element {
    Element::new("div")
        .class("dynamic-content-placeholder")
        .child(
            Element::new("div")
                .class("loading-indicator")
                .attr("style", "display: none;")
                .child(Element::new("div").class("loading-spinner"))
                .child(Element::new("span").text("Loading...")),
        )
        .child(
            Element::new("div")
                .class("error-placeholder")
                .attr("style", "display: none;")
                .child(Element::new("span").text("Content unavailable")),
        )
        .child(Element::new("div").class("dynamic-content-container"))
}

/// Bind component data to a loader's typed record.
///
/// Missing data binds as an empty object so field defaults apply.
pub(crate) fn bind<T: DeserializeOwned>(request: &LoadRequest<'_>) -> Result<T, LoadError> {
    let empty = Value::Object(Map::new());
    let data = if request.data().is_null() {
        &empty
    } else {
        request.data()
    };
    T::deserialize(data).map_err(|source| LoadError::Data {
        spec: request.metadata.component_spec.clone(),
        source,
    })
}

/// Wrap container children in a navigable element.
pub(crate) fn wrap_container(
    class: &'static str,
    handler: &'static str,
    id: &str,
    children: &[String],
    navigation: &NavigationConfig,
) -> Result<String, LoadError> {
    let mut inner = String::new();
    for child in children {
        inner.push_str(child);
        inner.push('\n');
    }
    Ok(Element::new("div")
        .class(class)
        .class(state_class(navigation))
        .attr("id", id)
        .attr_if(navigation.protected, "data-protected", "true")
        .attr("data-nav-handler", handler)
        .attr("data-nav-config", serde_json::to_string(navigation)?)
        .attr_if(navigation.starts_hidden(), "style", "display: none;")
        .raw(inner)
        .render())
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::test_support::Fixture;
    use super::*;

    const FRAME: Frame = Frame {
        tag: "div",
        class: "demo",
        handler: "handleDemoNavigation",
        init_hook: Some("initDemo"),
    };

    #[test]
    fn test_full_wraps_content() {
        let fixture = Fixture::new("demo/type_1", Value::Null);
        let html = FRAME
            .render(&fixture.request(RenderMode::Full), || Ok("<p>x</p>".to_owned()))
            .unwrap();
        assert!(html.starts_with(
            r#"<div class="demo nav-visible" id="c1" data-nav-handler="handleDemoNavigation""#
        ));
        assert!(html.contains(r#"data-init-hook="initDemo""#));
        assert!(html.ends_with("><p>x</p></div>"));
    }

    #[test]
    fn test_shell_does_not_evaluate_content() {
        let fixture = Fixture::new("demo/type_1", json!({"secret": "s3cr3t"}));
        let html = FRAME
            .render(&fixture.request(RenderMode::Shell), || {
                panic!("content must not render in shell mode")
            })
            .unwrap();
        assert!(html.contains(r#"data-load-state="not-loaded""#));
        assert!(html.contains(r#"data-dynamic="true""#));
        assert!(html.contains(r#"<div class="dynamic-content-container"></div>"#));
        assert!(!html.contains("s3cr3t"));
    }

    #[test]
    fn test_hidden_default_state() {
        let mut fixture = Fixture::new("demo/type_1", Value::Null);
        fixture.navigation.default_state = "hidden".to_owned();
        let html = FRAME
            .render(&fixture.request(RenderMode::Full), || Ok(String::new()))
            .unwrap();
        assert!(html.contains(r#"class="demo nav-hidden""#));
        assert!(html.contains(r#"style="display: none;""#));
    }

    #[test]
    fn test_protected_marker() {
        let mut fixture = Fixture::new("demo/type_1", Value::Null);
        fixture.metadata.protected = true;
        let html = FRAME
            .render(&fixture.request(RenderMode::Shell), || Ok(String::new()))
            .unwrap();
        assert!(html.contains(r#"data-protected="true""#));
    }

    #[test]
    fn test_wrap_container_joins_children() {
        let html = wrap_container(
            "vertical-container",
            "handleVerticalContainerNavigation",
            "v",
            &["<a></a>".to_owned(), "<b></b>".to_owned()],
            &NavigationConfig::default(),
        )
        .unwrap();
        assert!(html.ends_with("><a></a>\n<b></b>\n</div>"));
    }

    #[test]
    fn test_bind_null_applies_defaults() {
        #[derive(serde::Deserialize)]
        struct Record {
            #[serde(default)]
            items: Vec<String>,
        }
        let fixture = Fixture::new("demo/type_1", Value::Null);
        let record: Record = bind(&fixture.request(RenderMode::Full)).unwrap();
        assert!(record.items.is_empty());
    }

    #[test]
    fn test_bind_reports_spec() {
        #[derive(Debug, serde::Deserialize)]
        #[allow(dead_code)]
        struct Record {
            items: Vec<String>,
        }
        let fixture = Fixture::new("demo/type_1", json!({"items": 3}));
        let err = bind::<Record>(&fixture.request(RenderMode::Full)).unwrap_err();
        assert_eq!(
            err.to_string().split(':').next().unwrap(),
            "Invalid data for demo/type_1"
        );
    }
}
