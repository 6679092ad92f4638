//! `top_bar/type_1`: document with a top navigation bar.

use tessera_definition::{NavInstruction, SiteDefinition, build_fragment};

use crate::markup::Element;
use crate::{LoadError, SiteLoader};

const DEFAULT_SITE_TITLE: &str = "Portfolio";

/// Full HTML document with one `nav-link` per navigation tab.
#[derive(Clone, Copy, Debug, Default)]
pub struct TopBarSite;

impl SiteLoader for TopBarSite {
    fn render(&self, site: &SiteDefinition, content: &str) -> Result<String, LoadError> {
        let title = site.title.as_deref().unwrap_or(DEFAULT_SITE_TITLE);

        let tabs = site.navigation_tabs.iter().map(|tab| {
            let instruction = NavInstruction {
                target: tab.target.clone(),
                state: tab.state.clone(),
                parameters: tab.parameters.clone(),
            };
            let href = format!("#{}", build_fragment(&[instruction], None));
            Element::new("li").child(
                Element::new("a")
                    .class("nav-link")
                    .attr("href", href)
                    .attr("data-tab-id", tab.target.as_str())
                    .attr("data-target", tab.target.as_str())
                    .attr("data-state", tab.state.as_str())
                    .text(tab.label.as_str()),
            )
        });

        let head = Element::new("head")
            .child(Element::new("meta").attr("charset", "utf-8"))
            .child(
                Element::new("meta")
                    .attr("name", "viewport")
                    .attr("content", "width=device-width, initial-scale=1"),
            )
            .child(Element::new("title").text(title));

        let body = Element::new("body")
            .class("top-bar-site")
            .child(
                Element::new("header")
                    .class("top-bar")
                    .child(Element::new("div").class("top-bar__brand").text(title))
                    .child(
                        Element::new("nav")
                            .class("top-bar__nav")
                            .child(Element::new("ul").children(tabs)),
                    ),
            )
            .child(Element::new("main").class("site-pages").raw(content));

        let html = Element::new("html")
            .attr("lang", "en")
            .child(head)
            .child(body);

        let mut out = String::from("<!DOCTYPE html>\n");
        html.write_to(&mut out);
        out.push('\n');
        Ok(out)
    }
}
