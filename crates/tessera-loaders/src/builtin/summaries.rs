//! `summaries/type_1`: highlight banner, paragraphs, and expertise cards.

use serde::Deserialize;

use crate::builtin::{Frame, bind};
use crate::markup::{Element, render_all};
use crate::{ComponentLoader, LoadError, LoadRequest};

pub(crate) const FRAME: Frame = Frame {
    tag: "section",
    class: "summary-component",
    handler: "handleSummaryNavigation",
    init_hook: Some("initSummaryComponent"),
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryData {
    #[serde(default = "default_highlight_icon")]
    highlight_icon: String,
    #[serde(default)]
    highlight_title: String,
    #[serde(default)]
    highlight_subtitle: String,
    #[serde(default)]
    paragraphs: Vec<String>,
    #[serde(default)]
    expertise: Vec<Expertise>,
}

#[derive(Deserialize)]
struct Expertise {
    #[serde(default = "default_expertise_icon")]
    icon: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
}

fn default_highlight_icon() -> String {
    "rocket-outline".to_owned()
}

fn default_expertise_icon() -> String {
    "analytics-outline".to_owned()
}

fn icon(name: String) -> Element {
    Element::new("ion-icon")
        .attr("name", name)
        .attr("aria-hidden", "true")
}

/// Profile summary. Supports all modes; runs `initSummaryComponent` after
/// hydration.
#[derive(Clone, Copy, Debug, Default)]
pub struct SummariesLoader;

impl ComponentLoader for SummariesLoader {
    fn load(&self, request: &LoadRequest<'_>) -> Result<String, LoadError> {
        FRAME.render(request, || {
            let data: SummaryData = bind(request)?;

            let highlight = Element::new("div")
                .class("summary-component__highlight")
                .child(icon(data.highlight_icon))
                .child(
                    Element::new("div")
                        .child(
                            Element::new("h3")
                                .class("summary-component__highlight-title")
                                .text(data.highlight_title),
                        )
                        .child(
                            Element::new("p")
                                .class("summary-component__highlight-subtitle")
                                .text(data.highlight_subtitle),
                        ),
                );

            let text = Element::new("div")
                .class("summary-component__text")
                .children(data.paragraphs.into_iter().map(|p| Element::new("p").text(p)));

            let cards = data.expertise.into_iter().map(|item| {
                Element::new("div")
                    .class("summary-component__expertise-item")
                    .class("card")
                    .child(
                        Element::new("div")
                            .class("summary-component__expertise-icon-wrapper")
                            .child(icon(item.icon)),
                    )
                    .child(
                        Element::new("h4")
                            .class("summary-component__expertise-item-title")
                            .text(item.title),
                    )
                    .child(
                        Element::new("p")
                            .class("summary-component__expertise-item-description")
                            .text(item.description),
                    )
            });
            let expertise = Element::new("div")
                .class("summary-component__expertise")
                .children(cards);

            Ok(render_all(&[highlight, text, expertise]))
        })
    }
}
