//! `text_section/type_1`: a titled run of paragraphs.

use serde::Deserialize;

use crate::builtin::{Frame, bind};
use crate::markup::{Element, render_all};
use crate::{ComponentLoader, LoadError, LoadRequest};

pub(crate) const FRAME: Frame = Frame {
    tag: "div",
    class: "text-section-component",
    handler: "handleTextSectionNavigation",
    init_hook: None,
};

#[derive(Deserialize)]
struct TextSectionData {
    #[serde(default)]
    paragraphs: Vec<String>,
}

/// Heading plus paragraphs. Supports all modes.
#[derive(Clone, Copy, Debug, Default)]
pub struct TextSectionLoader;

impl ComponentLoader for TextSectionLoader {
    fn load(&self, request: &LoadRequest<'_>) -> Result<String, LoadError> {
        FRAME.render(request, || {
            let data: TextSectionData = bind(request)?;
            let body = Element::new("div")
                .class("text-section__body")
                .children(
                    data.paragraphs
                        .into_iter()
                        .map(|p| Element::new("p").text(p)),
                );
            Ok(render_all(&[
                Element::new("h3")
                    .class("text-section__title")
                    .text(request.title),
                body,
            ]))
        })
    }
}
