//! `section_title/type_1`: a section heading with optional subtitle.

use serde::Deserialize;

use crate::builtin::{Frame, bind};
use crate::markup::{Element, render_all};
use crate::{ComponentLoader, LoadError, LoadRequest};

pub(crate) const FRAME: Frame = Frame {
    tag: "div",
    class: "section-title-component",
    handler: "handleSectionTitleNavigation",
    init_hook: None,
};

#[derive(Deserialize)]
struct SectionTitleData {
    #[serde(default)]
    subtitle: Option<String>,
}

/// Section heading. Supports all modes.
#[derive(Clone, Copy, Debug, Default)]
pub struct SectionTitleLoader;

impl ComponentLoader for SectionTitleLoader {
    fn load(&self, request: &LoadRequest<'_>) -> Result<String, LoadError> {
        FRAME.render(request, || {
            let data: SectionTitleData = bind(request)?;
            let mut parts = vec![
                Element::new("h2")
                    .class("section-title__heading")
                    .text(request.title),
            ];
            if let Some(subtitle) = data.subtitle {
                parts.push(
                    Element::new("p")
                        .class("section-title__subtitle")
                        .text(subtitle),
                );
            }
            Ok(render_all(&parts))
        })
    }
}
