//! `placeholder/type_1`: a titled box.

use crate::builtin::Frame;
use crate::markup::Element;
use crate::{ComponentLoader, LoadError, LoadRequest};

pub(crate) const FRAME: Frame = Frame {
    tag: "div",
    class: "placeholder-component",
    handler: "handlePlaceholderNavigation",
    init_hook: None,
};

/// Renders the request title in a placeholder box. Supports all modes.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlaceholderLoader;

impl ComponentLoader for PlaceholderLoader {
    fn load(&self, request: &LoadRequest<'_>) -> Result<String, LoadError> {
        FRAME.render(request, || {
            Ok(Element::new("div")
                .class("placeholder-box")
                .child(
                    Element::new("div")
                        .class("placeholder-text")
                        .text(request.title),
                )
                .render())
        })
    }
}
