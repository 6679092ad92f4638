//! `heros/type_1`: page header. Only renders in `full` mode.

use serde::Deserialize;

use crate::builtin::{Frame, bind};
use crate::markup::{Element, render_all};
use crate::{ComponentLoader, LoadError, LoadRequest, RenderMode};

pub(crate) const FRAME: Frame = Frame {
    tag: "header",
    class: "header-component",
    handler: "handleHeroNavigation",
    init_hook: None,
};

#[derive(Deserialize)]
struct HeroData {
    #[serde(default)]
    subtitle: Option<String>,
}

/// Page header. Has no shell or content branch, so it cannot be dynamic.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeroLoader;

impl ComponentLoader for HeroLoader {
    fn load(&self, request: &LoadRequest<'_>) -> Result<String, LoadError> {
        match request.mode {
            RenderMode::Full => {
                let data: HeroData = bind(request)?;
                let mut parts = vec![
                    Element::new("h1")
                        .class("header-component__title")
                        .text(request.title),
                ];
                if let Some(subtitle) = data.subtitle {
                    parts.push(
                        Element::new("p")
                            .class("header-component__subtitle")
                            .text(subtitle),
                    );
                }
                FRAME.full(request, render_all(&parts))
            }
            mode @ (RenderMode::Shell | RenderMode::Content) => Err(LoadError::UnsupportedMode {
                spec: request.metadata.component_spec.clone(),
                mode,
            }),
        }
    }

    fn supports(&self, mode: RenderMode) -> bool {
        mode == RenderMode::Full
    }
}
