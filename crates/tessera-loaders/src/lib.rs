//! Component loaders for Tessera.
//!
//! A loader turns one node of a page definition into markup. This crate
//! provides:
//!
//! - [`ComponentLoader`], [`ContainerLoader`], and [`SiteLoader`] contracts
//! - [`LoaderRegistry`], the explicit `type/version` to loader mapping
//! - [`markup::Element`], the structured builder every loader renders with
//! - built-in loaders registered by [`LoaderRegistry::with_defaults`]
//!
//! # Render modes
//!
//! | Mode | Output |
//! |------|--------|
//! | [`RenderMode::Full`] | navigable element with content, ready for first paint |
//! | [`RenderMode::Shell`] | navigable element with hydration metadata and no content |
//! | [`RenderMode::Content`] | inner fragment only, injected into a shell |

mod builtin;
mod error;
mod loader;
pub mod markup;
mod mode;
mod registry;

pub use builtin::{
    HORIZONTAL_HANDLER, HeroLoader, HorizontalContainer, NAV_HANDLERS, PlaceholderLoader,
    SectionTitleLoader, SummariesLoader, TextSectionLoader, TopBarSite, VERTICAL_HANDLER,
    VerticalContainer,
};
pub use error::LoadError;
pub use loader::{
    ComponentLoader, ComponentMetadata, ContainerLoader, DEFAULT_TITLE, LoadRequest, SiteLoader,
    title_of,
};
pub use mode::RenderMode;
pub use registry::LoaderRegistry;
