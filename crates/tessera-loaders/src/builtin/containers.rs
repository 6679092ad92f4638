//! `vertical/type_1` and `horizontal/type_1` containers.

use tessera_definition::NavigationConfig;

use crate::builtin::wrap_container;
use crate::{ContainerLoader, LoadError};

/// Handler name shared by vertical containers.
pub const VERTICAL_HANDLER: &str = "handleVerticalContainerNavigation";

/// Handler name shared by horizontal containers.
pub const HORIZONTAL_HANDLER: &str = "handleHorizontalContainerNavigation";

/// Stacks children top to bottom.
#[derive(Clone, Copy, Debug, Default)]
pub struct VerticalContainer;

impl ContainerLoader for VerticalContainer {
    fn wrap(
        &self,
        id: &str,
        children: &[String],
        navigation: &NavigationConfig,
    ) -> Result<String, LoadError> {
        wrap_container("vertical-container", VERTICAL_HANDLER, id, children, navigation)
    }
}

/// Lays children out side by side.
#[derive(Clone, Copy, Debug, Default)]
pub struct HorizontalContainer;

impl ContainerLoader for HorizontalContainer {
    fn wrap(
        &self,
        id: &str,
        children: &[String],
        navigation: &NavigationConfig,
    ) -> Result<String, LoadError> {
        wrap_container(
            "horizontal-container",
            HORIZONTAL_HANDLER,
            id,
            children,
            navigation,
        )
    }
}
