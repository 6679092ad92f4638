//! Page definitions for Tessera.
//!
//! A page definition is a JSON document describing a tree of container and
//! component nodes. This crate provides:
//!
//! - [`PageDefinition`] and [`Node`], the parsed tree
//! - [`DefinitionName`] and [`ComponentSpec`], validated identifiers that
//!   guard every filesystem lookup
//! - [`Fragment`], the URL fragment grammar shared by server-rendered links
//!   and the client navigator
//! - [`DefinitionStore`] with [`FsDefinitionStore`] for a definitions directory
//! - [`MockDefinitionStore`] for testing (behind `mock` feature flag)
//!
//! # Example
//!
//! ```ignore
//! use tessera_definition::{DefinitionName, DefinitionStore, FsDefinitionStore};
//!
//! let store = FsDefinitionStore::new("definitions");
//! let page = store.load(&DefinitionName::parse("index.json")?)?;
//! for node in page.walk() {
//!     println!("{} ({})", node.id, node.spec);
//! }
//! ```

mod error;
mod fragment;
#[cfg(feature = "mock")]
mod mock;
mod model;
mod name;
mod parse;
mod store;

pub use error::DefinitionError;
pub use fragment::{Fragment, NavInstruction, build_fragment};
#[cfg(feature = "mock")]
pub use mock::MockDefinitionStore;
pub use model::{
    DEFAULT_ALLOWED_STATES, NavigationConfig, NavigationTab, Node, NodeBody, PageDefinition,
    SiteDefinition, VISIBLE,
};
pub use name::{ComponentSpec, DefinitionName};
pub use parse::parse_definition;
pub use store::{DefinitionStore, FsDefinitionStore};
