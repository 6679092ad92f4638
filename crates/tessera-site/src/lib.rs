//! Page building and dynamic content resolution for Tessera.
//!
//! - [`Builder`] renders a parsed page definition to markup, turning dynamic
//!   components into shells.
//! - [`ContentResolver`] serves the inner fragment of one dynamic node after
//!   re-validating the request against the stored definition.
//! - [`Site`] ties both to a definition store and optional site chrome.

mod builder;
mod content;
mod error;
mod site;

pub use builder::Builder;
pub use content::{ContentFragment, ContentRequest, ContentResolver};
pub use error::{ContentError, ErrorCategory, ResolveError};
pub use site::{CheckFailure, CheckReport, Site};
