//! Client-side navigation for Tessera pages.
//!
//! A [`Navigator`] keeps a document in sync with the URL fragment: it parses
//! the fragment into instructions, hydrates the dynamic shells those
//! instructions reveal, and drives each element's state handler.
//!
//! The navigator is headless. It works against the [`Document`] trait, with
//! [`MemoryDocument`] as the bundled implementation, and fetches fragments
//! through a [`ContentFetcher`] such as [`HttpContentFetcher`].
//!
//! # Example
//!
//! ```ignore
//! use tessera_navigator::{HttpContentFetcher, MemoryDocument, Navigator};
//!
//! let document = MemoryDocument::parse(&html)?;
//! let fetcher = HttpContentFetcher::new("http://127.0.0.1:8080/api/dynamic-content");
//! let mut navigator = Navigator::new(document, fetcher);
//! let report = navigator.apply_fragment("#about/scrollTo").await;
//! ```

mod dom;
mod error;
mod fetch;
mod handler;
mod memory;
mod navigator;
mod store;

pub use dom::{Document, DocumentExt, NodeId};
pub use error::{DomError, FetchError, NavigationError};
pub use fetch::{ContentFetcher, ContentResponse, HttpContentFetcher, HydrationRequest};
pub use handler::{HandlerRegistry, StateHandler, VisibilityHandler};
pub use memory::MemoryDocument;
pub use navigator::{
    HydrationOutcome, HydrationTicket, NavigationReport, Navigator, SkipReason, Skipped,
};
pub use store::{ClientStore, StoredFragment};
