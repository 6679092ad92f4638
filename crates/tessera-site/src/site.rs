//! Site facade over a definition store and loader registry.
//!
//! [`Site`] owns everything needed to serve a Tessera site: page builds
//! (optionally wrapped in site chrome), dynamic content hydration, and a
//! whole-store consistency check.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tessera_definition::FsDefinitionStore;
//! use tessera_loaders::LoaderRegistry;
//! use tessera_site::Site;
//!
//! let store = Arc::new(FsDefinitionStore::new("definitions"));
//! let site = Site::new(store, Arc::new(LoaderRegistry::with_defaults()));
//! let html = site.build_page("index.json", true)?;
//! ```

use std::sync::Arc;

use tessera_definition::{DefinitionName, DefinitionStore, SiteDefinition};
use tessera_loaders::LoaderRegistry;

use crate::{
    Builder, ContentError, ContentFragment, ContentRequest, ContentResolver, ResolveError,
};

/// A definition that failed [`Site::check`].
#[derive(Debug)]
pub struct CheckFailure {
    /// Definition file name.
    pub name: DefinitionName,
    /// Why it failed.
    pub error: ResolveError,
}

/// Outcome of [`Site::check`].
#[derive(Debug, Default)]
pub struct CheckReport {
    /// Definitions that built cleanly.
    pub passed: Vec<DefinitionName>,
    /// Definitions that did not.
    pub failures: Vec<CheckFailure>,
}

impl CheckReport {
    /// Whether every definition built.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Builds pages and serves dynamic content from one definition store.
#[derive(Clone)]
pub struct Site {
    store: Arc<dyn DefinitionStore>,
    builder: Builder,
    content: ContentResolver,
    chrome: Option<DefinitionName>,
}

impl Site {
    /// Create a site without standalone chrome.
    pub fn new(store: Arc<dyn DefinitionStore>, registry: Arc<LoaderRegistry>) -> Self {
        Self {
            content: ContentResolver::new(Arc::clone(&store), Arc::clone(&registry)),
            builder: Builder::new(registry),
            store,
            chrome: None,
        }
    }

    /// Wrap pages without inline chrome in the site definition `name`.
    #[must_use]
    pub fn with_chrome(mut self, name: DefinitionName) -> Self {
        self.chrome = Some(name);
        self
    }

    /// Page builder.
    #[must_use]
    pub fn builder(&self) -> &Builder {
        &self.builder
    }

    /// Build page `name`.
    ///
    /// With `with_site`, the page is wrapped in its inline `site` chrome, or
    /// failing that the configured standalone chrome. Without it, or when no
    /// chrome applies, the bare content is returned.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Definition`] if `name` is invalid or cannot be
    /// loaded, otherwise any error from [`Builder::build`].
    pub fn build_page(&self, name: &str, with_site: bool) -> Result<String, ResolveError> {
        let name = DefinitionName::parse(name)?;
        let page = self.store.load(&name)?;
        let content = self.builder.build(&page, &name)?;
        tracing::debug!(page = %name, bytes = content.len(), "Built page");

        if !with_site {
            return Ok(content);
        }
        match self.chrome_for(page.site)? {
            Some(site) => self.builder.wrap_site(&site, &content),
            None => Ok(content),
        }
    }

    /// Serve a dynamic content request.
    ///
    /// # Errors
    ///
    /// See [`ContentResolver::resolve`].
    pub fn resolve_content(
        &self,
        request: &ContentRequest,
        authenticated: bool,
    ) -> Result<ContentFragment, ContentError> {
        self.content.resolve(request, authenticated)
    }

    /// Build every definition in the store, collecting failures.
    ///
    /// The standalone chrome file is checked as a site definition rather than
    /// a page.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Definition`] only if the store cannot be
    /// listed.
    pub fn check(&self) -> Result<CheckReport, ResolveError> {
        let mut report = CheckReport::default();
        for name in self.store.list()? {
            let outcome = if self.chrome.as_ref() == Some(&name) {
                self.check_chrome(&name)
            } else {
                self.build_page(name.as_str(), true).map(drop)
            };
            match outcome {
                Ok(()) => report.passed.push(name),
                Err(error) => {
                    tracing::warn!(page = %name, error = %error, "Definition failed check");
                    report.failures.push(CheckFailure { name, error });
                }
            }
        }
        Ok(report)
    }

    fn check_chrome(&self, name: &DefinitionName) -> Result<(), ResolveError> {
        let site = self.store.load_site(name)?;
        self.builder.wrap_site(&site, "").map(drop)
    }

    fn chrome_for(
        &self,
        inline: Option<SiteDefinition>,
    ) -> Result<Option<SiteDefinition>, ResolveError> {
        if inline.is_some() {
            return Ok(inline);
        }
        match &self.chrome {
            Some(name) => Ok(Some(self.store.load_site(name)?)),
            None => Ok(None),
        }
    }
}

impl std::fmt::Debug for Site {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Site")
            .field("builder", &self.builder)
            .field("chrome", &self.chrome)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tessera_definition::{DefinitionError, MockDefinitionStore};

    use super::*;

    const PAGE: &str = r#"{"objects":[{"id":"about","component":"section_title/type_1","data":{"title":"About"}}]}"#;

    const CHROME: &str = r#"{"site":"top_bar/type_1","title":"Portfolio","navigationTabs":[
        {"label":"About","target":"about","state":"scrollTo"}
    ]}"#;

    fn site(store: MockDefinitionStore) -> Site {
        Site::new(Arc::new(store), Arc::new(LoaderRegistry::with_defaults()))
    }

    #[test]
    fn test_build_page_bare() {
        let site = site(MockDefinitionStore::new().with_definition("index.json", PAGE));
        let html = site.build_page("index.json", true).unwrap();
        assert!(html.starts_with(r#"<div class="section-title-component"#));
        assert!(!html.contains("<!DOCTYPE html>"));
    }

    #[test]
    fn test_build_page_with_standalone_chrome() {
        let site = site(
            MockDefinitionStore::new()
                .with_definition("index.json", PAGE)
                .with_definition("site.json", CHROME),
        )
        .with_chrome(DefinitionName::parse("site.json").unwrap());

        let html = site.build_page("index.json", true).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r##"href="#about/scrollTo""##));
        assert!(html.contains("About"));

        let bare = site.build_page("index.json", false).unwrap();
        assert!(!bare.contains("<!DOCTYPE html>"));
    }

    #[test]
    fn test_inline_chrome_takes_precedence() {
        let page = r#"{"site":{"site":"top_bar/type_1","title":"Inline"},"objects":[]}"#;
        let site = site(
            MockDefinitionStore::new()
                .with_definition("index.json", page)
                .with_definition("site.json", CHROME),
        )
        .with_chrome(DefinitionName::parse("site.json").unwrap());
        let html = site.build_page("index.json", true).unwrap();
        assert!(html.contains("<title>Inline</title>"));
    }

    #[test]
    fn test_build_page_invalid_name() {
        let site = site(MockDefinitionStore::new());
        let err = site.build_page("../secret.json", false).unwrap_err();
        assert!(matches!(
            err,
            ResolveError::Definition(DefinitionError::InvalidName(_))
        ));
    }

    #[test]
    fn test_check_reports_each_failure() {
        let site = site(
            MockDefinitionStore::new()
                .with_definition("index.json", PAGE)
                .with_definition("broken.json", r#"{"objects":[{"id":"x","component":"nope/type_1"}]}"#)
                .with_definition("corrupt.json", "{not json")
                .with_definition("site.json", CHROME),
        )
        .with_chrome(DefinitionName::parse("site.json").unwrap());

        let report = site.check().unwrap();
        let failed: Vec<&str> = report.failures.iter().map(|f| f.name.as_str()).collect();
        let passed: Vec<&str> = report.passed.iter().map(DefinitionName::as_str).collect();
        assert_eq!(failed, vec!["broken.json", "corrupt.json"]);
        assert_eq!(passed, vec!["index.json", "site.json"]);
        assert!(!report.is_ok());
    }

    static_assertions::assert_impl_all!(super::Site: Send, Sync);
}
