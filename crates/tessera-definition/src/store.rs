//! Page definition store trait and filesystem implementation.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::DefinitionError;
use crate::model::{PageDefinition, SiteDefinition};
use crate::name::DefinitionName;
use crate::parse::parse_definition;

/// Source of page definition documents.
///
/// Implementations only ever receive validated [`DefinitionName`]s, so a
/// store never has to re-check for path traversal.
pub trait DefinitionStore: Send + Sync {
    /// Read the raw JSON for `name`.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::NotFound`] if the definition does not exist,
    /// or [`DefinitionError::Io`] if it exists but cannot be read.
    fn read(&self, name: &DefinitionName) -> Result<String, DefinitionError>;

    /// List every definition in the store, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::Io`] if the store cannot be enumerated.
    fn list(&self) -> Result<Vec<DefinitionName>, DefinitionError>;

    /// Read and parse `name` as a page definition.
    ///
    /// # Errors
    ///
    /// Returns any error from [`Self::read`] or [`parse_definition`].
    fn load(&self, name: &DefinitionName) -> Result<PageDefinition, DefinitionError> {
        let json = self.read(name)?;
        parse_definition(&json)
    }

    /// Read and parse `name` as a standalone site definition.
    ///
    /// # Errors
    ///
    /// Returns any error from [`Self::read`], or [`DefinitionError::Json`].
    fn load_site(&self, name: &DefinitionName) -> Result<SiteDefinition, DefinitionError> {
        let json = self.read(name)?;
        SiteDefinition::from_json(&json)
    }
}

/// Store backed by a directory of `*.json` files.
#[derive(Clone, Debug)]
pub struct FsDefinitionStore {
    root: PathBuf,
}

impl FsDefinitionStore {
    /// Create a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Definitions directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl DefinitionStore for FsDefinitionStore {
    fn read(&self, name: &DefinitionName) -> Result<String, DefinitionError> {
        let path = self.root.join(name.as_str());
        tracing::debug!(definition = %name, path = %path.display(), "Reading page definition");
        fs::read_to_string(&path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                DefinitionError::NotFound(name.to_string())
            } else {
                DefinitionError::Io { path, source }
            }
        })
    }

    fn list(&self) -> Result<Vec<DefinitionName>, DefinitionError> {
        let entries = fs::read_dir(&self.root).map_err(|source| DefinitionError::Io {
            path: self.root.clone(),
            source,
        })?;

        let mut names: Vec<DefinitionName> = entries
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
            .filter_map(|entry| {
                let file_name = entry.file_name();
                DefinitionName::parse(file_name.to_str()?).ok()
            })
            .collect();
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    fn name(s: &str) -> DefinitionName {
        DefinitionName::parse(s).unwrap()
    }

    #[test]
    fn test_fs_store_load() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("index.json"),
            r#"{"objects":[{"id":"p","component":"placeholder/type_1"}]}"#,
        )
        .unwrap();

        let store = FsDefinitionStore::new(dir.path());
        let def = store.load(&name("index.json")).unwrap();
        assert_eq!(def.objects[0].id, "p");
    }

    #[test]
    fn test_fs_store_not_found() {
        let dir = TempDir::new().unwrap();
        let store = FsDefinitionStore::new(dir.path());
        let err = store.read(&name("missing.json")).unwrap_err();
        assert!(matches!(err, DefinitionError::NotFound(n) if n == "missing.json"));
    }

    #[test]
    fn test_fs_store_list_skips_invalid_names() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.json"), "{}").unwrap();
        fs::write(dir.path().join("a.json"), "{}").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        fs::write(dir.path().join("bad name.json"), "{}").unwrap();
        fs::create_dir(dir.path().join("dir.json")).unwrap();

        let store = FsDefinitionStore::new(dir.path());
        let listed: Vec<String> = store
            .list()
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(listed, vec!["a.json", "b.json"]);
    }

    #[test]
    fn test_fs_store_load_site() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("site.json"),
            r#"{"site":"top_bar/type_1","title":"Portfolio"}"#,
        )
        .unwrap();
        let store = FsDefinitionStore::new(dir.path());
        let site = store.load_site(&name("site.json")).unwrap();
        assert_eq!(site.title.as_deref(), Some("Portfolio"));
        assert!(site.navigation_tabs.is_empty());
    }
}
