//! CLI command implementations.

mod build;
mod check;
mod serve;

use std::sync::Arc;

use tessera_config::Config;
use tessera_definition::{DefinitionName, FsDefinitionStore};
use tessera_loaders::LoaderRegistry;
use tessera_site::Site;

pub(crate) use build::BuildArgs;
pub(crate) use check::CheckArgs;
pub(crate) use serve::ServeArgs;

use crate::error::CliError;

/// Site over the configured definitions directory and chrome.
fn load_site(config: &Config) -> Result<Site, CliError> {
    let resolved = &config.site_resolved;
    let store = Arc::new(FsDefinitionStore::new(resolved.definitions_dir.clone()));
    let mut site = Site::new(store, Arc::new(LoaderRegistry::with_defaults()));
    if let Some(chrome) = &resolved.site {
        site = site.with_chrome(DefinitionName::parse(chrome)?);
    }
    Ok(site)
}
