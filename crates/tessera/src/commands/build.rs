//! `build` command implementation.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use tessera_config::{CliSettings, Config};

use super::load_site;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Page definition to render (e.g. `index.json`).
    page: String,

    /// Write HTML to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Render the page content without site chrome.
    #[arg(long)]
    no_site: bool,

    /// Path to configuration file (default: auto-discover tessera.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Page definitions directory (overrides config).
    #[arg(short, long)]
    definitions_dir: Option<PathBuf>,
}

impl BuildArgs {
    /// Execute the build command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, the page build, or writing
    /// the output fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let cli_settings = CliSettings {
            definitions_dir: self.definitions_dir,
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let site = load_site(&config)?;

        let html = site.build_page(&self.page, !self.no_site)?;
        tracing::info!(
            page = %self.page,
            bytes = html.len(),
            with_site = !self.no_site,
            "Built page"
        );

        match &self.output {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(path, &html)?;
                Output::new().done(format_args!("Wrote {} to {}", self.page, path.display()));
            }
            None => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(html.as_bytes())?;
                stdout.write_all(b"\n")?;
            }
        }

        Ok(())
    }
}
