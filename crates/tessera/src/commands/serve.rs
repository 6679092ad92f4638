//! `serve` command implementation.

use std::path::PathBuf;

use clap::Args;
use tessera_config::{CliSettings, Config};
use tessera_server::{run_server, server_config_from_tessera_config};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    /// Path to configuration file (default: auto-discover tessera.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Server host (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Server port (overrides config).
    #[arg(short, long)]
    port: Option<u16>,

    /// Page definitions directory (overrides config).
    #[arg(short, long)]
    definitions_dir: Option<PathBuf>,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading fails or server fails to start.
    pub(crate) async fn execute(self, version: &str) -> Result<(), CliError> {
        let cli_settings = CliSettings {
            host: self.host,
            port: self.port,
            definitions_dir: self.definitions_dir,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let output = Output::new();
        output.heading(format_args!(
            "Serving on http://{}:{}",
            config.server.host, config.server.port
        ));
        output.field(
            "definitions",
            config.site_resolved.definitions_dir.display(),
        );
        output.field("entry", &config.site_resolved.entry);
        if let Some(site) = &config.site_resolved.site {
            output.field("chrome", site);
        }
        output.field("endpoint", &config.client.endpoint);
        if config.auth.session_tokens.is_empty() {
            output.note("No session tokens configured, protected content disabled");
        }

        let server_config = server_config_from_tessera_config(&config, version.to_owned());
        run_server(server_config).await?;

        Ok(())
    }
}
