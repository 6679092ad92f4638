//! `check` command implementation.

use std::path::PathBuf;

use clap::Args;
use tessera_config::{CliSettings, Config};

use super::load_site;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the check command.
#[derive(Args)]
pub(crate) struct CheckArgs {
    /// Path to configuration file (default: auto-discover tessera.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Page definitions directory (overrides config).
    #[arg(short, long)]
    definitions_dir: Option<PathBuf>,
}

impl CheckArgs {
    /// Execute the check command.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Validation`] if any definition fails to build.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let cli_settings = CliSettings {
            definitions_dir: self.definitions_dir,
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let site = load_site(&config)?;

        let output = Output::new();
        output.heading(format_args!(
            "Checking {}",
            config.site_resolved.definitions_dir.display()
        ));

        let report = site.check()?;
        for name in &report.passed {
            output.check_result(name, None);
        }
        for failure in &report.failures {
            output.check_result(&failure.name, Some(&failure.error));
        }

        let total = report.passed.len() + report.failures.len();
        tracing::info!(
            passed = report.passed.len(),
            failed = report.failures.len(),
            "Checked definitions"
        );
        if !report.is_ok() {
            return Err(CliError::Validation(format!(
                "{} of {total} definitions failed",
                report.failures.len()
            )));
        }
        output.done(format_args!("{total} definitions ok"));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::commands::test_support::{INDEX, project};

    #[test]
    fn test_check_passes_valid_definitions() {
        let dir = tempfile::tempdir().unwrap();
        let config = project(dir.path(), &[("index.json", INDEX), ("about.json", INDEX)]);

        let args = CheckArgs {
            config: Some(config),
            definitions_dir: None,
        };
        assert!(args.execute().is_ok());
    }

    #[test]
    fn test_check_reports_every_failure() {
        let dir = tempfile::tempdir().unwrap();
        let config = project(
            dir.path(),
            &[
                ("index.json", INDEX),
                ("broken.json", "{not json"),
                ("unknown.json", r#"{"objects": [{"id": "x", "component": "nope/type_9"}]}"#),
            ],
        );

        let args = CheckArgs {
            config: Some(config),
            definitions_dir: None,
        };
        let err = args.execute().unwrap_err();
        assert_eq!(err.to_string(), "2 of 3 definitions failed");
    }

    #[test]
    fn test_check_definitions_dir_override() {
        let dir = tempfile::tempdir().unwrap();
        let config = project(dir.path(), &[("broken.json", "{")]);
        let clean = dir.path().join("clean");
        std::fs::create_dir_all(&clean).unwrap();
        std::fs::write(clean.join("index.json"), INDEX).unwrap();

        let args = CheckArgs {
            config: Some(config),
            definitions_dir: Some(clean),
        };
        assert!(args.execute().is_ok());
    }
}
