//! CLI error types.

use tessera_config::ConfigError;
use tessera_definition::DefinitionError;
use tessera_server::ServerError;
use tessera_site::ResolveError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Definition(#[from] DefinitionError),

    #[error("{0}")]
    Build(#[from] ResolveError),

    #[error("{0}")]
    Server(#[from] ServerError),

    #[error("{0}")]
    Validation(String),
}
