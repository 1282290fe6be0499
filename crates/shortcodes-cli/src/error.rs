//! CLI error types.

use std::path::PathBuf;

use shortcodes::{CompileError, ProviderError};
use shortcodes_config::ConfigError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("failed to read {}: {source}", .path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Provider(#[from] ProviderError),

    #[error("{0}")]
    Compile(#[from] CompileError),
}
