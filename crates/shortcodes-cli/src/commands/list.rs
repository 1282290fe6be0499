//! `shortcodes list` command implementation.

use std::path::PathBuf;

use clap::Args;
use shortcodes::{Handler, Registry};

use super::load_registry;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the list command.
#[derive(Args)]
pub(crate) struct ListArgs {
    /// Path to configuration file (default: auto-discover shortcodes.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Template directory (overrides config).
    #[arg(short, long, env = "SHORTCODES_TEMPLATES")]
    templates: Option<PathBuf>,

    /// Enable verbose output (debug logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl ListArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let (config, registry) = load_registry(self.config.as_deref(), self.templates, None)?;

        let handlers = registry.all();
        if handlers.is_empty() {
            output.warning(&format!(
                "No templates found in {}",
                config.templates_resolved.dir.display()
            ));
            return Ok(());
        }

        for handler in handlers {
            output.result_line(handler.name())?;
        }
        Ok(())
    }
}
