//! `shortcodes compile` command implementation.

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::Args;
use shortcodes::{Compiler, CompilerConfig};

use super::load_registry;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the compile command.
#[derive(Args)]
pub(crate) struct CompileArgs {
    /// Input file (default: stdin; `-` also reads stdin).
    file: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover shortcodes.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Template directory (overrides config).
    #[arg(short, long, env = "SHORTCODES_TEMPLATES")]
    templates: Option<PathBuf>,

    /// How many levels of handler output to compile again (overrides config).
    #[arg(long)]
    recursion_limit: Option<usize>,

    /// Enable verbose output (debug logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl CompileArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let (config, registry) = load_registry(
            self.config.as_deref(),
            self.templates,
            self.recursion_limit,
        )?;
        let compiler_config =
            CompilerConfig::new().with_recursion_limit(config.compiler.recursion_limit);
        let compiler = Compiler::with_config(registry, compiler_config);

        let input = read_input(self.file.as_deref())?;
        let compiled = compiler.compile(&input)?;

        output.result(&compiled)?;
        Ok(())
    }
}

fn read_input(file: Option<&Path>) -> Result<String, CliError> {
    match file {
        Some(path) if path != Path::new("-") => {
            std::fs::read_to_string(path).map_err(|source| CliError::Input {
                path: path.to_path_buf(),
                source,
            })
        }
        _ => {
            let mut input = String::new();
            std::io::stdin().read_to_string(&mut input)?;
            Ok(input)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_input_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.txt");
        std::fs::write(&path, "[hello]").unwrap();

        assert_eq!(read_input(Some(&path)).unwrap(), "[hello]");
    }

    #[test]
    fn test_read_input_missing_file() {
        let err = read_input(Some(Path::new("/nonexistent/page.txt"))).unwrap_err();
        assert!(matches!(err, CliError::Input { .. }));
        assert!(err.to_string().contains("/nonexistent/page.txt"));
    }
}
