//! CLI command implementations.

pub(crate) mod compile;
pub(crate) mod list;

pub(crate) use compile::CompileArgs;
pub(crate) use list::ListArgs;

use std::path::{Path, PathBuf};

use shortcodes::{HandlerProvider, StaticRegistry};
use shortcodes_config::{CliSettings, Config};
use shortcodes_fs::DirectoryProvider;

use crate::error::CliError;

/// Load config and discover the template handlers it points at.
///
/// Discovery errors are returned instead of leaving the registry empty.
fn load_registry(
    config_path: Option<&Path>,
    templates_dir: Option<PathBuf>,
    recursion_limit: Option<usize>,
) -> Result<(Config, StaticRegistry), CliError> {
    let cli_settings = CliSettings {
        templates_dir,
        recursion_limit,
    };
    let config = Config::load(config_path, Some(&cli_settings))?;

    let templates = &config.templates_resolved;
    tracing::debug!(
        dir = %templates.dir.display(),
        extension = %templates.extension,
        "Loading templates"
    );

    let provider =
        DirectoryProvider::new(&templates.dir).with_extension(templates.extension.clone());
    let registry = StaticRegistry::from_handlers(provider.discover()?);

    Ok((config, registry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use shortcodes::{Compiler, Handler, Registry};

    #[test]
    fn test_load_registry_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("shortcodes.toml");
        std::fs::write(
            &config_path,
            "[compiler]\nrecursion_limit = 1\n\n[templates]\ndir = \"partials\"\n",
        )
        .unwrap();
        std::fs::create_dir(dir.path().join("partials")).unwrap();
        std::fs::write(dir.path().join("partials/Note.html"), "<p>{{ body }}</p>").unwrap();

        let (config, registry) = load_registry(Some(&config_path), None, None).unwrap();

        assert_eq!(config.compiler.recursion_limit, 1);
        let names: Vec<_> = registry.all().iter().map(|h| h.name().to_owned()).collect();
        assert_eq!(names, vec!["note"]);

        let compiled = Compiler::new(registry).compile("[note]hi[/note]").unwrap();
        assert_eq!(compiled, "<p>hi</p>");
    }

    #[test]
    fn test_load_registry_templates_override() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("shortcodes.toml");
        std::fs::write(&config_path, "").unwrap();
        let templates = dir.path().join("elsewhere");
        std::fs::create_dir(&templates).unwrap();
        std::fs::write(templates.join("call-out.html"), "!").unwrap();

        let (config, registry) =
            load_registry(Some(&config_path), Some(templates.clone()), Some(2)).unwrap();

        assert_eq!(config.templates_resolved.dir, templates);
        assert_eq!(config.compiler.recursion_limit, 2);
        assert!(registry.lookup("call_out").is_some());
    }

    #[test]
    fn test_load_registry_missing_config() {
        let err = load_registry(Some(Path::new("/nonexistent/shortcodes.toml")), None, None)
            .unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }
}
