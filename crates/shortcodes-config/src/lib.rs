//! Configuration management for the shortcodes compiler.
//!
//! Parses `shortcodes.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ```toml
//! [compiler]
//! recursion_limit = 0
//!
//! [templates]
//! dir = "shortcodes"
//! extension = "html"
//! ```
//!
//! ## Environment Variable Expansion
//!
//! `templates.dir` supports environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the template directory.
    pub templates_dir: Option<PathBuf>,
    /// Override the compiler recursion limit.
    pub recursion_limit: Option<usize>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "shortcodes.toml";

/// Upper bound for `compiler.recursion_limit`.
pub const MAX_RECURSION_LIMIT: usize = 32;

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Compiler configuration.
    pub compiler: CompilerSection,
    /// Template discovery configuration (paths are relative strings from TOML).
    templates: TemplatesConfigRaw,

    /// Resolved template configuration (set after loading).
    #[serde(skip)]
    pub templates_resolved: TemplatesConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// `[compiler]` section.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CompilerSection {
    /// How many levels of handler output are compiled again.
    pub recursion_limit: usize,
}

/// Raw templates configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct TemplatesConfigRaw {
    dir: Option<String>,
    extension: Option<String>,
}

/// Resolved template configuration with absolute paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplatesConfig {
    /// Directory scanned for template files.
    pub dir: PathBuf,
    /// Template file extension, without the leading dot.
    pub extension: String,
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_TEMPLATES_DIR),
            extension: DEFAULT_EXTENSION.to_owned(),
        }
    }
}

const DEFAULT_TEMPLATES_DIR: &str = "shortcodes";
const DEFAULT_EXTENSION: &str = "html";

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`templates.dir`").
        field: String,
        /// Error message (e.g., "${`SITE_ROOT`} not set").
        message: String,
    },
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise,
    /// searches for `shortcodes.toml` in the current directory and parents,
    /// falling back to defaults relative to the current directory.
    ///
    /// CLI settings are applied after path resolution and take precedence
    /// over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails
    /// or the resulting configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(dir) = &settings.templates_dir {
            self.templates_resolved.dir.clone_from(dir);
        }
        if let Some(limit) = settings.recursion_limit {
            self.compiler.recursion_limit = limit;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        find_config_from(&current)
    }

    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            compiler: CompilerSection::default(),
            templates: TemplatesConfigRaw::default(),
            templates_resolved: TemplatesConfig {
                dir: base.join(DEFAULT_TEMPLATES_DIR),
                extension: DEFAULT_EXTENSION.to_owned(),
            },
            config_path: None,
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.compiler.recursion_limit > MAX_RECURSION_LIMIT {
            return Err(ConfigError::Validation(format!(
                "compiler.recursion_limit cannot exceed {MAX_RECURSION_LIMIT}"
            )));
        }

        let extension = &self.templates_resolved.extension;
        if extension.is_empty() {
            return Err(ConfigError::Validation(
                "templates.extension cannot be empty".to_owned(),
            ));
        }
        if extension.starts_with('.') {
            return Err(ConfigError::Validation(
                "templates.extension must not start with a dot".to_owned(),
            ));
        }

        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref dir) = self.templates.dir {
            self.templates.dir = Some(expand::expand_env(dir, "templates.dir")?);
        }
        Ok(())
    }

    /// Resolve relative paths against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.templates_resolved = TemplatesConfig {
            dir: config_dir.join(
                self.templates
                    .dir
                    .as_deref()
                    .unwrap_or(DEFAULT_TEMPLATES_DIR),
            ),
            extension: self
                .templates
                .extension
                .clone()
                .unwrap_or_else(|| DEFAULT_EXTENSION.to_owned()),
        };
    }
}

/// Find `shortcodes.toml` in `start` or its nearest ancestor.
fn find_config_from(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(CONFIG_FILENAME);
        if candidate.exists() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));
        assert_eq!(config.compiler.recursion_limit, 0);
        assert_eq!(
            config.templates_resolved.dir,
            PathBuf::from("/test/shortcodes")
        );
        assert_eq!(config.templates_resolved.extension, "html");
        assert!(config.config_path.is_none());
    }

    #[test]
    fn test_parse_minimal_config() {
        let mut config: Config = toml::from_str("").unwrap();
        config.resolve_paths(Path::new("/project"));
        assert_eq!(config.compiler.recursion_limit, 0);
        assert_eq!(
            config.templates_resolved,
            TemplatesConfig {
                dir: PathBuf::from("/project/shortcodes"),
                extension: "html".to_owned(),
            }
        );
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[compiler]
recursion_limit = 3

[templates]
dir = "partials/shortcodes"
extension = "tpl"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(config.compiler.recursion_limit, 3);
        assert_eq!(
            config.templates_resolved.dir,
            PathBuf::from("/project/partials/shortcodes")
        );
        assert_eq!(config.templates_resolved.extension, "tpl");
    }

    #[test]
    fn test_absolute_dir_kept() {
        let toml = r#"
[templates]
dir = "/opt/shortcodes"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));
        assert_eq!(
            config.templates_resolved.dir,
            PathBuf::from("/opt/shortcodes")
        );
    }

    #[test]
    fn test_parse_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("[compiler]\nrecursion_limit = \"many\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_recursion_limit() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.compiler.recursion_limit = MAX_RECURSION_LIMIT;
        assert!(config.validate().is_ok());

        config.compiler.recursion_limit = MAX_RECURSION_LIMIT + 1;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("recursion_limit"));
    }

    #[test]
    fn test_validate_extension() {
        let mut config = Config::default_with_base(Path::new("/test"));

        config.templates_resolved.extension = String::new();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        config.templates_resolved.extension = ".html".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("dot"));
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            templates_dir: Some(PathBuf::from("/custom")),
            recursion_limit: Some(2),
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.templates_resolved.dir, PathBuf::from("/custom"));
        assert_eq!(config.compiler.recursion_limit, 2);
        assert_eq!(config.templates_resolved.extension, "html");
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default_with_base(Path::new("/test"));

        config.apply_cli_settings(&CliSettings::default());

        assert_eq!(
            config.templates_resolved.dir,
            PathBuf::from("/test/shortcodes")
        );
        assert_eq!(config.compiler.recursion_limit, 0);
    }

    #[test]
    fn test_expand_env_vars_templates_dir() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("SHORTCODES_CONFIG_TEST_DIR", "/env/shortcodes");
        }

        let toml = r#"
[templates]
dir = "${SHORTCODES_CONFIG_TEST_DIR}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(
            config.templates_resolved.dir,
            PathBuf::from("/env/shortcodes")
        );

        unsafe {
            std::env::remove_var("SHORTCODES_CONFIG_TEST_DIR");
        }
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[compiler]\nrecursion_limit = 1\n").unwrap();

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.compiler.recursion_limit, 1);
        assert_eq!(config.templates_resolved.dir, dir.path().join("shortcodes"));
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_with_cli_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[compiler]\nrecursion_limit = 1\n").unwrap();

        let settings = CliSettings {
            recursion_limit: Some(4),
            ..Default::default()
        };
        let config = Config::load(Some(&path), Some(&settings)).unwrap();
        assert_eq!(config.compiler.recursion_limit, 4);

        let settings = CliSettings {
            recursion_limit: Some(MAX_RECURSION_LIMIT + 1),
            ..Default::default()
        };
        assert!(matches!(
            Config::load(Some(&path), Some(&settings)),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_load_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[templates]\nextension = \"\"\n").unwrap();

        assert!(matches!(
            Config::load(Some(&path), None),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_load_explicit_path_not_found() {
        let result = Config::load(Some(Path::new("/nonexistent/shortcodes.toml")), None);
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_find_config_in_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "").unwrap();
        let nested = dir.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_config_from(&nested), Some(path));
    }
}
