//! Filesystem handler discovery.
//!
//! [`DirectoryProvider`] turns a directory of template files into
//! [`TemplateHandler`]s, one per file. Pair it with
//! [`CachedRegistry`](shortcodes::CachedRegistry) to get lazy discovery
//! with explicit invalidation:
//!
//! ```no_run
//! use shortcodes::{CachedRegistry, Compiler};
//! use shortcodes_fs::DirectoryProvider;
//!
//! let registry = CachedRegistry::new(DirectoryProvider::new("shortcodes"));
//! let compiler = Compiler::new(registry);
//! let html = compiler.compile("[hello_world]").unwrap();
//! ```

mod naming;
mod template;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use shortcodes::{Handler, HandlerProvider, ProviderError};

pub use template::TemplateHandler;

/// Default template file extension.
pub const DEFAULT_EXTENSION: &str = "html";

/// Discovers template handlers in a single directory.
///
/// Each non-hidden file with the configured extension becomes a handler
/// named after the snake-cased file stem (`HelloWorld.html` registers
/// `hello_world`). Subdirectories are not scanned. A missing directory
/// yields no handlers.
#[derive(Debug, Clone)]
pub struct DirectoryProvider {
    dir: PathBuf,
    extension: String,
}

impl DirectoryProvider {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            extension: DEFAULT_EXTENSION.to_owned(),
        }
    }

    /// Set the template file extension, without the leading dot.
    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Template files in the directory, sorted by path.
    fn template_files(&self) -> Result<Vec<PathBuf>, ProviderError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(dir = %self.dir.display(), "Template directory missing");
                return Ok(Vec::new());
            }
            Err(e) => return Err(io_error(&self.dir, e)),
        };

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| io_error(&self.dir, e))?;

            // Skip hidden files
            if entry.file_name().to_string_lossy().starts_with('.') {
                continue;
            }
            if !entry.file_type().is_ok_and(|t| t.is_file()) {
                continue;
            }

            let path = entry.path();
            if path.extension().is_some_and(|e| e == self.extension.as_str()) {
                paths.push(path);
            }
        }

        paths.sort();
        Ok(paths)
    }
}

fn io_error(path: &Path, source: io::Error) -> ProviderError {
    ProviderError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Load one template file; `None` if it cannot register a handler.
fn load(path: &Path) -> Result<Option<TemplateHandler>, ProviderError> {
    let Some(stem) = path.file_stem().map(|s| s.to_string_lossy()) else {
        return Ok(None);
    };

    let Some(name) = naming::tag_name(&stem) else {
        tracing::warn!(
            path = %path.display(),
            stem = %stem,
            "Skipping template with invalid tag name"
        );
        return Ok(None);
    };

    let source = fs::read_to_string(path).map_err(|e| io_error(path, e))?;
    match TemplateHandler::new(name, source) {
        Ok(handler) => Ok(Some(handler)),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Skipping invalid template");
            Ok(None)
        }
    }
}

impl HandlerProvider for DirectoryProvider {
    fn discover(&self) -> Result<Vec<Arc<dyn Handler>>, ProviderError> {
        let mut handlers: Vec<Arc<dyn Handler>> = Vec::new();

        for path in self.template_files()? {
            if let Some(handler) = load(&path)? {
                tracing::debug!(
                    tag = Handler::name(&handler),
                    path = %path.display(),
                    "Discovered template"
                );
                handlers.push(Arc::new(handler));
            }
        }

        Ok(handlers)
    }
}
