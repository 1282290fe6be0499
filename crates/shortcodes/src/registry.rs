//! Tag name to handler lookup.
//!
//! - [`Registry`]: the lookup interface the compiler depends on
//! - [`StaticRegistry`]: a fixed set of handlers
//! - [`CachedRegistry`]: handlers discovered by a [`HandlerProvider`], built
//!   on first use and rebuilt after [`Registry::invalidate`]
//!
//! # Thread Safety
//!
//! `CachedRegistry` is designed for concurrent access:
//! - `lookup()` clones an `Arc` snapshot under a short read lock
//! - the first lookup after construction or invalidation rebuilds under
//!   double-checked locking, so discovery runs once per invalidation
//! - `invalidate()` is lock-free (atomic generation counter)
//!
//! An `invalidate()` that lands while a rebuild is running leaves the new
//! snapshot stale, so the next lookup discovers again.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Instant;

use crate::Handler;

type HandlerMap = HashMap<String, Arc<dyn Handler>>;

/// Lookup of handlers by tag name.
pub trait Registry: Send + Sync {
    /// Find the handler for `name`.
    fn lookup(&self, name: &str) -> Option<Arc<dyn Handler>>;

    /// All registered handlers, sorted by name.
    fn all(&self) -> Vec<Arc<dyn Handler>>;

    /// Drop cached state so the next lookup sees newly added handlers.
    fn invalidate(&self);
}

impl<R: Registry + ?Sized> Registry for Arc<R> {
    fn lookup(&self, name: &str) -> Option<Arc<dyn Handler>> {
        (**self).lookup(name)
    }

    fn all(&self) -> Vec<Arc<dyn Handler>> {
        (**self).all()
    }

    fn invalidate(&self) {
        (**self).invalidate();
    }
}

/// Build a name map; later handlers replace earlier ones with the same name.
fn index_handlers(handlers: impl IntoIterator<Item = Arc<dyn Handler>>) -> HandlerMap {
    let mut map = HandlerMap::new();
    for handler in handlers {
        let name = handler.name().to_owned();
        if map.insert(name.clone(), handler).is_some() {
            tracing::warn!(tag = %name, "Duplicate shortcode handler, keeping the last one");
        }
    }
    map
}

fn sorted_handlers(map: &HandlerMap) -> Vec<Arc<dyn Handler>> {
    let mut handlers: Vec<_> = map.values().map(Arc::clone).collect();
    handlers.sort_by(|a, b| a.name().cmp(b.name()));
    handlers
}

/// Registry over a fixed handler set.
///
/// # Example
///
/// ```
/// use shortcodes::{Attributes, HandlerError, Registry, Shortcode, StaticRegistry};
///
/// struct Year;
///
/// impl Shortcode for Year {
///     type Attrs = Attributes;
///     fn name(&self) -> &str { "year" }
///     fn output(&self, _: Option<Attributes>, _: Option<&str>) -> Result<String, HandlerError> {
///         Ok("2024".to_owned())
///     }
/// }
///
/// let registry = StaticRegistry::new().with(Year);
/// assert!(registry.lookup("year").is_some());
/// assert!(registry.lookup("month").is_none());
/// ```
#[derive(Default)]
pub struct StaticRegistry {
    handlers: HandlerMap,
}

impl StaticRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry from already boxed handlers.
    #[must_use]
    pub fn from_handlers(handlers: impl IntoIterator<Item = Arc<dyn Handler>>) -> Self {
        Self {
            handlers: index_handlers(handlers),
        }
    }

    /// Register a handler.
    #[must_use]
    pub fn with<H: Handler + 'static>(mut self, handler: H) -> Self {
        self.insert(Arc::new(handler));
        self
    }

    /// Register a shared handler, replacing any handler with the same name.
    pub fn insert(&mut self, handler: Arc<dyn Handler>) {
        let name = handler.name().to_owned();
        if self.handlers.insert(name.clone(), handler).is_some() {
            tracing::warn!(tag = %name, "Duplicate shortcode handler, keeping the last one");
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for StaticRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.handlers.keys().collect();
        names.sort();
        f.debug_struct("StaticRegistry")
            .field("handlers", &names)
            .finish()
    }
}

impl Registry for StaticRegistry {
    fn lookup(&self, name: &str) -> Option<Arc<dyn Handler>> {
        self.handlers.get(name).map(Arc::clone)
    }

    fn all(&self) -> Vec<Arc<dyn Handler>> {
        sorted_handlers(&self.handlers)
    }

    fn invalidate(&self) {}
}

/// Error returned by a [`HandlerProvider`] during discovery.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Reading a handler source failed.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// Path being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Provider-specific failure.
    #[error("{0}")]
    Other(String),
}

/// Discovers the handlers available to a [`CachedRegistry`].
pub trait HandlerProvider: Send + Sync {
    fn discover(&self) -> Result<Vec<Arc<dyn Handler>>, ProviderError>;
}

/// Registry that discovers handlers lazily and caches them.
///
/// Discovery runs on the first lookup and again on the first lookup after
/// [`invalidate`](Registry::invalidate). A failing provider is logged and
/// yields an empty handler set until the next invalidation.
pub struct CachedRegistry<P> {
    provider: P,
    /// Serializes rebuilds.
    reload_lock: Mutex<()>,
    /// Current handler snapshot (atomically swappable).
    current: RwLock<Arc<HandlerMap>>,
    /// Bumped by every invalidation.
    generation: AtomicU64,
    /// Generation the current snapshot was built for.
    built: AtomicU64,
}

impl<P: HandlerProvider> CachedRegistry<P> {
    #[must_use]
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            reload_lock: Mutex::new(()),
            current: RwLock::new(Arc::new(HandlerMap::new())),
            generation: AtomicU64::new(1),
            built: AtomicU64::new(0),
        }
    }

    /// The underlying provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Current handler map, rebuilding it first if invalid.
    fn snapshot(&self) -> Arc<HandlerMap> {
        // Fast path: cache valid
        if self.is_valid() {
            return self.current();
        }

        let _guard = self
            .reload_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        // Double-check after acquiring lock
        if self.is_valid() {
            return self.current();
        }

        // Read before discovery so a concurrent invalidation stays visible
        let generation = self.generation.load(Ordering::Acquire);
        let start = Instant::now();
        let map = match self.provider.discover() {
            Ok(handlers) => index_handlers(handlers),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to discover shortcode handlers");
                HandlerMap::new()
            }
        };

        let map = Arc::new(map);
        *self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Arc::clone(&map);
        self.built.store(generation, Ordering::Release);

        tracing::info!(
            handler_count = map.len(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Shortcode registry rebuilt"
        );

        map
    }

    fn is_valid(&self) -> bool {
        self.built.load(Ordering::Acquire) == self.generation.load(Ordering::Acquire)
    }

    fn current(&self) -> Arc<HandlerMap> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }
}

impl<P: HandlerProvider> Registry for CachedRegistry<P> {
    fn lookup(&self, name: &str) -> Option<Arc<dyn Handler>> {
        self.snapshot().get(name).map(Arc::clone)
    }

    fn all(&self) -> Vec<Arc<dyn Handler>> {
        sorted_handlers(&self.snapshot())
    }

    fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
    }
}
