//! Shortcode compiler.
//!
//! Replaces every tag in a text with its handler's output in one
//! left-to-right pass.

use std::sync::Arc;

use crate::dispatch::{Dispatch, dispatch};
use crate::{Handler, HandlerError, Registry, StaticRegistry, TagMatcher};

/// Error returned by [`Compiler::compile`].
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// A handler failed while casting or rendering.
    #[error("shortcode `{tag}` failed: {source}")]
    Handler {
        /// Tag name of the failing handler.
        tag: String,
        /// Handler error.
        #[source]
        source: HandlerError,
    },
}

/// Configuration for the compiler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilerConfig {
    /// How many levels of handler output are compiled again.
    ///
    /// Default: 0 (handler output is spliced in as-is)
    pub recursion_limit: usize,
}

impl CompilerConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the recursion limit.
    #[must_use]
    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }
}

/// Compiles shortcodes against a [`Registry`].
///
/// A compiler holds no per-call state, so one instance can serve
/// concurrent `compile` calls.
///
/// # Example
///
/// ```
/// use shortcodes::{Attributes, Compiler, HandlerError, Shortcode, StaticRegistry};
///
/// struct Upper;
///
/// impl Shortcode for Upper {
///     type Attrs = Attributes;
///     fn name(&self) -> &str { "upper" }
///     fn output(&self, _: Option<Attributes>, body: Option<&str>) -> Result<String, HandlerError> {
///         Ok(body.unwrap_or_default().to_uppercase())
///     }
/// }
///
/// let compiler = Compiler::new(StaticRegistry::new().with(Upper));
/// let output = compiler.compile("Say [upper]hello[/upper], not [[upper]] or [lower].").unwrap();
/// assert_eq!(output, "Say HELLO, not [upper] or [lower].");
/// ```
pub struct Compiler<R> {
    registry: R,
    config: CompilerConfig,
}

impl<R: Registry> Compiler<R> {
    /// Create a compiler with default configuration.
    #[must_use]
    pub fn new(registry: R) -> Self {
        Self::with_config(registry, CompilerConfig::default())
    }

    #[must_use]
    pub fn with_config(registry: R, config: CompilerConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compile all shortcodes in `input`.
    ///
    /// Unknown tags are left unchanged, though tags inside their body are
    /// still compiled. Escaped tags lose one bracket layer.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::Handler`] as soon as any handler fails; no
    /// partial output is returned.
    pub fn compile(&self, input: &str) -> Result<String, CompileError> {
        self.compile_with_depth(input, 0)
    }

    fn compile_with_depth(&self, input: &str, depth: usize) -> Result<String, CompileError> {
        let mut output = String::with_capacity(input.len());
        let mut last = 0;
        let mut matcher = TagMatcher::new(input);

        while let Some(tag) = matcher.next() {
            output.push_str(&input[last..tag.span.start]);
            last = tag.span.end;

            match dispatch(&self.registry, &tag)? {
                Dispatch::Literal(text) => output.push_str(text),
                Dispatch::Rendered(rendered) => {
                    let expanded = self.expand(rendered, depth)?;
                    output.push_str(&expanded);
                }
                Dispatch::Unhandled => {
                    // Only the opening tag is kept; its body is scanned as text
                    let opening = tag.opening();
                    output.push_str(opening);
                    last = tag.span.start + opening.len();
                    matcher = TagMatcher::resume(input, last);
                }
            }
        }

        output.push_str(&input[last..]);
        Ok(output)
    }

    /// Compile handler output again while under the recursion limit.
    fn expand(&self, rendered: String, depth: usize) -> Result<String, CompileError> {
        let limit = self.config.recursion_limit;
        if limit == 0 {
            return Ok(rendered);
        }
        if depth >= limit {
            if TagMatcher::new(&rendered).next().is_some() {
                tracing::warn!(limit, "Shortcode recursion limit reached, output left unexpanded");
            }
            return Ok(rendered);
        }
        self.compile_with_depth(&rendered, depth + 1)
    }
}

/// Compile `input` against a fixed handler set.
///
/// # Errors
///
/// Returns [`CompileError::Handler`] if any handler fails.
pub fn compile_with(
    input: &str,
    handlers: impl IntoIterator<Item = Arc<dyn Handler>>,
) -> Result<String, CompileError> {
    Compiler::new(StaticRegistry::from_handlers(handlers)).compile(input)
}
