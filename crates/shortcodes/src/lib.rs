//! Shortcode compiler.
//!
//! Compiles WordPress-style shortcodes embedded in text,
//! `[tag attr="value"]body[/tag]`, by dispatching each tag to a registered
//! handler and splicing its output back into the text.
//!
//! # Architecture
//!
//! - [`TagMatcher`]: scans text for self-closing, paired and escaped tags
//! - [`parse_attributes`]: splits raw attribute text into positional and
//!   named [`Attributes`]
//! - [`Shortcode`] / [`Handler`]: the handler capability (`name`, `cast`,
//!   `output`)
//! - [`Registry`]: tag name to handler lookup, either a fixed
//!   [`StaticRegistry`] or a lazily discovered [`CachedRegistry`]
//! - [`Compiler`]: runs the matcher and dispatches every match
//!
//! # Syntax
//!
//! | Input | Meaning |
//! |---|---|
//! | `[name a b=c]` | tag with positional `a` and named `b` |
//! | `[name /]` | self-closing tag |
//! | `[name]body[/name]` | paired tag |
//! | `[[name]]` | escaped, renders as `[name]` |
//!
//! Tags without a handler are left unchanged.
//!
//! # Example
//!
//! ```
//! use shortcodes::{Attributes, Compiler, HandlerError, Shortcode, StaticRegistry};
//!
//! struct Link;
//!
//! impl Shortcode for Link {
//!     type Attrs = Attributes;
//!
//!     fn name(&self) -> &str { "link" }
//!
//!     fn output(&self, attrs: Option<Attributes>, body: Option<&str>) -> Result<String, HandlerError> {
//!         let attrs = attrs.unwrap_or_default();
//!         let href = attrs.positional(0).unwrap_or("#");
//!         Ok(format!(r#"<a href="{href}">{}</a>"#, body.unwrap_or(href)))
//!     }
//! }
//!
//! let compiler = Compiler::new(StaticRegistry::new().with(Link));
//! let html = compiler.compile("See [link https://example.com]the docs[/link].").unwrap();
//! assert_eq!(html, r#"See <a href="https://example.com">the docs</a>."#);
//! ```

mod attributes;
mod cast;
mod compiler;
pub mod dispatch;
mod handler;
mod matcher;
mod registry;

pub use attributes::{AttributeError, Attributes, parse_attributes};
pub use cast::{DateParser, UtcDateParser, to_bool};
pub use compiler::{CompileError, Compiler, CompilerConfig, compile_with};
pub use handler::{CastAttributes, FromAttributes, Handler, HandlerError, Shortcode};
pub use matcher::{TagMatch, TagMatcher};
pub use registry::{CachedRegistry, HandlerProvider, ProviderError, Registry, StaticRegistry};
