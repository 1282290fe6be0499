//! Handler capability.
//!
//! Handlers are written against the typed [`Shortcode`] trait. Registries
//! store them as object-safe [`Handler`]s, which every `Shortcode` implements
//! through a blanket impl.

use std::any::Any;
use std::fmt;

use crate::Attributes;

/// Errors raised by handlers while casting or rendering.
///
/// These are not absorbed by the compiler: a failing handler fails the
/// whole compile call.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// A required attribute was not supplied.
    #[error("missing required attribute `{0}`")]
    MissingAttribute(String),
    /// An attribute value could not be converted.
    #[error("attribute `{key}`: cannot read {value:?} as {expected}")]
    InvalidValue {
        /// Attribute key.
        key: String,
        /// Raw attribute value.
        value: String,
        /// Expected type (e.g., "integer").
        expected: &'static str,
    },
    /// Date parsing failed.
    #[error("invalid date: {0}")]
    Date(#[from] chrono::ParseError),
    /// Cast attributes of another handler were passed to `output`.
    #[error("cast attributes do not belong to handler `{tag}`")]
    CastMismatch {
        /// Name of the handler that received them.
        tag: String,
    },
    /// Template could not be parsed or rendered.
    #[error("template error: {0}")]
    Template(String),
    /// Any other handler-specific failure.
    #[error("{0}")]
    Other(String),
}

/// Conversion from parsed attributes into a handler's typed attributes.
///
/// `attrs` is `None` when the tag carried no attributes at all.
pub trait FromAttributes: Sized {
    fn from_attributes(attrs: Option<Attributes>) -> Result<Self, HandlerError>;
}

/// Identity: keeps the "no attributes" marker.
impl FromAttributes for Option<Attributes> {
    fn from_attributes(attrs: Option<Attributes>) -> Result<Self, HandlerError> {
        Ok(attrs)
    }
}

/// Identity that treats "no attributes" as an empty set.
impl FromAttributes for Attributes {
    fn from_attributes(attrs: Option<Attributes>) -> Result<Self, HandlerError> {
        Ok(attrs.unwrap_or_default())
    }
}

/// A typed shortcode handler.
///
/// The compiler calls [`cast`](Self::cast) and then
/// [`output`](Self::output) for every matched tag with this name. If the
/// tag's attributes are malformed, `cast` is skipped and `output` receives
/// `None`.
///
/// Handlers must not keep mutable state between calls; one instance serves
/// every match, possibly from several threads.
///
/// # Example
///
/// ```
/// use shortcodes::{Attributes, FromAttributes, Handler, HandlerError, Shortcode, compile_with};
/// use std::sync::Arc;
///
/// struct Double;
///
/// struct Number(i64);
///
/// impl FromAttributes for Number {
///     fn from_attributes(attrs: Option<Attributes>) -> Result<Self, HandlerError> {
///         let attrs = attrs.unwrap_or_default();
///         Ok(Number(attrs.int("n")?.unwrap_or(0)))
///     }
/// }
///
/// impl Shortcode for Double {
///     type Attrs = Number;
///
///     fn name(&self) -> &str { "double" }
///
///     fn output(&self, attrs: Option<Number>, _body: Option<&str>) -> Result<String, HandlerError> {
///         Ok(attrs.map(|n| (n.0 * 2).to_string()).unwrap_or_default())
///     }
/// }
///
/// let handlers: [Arc<dyn Handler>; 1] = [Arc::new(Double)];
/// let output = compile_with("[double n=21]", handlers).unwrap();
/// assert_eq!(output, "42");
/// ```
pub trait Shortcode: Send + Sync {
    /// Typed attributes produced by [`cast`](Self::cast).
    type Attrs: FromAttributes + Send + 'static;

    /// Tag name this handler answers to.
    fn name(&self) -> &str;

    /// Convert parsed attributes to typed attributes.
    ///
    /// Defaults to [`FromAttributes::from_attributes`].
    fn cast(&self, attrs: Option<Attributes>) -> Result<Self::Attrs, HandlerError> {
        Self::Attrs::from_attributes(attrs)
    }

    /// Render replacement text.
    ///
    /// `attrs` is `None` when attribute parsing failed; `body` is `None` for
    /// tags without a closing tag.
    fn output(
        &self,
        attrs: Option<Self::Attrs>,
        body: Option<&str>,
    ) -> Result<String, HandlerError>;
}

/// Type-erased attributes returned by [`Handler::cast`].
pub struct CastAttributes(Box<dyn Any + Send>);

impl CastAttributes {
    pub fn new<T: Any + Send>(value: T) -> Self {
        Self(Box::new(value))
    }

    /// Recover the typed value, or return `self` if the type differs.
    pub fn downcast<T: Any>(self) -> Result<T, Self> {
        match self.0.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(inner) => Err(Self(inner)),
        }
    }
}

impl fmt::Debug for CastAttributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CastAttributes").finish_non_exhaustive()
    }
}

/// Object-safe handler interface used by registries and the dispatcher.
///
/// Implemented for every [`Shortcode`].
pub trait Handler: Send + Sync {
    fn name(&self) -> &str;

    fn cast(&self, attrs: Option<Attributes>) -> Result<CastAttributes, HandlerError>;

    fn output(
        &self,
        attrs: Option<CastAttributes>,
        body: Option<&str>,
    ) -> Result<String, HandlerError>;
}

impl<S: Shortcode> Handler for S {
    fn name(&self) -> &str {
        Shortcode::name(self)
    }

    fn cast(&self, attrs: Option<Attributes>) -> Result<CastAttributes, HandlerError> {
        Shortcode::cast(self, attrs).map(CastAttributes::new)
    }

    fn output(
        &self,
        attrs: Option<CastAttributes>,
        body: Option<&str>,
    ) -> Result<String, HandlerError> {
        let attrs = attrs
            .map(|cast| {
                cast.downcast::<S::Attrs>()
                    .map_err(|_| HandlerError::CastMismatch {
                        tag: Shortcode::name(self).to_owned(),
                    })
            })
            .transpose()?;

        Shortcode::output(self, attrs, body)
    }
}
