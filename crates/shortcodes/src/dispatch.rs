//! Handler dispatch for a single matched tag.

use crate::{CompileError, Registry, TagMatch, parse_attributes};

/// Outcome of dispatching one tag.
///
/// The compiler splices [`Literal`](Self::Literal) and
/// [`Rendered`](Self::Rendered) text in place of the match. For
/// [`Unhandled`](Self::Unhandled) it keeps the opening tag and scans the
/// rest as ordinary text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch<'a> {
    /// Escaped tag with one bracket layer removed.
    Literal(&'a str),
    /// Handler output.
    Rendered(String),
    /// No handler registered for the tag name.
    Unhandled,
}

/// Resolve and run the handler for `tag`.
///
/// Escaped tags are never looked up. Malformed attributes skip `cast` and
/// call `output` with `None`.
///
/// # Errors
///
/// Returns [`CompileError::Handler`] if the handler's `cast` or `output`
/// fails.
pub fn dispatch<'a, R>(registry: &R, tag: &TagMatch<'a>) -> Result<Dispatch<'a>, CompileError>
where
    R: Registry + ?Sized,
{
    if tag.escaped {
        return Ok(Dispatch::Literal(tag.literal()));
    }

    let Some(handler) = registry.lookup(tag.name) else {
        tracing::debug!(tag = tag.name, "No handler registered, passing through");
        return Ok(Dispatch::Unhandled);
    };

    let handler_error = |source| CompileError::Handler {
        tag: tag.name.to_owned(),
        source,
    };

    let cast = match parse_attributes(tag.raw_attributes) {
        Ok(attrs) => Some(handler.cast(attrs).map_err(handler_error)?),
        Err(e) => {
            tracing::warn!(tag = tag.name, error = %e, "Malformed shortcode attributes");
            None
        }
    };

    tracing::trace!(tag = tag.name, has_body = tag.body.is_some(), "Dispatching shortcode");
    let output = handler.output(cast, tag.body).map_err(handler_error)?;

    Ok(Dispatch::Rendered(output))
}
