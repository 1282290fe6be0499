//! Template handlers.
//!
//! Templates are rendered with `minijinja`. The context holds:
//!
//! - `body`: the tag body
//! - `args`: positional attributes (`{{ args[0] }}`)
//! - `attrs`: named attributes (`{{ attrs["data-id"] }}`)
//! - every named attribute as a top-level variable (`{{ title }}`)
//!
//! Missing values render as empty strings. Output is not auto-escaped, so
//! templates can wrap HTML bodies; use the `escape` filter where needed.

use std::collections::BTreeMap;

use minijinja::{AutoEscape, Environment, Value};
use shortcodes::{Attributes, HandlerError, Shortcode};

/// Handler rendering a template under a fixed tag name.
///
/// Malformed attributes render as if no attributes were supplied.
#[derive(Debug)]
pub struct TemplateHandler {
    name: String,
    env: Environment<'static>,
}

impl TemplateHandler {
    /// Compile `source` as the template for tag `name`.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::Template`] if the source has a syntax error.
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Result<Self, HandlerError> {
        let name = name.into();
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.add_template_owned(name.clone(), source.into())
            .map_err(template_error)?;
        Ok(Self { name, env })
    }

    fn render(&self, attrs: &Attributes, body: Option<&str>) -> Result<String, HandlerError> {
        let mut ctx: BTreeMap<&str, Value> = attrs
            .named
            .iter()
            .map(|(key, value)| (key.as_str(), Value::from(value.as_str())))
            .collect();

        ctx.insert("args", Value::from_serialize(&attrs.positional));
        ctx.insert("attrs", Value::from_serialize(&attrs.named));
        // Left undefined when absent so it renders empty
        ctx.remove("body");
        if let Some(body) = body {
            ctx.insert("body", Value::from(body));
        }

        self.env
            .get_template(&self.name)
            .and_then(|template| template.render(&ctx))
            .map_err(template_error)
    }
}

#[allow(clippy::needless_pass_by_value)]
fn template_error(err: minijinja::Error) -> HandlerError {
    HandlerError::Template(err.to_string())
}

impl Shortcode for TemplateHandler {
    type Attrs = Option<Attributes>;

    fn name(&self) -> &str {
        &self.name
    }

    fn output(
        &self,
        attrs: Option<Option<Attributes>>,
        body: Option<&str>,
    ) -> Result<String, HandlerError> {
        self.render(&attrs.flatten().unwrap_or_default(), body)
    }
}
