//! Fixture handlers shared by the integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use shortcodes::{
    Attributes, DateParser, FromAttributes, Handler, HandlerError, Shortcode, UtcDateParser,
};

/// Returns its body verbatim.
pub struct OutputBody;

impl Shortcode for OutputBody {
    type Attrs = Option<Attributes>;

    fn name(&self) -> &str {
        "output_body"
    }

    fn output(&self, _: Option<Self::Attrs>, body: Option<&str>) -> Result<String, HandlerError> {
        Ok(body.unwrap_or_default().to_owned())
    }
}

/// Dumps parsed attributes; empty output for none or malformed.
pub struct OutputAttributes;

impl Shortcode for OutputAttributes {
    type Attrs = Option<Attributes>;

    fn name(&self) -> &str {
        "output_attributes"
    }

    fn output(&self, attrs: Option<Self::Attrs>, _: Option<&str>) -> Result<String, HandlerError> {
        Ok(attrs.flatten().map(|a| dump(&a)).unwrap_or_default())
    }
}

/// `positional` and `named` in a stable textual form.
pub fn dump(attrs: &Attributes) -> String {
    let named: BTreeMap<_, _> = attrs.named.iter().collect();
    format!("{:?} {:?}", attrs.positional, named)
}

pub struct BooleanAttrs {
    value: bool,
}

impl FromAttributes for BooleanAttrs {
    fn from_attributes(attrs: Option<Attributes>) -> Result<Self, HandlerError> {
        Ok(Self {
            value: attrs.is_some_and(|a| a.flag("test-boolean")),
        })
    }
}

pub struct CastBoolean;

impl Shortcode for CastBoolean {
    type Attrs = BooleanAttrs;

    fn name(&self) -> &str {
        "cast_boolean"
    }

    fn output(&self, attrs: Option<BooleanAttrs>, _: Option<&str>) -> Result<String, HandlerError> {
        Ok(attrs.is_some_and(|a| a.value).to_string())
    }
}

pub struct IntegerAttrs {
    value: i64,
}

impl FromAttributes for IntegerAttrs {
    fn from_attributes(attrs: Option<Attributes>) -> Result<Self, HandlerError> {
        let attrs = attrs.unwrap_or_default();
        Ok(Self {
            value: attrs.int("test-int")?.unwrap_or(0),
        })
    }
}

/// Doubles `test-int`.
pub struct CastInteger;

impl Shortcode for CastInteger {
    type Attrs = IntegerAttrs;

    fn name(&self) -> &str {
        "cast_integer"
    }

    fn output(&self, attrs: Option<IntegerAttrs>, _: Option<&str>) -> Result<String, HandlerError> {
        Ok(attrs.map_or(0, |a| a.value * 2).to_string())
    }
}

pub struct FloatAttrs {
    value: f64,
}

impl FromAttributes for FloatAttrs {
    fn from_attributes(attrs: Option<Attributes>) -> Result<Self, HandlerError> {
        let attrs = attrs.unwrap_or_default();
        Ok(Self {
            value: attrs.float("test-float")?.unwrap_or(0.0),
        })
    }
}

/// Adds 10 to `test-float`.
pub struct CastFloat;

impl Shortcode for CastFloat {
    type Attrs = FloatAttrs;

    fn name(&self) -> &str {
        "cast_float"
    }

    fn output(&self, attrs: Option<FloatAttrs>, _: Option<&str>) -> Result<String, HandlerError> {
        Ok(attrs.map_or(0.0, |a| a.value + 10.0).to_string())
    }
}

pub struct DateAttrs(Option<DateTime<Utc>>);

impl FromAttributes for DateAttrs {
    fn from_attributes(attrs: Option<Attributes>) -> Result<Self, HandlerError> {
        let attrs = attrs.unwrap_or_default();
        Ok(Self(attrs.date("test-date", &UtcDateParser)?))
    }
}

/// Renders `test-date` as a Unix timestamp using an injected parser.
pub struct CastDate {
    parser: Box<dyn DateParser>,
}

impl CastDate {
    pub fn new(parser: impl DateParser + 'static) -> Self {
        Self {
            parser: Box::new(parser),
        }
    }
}

impl Shortcode for CastDate {
    type Attrs = DateAttrs;

    fn name(&self) -> &str {
        "cast_date"
    }

    fn cast(&self, attrs: Option<Attributes>) -> Result<DateAttrs, HandlerError> {
        let attrs = attrs.unwrap_or_default();
        Ok(DateAttrs(attrs.date("test-date", self.parser.as_ref())?))
    }

    fn output(&self, attrs: Option<DateAttrs>, _: Option<&str>) -> Result<String, HandlerError> {
        Ok(attrs
            .and_then(|a| a.0)
            .map(|dt| dt.timestamp().to_string())
            .unwrap_or_default())
    }
}

pub fn handlers() -> Vec<Arc<dyn Handler>> {
    vec![
        Arc::new(OutputBody),
        Arc::new(OutputAttributes),
        Arc::new(CastBoolean),
        Arc::new(CastDate::new(UtcDateParser)),
        Arc::new(CastFloat),
        Arc::new(CastInteger),
    ]
}
