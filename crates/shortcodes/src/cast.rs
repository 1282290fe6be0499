//! Attribute casting helpers for handlers.
//!
//! The parser keeps every value as a string. These helpers convert them in
//! a handler's `cast` step.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::{Attributes, HandlerError};

/// Interpret a raw value as a boolean.
///
/// `""`, `"0"`, `"false"`, `"no"` and `"off"` (any case) are false;
/// anything else is true.
#[must_use]
pub fn to_bool(value: &str) -> bool {
    let value = value.trim();
    !(value.is_empty()
        || value == "0"
        || ["false", "no", "off"]
            .iter()
            .any(|f| value.eq_ignore_ascii_case(f)))
}

impl Attributes {
    /// Read `key` as a boolean flag.
    ///
    /// A bare positional token equal to `key` is true. Otherwise the named
    /// value is read with [`to_bool`]. Absent keys are false.
    ///
    /// # Example
    ///
    /// ```
    /// use shortcodes::parse_attributes;
    ///
    /// let attrs = parse_attributes(r#"autoplay loop="0""#).unwrap().unwrap();
    /// assert!(attrs.flag("autoplay"));
    /// assert!(!attrs.flag("loop"));
    /// assert!(!attrs.flag("muted"));
    /// ```
    #[must_use]
    pub fn flag(&self, key: &str) -> bool {
        self.has_flag(key) || self.get(key).is_some_and(to_bool)
    }

    /// Get a named value or fail with [`HandlerError::MissingAttribute`].
    pub fn require(&self, key: &str) -> Result<&str, HandlerError> {
        self.get(key)
            .ok_or_else(|| HandlerError::MissingAttribute(key.to_owned()))
    }

    /// Read `key` as an integer; `Ok(None)` if absent.
    pub fn int(&self, key: &str) -> Result<Option<i64>, HandlerError> {
        self.parse_with(key, "integer", |v| v.trim().parse().ok())
    }

    /// Read `key` as a float; `Ok(None)` if absent.
    pub fn float(&self, key: &str) -> Result<Option<f64>, HandlerError> {
        self.parse_with(key, "number", |v| v.trim().parse().ok())
    }

    /// Read `key` as a date with the given parser; `Ok(None)` if absent.
    pub fn date(
        &self,
        key: &str,
        parser: &dyn DateParser,
    ) -> Result<Option<DateTime<Utc>>, HandlerError> {
        self.get(key).map(|v| parser.parse(v)).transpose()
    }

    fn parse_with<T>(
        &self,
        key: &str,
        expected: &'static str,
        parse: impl FnOnce(&str) -> Option<T>,
    ) -> Result<Option<T>, HandlerError> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };

        parse(value)
            .map(Some)
            .ok_or_else(|| HandlerError::InvalidValue {
                key: key.to_owned(),
                value: value.to_owned(),
                expected,
            })
    }
}

/// Date/time parsing collaborator used by casting handlers.
///
/// Injected into handlers so they can be tested with fixed clocks or
/// alternative calendars.
pub trait DateParser: Send + Sync {
    fn parse(&self, value: &str) -> Result<DateTime<Utc>, HandlerError>;
}

/// Parses dates as UTC.
///
/// Accepts RFC 3339 (`2023-06-29T12:00:00+02:00`), `2023-06-29 12:00:00`
/// and `2023-06-29` (midnight).
#[derive(Debug, Default, Clone, Copy)]
pub struct UtcDateParser;

impl DateParser for UtcDateParser {
    fn parse(&self, value: &str) -> Result<DateTime<Utc>, HandlerError> {
        let value = value.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Ok(dt.with_timezone(&Utc));
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
            return Ok(dt.and_utc());
        }

        let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")?;
        Ok(date.and_time(NaiveTime::MIN).and_utc())
    }
}
