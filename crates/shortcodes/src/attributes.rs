//! Shortcode attribute parsing.
//!
//! Parses the raw text between a tag name and its closing bracket:
//! `[tag 123 url=http://example.com/ foo bar="baz"]`.
//!
//! Tokens are whitespace separated and take one of these forms:
//!
//! - `key="value"` / `key='value'` / `key=value`: named attributes
//! - `"value"` / `'value'` / `value`: positional attributes, in source order
//!
//! Values are never converted at this layer; casting belongs to handlers.

use std::collections::HashMap;

/// Parsed attributes of a single tag.
///
/// # Example
///
/// ```
/// use shortcodes::parse_attributes;
///
/// let attrs = parse_attributes(r#"123 url=http://x/ foo bar="baz""#)
///     .unwrap()
///     .unwrap();
/// assert_eq!(attrs.positional, vec!["123", "foo"]);
/// assert_eq!(attrs.get("url"), Some("http://x/"));
/// assert_eq!(attrs.get("bar"), Some("baz"));
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Attributes {
    /// Values supplied without a key, ordered by appearance.
    pub positional: Vec<String>,
    /// `key=value` pairs.
    pub named: HashMap<String, String>,
}

/// Reasons an attribute string is rejected as a whole.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttributeError {
    /// A quoted value has no closing quote.
    #[error("unterminated quote at byte {position}")]
    UnterminatedQuote {
        /// Byte offset of the opening quote.
        position: usize,
    },
    /// A value opens an HTML tag with `<` that is never closed by `>`.
    #[error("unclosed HTML tag in attribute value {value:?}")]
    UnbalancedHtml {
        /// The offending value.
        value: String,
    },
}

impl Attributes {
    /// Get a named attribute value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.named.get(key).map(String::as_str)
    }

    /// Get a positional attribute value by index.
    #[must_use]
    pub fn positional(&self, index: usize) -> Option<&str> {
        self.positional.get(index).map(String::as_str)
    }

    /// Whether `name` appears as a bare positional token.
    #[must_use]
    pub fn has_flag(&self, name: &str) -> bool {
        self.positional.iter().any(|p| p == name)
    }

    /// Total number of positional and named values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positional.len() + self.named.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reconstruct attribute text in canonical form.
    ///
    /// Positional values come first in order, then named values sorted by key.
    /// Values containing whitespace or quotes are double quoted.
    ///
    /// # Example
    ///
    /// ```
    /// use shortcodes::parse_attributes;
    ///
    /// let attrs = parse_attributes("b=2 'x y' a=1").unwrap().unwrap();
    /// assert_eq!(attrs.to_syntax(), r#""x y" a="1" b="2""#);
    /// ```
    #[must_use]
    pub fn to_syntax(&self) -> String {
        let mut parts: Vec<String> = self
            .positional
            .iter()
            .map(|value| {
                if value.is_empty() || value.contains(|c: char| c.is_whitespace() || is_quote(c)) {
                    format!(r#""{value}""#)
                } else {
                    value.clone()
                }
            })
            .collect();

        let mut keys: Vec<_> = self.named.keys().collect();
        keys.sort();
        for key in keys {
            parts.push(format!(r#"{key}="{}""#, self.named[key]));
        }

        parts.join(" ")
    }
}

/// Parse raw attribute text.
///
/// Returns `Ok(None)` when no attributes were supplied (empty or
/// whitespace-only text), which handlers can tell apart from a parsed set.
///
/// # Errors
///
/// Returns [`AttributeError`] when a quote is left open or a value contains
/// an unclosed `<`. No partial result is produced in either case.
pub fn parse_attributes(raw: &str) -> Result<Option<Attributes>, AttributeError> {
    let text = normalize_spaces(raw);
    if text.trim().is_empty() {
        return Ok(None);
    }

    let mut attrs = Attributes::default();
    let mut remaining = text.trim_start();

    while !remaining.is_empty() {
        let offset = text.len() - remaining.len();

        let rest = match parse_token(remaining, offset)? {
            Token::Named { key, value, rest } => {
                attrs.named.insert(key.to_owned(), value.to_owned());
                rest
            }
            Token::Positional { value, rest } => {
                attrs.positional.push(value.to_owned());
                rest
            }
        };

        remaining = rest.trim_start();
    }

    let mut values = attrs.positional.iter().chain(attrs.named.values());
    if let Some(value) = values.find(|v| has_unclosed_html(v)) {
        return Err(AttributeError::UnbalancedHtml {
            value: value.clone(),
        });
    }

    Ok(Some(attrs))
}

enum Token<'a> {
    Named {
        key: &'a str,
        value: &'a str,
        rest: &'a str,
    },
    Positional {
        value: &'a str,
        rest: &'a str,
    },
}

/// Parse one token from the start of `s` (no leading whitespace).
fn parse_token(s: &str, offset: usize) -> Result<Token<'_>, AttributeError> {
    if let Some((key, after_eq)) = split_key(s) {
        let value_offset = offset + (s.len() - after_eq.len());

        if let Some(quote) = after_eq.chars().next().filter(|&c| is_quote(c)) {
            let (value, rest) = split_quoted(after_eq, quote, value_offset)?;
            if ends_token(rest) {
                return Ok(Token::Named { key, value, rest });
            }
        } else {
            let end = after_eq
                .find(|c: char| c.is_whitespace() || is_quote(c))
                .unwrap_or(after_eq.len());
            let (value, rest) = after_eq.split_at(end);
            if !value.is_empty() && ends_token(rest) {
                return Ok(Token::Named { key, value, rest });
            }
        }

        return Ok(bare_token(s));
    }

    if let Some(quote) = s.chars().next().filter(|&c| is_quote(c)) {
        let (value, rest) = split_quoted(s, quote, offset)?;
        if ends_token(rest) {
            return Ok(Token::Positional { value, rest });
        }
    }

    Ok(bare_token(s))
}

/// Split a leading `key=` (whitespace allowed around `=`).
///
/// Returns the key and the text after `=` with leading whitespace removed.
fn split_key(s: &str) -> Option<(&str, &str)> {
    let key_len = s
        .find(|c: char| !is_key_char(c))
        .unwrap_or(s.len());
    if key_len == 0 {
        return None;
    }

    let after_key = s[key_len..].trim_start();
    let after_eq = after_key.strip_prefix('=')?;
    Some((&s[..key_len], after_eq.trim_start()))
}

/// Split a quoted value starting at `s[0] == quote`.
fn split_quoted(s: &str, quote: char, offset: usize) -> Result<(&str, &str), AttributeError> {
    let inner = &s[quote.len_utf8()..];
    let end = inner
        .find(quote)
        .ok_or(AttributeError::UnterminatedQuote { position: offset })?;
    Ok((&inner[..end], &inner[end + quote.len_utf8()..]))
}

/// Everything up to the next whitespace becomes a positional value.
fn bare_token(s: &str) -> Token<'_> {
    let end = s.find(char::is_whitespace).unwrap_or(s.len());
    Token::Positional {
        value: &s[..end],
        rest: &s[end..],
    }
}

fn ends_token(rest: &str) -> bool {
    rest.is_empty() || rest.starts_with(char::is_whitespace)
}

fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn is_quote(c: char) -> bool {
    c == '"' || c == '\''
}

/// Replace no-break and zero-width spaces with plain spaces.
fn normalize_spaces(raw: &str) -> String {
    raw.replace(['\u{00a0}', '\u{200b}'], " ")
}

/// Every `<` must be closed by a later `>`.
fn has_unclosed_html(value: &str) -> bool {
    let mut open = false;
    for c in value.chars() {
        match c {
            '<' => open = true,
            '>' => open = false,
            _ => {}
        }
    }
    open
}
