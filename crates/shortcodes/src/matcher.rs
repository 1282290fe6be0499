//! Tag scanning.
//!
//! Finds shortcode tags in free text, left to right and without overlap:
//!
//! - Self-closing: `[name attrs /]`
//! - Paired: `[name attrs]body[/name]` (or body-less `[name attrs]`)
//! - Escaped: `[[name attrs]]`, `[[/name]]` and `[[name attrs]body[/name]]`
//!
//! Any well-formed name is recognized; whether a handler exists is decided
//! later by the dispatcher.

use std::ops::Range;

/// A single tag found in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagMatch<'a> {
    /// Tag name (`[name ...]`).
    pub name: &'a str,
    /// Raw text between the name and `]` / `/]`, untrimmed.
    pub raw_attributes: &'a str,
    /// Whether the tag ends with `/]`.
    pub self_closing: bool,
    /// Text between the opening tag and `[/name]`, if a closing tag follows.
    pub body: Option<&'a str>,
    /// Whether the tag is wrapped in an extra bracket layer.
    pub escaped: bool,
    /// Byte range of the whole match in the input.
    pub span: Range<usize>,
    /// End of the opening tag; equals `span.end` without a body.
    open_end: usize,
    input: &'a str,
}

impl<'a> TagMatch<'a> {
    /// The matched text, including brackets, body and closing tag.
    #[must_use]
    pub fn source(&self) -> &'a str {
        &self.input[self.span.clone()]
    }

    /// The opening tag alone, `[name attrs]`.
    ///
    /// For escaped matches this is the whole match.
    #[must_use]
    pub fn opening(&self) -> &'a str {
        &self.input[self.span.start..self.open_end]
    }

    /// The matched text with one bracket layer removed.
    ///
    /// `[[name]]` yields `[name]`. Only meaningful for escaped matches.
    #[must_use]
    pub fn literal(&self) -> &'a str {
        let source = self.source();
        &source[1..source.len() - 1]
    }
}

/// Iterator over the tags of an input string.
///
/// # Example
///
/// ```
/// use shortcodes::TagMatcher;
///
/// let tags: Vec<_> = TagMatcher::new("a [b x=1] c [d]e[/d] [[f]]").collect();
/// assert_eq!(tags.len(), 3);
/// assert_eq!(tags[0].raw_attributes, " x=1");
/// assert_eq!(tags[1].body, Some("e"));
/// assert!(tags[2].escaped);
/// ```
#[derive(Debug, Clone)]
pub struct TagMatcher<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> TagMatcher<'a> {
    /// Scan from the start of `input`.
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self::resume(input, 0)
    }

    /// Scan from byte `offset` of `input`.
    ///
    /// `offset` is clamped to the input length and must lie on a char boundary.
    #[must_use]
    pub fn resume(input: &'a str, offset: usize) -> Self {
        Self {
            input,
            pos: offset.min(input.len()),
        }
    }

    /// Byte offset where the next scan starts.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    fn match_at(&self, start: usize) -> Option<TagMatch<'a>> {
        if self.input[start..].starts_with("[[") {
            self.match_escaped(start)
        } else {
            self.match_tag(start)
        }
    }

    /// `[name attrs]`, `[name attrs /]` or `[name attrs]body[/name]`.
    fn match_tag(&self, start: usize) -> Option<TagMatch<'a>> {
        let name_start = start + 1;
        let name = parse_name(&self.input[name_start..])?;
        let attrs_start = name_start + name.len();
        let close = find_tag_end(&self.input[attrs_start..])?;

        let raw_attributes = &self.input[attrs_start..attrs_start + close.attrs_len];
        let open_end = attrs_start + close.consumed;

        let (body, end) = if close.self_closing {
            (None, open_end)
        } else {
            let closing = format!("[/{name}]");
            match self.input[open_end..].find(&closing) {
                Some(offset) => {
                    let body_end = open_end + offset;
                    (Some(&self.input[open_end..body_end]), body_end + closing.len())
                }
                None => (None, open_end),
            }
        };

        Some(TagMatch {
            name,
            raw_attributes,
            self_closing: close.self_closing,
            body,
            escaped: false,
            span: start..end,
            open_end,
            input: self.input,
        })
    }

    /// `[[name attrs]]`, `[[name attrs /]]`, `[[/name]]` or
    /// `[[name attrs]body[/name]]`.
    fn match_escaped(&self, start: usize) -> Option<TagMatch<'a>> {
        let mut name_start = start + 2;
        let is_closing = self.input[name_start..].starts_with('/');
        if is_closing {
            name_start += 1;
        }

        let name = parse_name(&self.input[name_start..])?;
        let attrs_start = name_start + name.len();

        let close = if is_closing {
            self.input[attrs_start..]
                .starts_with(']')
                .then_some(TagEnd {
                    attrs_len: 0,
                    consumed: 1,
                    self_closing: false,
                })?
        } else {
            find_tag_end(&self.input[attrs_start..])?
        };

        let open_end = attrs_start + close.consumed;
        let (body, end) = if self.input[open_end..].starts_with(']') {
            (None, open_end + 1)
        } else if is_closing || close.self_closing {
            return None;
        } else {
            // Paired form: the nearest `[/name]` must carry the extra bracket
            let closing = format!("[/{name}]");
            let body_end = open_end + self.input[open_end..].find(&closing)?;
            let end = body_end + closing.len();
            if !self.input[end..].starts_with(']') {
                return None;
            }
            (Some(&self.input[open_end..body_end]), end + 1)
        };

        Some(TagMatch {
            name,
            raw_attributes: &self.input[attrs_start..attrs_start + close.attrs_len],
            self_closing: close.self_closing,
            body,
            escaped: true,
            span: start..end,
            open_end: end,
            input: self.input,
        })
    }
}

impl<'a> Iterator for TagMatcher<'a> {
    type Item = TagMatch<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos < self.input.len() {
            let start = self.pos + self.input[self.pos..].find('[')?;

            if let Some(tag) = self.match_at(start) {
                self.pos = tag.span.end;
                return Some(tag);
            }

            // Not a tag: `[` is literal, keep scanning after it
            self.pos = start + 1;
        }

        None
    }
}

/// Where an opening tag ends, relative to the end of its name.
struct TagEnd {
    /// Length of the attribute text.
    attrs_len: usize,
    /// Bytes up to and including the closing `]`.
    consumed: usize,
    self_closing: bool,
}

/// Parse a tag name at the start of `s`.
///
/// The name must be followed by whitespace, `]` or `/`.
fn parse_name(s: &str) -> Option<&str> {
    let len = s.find(|c: char| !is_name_char(c)).unwrap_or(s.len());
    if len == 0 {
        return None;
    }

    let next = s[len..].chars().next()?;
    (next.is_whitespace() || next == ']' || next == '/').then_some(&s[..len])
}

/// Find the closing `]` or `/]` of an opening tag.
///
/// Attribute text may contain `/` but never `]`.
fn find_tag_end(s: &str) -> Option<TagEnd> {
    let bytes = s.as_bytes();

    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b']' => {
                return Some(TagEnd {
                    attrs_len: i,
                    consumed: i + 1,
                    self_closing: false,
                });
            }
            b'/' if bytes.get(i + 1) == Some(&b']') => {
                return Some(TagEnd {
                    attrs_len: i,
                    consumed: i + 2,
                    self_closing: true,
                });
            }
            _ => {}
        }
    }

    None
}

/// Valid names contain only ASCII alphanumeric characters, hyphens, and underscores.
fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}
