//! Tag names derived from file names.

use heck::ToSnakeCase;

/// Convert a file stem to a snake-case tag name.
///
/// Stems may only contain ASCII alphanumerics, `-` and `_`; anything else
/// yields `None`.
///
/// Examples:
/// - `HelloWorld` -> `hello_world`
/// - `call-out` -> `call_out`
/// - `HTMLBlock` -> `html_block`
/// - `youtube` -> `youtube`
pub(crate) fn tag_name(stem: &str) -> Option<String> {
    let valid = !stem.is_empty()
        && stem
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        return None;
    }

    Some(stem.to_snake_case()).filter(|name| !name.is_empty())
}
