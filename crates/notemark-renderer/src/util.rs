//! Shared utility functions for markdown rendering.

use pulldown_cmark::HeadingLevel;

/// Convert heading level enum to number (1-6).
#[must_use]
pub(crate) fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Extract the language from a fence info string.
///
/// ```text
/// "rust"              -> Some("rust")
/// "python title=x.py" -> Some("python")
/// "{.rust}"           -> Some("rust")
/// ""                  -> None
/// ```
pub(crate) fn fence_language(info: &str) -> Option<String> {
    let first = info.split_whitespace().next()?;
    let lang = first
        .trim_start_matches('{')
        .trim_end_matches('}')
        .trim_start_matches('.');
    if lang.is_empty() {
        None
    } else {
        Some(lang.to_owned())
    }
}
