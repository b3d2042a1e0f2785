//! Keeps note references away from the markdown parser.
//!
//! A reference is not markdown, but its text can look like markdown:
//! `[[_draft_]]` would turn into emphasis and the `|` of `[[A|see]]` splits a
//! table cell. Before parsing, every token is swapped for a placeholder of
//! private-use characters and digits that no markdown rule reacts to. The
//! renderer puts the original text back into each event it receives.

use std::fmt::Write;

use pulldown_cmark::CowStr;

use crate::token::{Piece, Tokens};

const OPEN: char = '\u{E000}';
const CLOSE: char = '\u{E001}';

/// Markdown source with its references replaced by placeholders.
#[derive(Debug, Default)]
pub struct Shielded {
    pub source: String,
    /// Original text of each placeholder, by index.
    pub references: Vec<String>,
}

impl Shielded {
    fn hold(&mut self, raw: &str) {
        write!(self.source, "{OPEN}{}{CLOSE}", self.references.len()).unwrap();
        self.references.push(raw.to_owned());
    }

    /// Copy plain text, holding any placeholder characters the author typed
    /// so that restoring stays exact.
    fn push_text(&mut self, text: &str) {
        let mut rest = text;
        while let Some(start) = rest.find([OPEN, CLOSE]) {
            self.source.push_str(&rest[..start]);
            let end = start + OPEN.len_utf8();
            self.hold(&rest[start..end]);
            rest = &rest[end..];
        }
        self.source.push_str(rest);
    }

    /// Whether the next character is escaped by a backslash.
    fn escaped(&self) -> bool {
        let backslashes = self.source.bytes().rev().take_while(|&b| b == b'\\').count();
        backslashes % 2 == 1
    }
}

/// Replace the reference tokens of `content` with placeholders.
///
/// A `[[` escaped as `\[[` is left to markdown.
pub fn shield(content: &str) -> Shielded {
    let mut shielded = Shielded {
        source: String::with_capacity(content.len()),
        references: Vec::new(),
    };
    if !content.contains("[[") && !content.contains([OPEN, CLOSE]) {
        shielded.source.push_str(content);
        return shielded;
    }

    for piece in Tokens::new(content) {
        match piece {
            Piece::Token(token) if !shielded.escaped() => shielded.hold(token.raw),
            Piece::Token(token) => shielded.push_text(token.raw),
            Piece::Text(text) => shielded.push_text(text),
        }
    }
    shielded
}

/// Put the original text of every placeholder in `text` back.
pub fn restore<'a>(text: CowStr<'a>, references: &[String]) -> CowStr<'a> {
    if references.is_empty() || !text.contains(OPEN) {
        return text;
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = &*text;
    while let Some(start) = rest.find(OPEN) {
        out.push_str(&rest[..start]);
        let after = &rest[start + OPEN.len_utf8()..];
        let held = after.find(CLOSE).and_then(|end| {
            let index: usize = after[..end].parse().ok()?;
            Some((references.get(index)?, end))
        });
        match held {
            Some((raw, end)) => {
                out.push_str(raw);
                rest = &after[end + CLOSE.len_utf8()..];
            }
            None => {
                out.push(OPEN);
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn roundtrip(content: &str) -> String {
        let shielded = shield(content);
        restore(shielded.source.into(), &shielded.references).into_string()
    }

    #[test]
    fn test_shield_without_references() {
        let shielded = shield("# Title\n\n*plain* [link](x)");
        assert_eq!(shielded.source, "# Title\n\n*plain* [link](x)");
        assert!(shielded.references.is_empty());
    }

    #[test]
    fn test_shield_hides_markdown_syntax() {
        let shielded = shield("| [[A|see]] | [[_draft_]] |");
        assert_eq!(shielded.references, ["[[A|see]]", "[[_draft_]]"]);
        assert!(!shielded.source.contains(['[', '_']));
        assert_eq!(shielded.source.matches('|').count(), 3);
    }

    #[test]
    fn test_restore_exact() {
        for content in [
            "See [[Project Plan]] and [[A|b]].",
            "[[[A]]] [[open [[B]]",
            "private \u{E000}0\u{E001} use [[C]] \u{E001}",
            "```\n[[Code]]\n```",
        ] {
            assert_eq!(roundtrip(content), content);
        }
    }

    #[test]
    fn test_escaped_bracket_left_to_markdown() {
        let shielded = shield(r"\[[A]] and \\[[B]]");
        assert_eq!(shielded.references, ["[[B]]"]);
        assert!(shielded.source.starts_with(r"\[[A]]"));
    }

    #[test]
    fn test_restore_ignores_unknown_placeholder() {
        let text = CowStr::from("x\u{E000}9\u{E001}y");
        assert_eq!(&*restore(text, &["[[A]]".to_owned()]), "x\u{E000}9\u{E001}y");
    }
}
