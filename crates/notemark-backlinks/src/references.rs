//! Reference extraction from note content.

use notemark_renderer::{Piece, RenderOptions, Token, Tokens, render_with};

use crate::resolver::scoped_segments;
use crate::scan::decode_entities;

/// A `[[...]]` reference as written in note content.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NoteReference {
    /// Referenced title (or numeric id), trimmed.
    pub target: String,
    /// Display override after `|`.
    pub display: Option<String>,
}

impl NoteReference {
    /// Reference spelled by a token found in HTML text, with character
    /// references decoded. `None` when the target is blank.
    pub(crate) fn from_token(token: &Token<'_>) -> Option<Self> {
        let target = decode_entities(token.target).trim().to_owned();
        if target.is_empty() {
            return None;
        }
        Some(Self {
            target,
            display: token.display.map(decode_entities),
        })
    }

    /// Text a resolved link shows: the display override, else the target.
    pub fn label(&self) -> &str {
        self.display.as_deref().unwrap_or(&self.target)
    }
}

/// List the references in markdown `content`, in document order.
///
/// The content is rendered with `options` and scanned the way the resolver
/// scans it, so the result lists exactly the tokens resolution would try:
/// references in code and in markdown link text are not counted, and
/// malformed or blank tokens are skipped.
///
/// ```
/// use notemark_backlinks::extract_references;
/// use notemark_renderer::RenderOptions;
///
/// let refs = extract_references("See [[A]] and `[[B]]`, [[C|c]].", &RenderOptions::default());
/// let targets: Vec<&str> = refs.iter().map(|r| r.target.as_str()).collect();
/// assert_eq!(targets, ["A", "C"]);
/// ```
pub fn extract_references(content: &str, options: &RenderOptions) -> Vec<NoteReference> {
    html_references(&render_with(content, options).html)
}

/// List the references left in rendered `html`, in document order.
pub fn html_references(html: &str) -> Vec<NoteReference> {
    scoped_segments(html)
        .filter(|(_, scanned)| *scanned)
        .flat_map(|(segment, _)| Tokens::new(segment.as_str()))
        .filter_map(|piece| match piece {
            Piece::Token(token) => NoteReference::from_token(&token),
            Piece::Text(_) => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn references(content: &str) -> Vec<NoteReference> {
        extract_references(content, &RenderOptions::default())
    }

    fn targets(content: &str) -> Vec<String> {
        references(content).into_iter().map(|r| r.target).collect()
    }

    #[test]
    fn test_empty_content() {
        assert!(references("").is_empty());
    }

    #[test]
    fn test_references_in_order() {
        assert_eq!(
            targets("# [[Heading Ref]]\n\n- [[One]]\n- [[Two|2]]\n\n> [[Quoted]]"),
            vec!["Heading Ref", "One", "Two", "Quoted"]
        );
    }

    #[test]
    fn test_display_override() {
        let refs = references("[[A|See here]]");
        assert_eq!(
            refs,
            vec![NoteReference {
                target: "A".to_owned(),
                display: Some("See here".to_owned()),
            }]
        );
        assert_eq!(refs[0].label(), "See here");
    }

    #[test]
    fn test_code_skipped() {
        assert_eq!(
            targets("`[[Inline]]`\n\n```\n[[Block]]\n```\n\n    [[Indented]]\n\n[[Real]]"),
            vec!["Real"]
        );
    }

    #[test]
    fn test_link_text_skipped() {
        assert_eq!(targets("[see [[A]]](https://x.test) [[B]]"), vec!["B"]);
    }

    #[test]
    fn test_raw_html_block_counted() {
        assert_eq!(targets("<div>\n[[A]]\n</div>"), vec!["A"]);
    }

    #[test]
    fn test_markup_characters_in_titles() {
        assert_eq!(targets("[[a<b]] [[_draft_]] [[Q&A]]"), vec!["a<b", "_draft_", "Q&A"]);
    }

    #[test]
    fn test_token_text_is_literal() {
        assert_eq!(targets("[[Q&amp;A]]"), vec!["Q&amp;A"]);
    }

    #[test]
    fn test_table_cell_with_display() {
        for tables in [true, false] {
            let options = RenderOptions {
                tables,
                ..RenderOptions::default()
            };
            let refs = extract_references("| Ref | X |\n|---|---|\n| [[A|see]] | x |", &options);
            assert_eq!(refs.len(), 1);
            assert_eq!(refs[0].target, "A");
            assert_eq!(refs[0].label(), "see");
        }
    }

    #[test]
    fn test_malformed_skipped() {
        assert!(references("[[]] [[ ]] [[open").is_empty());
    }

    #[test]
    fn test_duplicates_kept() {
        assert_eq!(targets("[[A]] [[A]]"), vec!["A", "A"]);
    }

    #[test]
    fn test_html_references() {
        let html = r#"<p>[[A]] <a href="x">[[B]]</a> <code>[[C]]</code> [[D&amp;E|d]]</p>"#;
        let refs = html_references(html);
        let targets: Vec<&str> = refs.iter().map(|r| r.target.as_str()).collect();
        assert_eq!(targets, ["A", "D&E"]);
    }
}
