//! Note reference token syntax: `[[Title]]` and `[[Title|display text]]`.

/// Characters that may not appear between the brackets.
///
/// The same rule applies to markdown source and to escaped HTML text, so
/// characters the renderer escapes (`<`, `&`, quotes) are allowed.
const FORBIDDEN: &[char] = &['[', ']', '\n', '\r'];

/// A reference token found in text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token<'a> {
    /// The whole token including brackets.
    pub raw: &'a str,
    /// Trimmed target title, may be empty.
    pub target: &'a str,
    /// Trimmed display override, `None` when absent or blank.
    pub display: Option<&'a str>,
}

/// Parse the token at the start of `s`.
///
/// Returns `None` when `s` does not start with a well-formed token: missing
/// `]]`, an empty body, or a forbidden character before the closing brackets.
pub fn parse_token(s: &str) -> Option<Token<'_>> {
    let body = s.strip_prefix("[[")?;
    let end = body.find(FORBIDDEN)?;
    if end == 0 || !body[end..].starts_with("]]") {
        return None;
    }

    let inner = &body[..end];
    let (target, display) = match inner.split_once('|') {
        Some((target, display)) => {
            let display = display.trim();
            (target.trim(), (!display.is_empty()).then_some(display))
        }
        None => (inner.trim(), None),
    };

    Some(Token {
        raw: &s[..end + 4],
        target,
        display,
    })
}

/// Item yielded by [`Tokens`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Piece<'a> {
    /// Text outside any token.
    Text(&'a str),
    /// A well-formed token.
    Token(Token<'a>),
}

/// Left-to-right tokenizer over a text run.
///
/// The first `[[` that starts a well-formed token wins. A `[[` that does not
/// is emitted as text one `[` at a time, so `[[[A]]` yields `[` then `[[A]]`.
pub struct Tokens<'a> {
    rest: &'a str,
}

impl<'a> Tokens<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { rest: text }
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Piece<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.rest;
        if rest.is_empty() {
            return None;
        }

        let mut search_from = 0;
        loop {
            let Some(offset) = rest[search_from..].find("[[") else {
                self.rest = "";
                return Some(Piece::Text(rest));
            };
            let start = search_from + offset;

            if let Some(token) = parse_token(&rest[start..]) {
                if start > 0 {
                    self.rest = &rest[start..];
                    return Some(Piece::Text(&rest[..start]));
                }
                self.rest = &rest[token.raw.len()..];
                return Some(Piece::Token(token));
            }
            search_from = start + 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_simple() {
        let token = parse_token("[[Project Plan]] rest").unwrap();
        assert_eq!(token.raw, "[[Project Plan]]");
        assert_eq!(token.target, "Project Plan");
        assert_eq!(token.display, None);
    }

    #[test]
    fn test_parse_display() {
        let token = parse_token("[[A|See here]]").unwrap();
        assert_eq!(token.target, "A");
        assert_eq!(token.display, Some("See here"));
    }

    #[test]
    fn test_parse_trims() {
        let token = parse_token("[[  A  |  b  ]]").unwrap();
        assert_eq!(token.target, "A");
        assert_eq!(token.display, Some("b"));
    }

    #[test]
    fn test_parse_blank_display() {
        let token = parse_token("[[A| ]]").unwrap();
        assert_eq!(token.display, None);
    }

    #[test]
    fn test_parse_extra_pipes_go_to_display() {
        let token = parse_token("[[A|b|c]]").unwrap();
        assert_eq!(token.target, "A");
        assert_eq!(token.display, Some("b|c"));
    }

    #[test]
    fn test_parse_malformed() {
        assert_eq!(parse_token("[[]]"), None);
        assert_eq!(parse_token("[[Unterminated"), None);
        assert_eq!(parse_token("[[Half]"), None);
        assert_eq!(parse_token("[[a\nb]]"), None);
        assert_eq!(parse_token("[[[A]]"), None);
        assert_eq!(parse_token("[A]]"), None);
    }

    #[test]
    fn test_parse_markup_characters() {
        assert_eq!(parse_token("[[a<b]]").unwrap().target, "a<b");
        assert_eq!(parse_token("[[_draft_]]").unwrap().target, "_draft_");
        assert_eq!(parse_token("[[a&lt;b]]").unwrap().target, "a&lt;b");
    }

    #[test]
    fn test_parse_whitespace_only_target() {
        let token = parse_token("[[   ]]").unwrap();
        assert_eq!(token.target, "");
    }

    #[test]
    fn test_tokens_mixed() {
        let pieces: Vec<Piece<'_>> = Tokens::new("See [[A]] and [[B|b]].").collect();
        assert_eq!(pieces.len(), 5);
        assert_eq!(pieces[0], Piece::Text("See "));
        assert!(matches!(pieces[1], Piece::Token(t) if t.target == "A"));
        assert_eq!(pieces[2], Piece::Text(" and "));
        assert!(matches!(pieces[3], Piece::Token(t) if t.display == Some("b")));
        assert_eq!(pieces[4], Piece::Text("."));
    }

    #[test]
    fn test_tokens_leading_bracket() {
        let pieces: Vec<Piece<'_>> = Tokens::new("[[[A]]").collect();
        assert_eq!(pieces[0], Piece::Text("["));
        assert!(matches!(pieces[1], Piece::Token(t) if t.raw == "[[A]]"));
    }

    #[test]
    fn test_tokens_unterminated_then_valid() {
        let pieces: Vec<Piece<'_>> = Tokens::new("[[open and [[B]]").collect();
        assert_eq!(pieces[0], Piece::Text("[[open and "));
        assert!(matches!(pieces[1], Piece::Token(t) if t.target == "B"));
    }

    #[test]
    fn test_tokens_reassemble_input() {
        let text = "a [[b]] [[ c [[d|e]] ]] f]] [[";
        let joined: String = Tokens::new(text)
            .map(|piece| match piece {
                Piece::Text(t) => t,
                Piece::Token(t) => t.raw,
            })
            .collect();
        assert_eq!(joined, text);
    }

    #[test]
    fn test_tokens_empty() {
        assert_eq!(Tokens::new("").next(), None);
    }
}
