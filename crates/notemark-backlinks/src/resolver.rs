//! Rewrites `[[Title]]` references in rendered HTML into note links.
//!
//! Resolution runs after markdown rendering. The renderer keeps reference
//! tokens out of markdown parsing and emits them verbatim (only
//! HTML-escaped), so the resolver scans text nodes of the rendered fragment,
//! looks each token up in the note collection, and swaps resolved tokens for
//! anchors:
//!
//! ```text
//! <p>See [[Project Plan]].</p>
//!   -> <p>See <a class="note-link" href="#note-7" data-note-id="7">Project Plan</a>.</p>
//! ```
//!
//! Tokens inside `<code>`, `<pre>`, `<a>`, `<script>` and `<style>` are left
//! alone, which also makes a second pass over already resolved output a
//! no-op. Unresolved and malformed tokens stay as the literal text they were.

use std::borrow::Cow;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt::Write;

use notemark_renderer::{Piece, Tokens, escape_html};

use crate::note::{Note, NoteId};
use crate::references::NoteReference;
use crate::scan::{Segment, Segments};

/// Attribute carrying the target note id on emitted links.
pub const NOTE_ID_ATTRIBUTE: &str = "data-note-id";

/// Default CSS class of emitted links.
pub const DEFAULT_LINK_CLASS: &str = "note-link";

/// Elements whose text content is never scanned for references.
const OPAQUE_ELEMENTS: &[&str] = &["a", "code", "pre", "script", "style"];

/// How reference titles are compared with note titles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum MatchMode {
    /// Exact, case-sensitive comparison of trimmed titles.
    #[default]
    Exact,
    /// Unicode lowercase comparison of trimmed titles.
    CaseInsensitive,
}

impl MatchMode {
    fn key<'a>(self, title: &'a str) -> Cow<'a, str> {
        let title = title.trim();
        match self {
            MatchMode::Exact => title.into(),
            MatchMode::CaseInsensitive => title.to_lowercase().into(),
        }
    }
}

/// Resolves note references in rendered HTML.
///
/// # Example
///
/// ```
/// use notemark_backlinks::{BacklinkResolver, Note};
///
/// let notes = [Note::new(3, "A", "")];
/// let html = BacklinkResolver::new().resolve("<p>[[A|See here]]</p>", &notes);
/// assert_eq!(
///     html,
///     r##"<p><a class="note-link" href="#note-3" data-note-id="3">See here</a></p>"##
/// );
/// ```
#[derive(Clone, Debug)]
pub struct BacklinkResolver {
    match_mode: MatchMode,
    resolve_ids: bool,
    link_class: String,
}

impl Default for BacklinkResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl BacklinkResolver {
    /// Exact title matching, numeric id fallback, `note-link` class.
    #[must_use]
    pub fn new() -> Self {
        Self {
            match_mode: MatchMode::Exact,
            resolve_ids: true,
            link_class: DEFAULT_LINK_CLASS.to_owned(),
        }
    }

    #[must_use]
    pub fn with_match_mode(mut self, mode: MatchMode) -> Self {
        self.match_mode = mode;
        self
    }

    /// Resolve `[[42]]` to the note with id 42 when no title matches.
    #[must_use]
    pub fn with_id_resolution(mut self, enabled: bool) -> Self {
        self.resolve_ids = enabled;
        self
    }

    /// CSS class placed on emitted links. It is escaped when written.
    #[must_use]
    pub fn with_link_class(mut self, class: impl Into<String>) -> Self {
        self.link_class = class.into();
        self
    }

    /// Build a lookup table over `notes` using this resolver's rules.
    pub fn lookup<'n>(&self, notes: &'n [Note]) -> NoteLookup<'n> {
        NoteLookup::new(notes, self.match_mode, self.resolve_ids)
    }

    /// Resolve every reference in `html` against `notes`.
    ///
    /// Text outside recognized, resolvable tokens is copied unchanged; with
    /// no tokens present the output equals the input.
    pub fn resolve(&self, html: &str, notes: &[Note]) -> String {
        if !html.contains("[[") {
            return html.to_owned();
        }

        let lookup = self.lookup(notes);
        let mut out = String::with_capacity(html.len() + 64);

        for (segment, scanned) in scoped_segments(html) {
            if scanned {
                self.resolve_text(segment.as_str(), &lookup, &mut out);
            } else {
                out.push_str(segment.as_str());
            }
        }

        out
    }

    fn resolve_text(&self, text: &str, lookup: &NoteLookup<'_>, out: &mut String) {
        for piece in Tokens::new(text) {
            let token = match piece {
                Piece::Text(text) => {
                    out.push_str(text);
                    continue;
                }
                Piece::Token(token) => token,
            };
            let Some(reference) = NoteReference::from_token(&token) else {
                out.push_str(token.raw);
                continue;
            };
            match lookup.find(&reference.target) {
                Some(note) => self.write_link(note.id, reference.label(), out),
                None => {
                    tracing::debug!(reference = %reference.target, "Unresolved note reference");
                    out.push_str(token.raw);
                }
            }
        }
    }

    fn write_link(&self, id: NoteId, display: &str, out: &mut String) {
        write!(
            out,
            r##"<a class="{}" href="#note-{id}" {NOTE_ID_ATTRIBUTE}="{id}">{}</a>"##,
            escape_html(&self.link_class),
            escape_html(display)
        )
        .unwrap();
    }
}

/// Segments of `html`, each paired with whether it is a text node that can
/// hold references. Text inside opaque elements is not.
pub(crate) fn scoped_segments(html: &str) -> impl Iterator<Item = (Segment<'_>, bool)> {
    let mut opaque_depth = 0usize;
    Segments::new(html).map(move |segment| {
        match segment {
            Segment::StartTag {
                name,
                self_closing: false,
                ..
            } if is_opaque(name) => opaque_depth += 1,
            Segment::EndTag { name, .. } if is_opaque(name) => {
                opaque_depth = opaque_depth.saturating_sub(1);
            }
            _ => {}
        }
        let scanned = opaque_depth == 0 && matches!(segment, Segment::Text(_));
        (segment, scanned)
    })
}

/// Resolve references with the default [`BacklinkResolver`].
pub fn resolve_backlinks(html: &str, notes: &[Note]) -> String {
    BacklinkResolver::new().resolve(html, notes)
}

fn is_opaque(name: &str) -> bool {
    OPAQUE_ELEMENTS
        .iter()
        .any(|opaque| opaque.eq_ignore_ascii_case(name))
}

/// Title and id lookup over a note collection.
///
/// When several notes share a title the first one in collection order wins.
pub struct NoteLookup<'n> {
    mode: MatchMode,
    by_title: HashMap<Cow<'n, str>, &'n Note>,
    by_id: Option<HashMap<NoteId, &'n Note>>,
}

impl<'n> NoteLookup<'n> {
    fn new(notes: &'n [Note], mode: MatchMode, resolve_ids: bool) -> Self {
        let mut by_title = HashMap::with_capacity(notes.len());
        for note in notes {
            match by_title.entry(mode.key(&note.title)) {
                Entry::Vacant(slot) => {
                    slot.insert(note);
                }
                Entry::Occupied(existing) => {
                    tracing::debug!(
                        title = %note.title,
                        kept = %existing.get().id,
                        ignored = %note.id,
                        "Duplicate note title"
                    );
                }
            }
        }

        let by_id = resolve_ids.then(|| {
            let mut by_id = HashMap::with_capacity(notes.len());
            for note in notes {
                by_id.entry(note.id).or_insert(note);
            }
            by_id
        });

        Self {
            mode,
            by_title,
            by_id,
        }
    }

    /// Find the note a reference target points at.
    ///
    /// Titles are tried first; a target made only of ASCII digits then falls
    /// back to an id lookup when enabled.
    pub fn find(&self, target: &str) -> Option<&'n Note> {
        let target = target.trim();
        if target.is_empty() {
            return None;
        }
        if let Some(&note) = self.by_title.get(&*self.mode.key(target)) {
            return Some(note);
        }
        let by_id = self.by_id.as_ref()?;
        if !target.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let id: NoteId = target.parse().ok()?;
        by_id.get(&id).copied()
    }
}
