//! Reverse reference index ("which notes link here").

use std::collections::HashMap;

use notemark_renderer::RenderOptions;

use crate::note::{Note, NoteId};
use crate::references::extract_references;
use crate::resolver::BacklinkResolver;

/// Maps each note to the notes whose content references it.
///
/// Built fresh from a collection; it holds ids only and never borrows the
/// notes. Content is rendered with the given options and references resolve
/// with the same rules as [`BacklinkResolver`], so the index lists exactly
/// the links a rendered note shows.
#[derive(Debug, Default)]
pub struct BacklinkIndex {
    incoming: HashMap<NoteId, Vec<NoteId>>,
    outgoing: HashMap<NoteId, Vec<NoteId>>,
    unresolved: HashMap<NoteId, Vec<String>>,
}

impl BacklinkIndex {
    /// Index every reference in `notes`.
    ///
    /// Each source note is listed at most once per target, in collection
    /// order. A note referencing itself is not its own backlink.
    pub fn build(notes: &[Note], options: &RenderOptions, resolver: &BacklinkResolver) -> Self {
        let lookup = resolver.lookup(notes);
        let mut index = Self::default();

        for source in notes {
            for reference in extract_references(&source.content, options) {
                let Some(target) = lookup.find(&reference.target) else {
                    index
                        .unresolved
                        .entry(source.id)
                        .or_default()
                        .push(reference.target);
                    continue;
                };
                if target.id == source.id {
                    continue;
                }

                let outgoing = index.outgoing.entry(source.id).or_default();
                if outgoing.contains(&target.id) {
                    continue;
                }
                outgoing.push(target.id);
                index.incoming.entry(target.id).or_default().push(source.id);
            }
        }

        tracing::trace!(
            notes = notes.len(),
            linked = index.incoming.len(),
            "Built backlink index"
        );
        index
    }

    /// Notes referencing `id`.
    pub fn backlinks(&self, id: NoteId) -> &[NoteId] {
        self.incoming.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Notes referenced from `id`.
    pub fn outgoing(&self, id: NoteId) -> &[NoteId] {
        self.outgoing.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Reference targets in `id` that match no note.
    pub fn unresolved(&self, id: NoteId) -> &[String] {
        self.unresolved.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::MatchMode;
    use pretty_assertions::assert_eq;

    fn build(notes: &[Note], resolver: &BacklinkResolver) -> BacklinkIndex {
        BacklinkIndex::build(notes, &RenderOptions::default(), resolver)
    }

    fn notes() -> Vec<Note> {
        vec![
            Note::new(1, "Home", "Start at [[Projects]] or [[Ideas]]."),
            Note::new(
                2,
                "Projects",
                "Back to [[Home]]. See [[Ideas]] and [[Ideas|again]].",
            ),
            Note::new(
                3,
                "Ideas",
                "Self link [[Ideas]], missing [[Someday]], code `[[Home]]`.",
            ),
        ]
    }

    #[test]
    fn test_backlinks() {
        let index = build(&notes(), &BacklinkResolver::new());
        assert_eq!(index.backlinks(NoteId(1)), &[NoteId(2)]);
        assert_eq!(index.backlinks(NoteId(2)), &[NoteId(1)]);
        assert_eq!(index.backlinks(NoteId(3)), &[NoteId(1), NoteId(2)]);
    }

    #[test]
    fn test_outgoing_deduplicated() {
        let index = build(&notes(), &BacklinkResolver::new());
        assert_eq!(index.outgoing(NoteId(2)), &[NoteId(1), NoteId(3)]);
        assert!(index.outgoing(NoteId(3)).is_empty());
    }

    #[test]
    fn test_unresolved() {
        let index = build(&notes(), &BacklinkResolver::new());
        assert_eq!(index.unresolved(NoteId(3)), &["Someday".to_owned()]);
        assert!(index.unresolved(NoteId(1)).is_empty());
    }

    #[test]
    fn test_unknown_id() {
        let index = build(&notes(), &BacklinkResolver::new());
        assert!(index.backlinks(NoteId(99)).is_empty());
    }

    #[test]
    fn test_empty_collection() {
        let index = build(&[], &BacklinkResolver::new());
        assert!(index.backlinks(NoteId(1)).is_empty());
    }

    #[test]
    fn test_case_insensitive_index() {
        let notes = vec![
            Note::new(1, "Home", ""),
            Note::new(2, "Other", "see [[home]]"),
        ];
        let exact = build(&notes, &BacklinkResolver::new());
        assert!(exact.backlinks(NoteId(1)).is_empty());

        let resolver = BacklinkResolver::new().with_match_mode(MatchMode::CaseInsensitive);
        let relaxed = build(&notes, &resolver);
        assert_eq!(relaxed.backlinks(NoteId(1)), &[NoteId(2)]);
    }

    #[test]
    fn test_markup_in_references() {
        let notes = vec![
            Note::new(1, "_draft_", ""),
            Note::new(2, "a<b", ""),
            Note::new(3, "Home", ""),
            Note::new(
                4,
                "Table",
                "<div>\n[[Home]]\n</div>\n\n| Ref |\n|---|\n| [[a<b|less]] |\n\n[[_draft_]]",
            ),
        ];
        let index = build(&notes, &BacklinkResolver::new());
        assert_eq!(index.outgoing(NoteId(4)), &[NoteId(3), NoteId(2), NoteId(1)]);
        assert_eq!(index.backlinks(NoteId(2)), &[NoteId(4)]);
    }
}
