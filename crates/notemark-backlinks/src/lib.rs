//! Note reference resolution for rendered notes.
//!
//! Notes reference each other with `[[Title]]` or `[[Title|display text]]`.
//! This crate finds those tokens in rendered HTML and rewrites the ones that
//! match a note into navigable links carrying the target id in a
//! `data-note-id` attribute. Tokens that match nothing stay as plain text.
//!
//! It also provides the pieces a host needs around that step:
//! - [`extract_references`] lists the references a note's rendered content
//!   holds, using the same scan as resolution
//! - [`BacklinkIndex`] answers "which notes link here"
//! - [`elements`] and [`Element`] expose the start tags of a fragment so a
//!   display layer can read link attributes on activation
//!
//! # Example
//!
//! ```
//! use notemark_backlinks::{Note, resolve_backlinks};
//!
//! let notes = vec![Note::new(7, "Project Plan", "")];
//! let html = resolve_backlinks("<p>See [[Project Plan]] and [[Nope]].</p>", &notes);
//! assert!(html.contains(r#"data-note-id="7""#));
//! assert!(html.contains("[[Nope]]"));
//! ```

mod index;
mod note;
mod references;
mod resolver;
mod scan;

pub use index::BacklinkIndex;
pub use note::{Note, NoteId};
pub use references::{NoteReference, extract_references, html_references};
pub use resolver::{
    BacklinkResolver, DEFAULT_LINK_CLASS, MatchMode, NOTE_ID_ATTRIBUTE, NoteLookup,
    resolve_backlinks,
};
pub use scan::{Element, Segment, Segments, decode_entities, elements};
