//! Note rendering for the notes app.
//!
//! Ties together markdown rendering ([`notemark_renderer`]), note reference
//! resolution ([`notemark_backlinks`]) and configuration
//! ([`notemark_config`]), and wires rendered note links to the host's
//! navigation callback.
//!
//! A typical render cycle:
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use notemark::{NavigationRegistry, NotePipeline, NoteSurface};
//! use notemark::backlinks::{Note, NoteId};
//!
//! let notes = vec![
//!     Note::new(1, "Inbox", "Next: [[Project Plan]], then [[Someday]]."),
//!     Note::new(7, "Project Plan", "# Plan"),
//! ];
//! let opened = Rc::new(RefCell::new(Vec::new()));
//! let sink = Rc::clone(&opened);
//!
//! let html = NotePipeline::default().render(&notes[0].content, &notes);
//! let mut registry = NavigationRegistry::new();
//! let mut surface = NoteSurface::mount(&mut registry, html, move |id| {
//!     sink.borrow_mut().push(id);
//! });
//!
//! for link in surface.links() {
//!     surface.activate(&link);
//! }
//! assert_eq!(*opened.borrow(), vec![NoteId(7)]);
//! ```

mod navigation;
mod pipeline;
mod surface;

pub use navigation::{NavigateFn, NavigationRegistry, RegistrationId};
pub use pipeline::NotePipeline;
pub use surface::{NoteSurface, link_target};

pub use notemark_backlinks as backlinks;
pub use notemark_config as config;
pub use notemark_renderer as renderer;
