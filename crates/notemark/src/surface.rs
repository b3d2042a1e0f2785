//! Display surface for resolved note HTML.

use notemark_backlinks::{Element, NOTE_ID_ATTRIBUTE, NoteId, elements};

use crate::navigation::{NavigationRegistry, RegistrationId};

/// Resolved HTML mounted for display, wired to a navigation callback.
///
/// The surface holds the registry's unique borrow while mounted, so only one
/// surface can own the navigation slot at a time. Re-rendering replaces the
/// callback; dropping the surface clears it.
///
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// use notemark::{NavigationRegistry, NoteSurface};
///
/// let opened = Rc::new(Cell::new(None));
/// let sink = Rc::clone(&opened);
///
/// let mut registry = NavigationRegistry::new();
/// let mut surface = NoteSurface::mount(
///     &mut registry,
///     r##"<p><a class="note-link" href="#note-7" data-note-id="7">Plan</a></p>"##,
///     move |id| sink.set(Some(id)),
/// );
///
/// let link = surface.links().remove(0);
/// assert!(surface.activate(&link));
/// assert_eq!(opened.get().map(|id| id.0), Some(7));
/// ```
#[derive(Debug)]
pub struct NoteSurface<'a> {
    registry: &'a mut NavigationRegistry,
    registration: RegistrationId,
    html: String,
}

impl<'a> NoteSurface<'a> {
    /// Mount `html` and register `on_navigate` as the navigation callback.
    pub fn mount<F>(
        registry: &'a mut NavigationRegistry,
        html: impl Into<String>,
        on_navigate: F,
    ) -> Self
    where
        F: FnMut(NoteId) + 'static,
    {
        let registration = registry.register(on_navigate);
        Self {
            registry,
            registration,
            html: html.into(),
        }
    }

    /// Replace the displayed HTML and the navigation callback together.
    pub fn update<F>(&mut self, html: impl Into<String>, on_navigate: F)
    where
        F: FnMut(NoteId) + 'static,
    {
        self.html = html.into();
        self.registration = self.registry.register(on_navigate);
    }

    /// Displayed HTML.
    pub fn html(&self) -> &str {
        &self.html
    }

    /// Every element of the displayed HTML, in document order.
    pub fn elements(&self) -> Vec<Element> {
        elements(&self.html)
    }

    /// Navigable note links of the displayed HTML, in document order.
    pub fn links(&self) -> Vec<Element> {
        let mut elements = self.elements();
        elements.retain(|element| link_target(element).is_some());
        elements
    }

    /// Handle activation of `element`.
    ///
    /// Note links invoke the navigation callback exactly once with their
    /// target id. Any other element is ignored. Returns whether navigation
    /// was dispatched.
    pub fn activate(&mut self, element: &Element) -> bool {
        match link_target(element) {
            Some(id) => self.registry.dispatch(id),
            None => false,
        }
    }

    /// Unmount the surface, clearing its navigation callback.
    pub fn unmount(self) {
        drop(self);
    }
}

impl Drop for NoteSurface<'_> {
    fn drop(&mut self) {
        self.registry.unregister(self.registration);
    }
}

/// Target note of a rendered note link.
///
/// Only anchors carrying a well-formed id attribute qualify.
pub fn link_target(element: &Element) -> Option<NoteId> {
    if element.name != "a" {
        return None;
    }
    element.attribute(NOTE_ID_ATTRIBUTE)?.trim().parse().ok()
}
