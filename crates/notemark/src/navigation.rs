//! Single-slot navigation callback registry.
//!
//! Rendered note links carry only a note id. Activation is routed through a
//! registry holding the host's current `on_navigate` callback. There is one
//! slot: registering replaces whatever was there, so a stale handler from a
//! previous render can never fire.

use std::fmt;

use notemark_backlinks::NoteId;

/// Boxed navigation callback.
pub type NavigateFn = Box<dyn FnMut(NoteId)>;

/// Handle identifying one registration.
///
/// Ids are never reused within a registry, so an outdated handle cannot clear
/// a newer registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RegistrationId(u64);

/// Holds the callback invoked when a note link is activated.
#[derive(Default)]
pub struct NavigationRegistry {
    next_id: u64,
    current: Option<(RegistrationId, NavigateFn)>,
}

impl NavigationRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `callback`, dropping any previously registered one.
    pub fn register<F>(&mut self, callback: F) -> RegistrationId
    where
        F: FnMut(NoteId) + 'static,
    {
        let id = RegistrationId(self.next_id);
        self.next_id += 1;

        if let Some((previous, _)) = self.current.replace((id, Box::new(callback))) {
            tracing::trace!(
                previous = previous.0,
                current = id.0,
                "Replaced navigation handler"
            );
        } else {
            tracing::trace!(current = id.0, "Registered navigation handler");
        }
        id
    }

    /// Clear the slot if `id` is the current registration.
    ///
    /// Returns `false` when `id` was already superseded or removed.
    pub fn unregister(&mut self, id: RegistrationId) -> bool {
        if self.current() != Some(id) {
            return false;
        }
        self.current = None;
        tracing::trace!(current = id.0, "Unregistered navigation handler");
        true
    }

    /// Current registration, if any.
    pub fn current(&self) -> Option<RegistrationId> {
        self.current.as_ref().map(|(id, _)| *id)
    }

    pub fn is_registered(&self) -> bool {
        self.current.is_some()
    }

    /// Invoke the current callback once with `note`.
    ///
    /// Returns whether a callback ran.
    pub fn dispatch(&mut self, note: NoteId) -> bool {
        match &mut self.current {
            Some((_, callback)) => {
                callback(note);
                true
            }
            None => {
                tracing::debug!(note = %note, "Note link activated with no navigation handler");
                false
            }
        }
    }
}

impl fmt::Debug for NavigationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationRegistry")
            .field("next_id", &self.next_id)
            .field("current", &self.current())
            .finish()
    }
}
