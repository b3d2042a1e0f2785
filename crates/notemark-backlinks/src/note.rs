//! Note data model.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Note identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct NoteId(pub i64);

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for NoteId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl From<i64> for NoteId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// A note as supplied by the host storage layer.
///
/// Only `id`, `title` and `content` take part in rendering; the remaining
/// fields are carried for the host and ignored here. Uniqueness of `id` is
/// assumed, not checked.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub content: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub tags: Vec<String>,
    /// Last modification timestamp as stored by the host.
    #[cfg_attr(feature = "serde", serde(default))]
    pub updated_at: Option<String>,
}

impl Note {
    /// Create a note without metadata.
    pub fn new(
        id: impl Into<NoteId>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
            tags: Vec::new(),
            updated_at: None,
        }
    }
}
