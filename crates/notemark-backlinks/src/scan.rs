//! HTML segment scanner over `quick-xml` events.
//!
//! Splits an HTML fragment into tags, comments and text without building a
//! tree. Every segment borrows its exact source slice, so concatenating the
//! segments reproduces the input byte for byte. The reader runs with HTML
//! leniencies: void elements such as `<br>` need no end tag, end tags are not
//! matched against start tags, and a bare `&` is text.

use std::borrow::Cow;
use std::sync::LazyLock;

use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use regex::Regex;

/// Named, decimal and hexadecimal character references.
static CHARACTER_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:[a-zA-Z][a-zA-Z0-9]*|#[0-9]+|#[xX][0-9a-fA-F]+);")
        .expect("invalid character reference regex")
});

/// A slice of an HTML fragment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Character data between tags (entities still encoded).
    Text(&'a str),
    /// Opening tag such as `<a href="x">` or `<br/>`.
    StartTag {
        raw: &'a str,
        name: &'a str,
        self_closing: bool,
    },
    /// Closing tag such as `</a>`.
    EndTag { raw: &'a str, name: &'a str },
    /// Comment, doctype, processing instruction, or the unparsable rest of
    /// a malformed fragment.
    Other(&'a str),
}

impl<'a> Segment<'a> {
    /// The source slice of this segment.
    pub fn as_str(&self) -> &'a str {
        match *self {
            Segment::Text(raw)
            | Segment::StartTag { raw, .. }
            | Segment::EndTag { raw, .. }
            | Segment::Other(raw) => raw,
        }
    }
}

/// Iterator over the [`Segment`]s of an HTML fragment.
///
/// Text and entity reference events are joined into one [`Segment::Text`]
/// per run between tags.
pub struct Segments<'a> {
    html: &'a str,
    reader: Reader<&'a [u8]>,
    /// Markup read while finishing a text run.
    pending: Option<Segment<'a>>,
    done: bool,
}

impl<'a> Segments<'a> {
    pub fn new(html: &'a str) -> Self {
        let mut reader = Reader::from_str(html);
        let config = reader.config_mut();
        config.trim_text(false);
        config.check_end_names = false;
        config.allow_unmatched_ends = true;
        config.allow_dangling_amp = true;

        Self {
            html,
            reader,
            pending: None,
            done: false,
        }
    }

    fn position(&self) -> usize {
        usize::try_from(self.reader.buffer_position()).unwrap_or(self.html.len())
    }

    /// Offset where the next event starts.
    ///
    /// The reader may already have consumed the `<` of the next tag while
    /// ending a text run.
    fn next_start(&self) -> usize {
        let position = self.position();
        let bytes = self.html.as_bytes();
        let consumed_lt = position > 0
            && bytes.get(position) != Some(&b'<')
            && bytes.get(position - 1) == Some(&b'<');
        if consumed_lt { position - 1 } else { position }
    }

    fn markup(&self, event: &Event<'_>, start: usize) -> Segment<'a> {
        let html = self.html;
        let raw = &html[start..self.position().max(start)];
        match event {
            Event::Start(tag) => Segment::StartTag {
                raw,
                name: name_at(raw, 1, tag.name().as_ref().len()),
                self_closing: false,
            },
            Event::Empty(tag) => Segment::StartTag {
                raw,
                name: name_at(raw, 1, tag.name().as_ref().len()),
                self_closing: true,
            },
            Event::End(tag) => Segment::EndTag {
                raw,
                name: name_at(raw, 2, tag.name().as_ref().len()),
            },
            _ => Segment::Other(raw),
        }
    }

    /// Emit `segment`, flushing the text run that precedes it first.
    fn after_text(
        &mut self,
        text_start: Option<usize>,
        start: usize,
        segment: Segment<'a>,
    ) -> Segment<'a> {
        let html = self.html;
        match text_start {
            Some(from) if from < start => {
                self.pending = Some(segment);
                Segment::Text(&html[from..start])
            }
            _ => segment,
        }
    }
}

impl<'a> Iterator for Segments<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(segment) = self.pending.take() {
            return Some(segment);
        }
        if self.done {
            return None;
        }

        let html = self.html;
        let mut text_start = None;
        loop {
            let start = self.next_start();
            match self.reader.read_event() {
                Ok(Event::Text(_) | Event::GeneralRef(_)) => {
                    text_start.get_or_insert(start);
                }
                Ok(Event::Eof) => {
                    self.done = true;
                    return text_start.map(|from| Segment::Text(&html[from..]));
                }
                Ok(event) => {
                    let segment = self.markup(&event, start);
                    return Some(self.after_text(text_start, start, segment));
                }
                Err(error) => {
                    tracing::trace!(%error, position = start, "Leaving unparsable HTML as is");
                    self.done = true;
                    let rest = Segment::Other(&html[start..]);
                    return Some(self.after_text(text_start, start, rest));
                }
            }
        }
    }
}

/// Tag name of `len` bytes at `offset` in a raw tag.
fn name_at(raw: &str, offset: usize, len: usize) -> &str {
    raw.get(offset..offset + len).unwrap_or("")
}

/// An opening tag with its attributes, as seen by an event handler.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    /// Lowercased tag name.
    pub name: String,
    /// Attributes in source order with entity-decoded values.
    pub attributes: Vec<(String, String)>,
}

impl Element {
    /// Parse a raw start tag like `<a href="x" data-id=3>`.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut reader = Reader::from_str(raw);
        match reader.read_event().ok()? {
            Event::Start(tag) | Event::Empty(tag) => Self::from_tag(&tag),
            _ => None,
        }
    }

    fn from_tag(tag: &BytesStart<'_>) -> Option<Self> {
        let name = String::from_utf8_lossy(tag.name().as_ref()).to_ascii_lowercase();
        if name.is_empty() {
            return None;
        }

        let attributes = tag
            .html_attributes()
            .flatten()
            .map(|attr| {
                let key = String::from_utf8_lossy(attr.key.as_ref()).to_ascii_lowercase();
                let value = attr.unescape_value().map_or_else(
                    |_| String::from_utf8_lossy(&attr.value).into_owned(),
                    Cow::into_owned,
                );
                (key, value)
            })
            .collect();

        Some(Self { name, attributes })
    }

    /// Value of the first attribute called `name` (case-insensitive).
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// All opening tags of an HTML fragment, in document order.
pub fn elements(html: &str) -> Vec<Element> {
    Segments::new(html)
        .filter_map(|segment| match segment {
            Segment::StartTag { raw, .. } => Element::parse(raw),
            _ => None,
        })
        .collect()
}

/// Decode the character references in HTML text.
///
/// Handles the predefined named entities plus decimal and hexadecimal
/// numeric references. Anything else, including a bare `&`, is left as is.
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_owned();
    }

    CHARACTER_REFERENCE
        .replace_all(s, |caps: &regex::Captures| {
            unescape(&caps[0]).map_or_else(|_| caps[0].to_owned(), Cow::into_owned)
        })
        .into_owned()
}
