//! Buffers the renderer keeps open while walking markdown events.

use std::collections::HashMap;

use pulldown_cmark::Alignment;

/// Body of a code block collected until its end event.
#[derive(Debug, Default)]
pub struct CodeBuffer {
    pub language: Option<String>,
    pub body: String,
}

/// Open code block, if any.
#[derive(Default)]
pub struct CodeCapture {
    open: Option<CodeBuffer>,
}

impl CodeCapture {
    pub fn open(&mut self, language: Option<String>) {
        self.open = Some(CodeBuffer {
            language,
            body: String::new(),
        });
    }

    pub fn close(&mut self) -> Option<CodeBuffer> {
        self.open.take()
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn append(&mut self, text: &str) {
        if let Some(code) = &mut self.open {
            code.body.push_str(text);
        }
    }
}

/// Position inside the table being rendered.
#[derive(Default)]
pub struct TableCursor {
    columns: Vec<Alignment>,
    column: usize,
    header: bool,
}

impl TableCursor {
    pub fn begin(&mut self, columns: Vec<Alignment>) {
        *self = Self {
            columns,
            ..Self::default()
        };
    }

    /// Start the header row (`true`) or a body row (`false`).
    pub fn row(&mut self, header: bool) {
        self.header = header;
        self.column = 0;
    }

    /// Cell element name for the current row.
    pub fn cell_tag(&self) -> &'static str {
        if self.header { "th" } else { "td" }
    }

    /// `style` attribute for the current column, including the leading space.
    pub fn cell_style(&self) -> &'static str {
        match self.columns.get(self.column) {
            Some(Alignment::Left) => r#" style="text-align:left""#,
            Some(Alignment::Center) => r#" style="text-align:center""#,
            Some(Alignment::Right) => r#" style="text-align:right""#,
            Some(Alignment::None) | None => "",
        }
    }

    pub fn advance(&mut self) {
        self.column += 1;
    }
}

/// Image waiting for its alt text.
#[derive(Debug, PartialEq, Eq)]
pub struct PendingImage {
    pub src: String,
    pub title: String,
    pub alt: String,
}

/// Collects image alt text.
///
/// An image nested in another image's alt text only contributes its own alt
/// text to the outer one, so a depth counter is enough.
#[derive(Default)]
pub struct AltCapture {
    depth: usize,
    image: Option<PendingImage>,
}

impl AltCapture {
    pub fn open(&mut self, src: String, title: String) {
        if self.depth == 0 {
            self.image = Some(PendingImage {
                src,
                title,
                alt: String::new(),
            });
        }
        self.depth += 1;
    }

    /// Close one image level, yielding the outermost image once complete.
    pub fn close(&mut self) -> Option<PendingImage> {
        self.depth = self.depth.saturating_sub(1);
        if self.depth == 0 { self.image.take() } else { None }
    }

    pub fn is_open(&self) -> bool {
        self.depth > 0
    }

    pub fn append(&mut self, text: &str) {
        if let Some(image) = &mut self.image {
            image.alt.push_str(text);
        }
    }
}

/// Table of contents entry.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TocEntry {
    /// Heading level (1-6).
    pub level: u8,
    /// Heading text without markup.
    pub title: String,
    /// Slug usable as an anchor id.
    pub id: String,
}

/// Heading whose end event has been seen.
pub struct FinishedHeading {
    pub level: u8,
    pub id: String,
    pub html: String,
}

struct OpenHeading {
    level: u8,
    /// Plain text for the title, TOC and slug.
    text: String,
    /// Rendered inline markup.
    html: String,
}

/// Collects headings into a title and table of contents.
#[derive(Default)]
pub struct HeadingCollector {
    extract_title: bool,
    open: Option<OpenHeading>,
    title: Option<String>,
    toc: Vec<TocEntry>,
    slugs: SlugCounter,
}

impl HeadingCollector {
    /// With `extract_title`, the first H1 becomes the title instead of a TOC entry.
    pub fn new(extract_title: bool) -> Self {
        Self {
            extract_title,
            ..Self::default()
        }
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn begin(&mut self, level: u8) {
        self.open = Some(OpenHeading {
            level,
            text: String::new(),
            html: String::new(),
        });
    }

    pub fn push_text(&mut self, text: &str) {
        if let Some(heading) = &mut self.open {
            heading.text.push_str(text);
        }
    }

    pub fn push_html(&mut self, html: &str) {
        if let Some(heading) = &mut self.open {
            heading.html.push_str(html);
        }
    }

    /// Close the open heading. The title heading is still returned for output.
    pub fn finish(&mut self) -> Option<FinishedHeading> {
        let OpenHeading { level, text, html } = self.open.take()?;
        let text = text.trim();
        let id = self.slugs.unique(slugify(text));

        if self.extract_title && level == 1 && self.title.is_none() {
            self.title = Some(text.to_owned());
        } else {
            self.toc.push(TocEntry {
                level,
                title: text.to_owned(),
                id: id.clone(),
            });
        }

        Some(FinishedHeading { level, id, html })
    }

    /// Extracted title and table of contents, resetting both.
    pub fn take(&mut self) -> (Option<String>, Vec<TocEntry>) {
        (self.title.take(), std::mem::take(&mut self.toc))
    }
}

/// Hands out `faq`, `faq-1`, `faq-2` for repeated slugs.
///
/// Generated ids are recorded as well, so a heading whose own slug is
/// `faq-1` never collides with a numbered `faq`.
#[derive(Default)]
struct SlugCounter {
    /// Ids handed out, with the next suffix to try for each.
    seen: HashMap<String, usize>,
}

impl SlugCounter {
    fn unique(&mut self, slug: String) -> String {
        let Some(&next) = self.seen.get(&slug) else {
            self.seen.insert(slug.clone(), 1);
            return slug;
        };

        let mut suffix = next;
        let id = loop {
            let candidate = format!("{slug}-{suffix}");
            suffix += 1;
            if !self.seen.contains_key(&candidate) {
                break candidate;
            }
        };
        self.seen.insert(slug, suffix);
        self.seen.insert(id.clone(), 1);
        id
    }
}

/// Lowercase slug of `text`.
///
/// Words are separated by whitespace, `-` or `_` and joined with a single
/// `-`; other non-alphanumeric characters are dropped.
#[must_use]
pub fn slugify(text: &str) -> String {
    text.split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .map(|word| {
            word.chars()
                .filter(|c| c.is_alphanumeric())
                .flat_map(char::to_lowercase)
                .collect::<String>()
        })
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Escape text for use in HTML element content and quoted attributes.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut last = 0;
    for (i, c) in s.char_indices() {
        let entity = match c {
            '&' => "&amp;",
            '<' => "&lt;",
            '>' => "&gt;",
            '"' => "&quot;",
            '\'' => "&#x27;",
            _ => continue,
        };
        out.push_str(&s[last..i]);
        out.push_str(entity);
        last = i + 1;
    }
    out.push_str(&s[last..]);
    out
}
