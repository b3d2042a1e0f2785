//! Markdown event renderer.

use std::fmt::Write;

use pulldown_cmark::{CodeBlockKind, CowStr, Event, LinkType, Options, Parser, Tag, TagEnd};

use crate::html;
use crate::shield::{self, Shielded};
use crate::state::{AltCapture, CodeCapture, HeadingCollector, TableCursor, TocEntry, escape_html};
use crate::util::{fence_language, heading_level_to_num};

/// Result of rendering markdown.
#[derive(Clone, Debug)]
pub struct RenderResult {
    /// Rendered HTML content.
    pub html: String,
    /// Text of the first H1 heading, when title extraction is enabled.
    pub title: Option<String>,
    /// Headings other than the title, in document order.
    pub toc: Vec<TocEntry>,
}

/// Markdown extensions and output switches.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(clippy::struct_excessive_bools)]
pub struct RenderOptions {
    /// Enable GFM tables.
    pub tables: bool,
    /// Enable `~~strikethrough~~`.
    pub strikethrough: bool,
    /// Enable `- [ ]` task list markers.
    pub tasklists: bool,
    /// Emit `id="slug"` attributes on headings.
    pub heading_ids: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            tables: true,
            strikethrough: true,
            tasklists: true,
            heading_ids: false,
        }
    }
}

impl RenderOptions {
    /// Parser options matching the enabled extensions.
    #[must_use]
    pub fn parser_options(&self) -> Options {
        let mut options = Options::empty();
        options.set(Options::ENABLE_TABLES, self.tables);
        options.set(Options::ENABLE_STRIKETHROUGH, self.strikethrough);
        options.set(Options::ENABLE_TASKLISTS, self.tasklists);
        options
    }
}

/// Render note content to HTML with default options.
///
/// ```
/// assert_eq!(notemark_renderer::render("*hi*"), "<p><em>hi</em></p>");
/// assert_eq!(notemark_renderer::render(""), "");
/// ```
#[must_use]
pub fn render(content: &str) -> String {
    render_with(content, &RenderOptions::default()).html
}

/// Render note content to HTML, extracting title and table of contents.
///
/// Note references are kept out of markdown parsing and come out as their
/// literal (escaped) text.
#[must_use]
pub fn render_with(content: &str, options: &RenderOptions) -> RenderResult {
    let Shielded { source, references } = shield::shield(content);
    let parser = Parser::new_ext(&source, options.parser_options());
    let mut renderer = MarkdownRenderer::new()
        .with_title_extraction()
        .with_references(references);
    if options.heading_ids {
        renderer = renderer.with_heading_ids();
    }
    renderer.render(parser)
}

/// Markdown renderer producing escaped HTML.
///
/// Text, code and raw HTML from the source are always escaped, and link or
/// image URLs with a script-capable scheme are replaced by `#`. Text that
/// matches no markdown construct is written through verbatim apart from
/// escaping.
pub struct MarkdownRenderer {
    output: String,
    references: Vec<String>,
    code: CodeCapture,
    table: TableCursor,
    alt: AltCapture,
    headings: HeadingCollector,
    heading_ids: bool,
}

impl MarkdownRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            output: String::with_capacity(1024),
            references: Vec::new(),
            code: CodeCapture::default(),
            table: TableCursor::default(),
            alt: AltCapture::default(),
            headings: HeadingCollector::new(false),
            heading_ids: false,
        }
    }

    /// Report the first H1 as the title.
    ///
    /// The H1 is still rendered; it is only left out of the table of contents.
    #[must_use]
    pub fn with_title_extraction(mut self) -> Self {
        self.headings = HeadingCollector::new(true);
        self
    }

    /// Emit `id` attributes on headings, deduplicated as `faq`, `faq-1`, ...
    #[must_use]
    pub fn with_heading_ids(mut self) -> Self {
        self.heading_ids = true;
        self
    }

    /// Original text of the placeholders in a shielded source.
    #[must_use]
    pub(crate) fn with_references(mut self, references: Vec<String>) -> Self {
        self.references = references;
        self
    }

    /// Render markdown events and return the result.
    pub fn render<'a, I>(&mut self, events: I) -> RenderResult
    where
        I: Iterator<Item = Event<'a>>,
    {
        for event in events {
            match self.unshield(event) {
                Event::Start(tag) => self.open(tag),
                Event::End(tag) => self.close(tag),
                Event::Text(text) => self.content(&text, &escape_html(&text)),
                Event::Code(code) => {
                    let html = format!("<code>{}</code>", escape_html(&code));
                    self.content(&code, &html);
                }
                // Author HTML is shown as text, never interpreted
                Event::Html(raw) | Event::InlineHtml(raw) => {
                    self.content(&raw, &escape_html(&raw));
                }
                Event::SoftBreak if self.code.is_open() => self.code.append("\n"),
                Event::SoftBreak => self.content(" ", "\n"),
                Event::HardBreak => self.markup("<br>"),
                Event::Rule => self.output.push_str("<hr>"),
                Event::TaskListMarker(checked) => {
                    html::task_list_marker(checked, &mut self.output);
                }
                Event::FootnoteReference(_) | Event::InlineMath(_) | Event::DisplayMath(_) => {}
            }
        }

        let (title, toc) = self.headings.take();
        RenderResult {
            html: std::mem::take(&mut self.output),
            title,
            toc,
        }
    }

    /// Swap shielded references back into the text an event carries.
    fn unshield<'a>(&self, event: Event<'a>) -> Event<'a> {
        if self.references.is_empty() {
            return event;
        }
        let restore = |text: CowStr<'a>| shield::restore(text, &self.references);
        match event {
            Event::Text(text) => Event::Text(restore(text)),
            Event::Code(code) => Event::Code(restore(code)),
            Event::Html(raw) => Event::Html(restore(raw)),
            Event::InlineHtml(raw) => Event::InlineHtml(restore(raw)),
            Event::Start(Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            }) => Event::Start(Tag::Link {
                link_type,
                dest_url: restore(dest_url),
                title: restore(title),
                id,
            }),
            Event::Start(Tag::Image {
                link_type,
                dest_url,
                title,
                id,
            }) => Event::Start(Tag::Image {
                link_type,
                dest_url: restore(dest_url),
                title: restore(title),
                id,
            }),
            other => other,
        }
    }

    /// Route source content: `plain` feeds code bodies, alt text and heading
    /// titles, `html` is what gets displayed.
    fn content(&mut self, plain: &str, html: &str) {
        if self.code.is_open() {
            self.code.append(plain);
        } else if self.alt.is_open() {
            self.alt.append(plain);
        } else if self.headings.is_open() {
            self.headings.push_text(plain);
            self.headings.push_html(html);
        } else {
            self.output.push_str(html);
        }
    }

    /// Write generated inline markup. Markup inside alt text is dropped.
    fn markup(&mut self, html: &str) {
        if self.alt.is_open() {
            return;
        }
        if self.headings.is_open() {
            self.headings.push_html(html);
        } else {
            self.output.push_str(html);
        }
    }

    fn open(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.output.push_str("<p>"),
            // Written on close, once the id is known
            Tag::Heading { level, .. } => self.headings.begin(heading_level_to_num(level)),
            Tag::BlockQuote(_) => self.output.push_str("<blockquote>"),
            Tag::CodeBlock(CodeBlockKind::Fenced(info)) => self.code.open(fence_language(&info)),
            Tag::CodeBlock(CodeBlockKind::Indented) => self.code.open(None),
            Tag::List(None) => self.output.push_str("<ul>"),
            Tag::List(Some(1)) => self.output.push_str("<ol>"),
            Tag::List(Some(start)) => write!(self.output, r#"<ol start="{start}">"#).unwrap(),
            Tag::Item => self.output.push_str("<li>"),
            Tag::DefinitionList => self.output.push_str("<dl>"),
            Tag::DefinitionListTitle => self.output.push_str("<dt>"),
            Tag::DefinitionListDefinition => self.output.push_str("<dd>"),
            Tag::Table(columns) => {
                self.table.begin(columns);
                self.output.push_str("<table>");
            }
            Tag::TableHead => {
                self.table.row(true);
                self.output.push_str("<thead><tr>");
            }
            Tag::TableRow => {
                self.table.row(false);
                self.output.push_str("<tr>");
            }
            Tag::TableCell => {
                let (name, style) = (self.table.cell_tag(), self.table.cell_style());
                write!(self.output, "<{name}{style}>").unwrap();
            }
            Tag::Emphasis => self.markup("<em>"),
            Tag::Strong => self.markup("<strong>"),
            Tag::Strikethrough => self.markup("<s>"),
            Tag::Superscript => self.markup("<sup>"),
            Tag::Subscript => self.markup("<sub>"),
            Tag::Link {
                link_type,
                dest_url,
                title,
                ..
            } => {
                let mut anchor = String::new();
                if link_type == LinkType::Email {
                    html::link_start(&format!("mailto:{dest_url}"), &title, &mut anchor);
                } else {
                    html::link_start(&dest_url, &title, &mut anchor);
                }
                self.markup(&anchor);
            }
            // Written on close, once the alt text is known
            Tag::Image {
                dest_url, title, ..
            } => self.alt.open(dest_url.into_string(), title.into_string()),
            Tag::FootnoteDefinition(_) | Tag::HtmlBlock | Tag::MetadataBlock(_) => {}
        }
    }

    fn close(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.output.push_str("</p>"),
            TagEnd::Heading(_) => self.close_heading(),
            TagEnd::BlockQuote(_) => self.output.push_str("</blockquote>"),
            TagEnd::CodeBlock => {
                if let Some(code) = self.code.close() {
                    html::code_block(code.language.as_deref(), &code.body, &mut self.output);
                }
            }
            TagEnd::List(true) => self.output.push_str("</ol>"),
            TagEnd::List(false) => self.output.push_str("</ul>"),
            TagEnd::Item => self.output.push_str("</li>"),
            TagEnd::DefinitionList => self.output.push_str("</dl>"),
            TagEnd::DefinitionListTitle => self.output.push_str("</dt>"),
            TagEnd::DefinitionListDefinition => self.output.push_str("</dd>"),
            TagEnd::Table => self.output.push_str("</tbody></table>"),
            TagEnd::TableHead => {
                self.output.push_str("</tr></thead><tbody>");
                self.table.row(false);
            }
            TagEnd::TableRow => self.output.push_str("</tr>"),
            TagEnd::TableCell => {
                write!(self.output, "</{}>", self.table.cell_tag()).unwrap();
                self.table.advance();
            }
            TagEnd::Emphasis => self.markup("</em>"),
            TagEnd::Strong => self.markup("</strong>"),
            TagEnd::Strikethrough => self.markup("</s>"),
            TagEnd::Superscript => self.markup("</sup>"),
            TagEnd::Subscript => self.markup("</sub>"),
            TagEnd::Link => self.markup("</a>"),
            TagEnd::Image => {
                if let Some(image) = self.alt.close() {
                    let mut img = String::new();
                    html::image(&image.src, &image.alt, &image.title, &mut img);
                    self.markup(&img);
                }
            }
            TagEnd::FootnoteDefinition | TagEnd::HtmlBlock | TagEnd::MetadataBlock(_) => {}
        }
    }

    fn close_heading(&mut self) {
        let Some(heading) = self.headings.finish() else {
            return;
        };
        let level = heading.level;
        if self.heading_ids {
            write!(self.output, r#"<h{level} id="{}">"#, heading.id).unwrap();
        } else {
            write!(self.output, "<h{level}>").unwrap();
        }
        write!(self.output, "{}</h{level}>", heading.html.trim()).unwrap();
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}
