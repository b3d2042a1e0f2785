//! Markdown to HTML renderer for note content.
//!
//! Wraps `pulldown-cmark` events in a renderer that escapes everything the
//! author wrote: text, code, attribute values and raw HTML. The output is
//! meant for display only and never executes embedded script.
//!
//! Note references such as `[[Project Plan]]` are not a markdown construct.
//! They are held out of markdown parsing, so `[[_draft_]]` or `[[A|see]]`
//! inside a table cell come out as their literal text, ready for a later
//! resolution step. The [`Tokens`] tokenizer defines that syntax for both
//! steps.
//!
//! # Example
//!
//! ```
//! use notemark_renderer::{RenderOptions, render_with};
//!
//! let result = render_with("# Hello\n\n**Bold** text", &RenderOptions::default());
//! assert_eq!(result.html, "<h1>Hello</h1><p><strong>Bold</strong> text</p>");
//! assert_eq!(result.title.as_deref(), Some("Hello"));
//! ```

mod html;
mod renderer;
mod shield;
mod state;
mod token;
mod util;

pub use html::sanitize_url;
pub use renderer::{MarkdownRenderer, RenderOptions, RenderResult, render, render_with};
pub use state::{TocEntry, escape_html, slugify};
pub use token::{Piece, Token, Tokens, parse_token};
