//! HTML element writers.
//!
//! Every attribute value and text payload is escaped here; the renderer never
//! forwards author-supplied markup.

use std::fmt::Write;

use crate::state::escape_html;

/// URL schemes that can run script when a link is followed or an image is loaded.
const UNSAFE_SCHEMES: &[&str] = &["javascript:", "vbscript:", "data:"];

pub fn code_block(lang: Option<&str>, content: &str, out: &mut String) {
    if let Some(lang) = lang {
        write!(
            out,
            r#"<pre><code class="language-{}">{}</code></pre>"#,
            escape_html(lang),
            escape_html(content)
        )
        .unwrap();
    } else {
        write!(out, "<pre><code>{}</code></pre>", escape_html(content)).unwrap();
    }
}

pub fn link_start(href: &str, title: &str, out: &mut String) {
    let href = sanitize_url(href);
    if title.is_empty() {
        write!(out, r#"<a href="{}">"#, escape_html(href)).unwrap();
    } else {
        write!(
            out,
            r#"<a href="{}" title="{}">"#,
            escape_html(href),
            escape_html(title)
        )
        .unwrap();
    }
}

pub fn image(src: &str, alt: &str, title: &str, out: &mut String) {
    let src = sanitize_url(src);
    let title_attr = if title.is_empty() {
        String::new()
    } else {
        format!(r#" title="{}""#, escape_html(title))
    };
    write!(
        out,
        r#"<img src="{}"{title_attr} alt="{}">"#,
        escape_html(src),
        escape_html(alt)
    )
    .unwrap();
}

pub fn task_list_marker(checked: bool, out: &mut String) {
    if checked {
        out.push_str(r#"<input type="checkbox" checked disabled> "#);
    } else {
        out.push_str(r#"<input type="checkbox" disabled> "#);
    }
}

/// Neutralize URLs whose scheme could execute script.
///
/// Browsers ignore ASCII whitespace and control characters inside the scheme
/// (`java\tscript:`), so those are stripped before comparing. Unsafe URLs
/// become `#`; everything else is returned unchanged.
#[must_use]
pub fn sanitize_url(url: &str) -> &str {
    let scheme: String = url
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_control())
        .take_while(|&c| c != ':' && c != '/' && c != '?' && c != '#')
        .chain(std::iter::once(':'))
        .flat_map(char::to_lowercase)
        .collect();

    // The chained ':' only counts when the URL really has a scheme
    let has_scheme = url.contains(':');
    if has_scheme && UNSAFE_SCHEMES.contains(&scheme.as_str()) {
        tracing::warn!(scheme = %scheme, "Rejected unsafe URL scheme");
        "#"
    } else {
        url
    }
}
