//! Markdown rendering followed by reference resolution.

use notemark_backlinks::{BacklinkIndex, BacklinkResolver, MatchMode, Note};
use notemark_config::Config;
use notemark_renderer::{RenderOptions, RenderResult, render_with};

/// Renders note content and resolves its references in one step.
///
/// ```
/// use notemark::NotePipeline;
/// use notemark::backlinks::Note;
///
/// let notes = vec![Note::new(7, "Project Plan", "")];
/// let html = NotePipeline::default().render("See [[Project Plan]].", &notes);
/// assert_eq!(
///     html,
///     r##"<p>See <a class="note-link" href="#note-7" data-note-id="7">Project Plan</a>.</p>"##
/// );
/// ```
#[derive(Clone, Debug, Default)]
pub struct NotePipeline {
    options: RenderOptions,
    resolver: BacklinkResolver,
}

impl NotePipeline {
    /// Build a pipeline from loaded configuration.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        let markdown = &config.markdown;
        let options = RenderOptions {
            tables: markdown.tables,
            strikethrough: markdown.strikethrough,
            tasklists: markdown.tasklists,
            heading_ids: markdown.heading_ids,
        };

        let links = &config.links;
        let match_mode = if links.case_sensitive {
            MatchMode::Exact
        } else {
            MatchMode::CaseInsensitive
        };
        let resolver = BacklinkResolver::new()
            .with_match_mode(match_mode)
            .with_id_resolution(links.resolve_ids)
            .with_link_class(links.class.as_str());

        Self::from_parts(options, resolver)
    }

    #[must_use]
    pub fn from_parts(options: RenderOptions, resolver: BacklinkResolver) -> Self {
        Self { options, resolver }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn resolver(&self) -> &BacklinkResolver {
        &self.resolver
    }

    /// Render `content` and resolve its references against `notes`.
    pub fn render(&self, content: &str, notes: &[Note]) -> String {
        self.render_content(content, notes).html
    }

    /// Render a note, keeping its extracted title and table of contents.
    pub fn render_note(&self, note: &Note, notes: &[Note]) -> RenderResult {
        self.render_content(&note.content, notes)
    }

    /// Index the references between `notes` with this pipeline's rules.
    ///
    /// The index lists the same links [`NotePipeline::render`] produces.
    pub fn backlinks(&self, notes: &[Note]) -> BacklinkIndex {
        BacklinkIndex::build(notes, &self.options, &self.resolver)
    }

    fn render_content(&self, content: &str, notes: &[Note]) -> RenderResult {
        let mut result = render_with(content, &self.options);
        result.html = self.resolver.resolve(&result.html, notes);
        result
    }
}

#[cfg(test)]
mod tests {
    use notemark_backlinks::{NoteId, elements};

    use super::*;
    use crate::surface::link_target;
    use pretty_assertions::assert_eq;

    fn notes() -> Vec<Note> {
        vec![
            Note::new(7, "Project Plan", "# Plan\n\nBack to [[Inbox]]."),
            Note::new(
                1,
                "Inbox",
                "# Inbox\n\n- [[Project Plan|the plan]]\n- [[Later]]",
            ),
        ]
    }

    #[test]
    fn test_render_resolves_references() {
        let content = "# Title\n\nSee [[Project Plan]] for details.";
        let html = NotePipeline::default().render(content, &notes());
        assert_eq!(
            html,
            r##"<h1>Title</h1><p>See <a class="note-link" href="#note-7" data-note-id="7">Project Plan</a> for details.</p>"##
        );
    }

    #[test]
    fn test_render_without_notes_keeps_text() {
        let html = NotePipeline::default().render("See [[Project Plan]] for details.", &[]);
        assert_eq!(html, "<p>See [[Project Plan]] for details.</p>");
    }

    #[test]
    fn test_render_empty_content() {
        assert_eq!(NotePipeline::default().render("", &notes()), "");
    }

    #[test]
    fn test_raw_html_stays_escaped() {
        let html = NotePipeline::default().render("<b>[[Inbox]]</b>", &notes());
        assert!(html.contains("&lt;b&gt;"));
        assert!(html.contains(r#"data-note-id="1""#));
    }

    #[test]
    fn test_render_note_keeps_title() {
        let notes = notes();
        let result = NotePipeline::default().render_note(&notes[1], &notes);
        assert_eq!(result.title.as_deref(), Some("Inbox"));
        assert_eq!(
            result.html,
            r##"<h1>Inbox</h1><ul><li><a class="note-link" href="#note-7" data-note-id="7">the plan</a></li><li>[[Later]]</li></ul>"##
        );
    }

    #[test]
    fn test_config_case_insensitive() {
        let config = Config::from_toml("[links]\ncase_sensitive = false\n").unwrap();
        let html = NotePipeline::new(&config).render("[[project plan]]", &notes());
        assert!(html.contains(r#"data-note-id="7""#));

        let html = NotePipeline::new(&Config::default()).render("[[project plan]]", &notes());
        assert_eq!(html, "<p>[[project plan]]</p>");
    }

    #[test]
    fn test_config_link_class_and_ids() {
        let config = Config::from_toml("[links]\nclass = \"wiki\"\nresolve_ids = false\n").unwrap();
        let pipeline = NotePipeline::new(&config);
        assert_eq!(
            pipeline.render("[[Inbox]] [[7]]", &notes()),
            r##"<p><a class="wiki" href="#note-1" data-note-id="1">Inbox</a> [[7]]</p>"##
        );
    }

    #[test]
    fn test_config_markdown_options() {
        let config = Config::from_toml("[markdown]\nheading_ids = true\ntables = false\n").unwrap();
        let pipeline = NotePipeline::new(&config);
        assert!(pipeline.options().heading_ids);
        assert!(!pipeline.options().tables);
        assert_eq!(
            pipeline.render("## Next Steps", &[]),
            r#"<h2 id="next-steps">Next Steps</h2>"#
        );
    }

    #[test]
    fn test_backlinks() {
        let notes = notes();
        let index = NotePipeline::default().backlinks(&notes);
        assert_eq!(index.backlinks(NoteId(7)), &[NoteId(1)]);
        assert_eq!(index.backlinks(NoteId(1)), &[NoteId(7)]);
        assert_eq!(index.unresolved(NoteId(1)), &["Later".to_owned()]);
    }

    #[test]
    fn test_backlinks_agree_with_rendered_links() {
        let notes = vec![
            Note::new(3, "A", ""),
            Note::new(4, "a<b", ""),
            Note::new(5, "_draft_", ""),
            Note::new(
                6,
                "Source",
                "<div>\n[[A]]\n</div>\n\n| Ref | X |\n|---|---|\n| [[a<b|less]] | [[_draft_]] |\n\n`[[A]]` [[Missing]]",
            ),
        ];

        for tables in [true, false] {
            let config = Config::from_toml(&format!("[markdown]\ntables = {tables}\n")).unwrap();
            let pipeline = NotePipeline::new(&config);
            let html = pipeline.render(&notes[3].content, &notes);
            let rendered: Vec<NoteId> = elements(&html).iter().filter_map(link_target).collect();
            assert_eq!(rendered, [NoteId(3), NoteId(4), NoteId(5)], "{html}");

            let index = pipeline.backlinks(&notes);
            assert_eq!(index.outgoing(NoteId(6)), rendered.as_slice());
            assert_eq!(index.unresolved(NoteId(6)), &["Missing".to_owned()]);
        }
    }

    #[test]
    fn test_aliased_reference_in_table() {
        let notes = vec![Note::new(3, "A", "")];
        let content = "| Ref | X |\n|---|---|\n| [[A|see]] | x |";
        let html = NotePipeline::default().render(content, &notes);
        assert!(
            html.contains(r##"<td><a class="note-link" href="#note-3" data-note-id="3">see</a></td>"##),
            "{html}"
        );
    }
}
