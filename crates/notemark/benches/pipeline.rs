//! Benchmarks for note rendering and reference resolution.

#![allow(clippy::format_push_string)] // Benchmark setup code, performance not critical

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use notemark::NotePipeline;
use notemark::backlinks::{BacklinkResolver, Note};
use notemark::renderer::render;

/// Generate a collection of notes titled `Note {i}`.
fn generate_notes(count: usize) -> Vec<Note> {
    (0..count)
        .map(|i| {
            let id = i64::try_from(i).unwrap_or(i64::MAX);
            Note::new(id, format!("Note {i}"), format!("# Note {i}\n\nBody of note {i}."))
        })
        .collect()
}

/// Generate markdown with `references` references spread over paragraphs.
fn generate_markdown(paragraphs: usize, references: usize) -> String {
    let mut md = String::with_capacity(paragraphs * 120 + references * 16);
    md.push_str("# Daily Notes\n\n");

    for i in 0..paragraphs {
        md.push_str(&format!("Paragraph {i} with **bold** and *italic* text"));
        for j in (i..references).step_by(paragraphs.max(1)) {
            md.push_str(&format!(", see [[Note {j}]]"));
        }
        md.push_str(".\n\n");
    }
    md.push_str("A [[Missing Note]] and `[[Note 0]]` in code.\n");
    md
}

fn bench_render_without_references(c: &mut Criterion) {
    let notes = generate_notes(100);
    let pipeline = NotePipeline::default();
    let markdown = generate_markdown(20, 0);

    c.bench_function("render_without_references", |b| {
        b.iter(|| pipeline.render(&markdown, &notes));
    });
}

fn bench_resolve_only(c: &mut Criterion) {
    let notes = generate_notes(100);
    let resolver = BacklinkResolver::new();
    let html = render(&generate_markdown(20, 50));

    c.bench_function("resolve_50_references", |b| {
        b.iter(|| resolver.resolve(&html, &notes));
    });
}

fn bench_render_varying_sizes(c: &mut Criterion) {
    let notes = generate_notes(1000);
    let pipeline = NotePipeline::default();

    let mut group = c.benchmark_group("render_by_size");

    for (paragraphs, references) in [(5, 5), (20, 50), (100, 500)] {
        let markdown = generate_markdown(paragraphs, references);

        let size = markdown.len();
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(
            BenchmarkId::new("markdown", format!("{paragraphs}p_{references}r")),
            &markdown,
            |b, md| b.iter(|| pipeline.render(md, &notes)),
        );
    }

    group.finish();
}

fn bench_backlink_index(c: &mut Criterion) {
    let mut notes = generate_notes(500);
    for (i, note) in notes.iter_mut().enumerate() {
        note.content = generate_markdown(3, i % 20);
    }
    let pipeline = NotePipeline::default();

    c.bench_function("backlink_index_500_notes", |b| {
        b.iter(|| pipeline.backlinks(&notes));
    });
}

criterion_group!(
    benches,
    bench_render_without_references,
    bench_resolve_only,
    bench_render_varying_sizes,
    bench_backlink_index
);
criterion_main!(benches);
