use criterion::{Criterion, criterion_group, criterion_main};
use ownwiki_engine::{annotate, sanitize};

fn marker_dense_line(repeats: usize) -> String {
    "**bold** then *italic* then _under_ then `code` and [a link](Target) "
        .repeat(repeats)
}

fn wrapped_document(paragraphs: usize) -> String {
    let mut doc = String::new();
    for i in 0..paragraphs {
        doc.push_str(&format!("# Section {i}\n\n"));
        doc.push_str("a paragraph\nthat wraps\nacross lines\n\n");
        doc.push_str("* a list item\nwith a wrapped tail\n* another item\n\n");
    }
    doc
}

fn bench_annotate(c: &mut Criterion) {
    let mut group = c.benchmark_group("annotate");
    group.sample_size(50);

    let line = marker_dense_line(20);
    group.bench_function("marker_dense_line", |b| {
        b.iter(|| {
            let styled = annotate(std::hint::black_box(&line));
            std::hint::black_box(styled);
        });
    });

    group.finish();
}

fn bench_sanitize(c: &mut Criterion) {
    let mut group = c.benchmark_group("sanitize");
    group.sample_size(50);

    let doc = wrapped_document(50);
    group.bench_function("wrapped_document", |b| {
        b.iter(|| {
            let lines = sanitize(std::hint::black_box(&doc));
            std::hint::black_box(lines);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_annotate, bench_sanitize);
criterion_main!(benches);
