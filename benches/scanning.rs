//! Benchmarks for grammar compilation and document scanning.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use seams::{Grammar, Limits};

fn prose_text(size: usize) -> String {
    let sentences = [
        "The quick brown fox jumps over the lazy dog. ",
        "Pack my box with five dozen liquor jugs. ",
        "How vexingly quick daft zebras jump! ",
        "The five boxing wizards jump quickly. ",
        "Sphinx of black quartz, judge my vow. ",
    ];
    let mut text = String::with_capacity(size);
    let mut i = 0;
    while text.len() < size {
        text.push_str(sentences[i % sentences.len()]);
        i += 1;
    }
    text.truncate(size);
    text
}

fn markdown_text(size: usize) -> String {
    let blocks = [
        "# Section heading\n\n",
        "- first item\n- second item\n  - nested item\n\n",
        "> a quoted remark.\n\n",
        "```rust\nlet x = 1;\n```\n\n",
        "| a | b |\n|---|---|\n| 1 | 2 |\n\n",
        "A short paragraph of plain prose ending here.\n\n",
    ];
    let mut text = String::with_capacity(size);
    let mut i = 0;
    while text.len() < size {
        text.push_str(blocks[i % blocks.len()]);
        i += 1;
    }
    text.truncate(size);
    text
}

fn bench_compile(c: &mut Criterion) {
    c.bench_function("compile_default_grammar", |b| {
        b.iter(|| Grammar::compile(black_box(&Limits::default())).unwrap())
    });
}

fn bench_scan_prose(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan_prose");
    let grammar = Grammar::compile(&Limits::default()).unwrap();

    for size in [1_000, 10_000, 100_000] {
        let text = prose_text(size);

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("prose", size), &text, |b, text| {
            b.iter(|| grammar.scan(black_box(text)))
        });
    }

    group.finish();
}

fn bench_scan_markdown(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan_markdown");
    let grammar = Grammar::compile(&Limits::default()).unwrap();

    for size in [1_000, 10_000, 100_000] {
        let text = markdown_text(size);

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("markdown", size), &text, |b, text| {
            b.iter(|| grammar.scan(black_box(text)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_compile, bench_scan_prose, bench_scan_markdown);
criterion_main!(benches);
