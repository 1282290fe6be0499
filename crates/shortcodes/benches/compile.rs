//! Benchmarks for shortcode compilation.

#![allow(clippy::format_push_string)] // Benchmark setup code, performance not critical

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use shortcodes::{
    Attributes, Compiler, HandlerError, Shortcode, StaticRegistry, TagMatcher, parse_attributes,
};

struct Link;

impl Shortcode for Link {
    type Attrs = Attributes;

    fn name(&self) -> &str {
        "link"
    }

    fn output(&self, attrs: Option<Attributes>, body: Option<&str>) -> Result<String, HandlerError> {
        let attrs = attrs.unwrap_or_default();
        let href = attrs.get("href").unwrap_or("#");
        Ok(format!(r#"<a href="{href}">{}</a>"#, body.unwrap_or(href)))
    }
}

/// Generate a document with `tags` shortcodes spread between paragraphs.
fn generate_document(tags: usize) -> String {
    let mut doc = String::with_capacity(tags * 120);
    for i in 0..tags {
        doc.push_str(&format!(
            "Paragraph {i} with plain text, [brackets] and a \
             [link href=\"https://example.com/{i}\" title='Page {i}']link {i}[/link]. \
             Escaped: [[link]].\n\n"
        ));
    }
    doc
}

fn bench_compile(c: &mut Criterion) {
    let compiler = Compiler::new(StaticRegistry::new().with(Link));
    let mut group = c.benchmark_group("compile");

    for tags in [10, 100, 1000] {
        let doc = generate_document(tags);
        group.throughput(Throughput::Bytes(doc.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(tags), &doc, |b, doc| {
            b.iter(|| compiler.compile(black_box(doc)));
        });
    }

    group.finish();
}

fn bench_scan(c: &mut Criterion) {
    let doc = generate_document(1000);

    c.bench_function("scan_tags", |b| {
        b.iter(|| TagMatcher::new(black_box(&doc)).count());
    });
}

fn bench_parse_attributes(c: &mut Criterion) {
    let raw = r#" 123 url=http://wordpress.com/ foo bar="baz" 'quoted value' html="<b>x</b>""#;

    c.bench_function("parse_attributes", |b| {
        b.iter(|| parse_attributes(black_box(raw)));
    });
}

criterion_group!(benches, bench_compile, bench_scan, bench_parse_attributes);
criterion_main!(benches);
