//! Benchmarks for conversion throughput.
//!
//! Run with: cargo bench
//!
//! Inputs are generated in memory so no fixture files are needed.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use topdf::{CapabilityRegistry, Converter};

/// Lines of filler prose.
fn create_text(lines: usize) -> String {
    (0..lines)
        .map(|i| format!("Line {} of the benchmark document, long enough to wrap once the page fills up with text.\n", i))
        .collect()
}

/// A CSV table with a header and `rows` data rows.
fn create_csv(rows: usize) -> String {
    let mut csv = String::from("id,name,city,amount,note\n");
    for i in 0..rows {
        csv.push_str(&format!("{},Customer {},Istanbul,{}.50,a note that gets truncated\n", i, i, i * 3));
    }
    csv
}

/// An HTML page with `sections` headed sections.
fn create_html(sections: usize) -> String {
    let mut html = String::from("<html><head><title>Benchmark</title></head><body>");
    for i in 0..sections {
        html.push_str(&format!(
            "<h2>Section {}</h2><p>Paragraph with <b>inline</b> markup and   extra   spaces.</p>",
            i
        ));
    }
    html.push_str("</body></html>");
    html
}

fn converter() -> Converter {
    Converter::new().with_capabilities(CapabilityRegistry::all_available())
}

/// Benchmark MIME/extension classification.
fn bench_classify(c: &mut Criterion) {
    let converter = converter();
    c.bench_function("classify_mime", |b| {
        b.iter(|| converter.classify(black_box("text/csv; charset=utf-8"), black_box("a.bin")));
    });
    c.bench_function("classify_extension", |b| {
        b.iter(|| converter.classify(black_box(""), black_box("Report.DOCX")));
    });
}

/// Benchmark text conversion at various sizes.
fn bench_text(c: &mut Criterion) {
    let converter = converter();
    let mut group = c.benchmark_group("text");

    for lines in [10, 100, 1000].iter() {
        let data = create_text(*lines);
        group.bench_function(format!("{}_lines", lines), |b| {
            b.iter(|| {
                converter
                    .convert_bytes(black_box(data.as_bytes()), "text/plain", "a.txt")
                    .unwrap()
            });
        });
    }

    group.finish();
}

/// Benchmark CSV table rendering.
fn bench_csv(c: &mut Criterion) {
    let converter = converter();
    let mut group = c.benchmark_group("csv");

    for rows in [10, 500].iter() {
        let data = create_csv(*rows);
        group.bench_function(format!("{}_rows", rows), |b| {
            b.iter(|| {
                converter
                    .convert_bytes(black_box(data.as_bytes()), "text/csv", "a.csv")
                    .unwrap()
            });
        });
    }

    group.finish();
}

/// Benchmark HTML flattening.
fn bench_html(c: &mut Criterion) {
    let converter = converter();
    let data = create_html(200);
    c.bench_function("html_200_sections", |b| {
        b.iter(|| {
            converter
                .convert_bytes(black_box(data.as_bytes()), "text/html", "a.html")
                .unwrap()
        });
    });
}

/// Benchmark the encoding sanitizer alone.
fn bench_sanitize(c: &mut Criterion) {
    let text = "Çalışma günü: naïve café, ₺ 100 – “quoted” ✓ ".repeat(50);
    c.bench_function("sanitize_mixed", |b| {
        b.iter(|| topdf::sanitize(black_box(&text)));
    });
}

criterion_group!(
    benches,
    bench_classify,
    bench_text,
    bench_csv,
    bench_html,
    bench_sanitize,
);
criterion_main!(benches);
