use std::hint::black_box;
use std::path::Path;

use criterion::{criterion_group, criterion_main, Criterion};
use tpt_core::DisconnectParser;

const REQUESTS: &[(&str, Option<&str>)] = &[
    ("https://ad-trackera-1.example/ads.js", None),
    ("https://cdn.static.ad-trackerb.example/pixel.gif", None),
    ("https://a.b.c.d.e.f.unlisted.example/", None),
    ("http://10.0.0.1/", None),
    ("https://ad-trackera-1.example/ads.js", Some("https://www.ad-trackera-site.example/")),
    ("https://unlisted.example/app.js", Some("https://news.example/")),
];

fn load_parser() -> DisconnectParser {
    let testdata = Path::new(env!("CARGO_MANIFEST_DIR")).join("testdata");
    DisconnectParser::builder()
        .blocklist_path(testdata.join("test-blocklist.json"))
        .entitylist_path(testdata.join("test-entitylist.json"))
        .remap_table_path(testdata.join("test-mapping.json"))
        .build()
        .expect("test lists load")
}

fn bench_should_block(c: &mut Criterion) {
    let parser = load_parser();

    c.bench_function("should_block_with_match", |b| {
        b.iter(|| {
            for (url, top_url) in REQUESTS {
                black_box(parser.should_block_with_match(black_box(url), *top_url));
            }
        })
    });

    c.bench_function("get_domains_with_category", |b| {
        b.iter(|| black_box(parser.get_domains_with_category(["Advertising", "Analytics"]).map(|d| d.len())))
    });
}

criterion_group!(benches, bench_should_block);
criterion_main!(benches);
