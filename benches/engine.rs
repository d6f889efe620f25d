use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use jmespath::{runtime, RuntimeOptions, Value};

fn bench_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    let exprs = [
        ("field", "a.b.c"),
        ("projection", "people[*].name"),
        ("filter", "people[?age > `30`].name"),
        (
            "multi_select",
            "{name: people[0].name, count: length(people)}",
        ),
    ];
    for (label, expr) in exprs {
        group.bench_with_input(BenchmarkId::from_parameter(label), expr, |b, expr| {
            b.iter(|| jmespath::parse(black_box(expr)))
        });
    }
    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let rt = runtime(RuntimeOptions::default());
    let data: Value = serde_json::json!({
        "people": (0..100).map(|i| serde_json::json!({"name": format!("person{i}"), "age": i})).collect::<Vec<_>>()
    })
    .into();

    let mut group = c.benchmark_group("search");
    group.bench_function("filter_and_project", |b| {
        b.iter(|| rt.search(black_box("people[?age > `50`].name"), black_box(&data)))
    });
    group.bench_function("sort_by", |b| {
        b.iter(|| rt.search(black_box("sort_by(people, &age)[0]"), black_box(&data)))
    });
    group.bench_function("cached_compile", |b| {
        b.iter(|| rt.search(black_box("people[0].name"), black_box(&data)))
    });
    group.finish();
}

criterion_group!(benches, bench_parsing, bench_search);
criterion_main!(benches);
