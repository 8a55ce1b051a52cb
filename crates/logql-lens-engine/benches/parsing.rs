use criterion::{Criterion, criterion_group, criterion_main};
use logql_lens_engine::{matchers_from_query, nodes_from_query, parser_from_query, query_filters};

const QUERY: &str = r#"sum by (level) (count_over_time({service_name="checkout", env=~"prod|staging"} |= "timeout" != "healthz" | logfmt | level="error" | duration > 2s [5m]))"#;

fn long_query(stages: usize) -> String {
    let mut query = String::from(r#"{service_name="checkout"}"#);
    for i in 0..stages {
        query.push_str(&format!(r#" |= "needle{i}" | json | field{i}="value{i}""#));
    }
    query
}

fn bench_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("extraction");
    group.sample_size(10);

    group.bench_function("walk_all_nodes", |b| {
        b.iter(|| {
            let nodes = nodes_from_query(std::hint::black_box(QUERY), None);
            std::hint::black_box(nodes);
        });
    });

    group.bench_function("matchers", |b| {
        b.iter(|| {
            let filters = matchers_from_query(std::hint::black_box(QUERY));
            std::hint::black_box(filters);
        });
    });

    group.bench_function("parser_stage", |b| {
        b.iter(|| {
            let parser = parser_from_query(std::hint::black_box(QUERY));
            std::hint::black_box(parser);
        });
    });

    group.finish();
}

fn bench_query_filters(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_filters");
    group.sample_size(10);

    let query = long_query(50);
    group.bench_function("fifty_stages", |b| {
        b.iter(|| {
            let filters = query_filters(std::hint::black_box(&query), None);
            std::hint::black_box(filters);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_extraction, bench_query_filters);
criterion_main!(benches);
