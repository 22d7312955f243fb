// Parse and dispatch benchmarks against the built-in registry.

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use serde_json::json;
use tagrule::{Registry, Validation, parse_tag};

const TAG: &str = "Required; AlphaDash; MinLen(3); MaxLen(32); Match(^[a-z][a-z0-9_-]*$)";

fn bench_parse(c: &mut Criterion) {
    let registry = Registry::shared();

    let mut group = c.benchmark_group("parse");
    group.bench_function("single_rule", |b| {
        b.iter(|| parse_tag(&registry, black_box("Required")));
    });
    group.bench_function("five_rules", |b| {
        b.iter(|| parse_tag(&registry, black_box(TAG)));
    });
    group.finish();
}

fn bench_check(c: &mut Criterion) {
    let registry = Registry::shared();
    let rules = parse_tag(&registry, TAG).unwrap();
    let value = json!("some_user-name");

    let mut group = c.benchmark_group("dispatch");
    group.bench_function("preparsed", |b| {
        let mut ctx = Validation::new(registry.clone());
        b.iter(|| {
            for rule in &rules {
                let _ = black_box(registry.dispatch(rule, &mut ctx, black_box(&value)));
            }
        });
    });
    group.bench_function("parse_and_dispatch", |b| {
        b.iter(|| {
            let mut ctx = Validation::new(registry.clone());
            ctx.check(black_box(&value), black_box(TAG))
        });
    });
    group.finish();
}

criterion_group!(benches, bench_parse, bench_check);
criterion_main!(benches);
