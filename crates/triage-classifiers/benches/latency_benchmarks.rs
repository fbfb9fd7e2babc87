//! Latency benchmarks for complaint routing
//!
//! Measures the keyword rules on their own, the trained forest classifier,
//! and the full router decision protocol.
//!
//! Run with: cargo bench -p triage-classifiers

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;

use triage_classifiers::{
    Classifier, ComplaintRouter, CorpusBuilder, CorpusConfig, EngineConfig, ForestClassifier,
    ForestConfig, RuleTables,
};

const COMPLAINTS: &[(&str, &str)] = &[
    ("empty", ""),
    ("short_keyword", "tap leaking"),
    ("fire", "building on fire, people trapped inside"),
    ("street_light", "street light not working for 2 weeks"),
    (
        "long",
        "garbage has been piling up near the market for several days, the smell is \
         unbearable and stray dogs are spreading it across the road near the school",
    ),
];

fn trained_classifier() -> ForestClassifier {
    let corpus = CorpusBuilder::new(&CorpusConfig {
        samples_per_category: 60,
        seed: 42,
    })
    .build();
    let config = EngineConfig {
        forest: ForestConfig {
            n_trees: 50,
            ..Default::default()
        },
        ..Default::default()
    };
    ForestClassifier::train(&corpus, &config).expect("Failed to train classifier")
}

/// Rule tables only
fn benchmark_rules(c: &mut Criterion) {
    let rules = RuleTables::standard().expect("Failed to build rule tables");

    let mut group = c.benchmark_group("Rule_Tables");
    group.sample_size(100);

    for (name, text) in COMPLAINTS {
        group.bench_with_input(BenchmarkId::new("priority", name), text, |b, text| {
            b.iter(|| rules.match_priority(black_box(text)))
        });
        group.bench_with_input(BenchmarkId::new("department", name), text, |b, text| {
            b.iter(|| rules.match_department(black_box(text)))
        });
    }

    group.finish();
}

/// Vectorize and run the forest
fn benchmark_forest_classifier(c: &mut Criterion) {
    let classifier = trained_classifier();

    let mut group = c.benchmark_group("Forest_Classifier");
    group.sample_size(100);

    for (name, text) in COMPLAINTS {
        group.bench_with_input(BenchmarkId::new("classify", name), text, |b, text| {
            b.iter(|| classifier.classify(black_box(text)).unwrap())
        });
    }

    group.finish();
}

/// Full decision protocol, with and without a model
fn benchmark_router(c: &mut Criterion) {
    let rules_only = ComplaintRouter::new().expect("Failed to build router");
    let hybrid = ComplaintRouter::new()
        .expect("Failed to build router")
        .with_classifier(Arc::new(trained_classifier()));

    let mut group = c.benchmark_group("Router");
    group.sample_size(100);

    for (name, text) in COMPLAINTS {
        group.bench_with_input(BenchmarkId::new("rules_only", name), text, |b, text| {
            b.iter(|| rules_only.predict(black_box(text)))
        });
        group.bench_with_input(BenchmarkId::new("hybrid", name), text, |b, text| {
            b.iter(|| hybrid.predict(black_box(text)))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_rules,
    benchmark_forest_classifier,
    benchmark_router
);
criterion_main!(benches);
