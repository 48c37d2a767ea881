use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mimizuku::prelude::*;

fn class(i: usize) -> ClassExpression {
    ClassExpression::named(format!("http://example.org/Class{i}"))
}

/// A subclass chain with one typed individual per class and an
/// existential edge between neighbours.
fn chain_ontology(size: usize, universal: bool) -> Ontology {
    let r = PropertyExpression::object("http://example.org/related");
    let mut ontology = Ontology::new();
    for i in 0..size {
        if i > 0 {
            ontology.add_axiom(Axiom::SubClassOf(class(i), class(i - 1)));
            let filler = if universal {
                ClassExpression::all(r.clone(), class(i - 1))
            } else {
                ClassExpression::some(r.clone(), class(i - 1))
            };
            ontology.add_axiom(Axiom::SubClassOf(class(i), filler));
        }
        ontology.add_axiom(Axiom::ClassAssertion(class(i), Name::new(format!("http://example.org/ind{i}"))));
    }
    ontology
}

fn bench_consistency(c: &mut Criterion) {
    let mut group = c.benchmark_group("consistency");
    for size in [10, 50, 200] {
        let ontology = chain_ontology(size, true);
        group.bench_with_input(BenchmarkId::from_parameter(size), &ontology, |b, ontology| {
            b.iter(|| {
                let mut kb = KnowledgeBase::from_ontology(ontology.clone(), ReasonerConfig::default());
                black_box(kb.is_consistent().unwrap())
            })
        });
    }
    group.finish();
}

fn bench_classification(c: &mut Criterion) {
    let mut group = c.benchmark_group("classification");
    for size in [10, 50, 100] {
        for (label, universal) in [("el", false), ("tableau", true)] {
            let ontology = chain_ontology(size, universal);
            group.bench_with_input(BenchmarkId::new(label, size), &ontology, |b, ontology| {
                b.iter(|| {
                    let mut kb = KnowledgeBase::from_ontology(ontology.clone(), ReasonerConfig::default());
                    black_box(kb.classify().unwrap().node_count())
                })
            });
        }
    }
    group.finish();
}

fn bench_realization(c: &mut Criterion) {
    let ontology = chain_ontology(50, true);
    c.bench_function("realization_50", |b| {
        b.iter(|| {
            let mut kb = KnowledgeBase::from_ontology(ontology.clone(), ReasonerConfig::default());
            black_box(kb.realize().unwrap().len())
        })
    });
}

fn bench_incremental(c: &mut Criterion) {
    let ontology = chain_ontology(50, true);
    let mut group = c.benchmark_group("abox_addition");
    for (label, incremental) in [("incremental", true), ("rebuild", false)] {
        group.bench_function(label, |b| {
            b.iter(|| {
                let config = ReasonerConfig {
                    use_incremental_consistency: incremental,
                    ..ReasonerConfig::default()
                };
                let mut kb = KnowledgeBase::from_ontology(ontology.clone(), config);
                kb.is_consistent().unwrap();
                kb.add_axiom(Axiom::ClassAssertion(class(49), Name::new("http://example.org/extra")));
                black_box(kb.is_consistent().unwrap())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_consistency, bench_classification, bench_realization, bench_incremental);
criterion_main!(benches);
