//! Completion Performance Benchmarks
//!
//! This module benchmarks the completion pipeline:
//! - Whole-file parsing and analysis
//! - First-pass completion at a call argument
//! - Qualifier expansion on a repeated request
//! - The type checker inspection

use caret_completion::{CompletionContributor, SharedDocument};
use caret_inspect::{run_inspection, TypeCheckerInspection};
use caret_parser::parse_file;
use caret_semantics::SemanticModel;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

const CARET: &str = "/*caret*/";

/// Generate a class with `count` fields and methods and a caret in the last method
fn generate_class(count: usize) -> String {
    let mut source = String::from("class Generated {\n");
    for i in 0..count {
        source.push_str(&format!(
            r#"    List items{i};
    String label{i};
    int value{i}() {{ return items{i}.size() + label{i}.length(); }}
    void take{i}(int n, String s) {{ take{i}(value{i}(), label{i}); }}

"#
        ));
    }
    source.push_str(&format!("    void run() {{\n        take0({});\n    }}\n}}\n", CARET));
    source
}

fn caret_offset(source: &str) -> usize {
    source.find(CARET).unwrap_or(0) + CARET.len()
}

// ============================================================================
// Analysis Benchmarks
// ============================================================================

fn bench_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("analysis");

    for count in [10, 50, 200] {
        let source = generate_class(count);
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::new("parse_and_build", count), &source, |b, source| {
            b.iter(|| {
                let parsed = parse_file(black_box(source));
                black_box(SemanticModel::build(parsed.tree))
            })
        });
    }

    group.finish();
}

// ============================================================================
// Completion Benchmarks
// ============================================================================

fn bench_completion(c: &mut Criterion) {
    let mut group = c.benchmark_group("completion");
    let contributor = CompletionContributor::default();

    for count in [10, 50, 200] {
        let source = generate_class(count);
        let offset = caret_offset(&source);
        let document = SharedDocument::new(&source);

        group.bench_with_input(BenchmarkId::new("first_pass", count), &offset, |b, &offset| {
            b.iter(|| black_box(contributor.complete(&document, offset, 1)))
        });
        group.bench_with_input(BenchmarkId::new("with_expansion", count), &offset, |b, &offset| {
            b.iter(|| black_box(contributor.complete(&document, offset, 2)))
        });
    }

    group.finish();
}

// ============================================================================
// Inspection Benchmarks
// ============================================================================

fn bench_type_checker(c: &mut Criterion) {
    let mut group = c.benchmark_group("type_checker");

    for count in [10, 50, 200] {
        let source = generate_class(count);
        let model = SemanticModel::build(parse_file(&source).tree);
        group.bench_with_input(BenchmarkId::new("check", count), &model, |b, model| {
            b.iter(|| black_box(run_inspection(&TypeCheckerInspection, "Generated.java", model)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_analysis, bench_completion, bench_type_checker);
criterion_main!(benches);
