//! Benchmarks for the document rules and directory analysis
//!
//! ```bash
//! cargo bench
//! cargo bench rule_engine
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use markdown_guardian::{AnalysisOptions, Analyzer, RuleEngine};
use std::fs;
use tempfile::TempDir;

/// A document with frontmatter and `sections` repetitions of prose, lists and fences
fn synthetic_document(sections: usize) -> String {
    let mut content = String::from("---\ntitle: Benchmark\n---\n\n");
    for i in 0..sections {
        content.push_str(&format!("## Section {i}\n\nSome prose for section {i}.\n"));
        content.push_str("- first\n- second\n1. third\n\n");
        content.push_str("```\nlet x = 1;\n```\nTrailing text without a gap.\n\n");
    }
    content
}

fn bench_rule_engine(c: &mut Criterion) {
    let engine = RuleEngine::with_defaults();
    let mut group = c.benchmark_group("rule_engine");

    for sections in [10usize, 100, 1000] {
        let content = synthetic_document(sections);
        group.throughput(Throughput::Bytes(content.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(sections), &content, |b, content| {
            b.iter(|| engine.check("bench.md", black_box(content)))
        });
    }

    group.finish();
}

fn bench_directory_analysis(c: &mut Criterion) {
    let temp_dir = TempDir::new().unwrap();
    for i in 0..200 {
        fs::write(temp_dir.path().join(format!("doc{i}.md")), synthetic_document(20)).unwrap();
    }

    let analyzer = Analyzer::with_defaults().unwrap();
    let mut group = c.benchmark_group("directory_analysis");
    group.throughput(Throughput::Elements(200));

    for parallel in [false, true] {
        let options = AnalysisOptions { parallel, ..Default::default() };
        let label = if parallel { "parallel" } else { "sequential" };
        group.bench_with_input(BenchmarkId::from_parameter(label), &options, |b, options| {
            b.iter(|| analyzer.analyze_directory(temp_dir.path(), options).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_rule_engine, bench_directory_analysis);
criterion_main!(benches);
