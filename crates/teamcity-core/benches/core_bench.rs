// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

use criterion::{Criterion, criterion_group, criterion_main};
use teamcity_core::escape::escape;
use teamcity_core::prelude::*;

fn escape_benchmark(c: &mut Criterion) {
    let stack = "thread 'parser::tests::nested' panicked at src/parser.rs:120:9:\n\
                 assertion `left == right` failed\n  left: [1, 2]\n right: [1, 3]\n\
                 \x1B[31mnote\x1B[0m: run with `RUST_BACKTRACE=1` for a backtrace"
        .repeat(20);

    c.bench_function("escape_stack_trace", |b| {
        b.iter(|| escape(std::hint::black_box(&stack)))
    });
}

fn flush_benchmark(c: &mut Criterion) {
    let mut tree = SuiteTree::new();
    let mut suites = Vec::new();
    let mut tests = Vec::new();
    for module in 0..20 {
        let outer = tree.add_suite(tree.root(), format!("module_{module}"));
        let inner = tree.add_suite(outer, "tests");
        for n in 0..25 {
            tests.push(tree.add_test(inner, format!("case_{n}")));
        }
        suites.push((outer, inner));
    }

    c.bench_function("report_500_tests", |b| {
        b.iter(|| {
            let mut reporter = TeamcityReporter::new(Vec::with_capacity(1200));
            for (outer, inner) in &suites {
                reporter.suite_started(&tree.suite(*outer)).unwrap();
                reporter.suite_started(&tree.suite(*inner)).unwrap();
            }
            for test in &tests {
                reporter.test_started(&tree.test(*test)).unwrap();
                reporter.test_finished(&tree.test(*test)).unwrap();
            }
            for (outer, inner) in &suites {
                reporter.suite_finished(&tree.suite(*inner)).unwrap();
                reporter.suite_finished(&tree.suite(*outer)).unwrap();
            }
            std::hint::black_box(reporter.into_sink().len())
        })
    });
}

criterion_group!(benches, escape_benchmark, flush_benchmark);
criterion_main!(benches);
