// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Integration tests for teamcity-libtest
//!
//! These tests convert recorded libtest and nextest output and check the
//! resulting service messages.

use std::io::Cursor;
use std::path::Path;

use proptest::prelude::*;
use similar_asserts::assert_eq;
use teamcity_core::WriterSink;
use teamcity_core::clock::ManualClock;
use teamcity_libtest::prelude::*;
use teamcity_libtest::{convert_reader, convert_str};

/// Get the fixtures directory for test data
fn fixtures_dir() -> std::path::PathBuf {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set");
    Path::new(&manifest_dir).join("tests/fixtures")
}

fn read_fixture(name: &str) -> String {
    std::fs::read_to_string(fixtures_dir().join(name))
        .unwrap_or_else(|e| panic!("Failed to read fixture {name}: {e}"))
}

/// Convert with a stopped clock so suite durations are deterministic
fn convert_lines(input: &str, options: ConverterOptions) -> (ConversionSummary, Vec<String>) {
    let mut converter = StreamingConverter::with_clock(Vec::new(), options, ManualClock::default());
    for line in input.lines() {
        converter.process_line(line).expect("line converts");
    }
    converter.finish().expect("finish")
}

fn convert_fixture(name: &str, options: ConverterOptions) -> (ConversionSummary, Vec<String>) {
    convert_lines(&read_fixture(name), options)
}

#[test]
fn test_cargo_test_run_nests_modules() {
    let (summary, lines) = convert_fixture("cargo-test-run.jsonl", ConverterOptions::default());

    assert_eq!(summary.binaries, 1);
    assert_eq!(summary.passed, 3);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.ignored, 1);
    assert!(!summary.all_passed());

    let failed = "##teamcity[testFailed name='rejects_garbage' \
                  message='assertion `left == right` failed' captureStandardOutput='true' \
                  details='|nthread |'parser::tests::rejects_garbage|' panicked at src/parser.rs:88:9:\
                  |nassertion `left == right` failed|n  left: Ok(1)|n right: Err(..)\
                  |nnote: run with `RUST_BACKTRACE=1` environment variable to display a backtrace|n']";

    assert_eq!(
        lines,
        vec![
            "##teamcity[testSuiteStarted name='top-level']",
            "##teamcity[testStarted name='version_is_set' captureStandardOutput='true']",
            "##teamcity[testFinished name='version_is_set' duration='0']",
            "##teamcity[testSuiteFinished name='top-level' duration='0']",
            "##teamcity[testSuiteStarted name='parser']",
            "##teamcity[testSuiteStarted name='expr']",
            "##teamcity[testSuiteStarted name='tests']",
            "##teamcity[testStarted name='parses_sum' captureStandardOutput='true']",
            "##teamcity[testFinished name='parses_sum' duration='3']",
            "##teamcity[testSuiteFinished name='tests' duration='0']",
            "##teamcity[testSuiteFinished name='expr' duration='0']",
            "##teamcity[testSuiteStarted name='tests']",
            "##teamcity[testStarted name='rejects_garbage' captureStandardOutput='true']",
            "##teamcity[testStarted name='slow_fuzz' captureStandardOutput='true']",
            "##teamcity[testIgnored name='slow_fuzz' message='pending']",
            "##teamcity[testFinished name='slow_fuzz' duration='0']",
            failed,
            "##teamcity[testFinished name='rejects_garbage' duration='2']",
            "##teamcity[testSuiteFinished name='tests' duration='0']",
            "##teamcity[testSuiteFinished name='parser' duration='0']",
            "##teamcity[testSuiteStarted name='lexer']",
            "##teamcity[testSuiteStarted name='tests']",
            "##teamcity[testStarted name='reads_idents' captureStandardOutput='true']",
            "##teamcity[testFinished name='reads_idents' duration='1']",
            "##teamcity[testSuiteFinished name='tests' duration='0']",
            "##teamcity[testSuiteFinished name='lexer' duration='0']",
            "##teamcity[testSuiteFinished name='cargo.test' duration='12']",
        ]
    );
}

#[test]
fn test_nextest_run_reports_binaries_as_suites() {
    let (summary, lines) = convert_fixture("nextest-run.jsonl", ConverterOptions::default());

    assert_eq!(summary.binaries, 2);
    assert_eq!(summary.total(), 3);
    assert_eq!(
        lines,
        vec![
            "##teamcity[testSuiteStarted name='calc::calc']",
            "##teamcity[testSuiteStarted name='ops']",
            "##teamcity[testSuiteStarted name='tests']",
            "##teamcity[testStarted name='adds' captureStandardOutput='true']",
            "##teamcity[testFinished name='adds' duration='4']",
            "##teamcity[testStarted name='divides' captureStandardOutput='true']",
            "##teamcity[testFinished name='divides' duration='6']",
            "##teamcity[testSuiteFinished name='tests' duration='0']",
            "##teamcity[testSuiteFinished name='ops' duration='0']",
            "##teamcity[testSuiteFinished name='calc::calc' duration='0']",
            "##teamcity[testSuiteStarted name='calc::cli']",
            "##teamcity[testStarted name='runs_binary' captureStandardOutput='true']",
            "##teamcity[testFinished name='runs_binary' duration='20']",
            "##teamcity[testSuiteFinished name='calc::cli' duration='0']",
            "##teamcity[testSuiteFinished name='cargo.test' duration='30']",
        ]
    );
}

#[test]
fn test_nextest_run_with_stripped_binary_ids() {
    let options = ConverterOptions {
        strip_binary_id: true,
        ..Default::default()
    };
    let (_, lines) = convert_fixture("nextest-run.jsonl", options);

    assert_eq!(lines[0], "##teamcity[testSuiteStarted name='ops']");
    assert!(lines.contains(&"##teamcity[testSuiteStarted name='top-level']".to_string()));
    assert!(!lines.iter().any(|l| l.contains("calc::")));
}

const LIB_CLI_TEST: [&str; 2] = [
    r#"{"type":"test","event":"started","name":"calc$cli::parses_args"}"#,
    r#"{"type":"test","event":"ok","name":"calc$cli::parses_args","exec_time":0.001}"#,
];

const CLI_BINARY_TEST: [&str; 2] = [
    r#"{"type":"test","event":"started","name":"calc::cli$runs_binary"}"#,
    r#"{"type":"test","event":"ok","name":"calc::cli$runs_binary","exec_time":0.002}"#,
];

const BINARY_STARTED: &str = r#"{"type":"suite","event":"started"}"#;
const BINARY_OK: &str = r#"{"type":"suite","event":"ok"}"#;

fn lib_cli_block() -> Vec<&'static str> {
    vec![
        "##teamcity[testSuiteStarted name='calc']",
        "##teamcity[testSuiteStarted name='cli']",
        "##teamcity[testStarted name='parses_args' captureStandardOutput='true']",
        "##teamcity[testFinished name='parses_args' duration='1']",
        "##teamcity[testSuiteFinished name='cli' duration='0']",
        "##teamcity[testSuiteFinished name='calc' duration='0']",
    ]
}

fn cli_binary_block() -> Vec<&'static str> {
    vec![
        "##teamcity[testSuiteStarted name='calc::cli']",
        "##teamcity[testStarted name='runs_binary' captureStandardOutput='true']",
        "##teamcity[testFinished name='runs_binary' duration='2']",
        "##teamcity[testSuiteFinished name='calc::cli' duration='0']",
    ]
}

#[test]
fn test_binary_id_does_not_merge_with_module_path() {
    let input = [
        vec![BINARY_STARTED],
        LIB_CLI_TEST.to_vec(),
        vec![BINARY_OK, BINARY_STARTED],
        CLI_BINARY_TEST.to_vec(),
        vec![BINARY_OK],
    ]
    .concat()
    .join("\n");
    let (summary, lines) = convert_lines(&input, ConverterOptions::default());
    assert_eq!(summary.binaries, 2);

    let mut expected = lib_cli_block();
    expected.extend(cli_binary_block());
    expected.push("##teamcity[testSuiteFinished name='cargo.test' duration='0']");
    assert_eq!(lines, expected);
}

#[test]
fn test_concurrent_binary_id_does_not_merge_with_module_path() {
    let input = [
        vec![BINARY_STARTED, BINARY_STARTED],
        vec![LIB_CLI_TEST[0], CLI_BINARY_TEST[0]],
        vec![LIB_CLI_TEST[1], CLI_BINARY_TEST[1]],
        vec![BINARY_OK, BINARY_OK],
    ]
    .concat()
    .join("\n");
    let (summary, lines) = convert_lines(&input, ConverterOptions::default());
    assert_eq!(summary.passed, 2);

    // both binaries close together; the later root is flushed first
    let mut expected = cli_binary_block();
    expected.extend(lib_cli_block());
    expected.push("##teamcity[testSuiteFinished name='cargo.test' duration='0']");
    assert_eq!(lines, expected);
}

#[test]
fn test_repeated_module_names_across_binaries() {
    let input = r#"{"type":"suite","event":"started","test_count":1}
{"type":"test","event":"started","name":"tests::one"}
{"type":"test","event":"ok","name":"tests::one"}
{"type":"suite","event":"ok","passed":1,"failed":0,"ignored":0}
{"type":"suite","event":"started","test_count":1}
{"type":"test","event":"started","name":"tests::two"}
{"type":"test","event":"ok","name":"tests::two"}
{"type":"suite","event":"ok","passed":1,"failed":0,"ignored":0}"#;

    let (summary, lines) = convert_str(input, Vec::new(), ConverterOptions::default())
        .expect("conversion succeeds");
    assert_eq!(summary.binaries, 2);
    let begins = lines
        .iter()
        .filter(|l| l.as_str() == "##teamcity[testSuiteStarted name='tests']")
        .count();
    assert_eq!(begins, 2, "each binary gets its own block");
    assert_eq!(lines.len(), 9);
}

#[test]
fn test_custom_run_suite_name() {
    let mut options = ConverterOptions::default();
    options.reporter.run_suite_name = "nightly".to_string();
    let (_, lines) = convert_str("", Vec::new(), options).expect("empty input converts");
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("##teamcity[testSuiteFinished name='nightly' duration='"));
}

#[test]
fn test_convert_reader_writes_lines() {
    let input = Cursor::new(read_fixture("nextest-run.jsonl"));
    let (summary, sink) = convert_reader(input, WriterSink::new(Vec::new()), ConverterOptions::default())
        .expect("conversion succeeds");
    assert!(summary.all_passed());

    let written = String::from_utf8(sink.into_inner()).expect("utf-8 output");
    assert_eq!(written.lines().count(), 15);
    assert!(written.ends_with("duration='30']\n"));
}

#[test]
fn test_invalid_line_reports_line_number() {
    let input = "{\"type\":\"suite\",\"event\":\"started\"}\n\nrunning 2 tests\n";
    let err = convert_str(input, Vec::new(), ConverterOptions::default()).unwrap_err();
    assert!(matches!(err, LibtestError::JsonParse { line: 3, .. }));
    assert!(err.to_string().starts_with("JSON parse error on line 3"));
}

#[test]
fn test_lenient_mode_skips_cargo_noise() {
    let input = format!("running 5 tests\n{}\ntest result: FAILED\n", read_fixture("cargo-test-run.jsonl"));
    let options = ConverterOptions {
        lenient: true,
        ..Default::default()
    };
    let (summary, _) = convert_str(&input, Vec::new(), options).expect("lenient conversion");
    assert_eq!(summary.skipped_lines, 2);
    assert_eq!(summary.total(), 5);
}

fn test_name() -> impl Strategy<Value = String> {
    (
        prop::option::of("[a-z]{1,4}::[a-z]{1,4}"),
        prop::collection::vec("[a-z]{1,3}", 0..4),
        "[a-z_]{1,6}",
    )
        .prop_map(|(binary, modules, name)| {
            let mut path = modules;
            path.push(name);
            match binary {
                Some(binary) => format!("{binary}${}", path.join("::")),
                None => path.join("::"),
            }
        })
}

proptest! {
    #[test]
    fn prop_begin_and_end_lines_balance(names in prop::collection::vec(test_name(), 0..12)) {
        let mut input = String::from("{\"type\":\"suite\",\"event\":\"started\"}\n");
        for (i, name) in names.iter().enumerate() {
            input.push_str(&format!("{{\"type\":\"test\",\"event\":\"started\",\"name\":\"{name}\"}}\n"));
            let status = ["ok", "failed", "ignored"][i % 3];
            input.push_str(&format!("{{\"type\":\"test\",\"event\":\"{status}\",\"name\":\"{name}\"}}\n"));
        }
        input.push_str("{\"type\":\"suite\",\"event\":\"ok\"}\n");

        let (summary, lines) = convert_str(&input, Vec::new(), ConverterOptions::default()).unwrap();
        let begins = lines.iter().filter(|l| l.starts_with("##teamcity[testSuiteStarted")).count();
        // the run suite line closes a suite that is never opened
        let ends = lines.iter().filter(|l| l.starts_with("##teamcity[testSuiteFinished")).count();
        prop_assert_eq!(begins + 1, ends);
        prop_assert_eq!(summary.total(), names.len());
    }
}
