// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! libtest JSON event types
//!
//! Both `cargo test -- -Z unstable-options --format json --report-time` and
//! `cargo nextest run --message-format libtest-json` write one event per line:
//!
//! ```text
//! {"type":"suite","event":"started","test_count":2}
//! {"type":"test","event":"started","name":"net::tests::connects"}
//! {"type":"test","event":"ok","name":"net::tests::connects","exec_time":0.004}
//! {"type":"suite","event":"ok","passed":2,"failed":0,"ignored":0,"exec_time":0.006}
//! ```

use serde::{Deserialize, Serialize};

/// A single event from libtest JSON output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LibtestEvent {
    /// Suite started or finished
    Suite(SuiteEvent),
    /// Test started, passed, failed, ignored or timed out
    Test(TestEvent),
    /// Benchmarks and anything newer than this crate
    #[serde(other)]
    Other,
}

/// Suite-level event status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuiteStatus {
    /// A test binary started running
    Started,
    /// A test binary finished without failures
    Ok,
    /// A test binary finished with failures
    Failed,
}

/// Suite-level event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteEvent {
    /// Event status
    pub event: SuiteStatus,
    /// Number of tests (only in "started" event)
    pub test_count: Option<usize>,
    /// Number of passed tests (in final event)
    pub passed: Option<usize>,
    /// Number of failed tests (in final event)
    pub failed: Option<usize>,
    /// Number of ignored tests (in final event)
    pub ignored: Option<usize>,
    /// Execution time in seconds (in final event)
    pub exec_time: Option<f64>,
}

/// Test-level event status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    /// The test started
    Started,
    /// The test passed
    Ok,
    /// The test failed
    Failed,
    /// The test was ignored
    Ignored,
    /// The test has been running for a long time; it is still running
    Timeout,
    /// A status this crate does not know about
    #[serde(other)]
    Unknown,
}

/// Test-level event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestEvent {
    /// Event status
    pub event: TestStatus,
    /// Full test name, including the nextest binary ID when present
    pub name: String,
    /// Execution time in seconds (only in finished events)
    pub exec_time: Option<f64>,
    /// Captured output (only in failed events)
    pub stdout: Option<String>,
    /// Reason attached to an ignored or failed test
    pub message: Option<String>,
}

/// Outcome of a completed test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TestOutcome {
    /// Test passed
    Passed,
    /// Test failed
    Failed,
    /// Test was ignored/skipped
    Ignored,
}

/// Where a test sits in the suite hierarchy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestPath<'a> {
    /// nextest binary ID (`crate::binary`), if the name carried one
    pub binary_id: Option<&'a str>,
    /// Module path inside the test binary
    pub modules: Vec<&'a str>,
    /// Test function name
    pub name: &'a str,
}

impl<'a> TestPath<'a> {
    /// Split a libtest or nextest test name
    ///
    /// nextest names look like `binary-id$module::path::test`; plain libtest
    /// names are `module::path::test`.
    #[must_use]
    pub fn parse(full_name: &'a str) -> Self {
        let (binary_id, path) = match full_name.split_once('$') {
            Some((binary, path)) => (Some(binary), path),
            None => (None, full_name),
        };
        let mut modules: Vec<&str> = path.split("::").collect();
        let name = modules.pop().unwrap_or(path);
        Self {
            binary_id,
            modules,
            name,
        }
    }
}

/// Convert libtest seconds into whole milliseconds
#[must_use]
pub fn seconds_to_ms(seconds: f64) -> u64 {
    if seconds.is_finite() && seconds > 0.0 {
        (seconds * 1000.0).round() as u64
    } else {
        0
    }
}

/// Extract the panic message from a failed test's captured output
///
/// Handles both the current two-line form
///
/// ```text
/// thread 'tests::adds' panicked at src/lib.rs:10:5:
/// assertion failed: 1 + 1 == 3
/// ```
///
/// and the older `panicked at 'message', src/lib.rs:10:5` form. Falls back to
/// the first non-empty line.
#[must_use]
pub fn panic_message(stdout: &str) -> Option<String> {
    let mut lines = stdout.lines();
    while let Some(line) = lines.next() {
        let Some(idx) = line.find("panicked at ") else {
            continue;
        };
        let rest = &line[idx + "panicked at ".len()..];
        if let Some(quoted) = rest.strip_prefix('\'') {
            if let Some(end) = quoted.rfind("', ") {
                return Some(quoted[..end].to_string());
            }
        }
        if rest.ends_with(':') {
            if let Some(message) = lines.next().filter(|l| !l.trim().is_empty()) {
                return Some(message.to_string());
            }
        }
        return Some(line.trim().to_string());
    }
    stdout
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(str::to_string)
}
