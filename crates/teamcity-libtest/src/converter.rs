// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Streaming conversion of libtest JSON into TeamCity service messages
//!
//! libtest only reports tests, and tests from different modules interleave
//! because they run in parallel. The converter rebuilds the module hierarchy
//! from test names, starts module suites the first time a test inside them
//! shows up, and ends them when the test binary's run finishes. The
//! [`TeamcityReporter`] takes care of writing everything properly nested.
//!
//! # Example
//!
//! ```
//! use teamcity_libtest::{ConverterOptions, StreamingConverter};
//!
//! let mut converter = StreamingConverter::new(Vec::new(), ConverterOptions::default());
//! converter.process_line(r#"{"type":"suite","event":"started","test_count":1}"#).unwrap();
//! converter.process_line(r#"{"type":"test","event":"started","name":"math::adds"}"#).unwrap();
//! converter.process_line(r#"{"type":"test","event":"ok","name":"math::adds","exec_time":0.002}"#).unwrap();
//! converter.process_line(r#"{"type":"suite","event":"ok","passed":1,"failed":0,"ignored":0,"exec_time":0.002}"#).unwrap();
//! let (summary, lines) = converter.finish().unwrap();
//!
//! assert_eq!(summary.passed, 1);
//! assert_eq!(lines.first().map(String::as_str), Some("##teamcity[testSuiteStarted name='math']"));
//! ```

use std::collections::HashMap;
use std::io::BufRead;

use serde::{Deserialize, Serialize};
use teamcity_core::clock::{Clock, SystemClock};
use teamcity_core::host::{Failure, SuiteId, SuiteTree, TestId};
use teamcity_core::reporter::{ReporterOptions, RunStats, TeamcityReporter};
use teamcity_core::sink::Sink;
use tracing::{debug, info, warn};

use crate::error::LibtestError;
use crate::event::{
    LibtestEvent, SuiteEvent, SuiteStatus, TestEvent, TestOutcome, TestPath, TestStatus,
    panic_message, seconds_to_ms,
};

/// Suite holding tests that are not inside any module
pub const DEFAULT_TOP_LEVEL_SUITE: &str = "top-level";

/// Separator used to compose full suite titles for tracking
///
/// nextest binary IDs contain `::` themselves (`calc::cli`), so joining with
/// `::` would let a binary suite collide with a module path in another
/// binary. The unit separator never appears in a binary ID or module name.
const TITLE_SEPARATOR: &str = "\u{1f}";

/// Converter settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterOptions {
    /// Reporter settings, including the name of the outer run suite
    pub reporter: ReporterOptions,
    /// Suite for tests declared at the root of a test binary
    pub top_level_suite: String,
    /// Drop the nextest binary ID instead of reporting it as a suite
    pub strip_binary_id: bool,
    /// Skip lines that are not libtest JSON instead of failing
    pub lenient: bool,
}

impl Default for ConverterOptions {
    fn default() -> Self {
        Self {
            reporter: ReporterOptions::default(),
            top_level_suite: DEFAULT_TOP_LEVEL_SUITE.to_string(),
            strip_binary_id: false,
            lenient: false,
        }
    }
}

/// Totals over a converted run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionSummary {
    /// Test binaries whose run finished
    pub binaries: usize,
    /// Tests passed
    pub passed: usize,
    /// Tests failed
    pub failed: usize,
    /// Tests ignored
    pub ignored: usize,
    /// Input lines skipped in lenient mode
    pub skipped_lines: usize,
}

impl ConversionSummary {
    /// Check if all tests passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Total completed tests
    #[must_use]
    pub fn total(&self) -> usize {
        self.passed + self.failed + self.ignored
    }

    fn record(&mut self, outcome: TestOutcome) {
        match outcome {
            TestOutcome::Passed => self.passed += 1,
            TestOutcome::Failed => self.failed += 1,
            TestOutcome::Ignored => self.ignored += 1,
        }
    }
}

/// Suites and tests opened while test binaries are running
#[derive(Debug, Default)]
struct Scope {
    /// Nesting depth of `suite started` events
    depth: usize,
    suites: HashMap<Vec<String>, SuiteId>,
    opened: Vec<SuiteId>,
    running: HashMap<String, TestId>,
}

/// Converts libtest JSON lines into nested TeamCity service messages
pub struct StreamingConverter<K: Sink, C: Clock = SystemClock> {
    tree: SuiteTree,
    reporter: TeamcityReporter<K, C>,
    options: ConverterOptions,
    scope: Scope,
    summary: ConversionSummary,
    reported_ms: Option<u64>,
    line_number: usize,
}

impl<K: Sink> StreamingConverter<K, SystemClock> {
    /// Create a converter writing to `sink`
    #[must_use]
    pub fn new(sink: K, options: ConverterOptions) -> Self {
        Self::with_clock(sink, options, SystemClock)
    }
}

impl<K: Sink, C: Clock> StreamingConverter<K, C> {
    /// Create a converter timed by `clock`
    #[must_use]
    pub fn with_clock(sink: K, options: ConverterOptions, clock: C) -> Self {
        let reporter = TeamcityReporter::with_clock(sink, options.reporter.clone(), clock);
        Self {
            tree: SuiteTree::with_separator(TITLE_SEPARATOR),
            reporter,
            options,
            scope: Scope::default(),
            summary: ConversionSummary::default(),
            reported_ms: None,
            line_number: 0,
        }
    }

    /// Process a single line of output
    ///
    /// Returns the outcome when the line completed a test.
    ///
    /// # Errors
    ///
    /// Returns `LibtestError::JsonParse` if the line is invalid JSON (unless
    /// lenient), or `LibtestError::Reporter` if writing a suite fails.
    pub fn process_line(&mut self, line: &str) -> Result<Option<TestOutcome>, LibtestError> {
        self.line_number += 1;
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let event: LibtestEvent = match serde_json::from_str(line) {
            Ok(event) => event,
            Err(source) if self.options.lenient => {
                warn!(line = self.line_number, error = %source, "Skipping non-libtest line");
                self.summary.skipped_lines += 1;
                return Ok(None);
            }
            Err(source) => {
                return Err(LibtestError::JsonParse {
                    line: self.line_number,
                    source,
                });
            }
        };

        match event {
            LibtestEvent::Suite(suite) => {
                self.suite_event(suite)?;
                Ok(None)
            }
            LibtestEvent::Test(test) => self.test_event(test),
            LibtestEvent::Other => {
                debug!(line = self.line_number, "Ignoring non-test event");
                Ok(None)
            }
        }
    }

    /// Totals so far
    #[must_use]
    pub fn summary(&self) -> ConversionSummary {
        self.summary
    }

    /// Close anything still open, end the run and return the sink
    ///
    /// # Errors
    ///
    /// Returns `LibtestError::Reporter` if writing fails.
    pub fn finish(mut self) -> Result<(ConversionSummary, K), LibtestError> {
        if self.scope.depth > 0 || !self.scope.opened.is_empty() {
            warn!(
                open_suites = self.scope.opened.len(),
                "Input ended while a test binary was still running"
            );
            self.close_scope()?;
        }
        self.reporter.run_finished(RunStats {
            duration_ms: self.reported_ms,
        })?;
        info!(
            binaries = self.summary.binaries,
            passed = self.summary.passed,
            failed = self.summary.failed,
            ignored = self.summary.ignored,
            "Converted test run"
        );
        Ok((self.summary, self.reporter.into_sink()))
    }

    fn suite_event(&mut self, suite: SuiteEvent) -> Result<(), LibtestError> {
        match suite.event {
            SuiteStatus::Started => {
                self.scope.depth += 1;
                debug!(test_count = ?suite.test_count, "Test binary started");
            }
            SuiteStatus::Ok | SuiteStatus::Failed => {
                if let Some(exec_time) = suite.exec_time {
                    let total = self.reported_ms.get_or_insert(0);
                    *total = total.saturating_add(seconds_to_ms(exec_time));
                }
                self.summary.binaries += 1;
                self.scope.depth = self.scope.depth.saturating_sub(1);
                if self.scope.depth == 0 {
                    self.close_scope()?;
                }
            }
        }
        Ok(())
    }

    fn test_event(&mut self, test: TestEvent) -> Result<Option<TestOutcome>, LibtestError> {
        let outcome = match test.event {
            TestStatus::Started => {
                let id = self.register_test(&test.name)?;
                self.reporter.test_started(&self.tree.test(id))?;
                return Ok(None);
            }
            TestStatus::Timeout => {
                warn!(test = %test.name, "Test has been running for over 60 seconds");
                return Ok(None);
            }
            TestStatus::Unknown => {
                debug!(test = %test.name, "Ignoring unknown test event");
                return Ok(None);
            }
            TestStatus::Ok => TestOutcome::Passed,
            TestStatus::Failed => TestOutcome::Failed,
            TestStatus::Ignored => TestOutcome::Ignored,
        };

        let id = match self.scope.running.remove(&test.name) {
            Some(id) => id,
            None => {
                let id = self.register_test(&test.name)?;
                self.scope.running.remove(&test.name);
                id
            }
        };
        self.tree
            .set_duration(id, test.exec_time.map(seconds_to_ms).unwrap_or(0));

        let handle = self.tree.test(id);
        match outcome {
            TestOutcome::Failed => {
                let details = test.stdout.or(test.message);
                let failure = Failure {
                    message: details.as_deref().and_then(panic_message),
                    stack: details,
                };
                self.reporter.test_failed(&handle, &failure)?;
            }
            TestOutcome::Ignored => self.reporter.test_pending(&handle)?,
            TestOutcome::Passed => {}
        }
        self.reporter.test_finished(&handle)?;

        self.summary.record(outcome);
        debug!(test = %test.name, ?outcome, "Test finished");
        Ok(Some(outcome))
    }

    /// Create the test and any suites above it that are not open yet
    fn register_test(&mut self, full_name: &str) -> Result<TestId, LibtestError> {
        let path = TestPath::parse(full_name);
        let mut titles: Vec<String> = Vec::new();
        if let Some(binary_id) = path.binary_id.filter(|_| !self.options.strip_binary_id) {
            titles.push(binary_id.to_string());
        }
        titles.extend(path.modules.iter().map(|m| m.to_string()));
        if titles.is_empty() {
            titles.push(self.options.top_level_suite.clone());
        }

        let suite = self.ensure_suite(&titles)?;
        let id = self.tree.add_test(suite, path.name);
        self.scope.running.insert(full_name.to_string(), id);
        Ok(id)
    }

    fn ensure_suite(&mut self, titles: &[String]) -> Result<SuiteId, LibtestError> {
        let mut parent = self.tree.root();
        for depth in 1..=titles.len() {
            let key = &titles[..depth];
            parent = match self.scope.suites.get(key) {
                Some(id) => *id,
                None => {
                    let id = self.tree.add_suite(parent, titles[depth - 1].clone());
                    self.reporter.suite_started(&self.tree.suite(id))?;
                    self.scope.suites.insert(key.to_vec(), id);
                    self.scope.opened.push(id);
                    id
                }
            };
        }
        Ok(parent)
    }

    /// End every suite opened since the last binary finished, innermost first
    fn close_scope(&mut self) -> Result<(), LibtestError> {
        if !self.scope.running.is_empty() {
            warn!(
                unfinished = self.scope.running.len(),
                "Test binary finished with tests still running"
            );
        }
        let scope = std::mem::take(&mut self.scope);
        for id in scope.opened.iter().rev() {
            self.reporter.suite_finished(&self.tree.suite(*id))?;
        }
        Ok(())
    }
}

/// Convert a complete libtest JSON document held in memory
///
/// # Errors
///
/// Returns the first error raised by [`StreamingConverter::process_line`] or
/// [`StreamingConverter::finish`].
pub fn convert_str<K: Sink>(
    output: &str,
    sink: K,
    options: ConverterOptions,
) -> Result<(ConversionSummary, K), LibtestError> {
    let mut converter = StreamingConverter::new(sink, options);
    for line in output.lines() {
        converter.process_line(line)?;
    }
    converter.finish()
}

/// Convert libtest JSON read line by line from `reader`
///
/// Service messages reach the sink as soon as each root suite finishes.
///
/// # Errors
///
/// Returns `LibtestError::Io` if reading fails, or the first conversion error.
pub fn convert_reader<R: BufRead, K: Sink>(
    reader: R,
    sink: K,
    options: ConverterOptions,
) -> Result<(ConversionSummary, K), LibtestError> {
    let mut converter = StreamingConverter::new(sink, options);
    for line in reader.lines() {
        converter.process_line(&line?)?;
    }
    converter.finish()
}
