// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Lifecycle event handling
//!
//! [`TeamcityReporter`] turns host lifecycle notifications into service
//! message lines and hands them to the [`SuiteTracker`], which decides when
//! they reach the sink.
//!
//! # Example
//!
//! ```
//! use teamcity_core::host::SuiteTree;
//! use teamcity_core::reporter::{RunStats, TeamcityReporter};
//!
//! let mut tree = SuiteTree::new();
//! let suite = tree.add_suite(tree.root(), "math");
//! let test = tree.add_test(suite, "adds");
//! tree.set_duration(test, 1);
//!
//! let mut reporter = TeamcityReporter::new(Vec::new());
//! reporter.suite_started(&tree.suite(suite)).unwrap();
//! reporter.test_started(&tree.test(test)).unwrap();
//! reporter.test_finished(&tree.test(test)).unwrap();
//! reporter.suite_finished(&tree.suite(suite)).unwrap();
//! reporter.run_finished(RunStats::default()).unwrap();
//!
//! let lines = reporter.into_sink();
//! assert_eq!(lines[0], "##teamcity[testSuiteStarted name='math']");
//! assert_eq!(lines.len(), 5);
//! ```

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::clock::{Clock, SystemClock, elapsed_ms};
use crate::error::ReporterError;
use crate::host::{Failure, Suite, Test};
use crate::message;
use crate::sink::Sink;
use crate::tracker::{SuiteEnd, SuiteTracker};

/// Name of the outer suite closed when the whole run ends
pub const DEFAULT_RUN_SUITE_NAME: &str = "cargo.test";

/// Reporter settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReporterOptions {
    /// Name of the synthetic suite wrapping the whole run
    pub run_suite_name: String,
}

impl Default for ReporterOptions {
    fn default() -> Self {
        Self {
            run_suite_name: DEFAULT_RUN_SUITE_NAME.to_string(),
        }
    }
}

/// Totals supplied by the host when the run completes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Total run duration as measured by the host; measured locally if absent
    pub duration_ms: Option<u64>,
}

/// A lifecycle notification from the host framework
#[derive(Debug)]
pub enum RunnerEvent<'e, S, T> {
    /// A suite started
    SuiteStarted(&'e S),
    /// A test started
    TestStarted(&'e T),
    /// A test failed
    TestFailed(&'e T, &'e Failure),
    /// A test was skipped
    TestPending(&'e T),
    /// A test completed, whatever its outcome
    TestFinished(&'e T),
    /// A suite finished
    SuiteFinished(&'e S),
    /// The whole run finished
    RunFinished(RunStats),
}

/// Formats lifecycle events as nested TeamCity service messages
#[derive(Debug)]
pub struct TeamcityReporter<K: Sink, C: Clock = SystemClock> {
    tracker: SuiteTracker<C>,
    sink: K,
    options: ReporterOptions,
    run_started_at: DateTime<Utc>,
}

impl<K: Sink> TeamcityReporter<K, SystemClock> {
    /// Create a reporter with default options writing to `sink`
    #[must_use]
    pub fn new(sink: K) -> Self {
        Self::with_options(sink, ReporterOptions::default())
    }

    /// Create a reporter with `options` writing to `sink`
    #[must_use]
    pub fn with_options(sink: K, options: ReporterOptions) -> Self {
        Self::with_clock(sink, options, SystemClock)
    }
}

impl<K: Sink, C: Clock> TeamcityReporter<K, C> {
    /// Create a reporter timed by `clock`
    #[must_use]
    pub fn with_clock(sink: K, options: ReporterOptions, clock: C) -> Self {
        let run_started_at = clock.now();
        Self {
            tracker: SuiteTracker::with_clock(clock),
            sink,
            options,
            run_started_at,
        }
    }

    /// Dispatch one lifecycle event
    ///
    /// # Errors
    ///
    /// Propagates the error of the matching handler.
    pub fn handle<S, T>(&mut self, event: RunnerEvent<'_, S, T>) -> Result<(), ReporterError>
    where
        S: Suite,
        T: Test,
    {
        match event {
            RunnerEvent::SuiteStarted(suite) => self.suite_started(suite),
            RunnerEvent::TestStarted(test) => self.test_started(test),
            RunnerEvent::TestFailed(test, failure) => self.test_failed(test, failure),
            RunnerEvent::TestPending(test) => self.test_pending(test),
            RunnerEvent::TestFinished(test) => self.test_finished(test),
            RunnerEvent::SuiteFinished(suite) => self.suite_finished(suite),
            RunnerEvent::RunFinished(stats) => self.run_finished(stats),
        }
    }

    /// Handle a suite start; the framework's implicit root is skipped
    ///
    /// # Errors
    ///
    /// Returns `ReporterError::UnknownSuite` if the enclosing suite was never
    /// started.
    pub fn suite_started<S: Suite>(&mut self, suite: &S) -> Result<(), ReporterError> {
        if suite.is_root() {
            return Ok(());
        }
        self.tracker
            .begin_suite(suite, message::suite_started(suite.title()))?;
        Ok(())
    }

    /// Handle a test start
    ///
    /// # Errors
    ///
    /// Returns `ReporterError::UnknownSuite` if the test's suite is not open.
    pub fn test_started<T: Test>(&mut self, test: &T) -> Result<(), ReporterError> {
        self.tracker
            .log_test(&test.parent(), message::test_started(test.title()))
    }

    /// Handle a test failure
    ///
    /// # Errors
    ///
    /// Returns `ReporterError::UnknownSuite` if the test's suite is not open.
    pub fn test_failed<T: Test>(&mut self, test: &T, failure: &Failure) -> Result<(), ReporterError> {
        let line = message::test_failed(
            test.title(),
            failure.message.as_deref(),
            failure.stack.as_deref(),
        );
        self.tracker.log_test(&test.parent(), line)
    }

    /// Handle a skipped test
    ///
    /// # Errors
    ///
    /// Returns `ReporterError::UnknownSuite` if the test's suite is not open.
    pub fn test_pending<T: Test>(&mut self, test: &T) -> Result<(), ReporterError> {
        self.tracker
            .log_test(&test.parent(), message::test_ignored(test.title()))
    }

    /// Handle the completion of a test
    ///
    /// # Errors
    ///
    /// Returns `ReporterError::UnknownSuite` if the test's suite is not open.
    pub fn test_finished<T: Test>(&mut self, test: &T) -> Result<(), ReporterError> {
        let line = message::test_finished(test.title(), test.duration_ms().unwrap_or(0));
        self.tracker.log_test(&test.parent(), line)
    }

    /// Handle a suite end, flushing the buffered tree when a root finishes
    ///
    /// # Errors
    ///
    /// Returns `ReporterError::UnknownSuite` if the suite is not open,
    /// `ReporterError::UnfinishedSuite` if a child is still open at flush time,
    /// or `ReporterError::Io` if writing fails.
    pub fn suite_finished<S: Suite>(&mut self, suite: &S) -> Result<(), ReporterError> {
        if suite.is_root() {
            return Ok(());
        }
        let template = message::suite_finished_template(suite.title());
        if let SuiteEnd::Root(id) = self.tracker.end_suite(suite, &template)? {
            debug!(suite = %self.tracker.record(id).title(), "Flushing suite tree");
            self.tracker.flush(id, &mut self.sink)?;
        }
        Ok(())
    }

    /// Close the synthetic outer suite of the run
    ///
    /// # Errors
    ///
    /// Returns `ReporterError::Io` if writing fails.
    pub fn run_finished(&mut self, stats: RunStats) -> Result<(), ReporterError> {
        let duration = stats
            .duration_ms
            .unwrap_or_else(|| elapsed_ms(self.run_started_at, self.tracker.clock().now()));
        let line = message::suite_finished(&self.options.run_suite_name, duration);
        self.sink.emit(&line)?;
        Ok(())
    }

    /// Suite tracker state
    #[must_use]
    pub fn tracker(&self) -> &SuiteTracker<C> {
        &self.tracker
    }

    /// Reporter settings
    #[must_use]
    pub fn options(&self) -> &ReporterOptions {
        &self.options
    }

    /// Borrow the sink
    #[must_use]
    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Consume the reporter and return its sink
    pub fn into_sink(self) -> K {
        self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::host::SuiteTree;
    use similar_asserts::assert_eq;

    #[test]
    fn test_implicit_root_is_not_reported() {
        let tree = SuiteTree::new();
        let mut reporter = TeamcityReporter::new(Vec::new());
        let root = tree.suite(tree.root());

        reporter.suite_started(&root).unwrap();
        reporter.suite_finished(&root).unwrap();
        assert!(reporter.tracker().is_empty());
        assert!(reporter.sink().is_empty());
    }

    #[test]
    fn test_run_finished_uses_host_duration() {
        let options = ReporterOptions {
            run_suite_name: "mocha.suite".to_string(),
        };
        let mut reporter = TeamcityReporter::with_options(Vec::new(), options);
        reporter
            .run_finished(RunStats {
                duration_ms: Some(1234),
            })
            .unwrap();
        assert_eq!(
            reporter.into_sink(),
            vec!["##teamcity[testSuiteFinished name='mocha.suite' duration='1234']"]
        );
    }

    #[test]
    fn test_handle_dispatches_events() {
        let mut tree = SuiteTree::new();
        let a = tree.add_suite(tree.root(), "A");
        let t = tree.add_test(a, "t");
        let failure = Failure::new("boom", "at line 1");

        let mut reporter =
            TeamcityReporter::with_clock(Vec::new(), ReporterOptions::default(), ManualClock::default());
        let suite = tree.suite(a);
        let test = tree.test(t);
        let events = [
            RunnerEvent::SuiteStarted(&suite),
            RunnerEvent::TestStarted(&test),
            RunnerEvent::TestFailed(&test, &failure),
            RunnerEvent::TestFinished(&test),
            RunnerEvent::SuiteFinished(&suite),
        ];
        for event in events {
            reporter.handle(event).unwrap();
        }

        assert_eq!(
            reporter.into_sink(),
            vec![
                "##teamcity[testSuiteStarted name='A']",
                "##teamcity[testStarted name='t' captureStandardOutput='true']",
                "##teamcity[testFailed name='t' message='boom' captureStandardOutput='true' details='at line 1']",
                "##teamcity[testFinished name='t' duration='0']",
                "##teamcity[testSuiteFinished name='A' duration='0']",
            ]
        );
    }
}
