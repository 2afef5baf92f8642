// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Suite nesting reconstruction
//!
//! Hosts report suites and tests as a flat stream of events, and sibling
//! suites may interleave. Writing each line as it arrives would break the
//! nesting TeamCity expects, so the tracker buffers every suite's lines in a
//! record and only writes a tree once its root suite has finished.
//!
//! Records live in an append-only arena. Children are referenced by
//! [`RecordId`], and the title index only points at records that are still
//! open.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::{debug, trace};

use crate::clock::{Clock, SystemClock, elapsed_ms};
use crate::error::ReporterError;
use crate::host::{Suite, effective_parent};
use crate::message::fill_duration;
use crate::sink::Sink;

/// Index of a record in the tracker's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordId(usize);

/// Buffered output of one suite
#[derive(Debug, Clone)]
pub struct SuiteRecord {
    title: String,
    begin_line: String,
    started_at: DateTime<Utc>,
    end_line: Option<String>,
    test_lines: Vec<String>,
    children: Vec<RecordId>,
}

impl SuiteRecord {
    /// Fully-qualified title the record was opened under
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Line written before anything else in the suite's block
    #[must_use]
    pub fn begin_line(&self) -> &str {
        &self.begin_line
    }

    /// Moment the suite started
    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Closing line, once the suite has finished
    #[must_use]
    pub fn end_line(&self) -> Option<&str> {
        self.end_line.as_deref()
    }

    /// Test lines in arrival order
    #[must_use]
    pub fn test_lines(&self) -> &[String] {
        &self.test_lines
    }

    /// Child suites in the order they started
    #[must_use]
    pub fn children(&self) -> &[RecordId] {
        &self.children
    }
}

/// An open record and how many times its title has been entered
#[derive(Debug, Clone, Copy)]
struct OpenRecord {
    id: RecordId,
    depth: usize,
}

/// Result of ending a suite
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuiteEnd {
    /// The suite had no title and was never tracked
    Untracked,
    /// An enclosing node with the same title is still open
    Reentered,
    /// The suite finished inside a parent suite
    Nested(RecordId),
    /// A root suite finished; its tree is ready to flush
    Root(RecordId),
}

/// Registry of suite records for a single run
#[derive(Debug)]
pub struct SuiteTracker<C: Clock = SystemClock> {
    records: Vec<SuiteRecord>,
    open: HashMap<String, OpenRecord>,
    clock: C,
}

impl SuiteTracker<SystemClock> {
    /// Create a tracker timed by the wall clock
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for SuiteTracker<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> SuiteTracker<C> {
    /// Create a tracker timed by `clock`
    #[must_use]
    pub fn with_clock(clock: C) -> Self {
        Self {
            records: Vec::new(),
            open: HashMap::new(),
            clock,
        }
    }

    /// The tracker's time source
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Start buffering a suite
    ///
    /// Suites with an empty composed title are ignored. Beginning a title that
    /// is already open re-enters the open record: this is a framework wrapper
    /// node sharing its child's title, and both map onto one block.
    ///
    /// # Errors
    ///
    /// Returns `ReporterError::UnknownSuite` if the suite's effective parent
    /// was never started.
    pub fn begin_suite<S: Suite>(
        &mut self,
        suite: &S,
        begin_line: String,
    ) -> Result<Option<RecordId>, ReporterError> {
        let title = suite.full_title();
        if title.is_empty() {
            trace!("Ignoring untitled suite start");
            return Ok(None);
        }

        if let Some(open) = self.open.get_mut(&title) {
            open.depth += 1;
            debug!(suite = %title, depth = open.depth, "Re-entered open suite");
            return Ok(Some(open.id));
        }

        let parent = match effective_parent(suite) {
            Some(parent) => Some(self.open_record(&parent.full_title())?),
            None => None,
        };

        let id = RecordId(self.records.len());
        self.records.push(SuiteRecord {
            title: title.clone(),
            begin_line,
            started_at: self.clock.now(),
            end_line: None,
            test_lines: Vec::new(),
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            self.records[parent.0].children.push(id);
        }
        debug!(suite = %title, root = parent.is_none(), "Suite started");
        self.open.insert(title, OpenRecord { id, depth: 1 });

        Ok(Some(id))
    }

    /// Buffer a test line under the suite that owns the test
    ///
    /// # Errors
    ///
    /// Returns `ReporterError::UnknownSuite` if the suite is not open.
    pub fn log_test<S: Suite>(&mut self, suite: &S, line: String) -> Result<(), ReporterError> {
        let title = suite.full_title();
        if title.is_empty() {
            trace!("Ignoring test line for untitled suite");
            return Ok(());
        }
        let id = self.open_record(&title)?;
        self.records[id.0].test_lines.push(line);
        Ok(())
    }

    /// Finish a suite, filling the measured duration into `end_template`
    ///
    /// # Errors
    ///
    /// Returns `ReporterError::UnknownSuite` if the suite is not open.
    pub fn end_suite<S: Suite>(
        &mut self,
        suite: &S,
        end_template: &str,
    ) -> Result<SuiteEnd, ReporterError> {
        let title = suite.full_title();
        if title.is_empty() {
            trace!("Ignoring untitled suite end");
            return Ok(SuiteEnd::Untracked);
        }

        let open = self
            .open
            .get_mut(&title)
            .ok_or_else(|| ReporterError::UnknownSuite {
                title: title.clone(),
            })?;
        if open.depth > 1 {
            open.depth -= 1;
            return Ok(SuiteEnd::Reentered);
        }
        let id = open.id;
        self.open.remove(&title);

        let record = &mut self.records[id.0];
        let duration = elapsed_ms(record.started_at, self.clock.now());
        record.end_line = Some(fill_duration(end_template, duration));
        debug!(suite = %title, duration_ms = duration, "Suite finished");

        if effective_parent(suite).is_some() {
            Ok(SuiteEnd::Nested(id))
        } else {
            Ok(SuiteEnd::Root(id))
        }
    }

    /// Write a finished record and all of its descendants, depth first
    ///
    /// Order: begin line, test lines, each child's block, end line.
    ///
    /// # Errors
    ///
    /// Returns `ReporterError::UnfinishedSuite` if any record in the tree has
    /// not ended, or `ReporterError::Io` if the sink fails.
    pub fn flush<K: Sink>(&self, id: RecordId, sink: &mut K) -> Result<(), ReporterError> {
        let record = &self.records[id.0];
        let end_line = record
            .end_line
            .as_deref()
            .ok_or_else(|| ReporterError::UnfinishedSuite {
                title: record.title.clone(),
            })?;

        sink.emit(&record.begin_line)?;
        for line in &record.test_lines {
            sink.emit(line)?;
        }
        for child in &record.children {
            self.flush(*child, sink)?;
        }
        sink.emit(end_line)?;
        Ok(())
    }

    /// Look up a record
    #[must_use]
    pub fn record(&self, id: RecordId) -> &SuiteRecord {
        &self.records[id.0]
    }

    /// Number of records created during the run
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no suite has been tracked yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Titles of suites that started but have not finished
    #[must_use]
    pub fn open_titles(&self) -> Vec<&str> {
        let mut open: Vec<_> = self.open.iter().collect();
        open.sort_by_key(|(_, record)| record.id.0);
        open.into_iter().map(|(title, _)| title.as_str()).collect()
    }

    fn open_record(&self, title: &str) -> Result<RecordId, ReporterError> {
        self.open
            .get(title)
            .map(|open| open.id)
            .ok_or_else(|| ReporterError::UnknownSuite {
                title: title.to_string(),
            })
    }
}
