// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! teamcity-core: nested TeamCity service messages from flat test events
//!
//! Test frameworks report suites and tests as a flat stream of lifecycle
//! events. TeamCity expects every suite's messages to appear as one nested
//! block. This crate buffers each suite's output and writes a suite tree only
//! once its root suite has finished, so sibling suites that interleave at run
//! time still come out properly nested.
//!
//! # Example
//!
//! ```
//! use teamcity_core::prelude::*;
//!
//! let mut tree = SuiteTree::new();
//! let outer = tree.add_suite(tree.root(), "parser");
//! let inner = tree.add_suite(outer, "literals");
//! let test = tree.add_test(inner, "parses strings");
//!
//! let mut reporter = TeamcityReporter::new(Vec::new());
//! reporter.suite_started(&tree.suite(outer)).unwrap();
//! reporter.suite_started(&tree.suite(inner)).unwrap();
//! reporter.test_started(&tree.test(test)).unwrap();
//! reporter.test_finished(&tree.test(test)).unwrap();
//! reporter.suite_finished(&tree.suite(inner)).unwrap();
//! // nothing is written until the root suite ends
//! assert!(reporter.sink().is_empty());
//! reporter.suite_finished(&tree.suite(outer)).unwrap();
//! assert_eq!(reporter.sink().len(), 6);
//! ```

pub mod clock;
pub mod error;
pub mod escape;
pub mod host;
pub mod message;
pub mod reporter;
pub mod sink;
pub mod tracker;

pub use error::ReporterError;
pub use escape::{escape, escape_opt};
pub use host::{Failure, Suite, SuiteTree, Test, effective_parent};
pub use reporter::{ReporterOptions, RunStats, RunnerEvent, TeamcityReporter};
pub use sink::{Sink, WriterSink};
pub use tracker::{RecordId, SuiteEnd, SuiteRecord, SuiteTracker};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::clock::{Clock, ManualClock, SystemClock};
    pub use crate::error::ReporterError;
    pub use crate::host::{Failure, Suite, SuiteTree, Test};
    pub use crate::reporter::{ReporterOptions, RunStats, RunnerEvent, TeamcityReporter};
    pub use crate::sink::{Sink, WriterSink};
}
