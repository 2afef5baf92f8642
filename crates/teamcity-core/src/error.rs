// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Error types for teamcity-core

use thiserror::Error;

/// Errors raised while tracking suites or writing service messages
///
/// Every variant except `Io` means the host delivered lifecycle events out of
/// the order the tracker relies on. They are surfaced instead of emitting
/// malformed protocol lines.
#[derive(Debug, Error)]
pub enum ReporterError {
    /// A test or suite-end event referenced a suite that never started
    #[error("Suite was never started: {title}")]
    UnknownSuite {
        /// Fully-qualified title of the suite
        title: String,
    },

    /// A suite was flushed while one of its children had not finished
    #[error("Suite finished before its child suite: {title}")]
    UnfinishedSuite {
        /// Fully-qualified title of the unfinished child
        title: String,
    },

    /// Error writing to the output sink
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
