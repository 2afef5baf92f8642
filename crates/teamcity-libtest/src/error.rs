// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Error types for teamcity-libtest

use thiserror::Error;

/// Errors that can occur while converting libtest output
#[derive(Debug, Error)]
pub enum LibtestError {
    /// A line of input was not a libtest JSON event
    #[error("JSON parse error on line {line}: {source}")]
    JsonParse {
        /// 1-based input line number
        line: usize,
        /// Underlying parse error
        source: serde_json::Error,
    },

    /// Error reading the input stream
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The event stream violated the reporter's ordering contract
    #[error("Reporter error: {0}")]
    Reporter(#[from] teamcity_core::ReporterError),
}
