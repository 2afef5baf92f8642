// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! teamcity-libtest: TeamCity reporting for libtest and cargo-nextest
//!
//! This library crate reads the JSON event stream written by libtest
//! (`--format json`) or cargo-nextest (`--message-format libtest-json`) and
//! writes nested TeamCity service messages through `teamcity-core`.
//!
//! # Example
//!
//! ```no_run
//! use teamcity_libtest::{ConverterOptions, convert_reader};
//! use teamcity_core::WriterSink;
//!
//! let stdin = std::io::stdin().lock();
//! let sink = WriterSink::new(std::io::stdout());
//! let (summary, _) = convert_reader(stdin, sink, ConverterOptions::default()).unwrap();
//! eprintln!("{} passed, {} failed", summary.passed, summary.failed);
//! ```

pub mod converter;
pub mod error;
pub mod event;

pub use converter::{
    ConversionSummary, ConverterOptions, DEFAULT_TOP_LEVEL_SUITE, StreamingConverter,
    convert_reader, convert_str,
};
pub use error::LibtestError;
pub use event::{LibtestEvent, SuiteEvent, TestEvent, TestOutcome, TestPath};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::converter::{ConversionSummary, ConverterOptions, StreamingConverter};
    pub use crate::error::LibtestError;
    pub use crate::event::TestOutcome;
}
