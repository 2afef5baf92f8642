// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! teamcity-report library
//!
//! This module exports the command's configuration and run loop for use in
//! integration tests and as a library.

pub mod config;

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};

use anyhow::{Context, Result};
use teamcity_core::WriterSink;
use teamcity_libtest::{ConversionSummary, convert_reader};
use tracing::{debug, info};

use crate::config::Config;

/// Convert the configured input and write service messages to the output
///
/// # Errors
///
/// Returns an error if the configuration is invalid, a file cannot be opened,
/// or the input is not a valid libtest event stream.
pub fn run(config: &Config) -> Result<ConversionSummary> {
    config.validate()?;

    let reader: Box<dyn BufRead> = match &config.input {
        Some(path) => {
            debug!(input = %path.display(), "Reading test output from file");
            let file = File::open(path)
                .with_context(|| format!("Failed to open input {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => {
            debug!("Reading test output from stdin");
            Box::new(io::stdin().lock())
        }
    };

    let writer: Box<dyn Write> = match &config.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output {}", path.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(io::stdout().lock()),
    };

    let (summary, sink) = convert_reader(reader, WriterSink::new(writer), config.converter_options())
        .context("Failed to convert test output")?;
    sink.into_inner()
        .flush()
        .context("Failed to flush service messages")?;

    if let Some(path) = &config.summary_file {
        let json = serde_json::to_string_pretty(&summary)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write summary {}", path.display()))?;
    }

    info!(
        total = summary.total(),
        passed = summary.passed,
        failed = summary.failed,
        ignored = summary.ignored,
        "Reported test run to TeamCity"
    );
    Ok(summary)
}
