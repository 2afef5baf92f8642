// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! teamcity-report: nested TeamCity service messages for cargo test runs
//!
//! Reads libtest JSON (from `cargo test` or `cargo nextest`) and writes
//! TeamCity service messages with modules reported as nested suites.

use std::process::ExitCode;

use clap::Parser;
use teamcity_report::config::Config;
use tracing::error;

fn main() -> ExitCode {
    let config = Config::parse();

    // Service messages own stdout; logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(config.log_level().into()),
        )
        .init();

    match teamcity_report::run(&config) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
