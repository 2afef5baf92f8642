// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Configuration for the teamcity-report command
//!
//! This module provides the command line interface, including input and
//! output paths, suite naming and logging options.

use std::path::PathBuf;

use clap::Parser;
use teamcity_core::reporter::{DEFAULT_RUN_SUITE_NAME, ReporterOptions};
use teamcity_libtest::{ConverterOptions, DEFAULT_TOP_LEVEL_SUITE};

/// Convert libtest JSON test output into nested TeamCity service messages
///
/// Example:
///   cargo test -- -Z unstable-options --format json --report-time | teamcity-report
#[derive(Parser, Debug, Clone)]
#[command(name = "teamcity-report")]
#[command(version, about, long_about = None)]
pub struct Config {
    /// File holding libtest JSON output
    ///
    /// Reads from stdin when omitted.
    pub input: Option<PathBuf>,

    /// File to write service messages to
    ///
    /// Writes to stdout when omitted.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Also write the run totals as JSON to this file
    #[arg(long)]
    pub summary_file: Option<PathBuf>,

    /// Name of the suite closed at the end of the run
    #[arg(long, env = "TEAMCITY_RUN_SUITE_NAME", default_value = DEFAULT_RUN_SUITE_NAME)]
    pub run_suite_name: String,

    /// Suite for tests declared outside any module
    #[arg(long, default_value = DEFAULT_TOP_LEVEL_SUITE)]
    pub top_level_suite: String,

    /// Do not report nextest binary IDs as suites
    #[arg(long, default_value = "false")]
    pub strip_binary_id: bool,

    /// Skip input lines that are not libtest JSON
    ///
    /// Useful when cargo's own progress output is mixed into the stream.
    #[arg(long, default_value = "false")]
    pub lenient: bool,

    /// Enable verbose logging (debug level)
    ///
    /// Logs are written to stderr so they never mix with service messages.
    #[arg(short, long, default_value = "false")]
    pub verbose: bool,

    /// Quiet mode - suppress info-level logs
    ///
    /// Only errors and warnings will be logged.
    #[arg(short, long, default_value = "false")]
    pub quiet: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: None,
            output: None,
            summary_file: None,
            run_suite_name: DEFAULT_RUN_SUITE_NAME.to_string(),
            top_level_suite: DEFAULT_TOP_LEVEL_SUITE.to_string(),
            strip_binary_id: false,
            lenient: false,
            verbose: false,
            quiet: false,
        }
    }
}

impl Config {
    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The input path is specified but doesn't exist or isn't a file
    /// - The run suite name is blank
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(ref input) = self.input {
            if !input.exists() {
                return Err(ConfigError::InputNotFound(input.clone()));
            }
            if !input.is_file() {
                return Err(ConfigError::InputNotFile(input.clone()));
            }
        }

        if self.run_suite_name.trim().is_empty() {
            return Err(ConfigError::EmptyRunSuiteName);
        }

        Ok(())
    }

    /// Get the log level based on verbose/quiet flags
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.quiet {
            tracing::Level::WARN
        } else {
            tracing::Level::INFO
        }
    }

    /// Converter settings derived from the command line
    #[must_use]
    pub fn converter_options(&self) -> ConverterOptions {
        ConverterOptions {
            reporter: ReporterOptions {
                run_suite_name: self.run_suite_name.clone(),
            },
            top_level_suite: self.top_level_suite.clone(),
            strip_binary_id: self.strip_binary_id,
            lenient: self.lenient,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Input path not found
    #[error("Input file not found: {0}")]
    InputNotFound(PathBuf),

    /// Input path is not a regular file
    #[error("Input path is not a file: {0}")]
    InputNotFile(PathBuf),

    /// The run suite name is empty
    #[error("Run suite name must not be empty")]
    EmptyRunSuiteName,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.input.is_none());
        assert!(config.output.is_none());
        assert!(config.summary_file.is_none());
        assert_eq!(config.run_suite_name, "cargo.test");
        assert_eq!(config.top_level_suite, "top-level");
        assert!(!config.strip_binary_id);
        assert!(!config.lenient);
        assert!(!config.verbose);
        assert!(!config.quiet);
    }

    #[test]
    fn test_log_level_default() {
        let config = Config::default();
        assert_eq!(config.log_level(), tracing::Level::INFO);
    }

    #[test]
    fn test_log_level_verbose() {
        let config = Config {
            verbose: true,
            ..Default::default()
        };
        assert_eq!(config.log_level(), tracing::Level::DEBUG);
    }

    #[test]
    fn test_log_level_quiet() {
        let config = Config {
            quiet: true,
            ..Default::default()
        };
        assert_eq!(config.log_level(), tracing::Level::WARN);
    }

    #[test]
    fn test_validate_nonexistent_input() {
        let config = Config {
            input: Some(PathBuf::from("/nonexistent/path/12345.json")),
            ..Default::default()
        };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::InputNotFound(_))));
    }

    #[test]
    fn test_validate_directory_input() {
        let config = Config {
            input: Some(std::env::temp_dir()),
            ..Default::default()
        };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::InputNotFile(_))));
    }

    #[test]
    fn test_validate_blank_run_suite_name() {
        let config = Config {
            run_suite_name: "  ".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyRunSuiteName)
        ));
    }

    #[test]
    fn test_validate_stdin_defaults() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_converter_options() {
        let config = Config {
            run_suite_name: "nightly".to_string(),
            strip_binary_id: true,
            ..Default::default()
        };
        let options = config.converter_options();
        assert_eq!(options.reporter.run_suite_name, "nightly");
        assert_eq!(options.top_level_suite, "top-level");
        assert!(options.strip_binary_id);
        assert!(!options.lenient);
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Config::command().debug_assert();
    }
}
