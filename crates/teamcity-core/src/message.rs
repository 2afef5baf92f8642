// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! TeamCity service message lines
//!
//! Each function renders one complete `##teamcity[...]` line. Names, messages
//! and details are escaped here; durations are written as raw integers.

use crate::escape::{escape, escape_opt};

/// Token replaced by the measured duration in a suite-finished template
pub const DURATION_PLACEHOLDER: &str = "DURATION";

/// `testSuiteStarted`
#[must_use]
pub fn suite_started(name: &str) -> String {
    format!("##teamcity[testSuiteStarted name='{}']", escape(name))
}

/// `testSuiteFinished` with the duration left as [`DURATION_PLACEHOLDER`]
#[must_use]
pub fn suite_finished_template(name: &str) -> String {
    format!(
        "##teamcity[testSuiteFinished name='{}' duration='{DURATION_PLACEHOLDER}']",
        escape(name)
    )
}

/// `testSuiteFinished` with a known duration
#[must_use]
pub fn suite_finished(name: &str, duration_ms: u64) -> String {
    format!(
        "##teamcity[testSuiteFinished name='{}' duration='{duration_ms}']",
        escape(name)
    )
}

/// `testStarted`
#[must_use]
pub fn test_started(name: &str) -> String {
    format!(
        "##teamcity[testStarted name='{}' captureStandardOutput='true']",
        escape(name)
    )
}

/// `testFailed`
#[must_use]
pub fn test_failed(name: &str, message: Option<&str>, details: Option<&str>) -> String {
    format!(
        "##teamcity[testFailed name='{}' message='{}' captureStandardOutput='true' details='{}']",
        escape(name),
        escape_opt(message),
        escape_opt(details)
    )
}

/// `testIgnored`
#[must_use]
pub fn test_ignored(name: &str) -> String {
    format!(
        "##teamcity[testIgnored name='{}' message='pending']",
        escape(name)
    )
}

/// `testFinished`
#[must_use]
pub fn test_finished(name: &str, duration_ms: u64) -> String {
    format!(
        "##teamcity[testFinished name='{}' duration='{duration_ms}']",
        escape(name)
    )
}

/// Substitute `duration_ms` for the placeholder in a suite-finished template
///
/// The duration attribute is the last one in the line, so the last occurrence
/// of the token is replaced. A suite title that happens to contain the token
/// text is left alone.
#[must_use]
pub fn fill_duration(template: &str, duration_ms: u64) -> String {
    match template.rfind(DURATION_PLACEHOLDER) {
        Some(idx) => format!(
            "{}{duration_ms}{}",
            &template[..idx],
            &template[idx + DURATION_PLACEHOLDER.len()..]
        ),
        None => template.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    #[test]
    fn test_suite_lines() {
        assert_eq!(
            suite_started("math"),
            "##teamcity[testSuiteStarted name='math']"
        );
        assert_eq!(
            suite_finished("math", 12),
            "##teamcity[testSuiteFinished name='math' duration='12']"
        );
    }

    #[test]
    fn test_test_lines() {
        assert_eq!(
            test_started("adds"),
            "##teamcity[testStarted name='adds' captureStandardOutput='true']"
        );
        assert_eq!(
            test_ignored("adds"),
            "##teamcity[testIgnored name='adds' message='pending']"
        );
        assert_eq!(
            test_finished("adds", 3),
            "##teamcity[testFinished name='adds' duration='3']"
        );
    }

    #[test]
    fn test_failed_line_escapes_fields() {
        assert_eq!(
            test_failed("it's", Some("expected [1]"), Some("at a\nat b")),
            "##teamcity[testFailed name='it|'s' message='expected |[1|]' \
             captureStandardOutput='true' details='at a|nat b']"
        );
        assert_eq!(
            test_failed("t", None, None),
            "##teamcity[testFailed name='t' message='' captureStandardOutput='true' details='']"
        );
    }

    #[test]
    fn test_fill_duration() {
        let template = suite_finished_template("math");
        assert_eq!(fill_duration(&template, 42), suite_finished("math", 42));
    }

    #[test]
    fn test_fill_duration_ignores_title_token() {
        let template = suite_finished_template("DURATION checks");
        assert_eq!(
            fill_duration(&template, 7),
            "##teamcity[testSuiteFinished name='DURATION checks' duration='7']"
        );
    }
}
