// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Escaping of free-form text into service message attribute values
//!
//! TeamCity attribute values are wrapped in single quotes and use `|` as the
//! escape character. Titles, failure messages and stack traces all pass
//! through [`escape`] before they are placed in a message.

use std::sync::LazyLock;

use regex::Regex;

/// ANSI colour sequences: ESC up to and including the next `m`
static ANSI_SEQUENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1B.*?m").expect("ANSI regex is valid"));

/// Substitutions applied after ANSI stripping, in order.
///
/// `|` must come first so the escape tokens introduced by later entries are
/// not escaped again.
const SUBSTITUTIONS: [(&str, &str); 9] = [
    ("|", "||"),
    ("\n", "|n"),
    ("\r", "|r"),
    ("[", "|["),
    ("]", "|]"),
    ("\u{0085}", "|x"),
    ("\u{2028}", "|l"),
    ("\u{2029}", "|p"),
    ("'", "|'"),
];

/// Escape `text` for use inside a quoted service message attribute
///
/// # Example
///
/// ```
/// use teamcity_core::escape::escape;
///
/// assert_eq!(escape("it's [done]"), "it|'s |[done|]");
/// ```
#[must_use]
pub fn escape(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mut escaped = ANSI_SEQUENCE.replace_all(text, "").into_owned();
    for (from, to) in SUBSTITUTIONS {
        if escaped.contains(from) {
            escaped = escaped.replace(from, to);
        }
    }
    escaped
}

/// Escape optional text; absent text becomes an empty value
#[must_use]
pub fn escape_opt(text: Option<&str>) -> String {
    text.map(escape).unwrap_or_default()
}
