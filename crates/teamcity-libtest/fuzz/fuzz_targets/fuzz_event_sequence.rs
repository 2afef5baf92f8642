// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Fuzz target for structured event sequences
//!
//! Builds well-formed libtest events from arbitrary test names and statuses
//! so the fuzzer spends its time on suite nesting rather than JSON syntax.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use serde_json::json;

use teamcity_libtest::{ConverterOptions, StreamingConverter};

#[derive(Debug, Arbitrary)]
enum Step {
    BinaryStarted,
    BinaryFinished { failed: bool, exec_time: f64 },
    TestStarted(String),
    TestFinished { name: String, status: u8, exec_time: f64 },
}

fuzz_target!(|input: (Vec<Step>, bool)| {
    let (steps, strip_binary_id) = input;
    let options = ConverterOptions {
        strip_binary_id,
        ..Default::default()
    };
    let mut converter = StreamingConverter::new(Vec::new(), options);

    for step in steps {
        let line = match step {
            Step::BinaryStarted => r#"{"type":"suite","event":"started"}"#.to_string(),
            Step::BinaryFinished { failed, exec_time } => event_line(
                "suite",
                if failed { "failed" } else { "ok" },
                None,
                exec_time,
            ),
            Step::TestStarted(name) => event_line("test", "started", Some(&name), 0.0),
            Step::TestFinished {
                name,
                status,
                exec_time,
            } => {
                let event = ["ok", "failed", "ignored", "timeout"][usize::from(status % 4)];
                event_line("test", event, Some(&name), exec_time)
            }
        };
        if converter.process_line(&line).is_err() {
            return;
        }
    }
    let _ = converter.finish();
});

/// Non-finite times serialize as `null`, which the converter treats as absent
fn event_line(kind: &str, event: &str, name: Option<&str>, exec_time: f64) -> String {
    let mut value = json!({
        "type": kind,
        "event": event,
        "exec_time": exec_time,
    });
    if let Some(name) = name {
        value["name"] = json!(name);
    }
    value.to_string()
}
