// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Fuzz target for service message escaping

#![no_main]

use libfuzzer_sys::fuzz_target;

use teamcity_core::escape::escape;

fuzz_target!(|input: &str| {
    let escaped = escape(input);
    for raw in ['\n', '\r', '\u{0085}', '\u{2028}', '\u{2029}'] {
        assert!(!escaped.contains(raw), "raw {raw:?} in {escaped:?}");
    }
    // an ESC with no `m` later on its line is not a colour sequence and stays
    if !input.contains('\n') {
        let terminated = input.rfind('\x1B').is_none_or(|i| input[i..].contains('m'));
        if terminated {
            assert!(!escaped.contains('\x1B'), "colour sequence left in {escaped:?}");
        }
    }

    // every remaining special character is the second half of a `|` token
    let mut chars = escaped.chars();
    while let Some(c) = chars.next() {
        match c {
            '|' => assert!(chars.next().is_some(), "dangling escape in {escaped:?}"),
            '[' | ']' | '\'' => panic!("raw {c:?} in {escaped:?}"),
            _ => {}
        }
    }
});
