// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Fuzz target for libtest JSON conversion
//!
//! Feeds arbitrary text through `convert_str` in both strict and lenient
//! mode.

#![no_main]

use libfuzzer_sys::fuzz_target;

use teamcity_libtest::{ConverterOptions, convert_str};

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let _ = convert_str(input, Vec::new(), ConverterOptions::default());

        let lenient = ConverterOptions {
            lenient: true,
            ..Default::default()
        };
        let _ = convert_str(input, Vec::new(), lenient);
    }
});
