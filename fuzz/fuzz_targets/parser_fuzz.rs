//! Fuzz target for the full parse pipeline
//!
//! Any UTF-8 input must produce either statements or one located error:
//! - No panics, including on deeply nested input
//! - Errors carry a 1-based position and a non-empty message
//! - Parsing the same text twice gives the same answer
//!
//! Run with: cargo +nightly fuzz run parser_fuzz -- -max_total_time=60

#![no_main]

use cfparse_dsl::{parse_source, CollectingWarnings, Namespace};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let namespace = Namespace::from_path("fuzz");
        let sink = CollectingWarnings::new();
        let first = parse_source(&namespace, "fuzz.cf", input, &sink);

        match &first {
            Ok(statements) => {
                for statement in statements {
                    assert_eq!(statement.namespace.get_full_name(), "fuzz");
                }
            }
            Err(err) => {
                let location = err.location();
                assert!(location.lnr >= 1, "Error line should be >= 1");
                assert!(location.start_char >= 1, "Error column should be >= 1");
                assert!(!err.message().is_empty(), "Error message should not be empty");
            }
        }

        for warning in sink.take() {
            assert!(!warning.message.is_empty());
        }

        let second = parse_source(&namespace, "fuzz.cf", input, &CollectingWarnings::new());
        assert_eq!(first.is_ok(), second.is_ok(), "Parsing is not deterministic");
    }
});
