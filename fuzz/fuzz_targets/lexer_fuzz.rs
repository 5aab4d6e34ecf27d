//! Fuzz target for the model lexer
//!
//! Feeds arbitrary UTF-8 to the lexer looking for:
//! - Panics on malformed literals or stray bytes
//! - Spans that run backwards or past the input
//!
//! Run with: cargo +nightly fuzz run lexer_fuzz -- -max_total_time=60

#![no_main]

use cfparse_dsl::{Lexer, TokenKind};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let tokens = Lexer::new(input).tokenize();

        // The stream always ends in exactly one Eof
        assert!(matches!(tokens.last().map(|t| &t.kind), Some(TokenKind::Eof)));
        assert_eq!(
            tokens.iter().filter(|t| t.kind == TokenKind::Eof).count(),
            1,
            "Eof must appear once"
        );

        let mut previous_end = 0;
        for token in &tokens {
            assert!(token.span.start <= token.span.end, "Span start should be <= end");
            assert!(token.span.end <= input.len(), "Span past end of input");
            assert!(token.span.start >= previous_end, "Tokens overlap");
            assert!(token.span.line >= 1 && token.span.column >= 1);
            let start = (token.span.line, token.span.column);
            let end = (token.span.end_line, token.span.end_column);
            assert!(end >= start, "Span ends before it starts");
            previous_end = token.span.end;
        }
    }
});
