//! Translation of grammar failures into user-facing errors.

use crate::lexer::{Token, TokenKind};
use cfparse_core::{ParseError, Range};
use std::sync::Arc;

/// Keywords that can legitimately end a construct, so a failure right
/// after them says nothing about the keyword itself.
const TERMINAL_KEYWORDS: [&str; 7] = [
    "end", "true", "false", "null", "undef", "parents", "defined",
];

fn range(token: &Token, file: &Arc<str>) -> Range {
    Range::new(
        file.clone(),
        token.span.line,
        token.span.column,
        token.span.end_line,
        token.span.end_column,
    )
}

fn reserved(token: &Token, word: &str, file: &Arc<str>) -> ParseError {
    ParseError::syntax_with_value(
        range(token, file),
        word,
        format!("invalid identifier, {} is a reserved keyword", word),
    )
}

/// Turn a failure at `tokens[failure]` into the single reported error.
///
/// Checked in order: illegal character, reserved keyword at the failure,
/// reserved keyword just before it, end of file, then the generic fallback.
pub(crate) fn translate(tokens: &[Token], failure: usize, file: &Arc<str>) -> ParseError {
    let Some(token) = tokens.get(failure).or_else(|| tokens.last()) else {
        return ParseError::syntax(Range::file_start(file.clone()), "Unexpected end of file");
    };

    if let TokenKind::Error(text) = &token.kind {
        if let Some(character) = text.chars().next() {
            return ParseError::IllegalCharacter {
                location: range(token, file),
                character,
            };
        }
    }

    if let Some(word) = token.kind.keyword_text() {
        return reserved(token, word, file);
    }

    if let Some(previous) = failure.checked_sub(1).and_then(|idx| tokens.get(idx)) {
        if let Some(word) = previous.kind.keyword_text() {
            if !TERMINAL_KEYWORDS.contains(&word) {
                return reserved(previous, word, file);
            }
        }
    }

    if token.kind == TokenKind::Eof {
        let location = failure
            .checked_sub(1)
            .and_then(|idx| tokens.get(idx))
            .map_or_else(|| range(token, file), |last| range(last, file));
        return ParseError::syntax(location, "Unexpected end of file");
    }

    ParseError::syntax_with_value(
        range(token, file),
        token.text.clone(),
        format!("Unexpected token '{}'", token.text),
    )
}
