//! cfparse DSL - Front-end for the configuration model language
//!
//! This crate turns `.cf` source files into located, immutable statement
//! trees ready for a later compilation stage.
//!
//! Architecture:
//! ```text
//! Source text (.cf file)
//!     ↓
//! Lexer (tokens with spans, hidden channel for whitespace/comments)
//!     ↓
//! Parser (recursive descent, error translation)
//!     ↓
//! AST builder (string interpolation, constant folding, desugaring)
//!     ↓
//! Vec<Statement>
//!     ↓
//! ParseCache (keyed by namespace and filename)
//! ```
//!
//! Names are not resolved here. A `Statement` only knows the namespace it
//! was parsed in.

pub mod cache;
pub mod lexer;
pub mod parser;
pub mod strings;

// Re-export key types for convenience
pub use cache::{CacheEntry, CacheStats, ParseCache};
pub use cfparse_core::{
    CollectingWarnings, LocatableString, Namespace, ParseError, ParseResult, ParserConfig,
    ParserWarning, Range, TracingWarnings, WarningKind, WarningSink,
};
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::*;

use std::borrow::Cow;
use std::sync::Arc;

/// Parse one file through `cache`, logging warnings with `tracing`.
///
/// `content` is the file text; when `None` the file is read from disk.
pub fn parse(
    cache: &ParseCache,
    namespace: &Arc<Namespace>,
    filename: &str,
    content: Option<&str>,
) -> ParseResult<Arc<Vec<Statement>>> {
    cache.get_or_parse(namespace, filename, content, &TracingWarnings)
}

/// [`parse`] with an explicit configuration and warning sink.
///
/// With caching disabled the cache is neither read nor written.
pub fn parse_with(
    config: &ParserConfig,
    cache: &ParseCache,
    namespace: &Arc<Namespace>,
    filename: &str,
    content: Option<&str>,
    warnings: &dyn WarningSink,
) -> ParseResult<Arc<Vec<Statement>>> {
    if !config.cache_enabled {
        let source = load_source(filename, content)?;
        return parse_source_with(config, namespace, filename, &source, warnings).map(Arc::new);
    }

    cache.get_or_insert_with(namespace, filename, || {
        let source = load_source(filename, content)?;
        let statements = parse_source_with(config, namespace, filename, &source, warnings)?;
        Ok(CacheEntry::new(statements, &source))
    })
}

/// Uncached pipeline with the default configuration.
pub fn parse_source(
    namespace: &Arc<Namespace>,
    filename: &str,
    source: &str,
    warnings: &dyn WarningSink,
) -> ParseResult<Vec<Statement>> {
    parse_source_with(&ParserConfig::default(), namespace, filename, source, warnings)
}

pub fn parse_source_with(
    config: &ParserConfig,
    namespace: &Arc<Namespace>,
    filename: &str,
    source: &str,
    warnings: &dyn WarningSink,
) -> ParseResult<Vec<Statement>> {
    if source.is_empty() {
        return Ok(Vec::new());
    }

    let mut text = String::with_capacity(source.len() + 1);
    text.push_str(source);
    text.push('\n');

    let tokens = Lexer::new(&text).tokenize();
    let statements = Parser::new(tokens, filename, namespace.clone(), warnings, config).parse()?;

    tracing::debug!(
        file = filename,
        namespace = %namespace,
        statements = statements.len(),
        "parsed file"
    );
    Ok(statements)
}

fn load_source<'a>(filename: &str, content: Option<&'a str>) -> ParseResult<Cow<'a, str>> {
    match content {
        Some(content) => Ok(Cow::Borrowed(content)),
        None => std::fs::read_to_string(filename)
            .map(Cow::Owned)
            .map_err(|e| ParseError::Io {
                location: Range::file_start(filename),
                path: filename.to_string(),
                reason: e.to_string(),
            }),
    }
}
