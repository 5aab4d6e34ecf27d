//! Parser implementation: state, token helpers and the module entry point.
//!
//! Grammar productions live in `statements.rs` and `expressions.rs`; this
//! file owns the cursor, node construction helpers and recursion limit.

use super::ast::*;
use super::diagnostics::translate;
use crate::lexer::*;
use cfparse_core::{
    LocatableString, Namespace, ParseError, ParseResult, ParserConfig, ParserWarning, Range,
    WarningKind, WarningSink,
};
use std::sync::Arc;

// ============================================================================
// PARSER
// ============================================================================

/// Recursive-descent parser for one source file.
pub struct Parser<'w> {
    pub(crate) tokens: Vec<Token>,
    pub(crate) pos: usize,
    pub(crate) file: Arc<str>,
    pub(crate) namespace: Arc<Namespace>,
    warnings: &'w dyn WarningSink,
    depth: usize,
    max_depth: usize,
}

impl<'w> Parser<'w> {
    /// Create a parser over visible tokens (as produced by [`Lexer::tokenize`]).
    pub fn new(
        tokens: Vec<Token>,
        file: impl Into<Arc<str>>,
        namespace: Arc<Namespace>,
        warnings: &'w dyn WarningSink,
        config: &ParserConfig,
    ) -> Self {
        let mut tokens = tokens;
        if !matches!(tokens.last().map(|t| &t.kind), Some(TokenKind::Eof)) {
            let span = tokens
                .last()
                .map(|t| Span {
                    start: t.span.end,
                    end: t.span.end,
                    line: t.span.end_line,
                    column: t.span.end_column,
                    end_line: t.span.end_line,
                    end_column: t.span.end_column,
                })
                .unwrap_or_default();
            tokens.push(Token {
                kind: TokenKind::Eof,
                text: String::new(),
                span,
            });
        }
        Self {
            tokens,
            pos: 0,
            file: file.into(),
            namespace,
            warnings,
            depth: 0,
            max_depth: config.max_nesting_depth,
        }
    }

    /// Parse a whole module: an optional docstring followed by top-level statements.
    pub fn parse(&mut self) -> ParseResult<Vec<Statement>> {
        let mut statements = Vec::new();

        if let TokenKind::MultiLineString { .. } = self.current().kind {
            let start = self.pos;
            let doc = self.parse_comment()?;
            statements.push(self.statement(StatementKind::Docstring(doc), start));
        }

        while !self.is_at_end() {
            statements.push(self.parse_top_statement()?);
        }

        Ok(statements)
    }

    // ========================================================================
    // Helper methods
    // ========================================================================

    pub(crate) fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    /// Token `offset` positions ahead, clamped to `Eof`.
    pub(crate) fn peek(&self, offset: usize) -> &Token {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    pub(crate) fn advance(&mut self) {
        if !self.is_at_end() {
            self.pos += 1;
        }
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.current().kind == TokenKind::Eof
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.current().kind) == std::mem::discriminant(kind)
    }

    /// Consume a token of the given kind or fail at the current one.
    pub(crate) fn expect(&mut self, kind: TokenKind) -> ParseResult<Token> {
        if self.check(&kind) {
            let token = self.current().clone();
            self.advance();
            Ok(token)
        } else {
            Err(self.unexpected())
        }
    }

    /// Consume a lower-case identifier.
    pub(crate) fn expect_identifier(&mut self) -> ParseResult<LocatableString> {
        match &self.current().kind {
            TokenKind::Id(name) => {
                let name = self.locatable(name.clone(), self.pos);
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected()),
        }
    }

    /// Consume an identifier that defines something, rejecting hyphens.
    pub(crate) fn expect_definition_name(&mut self) -> ParseResult<LocatableString> {
        let name = self.expect_identifier()?;
        self.check_hyphen(&name)?;
        Ok(name)
    }

    pub(crate) fn optional_comma(&mut self) -> bool {
        if self.check(&TokenKind::Comma) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Translated grammar error at the current token.
    pub(crate) fn unexpected(&self) -> ParseError {
        self.unexpected_at(self.pos)
    }

    pub(crate) fn unexpected_at(&self, idx: usize) -> ParseError {
        translate(&self.tokens, idx, &self.file)
    }

    /// Syntax error carrying the offending value.
    pub(crate) fn error(
        &self,
        location: Range,
        value: &str,
        message: impl Into<String>,
    ) -> ParseError {
        ParseError::syntax_with_value(location, value, message)
    }

    pub(crate) fn check_hyphen(&self, name: &LocatableString) -> ParseResult<()> {
        if name.value.contains('-') {
            return Err(self.error(
                name.location.clone(),
                &name.value,
                format!(
                    "The use of '-' in identifiers is not allowed. please rename {}.",
                    name.value
                ),
            ));
        }
        Ok(())
    }

    pub(crate) fn warn(
        &self,
        kind: WarningKind,
        location: Range,
        value: Option<String>,
        message: &str,
    ) {
        self.warnings
            .warn(ParserWarning::new(kind, location, value, message));
    }

    /// Run `f` one nesting level deeper, failing past the configured limit.
    pub(crate) fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> ParseResult<T>,
    ) -> ParseResult<T> {
        if self.depth >= self.max_depth {
            let location = self.token_range(self.pos);
            return Err(ParseError::syntax(
                location,
                format!("Maximum nesting depth of {} exceeded", self.max_depth),
            ));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    // ========================================================================
    // Locations and node construction
    // ========================================================================

    pub(crate) fn span_range(&self, span: &Span) -> Range {
        Range::new(
            self.file.clone(),
            span.line,
            span.column,
            span.end_line,
            span.end_column,
        )
    }

    pub(crate) fn token_range(&self, idx: usize) -> Range {
        self.span_range(&self.tokens[idx].span)
    }

    /// Range from token `start` through the last consumed token.
    pub(crate) fn range_from(&self, start: usize) -> Range {
        let last = self.pos.saturating_sub(1).max(start);
        self.token_range(start).merge(&self.token_range(last))
    }

    pub(crate) fn lexpos(&self, idx: usize) -> usize {
        self.tokens[idx].span.start
    }

    pub(crate) fn locatable(&self, value: impl Into<String>, idx: usize) -> LocatableString {
        LocatableString::new(
            value,
            self.token_range(idx),
            self.lexpos(idx),
            self.namespace.clone(),
        )
    }

    pub(crate) fn expression(
        &self,
        kind: ExpressionKind,
        location: Range,
        lexpos: usize,
    ) -> Expression {
        Expression::new(kind, location, self.namespace.clone(), lexpos)
    }

    /// Statement spanning token `start` through the last consumed token.
    pub(crate) fn statement(&self, kind: StatementKind, start: usize) -> Statement {
        Statement::new(
            kind,
            self.range_from(start),
            self.namespace.clone(),
            self.lexpos(start),
        )
    }
}

// ============================================================================
// TESTS
// ============================================================================
