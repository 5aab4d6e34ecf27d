//! Lexer implementation

use super::token::*;
use once_cell::sync::Lazy;
use regex::Regex;
use std::iter::Peekable;
use std::str::CharIndices;

// ============================================================================
// TOKEN PATTERNS
// ============================================================================

static MLS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"\A"{3,5}[\s\S]*?"{3,5}"#).unwrap());
static DQ_STRING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\A"(?:[^"\\\n]|\\.)*""#).unwrap());
static SQ_STRING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\A'(?:[^'\\\n]|\\.)*'").unwrap());
static REGEX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\Amatching\s+/((?:[^/\\\n]|\\.)+)/").unwrap());
static FLOAT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"\A(?:[0-9]+\.[0-9]*(?:[eE][+-]?[0-9]+)?",
        r"|\.[0-9]+(?:[eE][+-]?[0-9]+)?",
        r"|[0-9]+[eE][+-]?[0-9]+)",
    ))
    .unwrap()
});
static INT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\A[0-9]+").unwrap());
static NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\A[a-zA-Z_][a-zA-Z0-9_-]*").unwrap());

// ============================================================================
// LEXER IMPLEMENTATION
// ============================================================================

/// Lexer for the configuration language.
///
/// Iterating a `Lexer` yields the visible tokens lazily and stops after
/// `Eof`; whitespace and comments are only returned by
/// [`Lexer::tokenize_with_hidden`].
pub struct Lexer<'a> {
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
    line: usize,
    column: usize,
    pos: usize,
    finished: bool,
    /// Result of the last search for `*/`: the byte offset of the first
    /// terminator at or after where that search started.
    block_end: Option<Option<usize>>,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            line: 1,
            column: 1,
            pos: 0,
            finished: false,
            block_end: None,
        }
    }

    /// Tokenize the entire source, dropping whitespace and comments.
    /// The last token is always `Eof`.
    pub fn tokenize(&mut self) -> Vec<Token> {
        self.collect()
    }

    /// Tokenize the entire source including the hidden channel.
    pub fn tokenize_with_hidden(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }

        self.finished = true;
        tokens
    }

    /// Get the next token from the source, hidden tokens included.
    fn next_token(&mut self) -> Token {
        let start_pos = self.pos;
        let start_line = self.line;
        let start_col = self.column;

        let kind = match self.peek_char() {
            None => TokenKind::Eof,
            Some(c) => match c {
                ' ' | '\t' | '\r' | '\n' | '\x0c' => {
                    while matches!(self.peek_char(), Some(' ' | '\t' | '\r' | '\n' | '\x0c')) {
                        self.advance();
                    }
                    TokenKind::Whitespace
                }

                '#' => self.scan_line_comment(),

                '/' => match self.peek_next_char() {
                    Some('/') => self.scan_line_comment(),
                    Some('*') if self.block_comment_terminated() => self.scan_block_comment(),
                    _ => {
                        self.advance();
                        TokenKind::Slash
                    }
                },

                '"' => self.scan_multiline_string().unwrap_or_else(|| self.scan_string(0)),
                '\'' => self.scan_string(0),

                'f' | 'r' if matches!(self.peek_next_char(), Some('"' | '\'')) => {
                    self.scan_prefixed_string(c)
                }

                'm' if REGEX_RE.is_match(self.rest()) => self.scan_regex(),

                c if c.is_ascii_digit() => self.scan_number(),
                '.' if self.peek_next_char().is_some_and(|n| n.is_ascii_digit()) => {
                    self.scan_number()
                }

                c if c.is_ascii_alphabetic() || c == '_' => self.scan_identifier(),

                '=' => self.one_or_two('=', TokenKind::Assign, TokenKind::Eq),
                '!' => {
                    self.advance();
                    if self.peek_char() == Some('=') {
                        self.advance();
                        TokenKind::Ne
                    } else {
                        TokenKind::Error("!".to_string())
                    }
                }
                '<' => {
                    self.advance();
                    match self.peek_char() {
                        Some('=') => {
                            self.advance();
                            TokenKind::Le
                        }
                        Some('-') => {
                            self.advance();
                            TokenKind::RelLeft
                        }
                        _ => TokenKind::Lt,
                    }
                }
                '>' => self.one_or_two('=', TokenKind::Gt, TokenKind::Ge),
                '-' => {
                    self.advance();
                    match self.peek_char() {
                        Some('>') => {
                            self.advance();
                            TokenKind::RelRight
                        }
                        Some('-') => {
                            self.advance();
                            TokenKind::RelBoth
                        }
                        _ => TokenKind::Minus,
                    }
                }
                '+' => self.one_or_two('=', TokenKind::Plus, TokenKind::PlusAssign),
                '*' => self.one_or_two('*', TokenKind::Star, TokenKind::DoubleStar),
                ':' => self.one_or_two(':', TokenKind::Colon, TokenKind::DoubleColon),
                '%' => self.single(TokenKind::Percent),
                '(' => self.single(TokenKind::LParen),
                ')' => self.single(TokenKind::RParen),
                '[' => self.single(TokenKind::LBracket),
                ']' => self.single(TokenKind::RBracket),
                '{' => self.single(TokenKind::LBrace),
                '}' => self.single(TokenKind::RBrace),
                ',' => self.single(TokenKind::Comma),
                '.' => self.single(TokenKind::Dot),
                '?' => self.single(TokenKind::Question),

                c => {
                    self.advance();
                    TokenKind::Error(c.to_string())
                }
            },
        };

        Token {
            kind,
            text: self.source[start_pos..self.pos].to_string(),
            span: Span {
                start: start_pos,
                end: self.pos,
                line: start_line,
                column: start_col,
                end_line: self.line,
                end_column: self.column,
            },
        }
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.advance();
        kind
    }

    /// `first` alone, or `second` when the next char is `follow`.
    fn one_or_two(&mut self, follow: char, first: TokenKind, second: TokenKind) -> TokenKind {
        self.advance();
        if self.peek_char() == Some(follow) {
            self.advance();
            second
        } else {
            first
        }
    }

    /// Scan an identifier, class identifier or keyword.
    fn scan_identifier(&mut self) -> TokenKind {
        let len = NAME_RE.find(self.rest()).map_or(1, |m| m.end());
        let start = self.pos;
        self.consume_bytes(len);
        let ident = &self.source[start..self.pos];

        if ident.starts_with(|c: char| c.is_ascii_uppercase()) {
            return TokenKind::ClassId(ident.to_string());
        }
        TokenKind::keyword(ident).unwrap_or_else(|| TokenKind::Id(ident.to_string()))
    }

    /// Scan a quoted string starting `prefix_len` bytes after the cursor.
    ///
    /// An unterminated string is reported as an illegal opening quote.
    fn scan_string(&mut self, prefix_len: usize) -> TokenKind {
        let body = &self.rest()[prefix_len..];
        let re = if body.starts_with('"') {
            &*DQ_STRING_RE
        } else {
            &*SQ_STRING_RE
        };

        match re.find(body) {
            Some(m) => {
                let content = body[1..m.end() - 1].to_string();
                self.consume_bytes(prefix_len + m.end());
                TokenKind::String(content)
            }
            None => {
                self.consume_bytes(prefix_len);
                let quote = self.advance().unwrap_or('"');
                TokenKind::Error(quote.to_string())
            }
        }
    }

    /// `f"..."` or `r"..."`.
    fn scan_prefixed_string(&mut self, prefix: char) -> TokenKind {
        match self.scan_string(1) {
            TokenKind::String(content) if prefix == 'f' => TokenKind::FString(content),
            TokenKind::String(content) => TokenKind::RawString(content),
            other => other,
        }
    }

    /// Triple-quoted string, or `None` when the cursor is not at one.
    fn scan_multiline_string(&mut self) -> Option<TokenKind> {
        let m = MLS_RE.find(self.rest())?;
        let raw = m.as_str().to_string();
        let quotes = raw.chars().take_while(|c| *c == '"').count();
        self.consume_bytes(m.end());
        Some(TokenKind::MultiLineString { quotes, raw })
    }

    /// `matching /pattern/` as a single token.
    fn scan_regex(&mut self) -> TokenKind {
        let Some(caps) = REGEX_RE.captures(self.rest()) else {
            return self.scan_identifier();
        };
        let (len, pattern, slash_offset) = match (caps.get(0), caps.get(1)) {
            (Some(all), Some(pat)) => (all.end(), pat.as_str().to_string(), pat.start() - 1),
            _ => return self.scan_identifier(),
        };
        self.consume_bytes(len);
        TokenKind::Regex {
            pattern,
            slash_offset,
        }
    }

    /// Scan an integer or float literal.
    fn scan_number(&mut self) -> TokenKind {
        if let Some(m) = FLOAT_RE.find(self.rest()) {
            let text = m.as_str().to_string();
            self.consume_bytes(m.end());
            return TokenKind::Float(text);
        }
        let len = INT_RE.find(self.rest()).map_or(1, |m| m.end());
        let start = self.pos;
        self.consume_bytes(len);
        TokenKind::Integer(self.source[start..self.pos].to_string())
    }

    fn scan_line_comment(&mut self) -> TokenKind {
        while let Some(c) = self.peek_char() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
        TokenKind::Comment
    }

    /// Block comment; the caller has checked that it is terminated.
    fn scan_block_comment(&mut self) -> TokenKind {
        self.advance(); // /
        self.advance(); // *
        loop {
            match self.peek_char() {
                None => break,
                Some('*') if self.peek_next_char() == Some('/') => {
                    self.advance();
                    self.advance();
                    break;
                }
                _ => {
                    self.advance();
                }
            }
        }
        TokenKind::Comment
    }

    /// Whether the `/*` at the cursor has a closing `*/`. Searches resume
    /// past the previous hit, so the input is scanned once overall.
    fn block_comment_terminated(&mut self) -> bool {
        let from = self.pos + 2;
        match self.block_end {
            Some(Some(end)) if end >= from => true,
            Some(None) => false,
            _ => {
                let found = self.source[from..].find("*/").map(|i| from + i);
                self.block_end = Some(found);
                found.is_some()
            }
        }
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn consume_bytes(&mut self, len: usize) {
        let target = self.pos + len;
        while self.pos < target && self.advance().is_some() {}
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn peek_next_char(&self) -> Option<char> {
        let mut iter = self.source[self.pos..].chars();
        iter.next();
        iter.next()
    }

    fn advance(&mut self) -> Option<char> {
        if let Some((i, c)) = self.chars.next() {
            self.pos = i + c.len_utf8();
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
            Some(c)
        } else {
            None
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }
        loop {
            let token = self.next_token();
            if token.kind.is_hidden() {
                continue;
            }
            if token.kind == TokenKind::Eof {
                self.finished = true;
            }
            return Some(token);
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source).tokenize().into_iter().map(|t| t.kind).collect()
    }

    // ========================================================================
    // Lexer Tests
    // ========================================================================

    #[test]
    fn test_lexer_keywords() {
        let tokens = kinds("entity implement implementation typedef matching index");

        assert!(matches!(tokens[0], TokenKind::Entity));
        assert!(matches!(tokens[1], TokenKind::Implement));
        assert!(matches!(tokens[2], TokenKind::Implementation));
        assert!(matches!(tokens[3], TokenKind::Typedef));
        assert!(matches!(tokens[4], TokenKind::Matching));
        assert!(matches!(tokens[5], TokenKind::Index));
        assert!(matches!(tokens[6], TokenKind::Eof));
    }

    #[test]
    fn test_lexer_every_reserved_word_is_a_keyword() {
        for word in RESERVED_KEYWORDS {
            let tokens = kinds(word);
            assert!(tokens[0].is_keyword(), "{} lexed as {:?}", word, tokens[0]);
            assert_eq!(tokens[0].keyword_text(), Some(word));
        }
    }

    #[test]
    fn test_lexer_identifiers() {
        let tokens = kinds("host Host _x a-b entity_name");

        assert_eq!(tokens[0], TokenKind::Id("host".to_string()));
        assert_eq!(tokens[1], TokenKind::ClassId("Host".to_string()));
        assert_eq!(tokens[2], TokenKind::Id("_x".to_string()));
        assert_eq!(tokens[3], TokenKind::Id("a-b".to_string()));
        assert_eq!(tokens[4], TokenKind::Id("entity_name".to_string()));
    }

    #[test]
    fn test_lexer_operators() {
        let tokens = kinds("== != < > <= >= = += -- -> <- :: : ** * / % + - ?");

        let expected = [
            TokenKind::Eq,
            TokenKind::Ne,
            TokenKind::Lt,
            TokenKind::Gt,
            TokenKind::Le,
            TokenKind::Ge,
            TokenKind::Assign,
            TokenKind::PlusAssign,
            TokenKind::RelBoth,
            TokenKind::RelRight,
            TokenKind::RelLeft,
            TokenKind::DoubleColon,
            TokenKind::Colon,
            TokenKind::DoubleStar,
            TokenKind::Star,
            TokenKind::Slash,
            TokenKind::Percent,
            TokenKind::Plus,
            TokenKind::Minus,
            TokenKind::Question,
            TokenKind::Eof,
        ];
        assert_eq!(tokens, expected);
    }

    #[test]
    fn test_lexer_numbers() {
        let tokens = kinds("1 1. .1 1e5 1.5e-3 42");

        assert_eq!(tokens[0], TokenKind::Integer("1".to_string()));
        assert_eq!(tokens[1], TokenKind::Float("1.".to_string()));
        assert_eq!(tokens[2], TokenKind::Float(".1".to_string()));
        assert_eq!(tokens[3], TokenKind::Float("1e5".to_string()));
        assert_eq!(tokens[4], TokenKind::Float("1.5e-3".to_string()));
        assert_eq!(tokens[5], TokenKind::Integer("42".to_string()));
    }

    #[test]
    fn test_lexer_exponent_requires_digit() {
        let tokens = kinds("1e");
        assert_eq!(tokens[0], TokenKind::Integer("1".to_string()));
        assert_eq!(tokens[1], TokenKind::Id("e".to_string()));
    }

    #[test]
    fn test_lexer_strings() {
        let tokens = kinds(r#""a\"b" 'single' r"raw\d" f"{x}""#);

        assert_eq!(tokens[0], TokenKind::String("a\\\"b".to_string()));
        assert_eq!(tokens[1], TokenKind::String("single".to_string()));
        assert_eq!(tokens[2], TokenKind::RawString("raw\\d".to_string()));
        assert_eq!(tokens[3], TokenKind::FString("{x}".to_string()));
    }

    #[test]
    fn test_lexer_unterminated_string_is_illegal_quote() {
        let tokens = Lexer::new("x = \"abc\n").tokenize();
        let error = &tokens[2];

        assert_eq!(error.kind, TokenKind::Error("\"".to_string()));
        assert_eq!(error.span.column, 5);
        assert_eq!(error.span.end_column, 6);
    }

    #[test]
    fn test_lexer_multiline_string() {
        let tokens = Lexer::new("\"\"\"\nline one\nline two\n\"\"\" x").tokenize();

        match &tokens[0].kind {
            TokenKind::MultiLineString { quotes, raw } => {
                assert_eq!(*quotes, 3);
                assert!(raw.contains("line two"));
            }
            other => panic!("Expected multi-line string, got {:?}", other),
        }
        assert_eq!(tokens[0].span.line, 1);
        assert_eq!(tokens[0].span.end_line, 4);
        assert_eq!(tokens[1].span.line, 4);
    }

    #[test]
    fn test_lexer_regex_token() {
        let tokens = Lexer::new("typedef t as string matching /^a+$/").tokenize();

        match &tokens[4].kind {
            TokenKind::Regex {
                pattern,
                slash_offset,
            } => {
                assert_eq!(pattern, "^a+$");
                assert_eq!(*slash_offset, "matching ".len());
            }
            other => panic!("Expected regex, got {:?}", other),
        }
    }

    #[test]
    fn test_lexer_matching_without_slash_is_keyword() {
        let tokens = kinds("matching self > 0");
        assert!(matches!(tokens[0], TokenKind::Matching));
    }

    #[test]
    fn test_lexer_comments_are_hidden() {
        let source = "a # hash\nb // slashes\nc /* block\n */ d";
        let visible = kinds(source);
        assert_eq!(visible.len(), 5);

        let all = Lexer::new(source).tokenize_with_hidden();
        let comments = all.iter().filter(|t| t.kind == TokenKind::Comment).count();
        assert_eq!(comments, 3);
    }

    #[test]
    fn test_lexer_unterminated_block_comment_is_not_a_comment() {
        let tokens = kinds("/* open");
        assert_eq!(tokens[0], TokenKind::Slash);
        assert_eq!(tokens[1], TokenKind::Star);
    }

    #[test]
    fn test_lexer_illegal_character_span() {
        let tokens = Lexer::new("x\u{e9}\n").tokenize();

        assert_eq!(tokens[0].kind, TokenKind::Id("x".to_string()));
        assert_eq!(tokens[1].kind, TokenKind::Error("\u{e9}".to_string()));
        assert_eq!(tokens[1].span.column, 2);
        assert_eq!(tokens[1].span.end_column, 3);
    }

    #[test]
    fn test_lexer_line_tracking() {
        let tokens = Lexer::new("a\n  bb\n").tokenize();

        assert_eq!((tokens[1].span.line, tokens[1].span.column), (2, 3));
        assert_eq!(tokens[1].span.end_column, 5);
    }

    #[test]
    fn test_lexer_iterator_is_lazy_and_ends_after_eof() {
        let mut lexer = Lexer::new("a b");
        assert!(lexer.next().is_some());
        assert!(lexer.next().is_some());
        assert_eq!(lexer.next().map(|t| t.kind), Some(TokenKind::Eof));
        assert!(lexer.next().is_none());
    }

    #[test]
    fn test_lexer_unterminated_block_comments_are_slash_star() {
        let source = "/* a /* b */ c /* d".to_string() + &" /*".repeat(2000);
        let tokens = kinds(&source);

        assert_eq!(tokens[0], TokenKind::Id("c".to_string()));
        assert_eq!(tokens[1], TokenKind::Slash);
        assert_eq!(tokens[2], TokenKind::Star);
        assert_eq!(tokens[3], TokenKind::Id("d".to_string()));
        assert_eq!(tokens.len(), 4 + 2 * 2000 + 1);
    }
}
