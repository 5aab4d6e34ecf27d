//! Lexer token types

use serde::Serialize;
use std::fmt;

// ============================================================================
// LEXER TYPES
// ============================================================================

/// Reserved words of the language. None of them may be used as an identifier.
pub const RESERVED_KEYWORDS: [&str; 28] = [
    "typedef",
    "as",
    "entity",
    "extends",
    "end",
    "in",
    "implementation",
    "for",
    "matching",
    "index",
    "implement",
    "using",
    "when",
    "and",
    "or",
    "not",
    "true",
    "false",
    "import",
    "is",
    "defined",
    "dict",
    "null",
    "undef",
    "parents",
    "if",
    "else",
    "elif",
];

/// Token kinds for the configuration language.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TokenKind {
    // Keywords
    Typedef,
    As,
    Entity,
    Extends,
    End,
    In,
    Implementation,
    For,
    Matching,
    Index,
    Implement,
    Using,
    When,
    And,
    Or,
    Not,
    True,
    False,
    Import,
    Is,
    Defined,
    Dict,
    Null,
    Undef,
    Parents,
    If,
    Else,
    Elif,

    // Names
    Id(String),
    ClassId(String),

    // Literals (raw source text, decoded by the parser)
    Integer(String),
    Float(String),
    String(String),
    RawString(String),
    FString(String),
    MultiLineString { quotes: usize, raw: String },
    /// `matching /pattern/`; `slash_offset` is the byte offset of the
    /// opening slash inside the token text.
    Regex { pattern: String, slash_offset: usize },

    // Comparison
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,

    // Relations
    RelBoth,
    RelRight,
    RelLeft,

    // Arithmetic and assignment
    Assign,
    PlusAssign,
    Plus,
    Minus,
    Star,
    DoubleStar,
    Slash,
    Percent,

    // Delimiters
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Colon,
    DoubleColon,
    Comma,
    Dot,
    Question,

    // Hidden channel
    Whitespace,
    Comment,

    // Special
    Eof,
    Error(String),
}

impl TokenKind {
    /// Keyword token for `word`, if it is reserved.
    pub fn keyword(word: &str) -> Option<TokenKind> {
        let kind = match word {
            "typedef" => TokenKind::Typedef,
            "as" => TokenKind::As,
            "entity" => TokenKind::Entity,
            "extends" => TokenKind::Extends,
            "end" => TokenKind::End,
            "in" => TokenKind::In,
            "implementation" => TokenKind::Implementation,
            "for" => TokenKind::For,
            "matching" => TokenKind::Matching,
            "index" => TokenKind::Index,
            "implement" => TokenKind::Implement,
            "using" => TokenKind::Using,
            "when" => TokenKind::When,
            "and" => TokenKind::And,
            "or" => TokenKind::Or,
            "not" => TokenKind::Not,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "import" => TokenKind::Import,
            "is" => TokenKind::Is,
            "defined" => TokenKind::Defined,
            "dict" => TokenKind::Dict,
            "null" => TokenKind::Null,
            "undef" => TokenKind::Undef,
            "parents" => TokenKind::Parents,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "elif" => TokenKind::Elif,
            _ => return None,
        };
        Some(kind)
    }

    /// Source spelling of a keyword token.
    pub fn keyword_text(&self) -> Option<&'static str> {
        let text = match self {
            TokenKind::Typedef => "typedef",
            TokenKind::As => "as",
            TokenKind::Entity => "entity",
            TokenKind::Extends => "extends",
            TokenKind::End => "end",
            TokenKind::In => "in",
            TokenKind::Implementation => "implementation",
            TokenKind::For => "for",
            TokenKind::Matching => "matching",
            TokenKind::Index => "index",
            TokenKind::Implement => "implement",
            TokenKind::Using => "using",
            TokenKind::When => "when",
            TokenKind::And => "and",
            TokenKind::Or => "or",
            TokenKind::Not => "not",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Import => "import",
            TokenKind::Is => "is",
            TokenKind::Defined => "defined",
            TokenKind::Dict => "dict",
            TokenKind::Null => "null",
            TokenKind::Undef => "undef",
            TokenKind::Parents => "parents",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::Elif => "elif",
            _ => return None,
        };
        Some(text)
    }

    pub fn is_keyword(&self) -> bool {
        self.keyword_text().is_some()
    }

    /// Tokens the parser never sees.
    pub fn is_hidden(&self) -> bool {
        matches!(self, TokenKind::Whitespace | TokenKind::Comment)
    }
}

/// Source location span.
///
/// `start`/`end` are byte offsets; lines and columns are 1-based and
/// `end_column` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
    pub end_line: usize,
    pub end_column: usize,
}

impl Default for Span {
    fn default() -> Self {
        Self {
            start: 0,
            end: 0,
            line: 1,
            column: 1,
            end_line: 1,
            end_column: 1,
        }
    }
}

/// A token with its kind, raw text and source location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eof => write!(f, "<eof> at {}:{}", self.span.line, self.span.column),
            _ => write!(
                f,
                "{:?} '{}' at {}:{}",
                self.kind, self.text, self.span.line, self.span.column
            ),
        }
    }
}
