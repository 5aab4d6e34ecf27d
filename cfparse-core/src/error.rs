//! Error types for front-end operations

use crate::location::Range;
use thiserror::Error;

/// The fatal error of a failed parse.
///
/// Exactly one is reported per file. Every variant exposes the same
/// `{location, value, message}` triple through the accessors below.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Syntax error: {message} ({location})")]
    Syntax {
        location: Range,
        value: Option<String>,
        message: String,
    },

    #[error("Syntax error: Illegal character '{character}' ({location})")]
    IllegalCharacter { location: Range, character: char },

    #[error(
        "Syntax error: invalid namespace access `{name}`. The '.' separator is reserved for \
         attribute and relation access. Did you mean: `{suggestion}` ({location})"
    )]
    InvalidNamespaceAccess {
        location: Range,
        name: String,
        suggestion: String,
    },

    #[error("Syntax error: unable to read {path}: {reason} ({location})")]
    Io {
        location: Range,
        path: String,
        reason: String,
    },

    #[error("Syntax error: {message} ({location})")]
    Internal { location: Range, message: String },
}

impl ParseError {
    pub fn syntax(location: Range, message: impl Into<String>) -> Self {
        ParseError::Syntax {
            location,
            value: None,
            message: message.into(),
        }
    }

    pub fn syntax_with_value(
        location: Range,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ParseError::Syntax {
            location,
            value: Some(value.into()),
            message: message.into(),
        }
    }

    /// `a.B` written where `a::B` was meant.
    pub fn invalid_namespace_access(location: Range, name: impl Into<String>) -> Self {
        let name = name.into();
        let suggestion = name.replace('.', "::");
        ParseError::InvalidNamespaceAccess {
            location,
            name,
            suggestion,
        }
    }

    pub fn location(&self) -> &Range {
        match self {
            ParseError::Syntax { location, .. }
            | ParseError::IllegalCharacter { location, .. }
            | ParseError::InvalidNamespaceAccess { location, .. }
            | ParseError::Io { location, .. }
            | ParseError::Internal { location, .. } => location,
        }
    }

    /// The offending lexeme, when one is known.
    pub fn value(&self) -> Option<String> {
        match self {
            ParseError::Syntax { value, .. } => value.clone(),
            ParseError::IllegalCharacter { character, .. } => Some(character.to_string()),
            ParseError::InvalidNamespaceAccess { name, .. } => Some(name.clone()),
            ParseError::Io { path, .. } => Some(path.clone()),
            ParseError::Internal { .. } => None,
        }
    }

    /// The message without the `Syntax error:` prefix and location suffix.
    pub fn message(&self) -> String {
        match self {
            ParseError::Syntax { message, .. } | ParseError::Internal { message, .. } => {
                message.clone()
            }
            ParseError::IllegalCharacter { character, .. } => {
                format!("Illegal character '{}'", character)
            }
            ParseError::InvalidNamespaceAccess {
                name, suggestion, ..
            } => format!(
                "invalid namespace access `{}`. The '.' separator is reserved for attribute \
                 and relation access. Did you mean: `{}`",
                name, suggestion
            ),
            ParseError::Io { path, reason, .. } => format!("unable to read {}: {}", path, reason),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Malformed configuration: {reason}")]
    Malformed { reason: String },
}

/// Result type alias for front-end operations.
pub type ParseResult<T> = Result<T, ParseError>;

// =============================================================================
// TESTS
// =============================================================================
