//! Source positions attached to tokens, AST nodes and diagnostics.

use crate::namespace::Namespace;
use serde::Serialize;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// File name used for nodes the parser synthesizes (e.g. implicit parents).
pub const INTERNAL_FILE: &str = "__internal__";

// ============================================================================
// RANGE / LOCATION
// ============================================================================

/// A region of a source file.
///
/// Lines and columns are 1-based. `end_char` is exclusive, so a single
/// character at column 4 spans `4..5`. Columns count chars, not bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Range {
    pub file: Arc<str>,
    pub lnr: usize,
    pub start_char: usize,
    pub end_lnr: usize,
    pub end_char: usize,
}

impl Range {
    pub fn new(
        file: impl Into<Arc<str>>,
        lnr: usize,
        start_char: usize,
        end_lnr: usize,
        end_char: usize,
    ) -> Self {
        Self {
            file: file.into(),
            lnr,
            start_char,
            end_lnr,
            end_char,
        }
    }

    /// Zero-width range at the very start of `file`.
    pub fn file_start(file: impl Into<Arc<str>>) -> Self {
        Self::new(file, 1, 1, 1, 1)
    }

    /// Location of nodes that do not originate from any source file.
    pub fn internal() -> Self {
        Self::file_start(INTERNAL_FILE)
    }

    pub fn is_internal(&self) -> bool {
        &*self.file == INTERNAL_FILE
    }

    /// Range from the start of `self` to the end of `other`.
    pub fn merge(&self, other: &Range) -> Range {
        Range {
            file: self.file.clone(),
            lnr: self.lnr,
            start_char: self.start_char,
            end_lnr: other.end_lnr,
            end_char: other.end_char,
        }
    }

    /// Column width of a single-line range (0 for multi-line ranges).
    pub fn width(&self) -> usize {
        if self.lnr == self.end_lnr {
            self.end_char.saturating_sub(self.start_char)
        } else {
            0
        }
    }

    pub fn location(&self) -> Location {
        Location {
            file: self.file.clone(),
            lnr: self.lnr,
        }
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.lnr, self.start_char)
    }
}

/// Line-granular position, used where a column is meaningless.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Location {
    pub file: Arc<str>,
    pub lnr: usize,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.lnr)
    }
}

// ============================================================================
// LOCATABLE STRING
// ============================================================================

/// An identifier or literal fragment together with where it was written.
///
/// `lexpos` is the byte offset of the originating token and is monotonic
/// within a file, which keeps source order recoverable after desugaring.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocatableString {
    pub value: String,
    pub location: Range,
    pub lexpos: usize,
    pub namespace: Arc<Namespace>,
}

impl LocatableString {
    pub fn new(
        value: impl Into<String>,
        location: Range,
        lexpos: usize,
        namespace: Arc<Namespace>,
    ) -> Self {
        Self {
            value: value.into(),
            location,
            lexpos,
            namespace,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl Deref for LocatableString {
    type Target = str;

    fn deref(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for LocatableString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl PartialEq<str> for LocatableString {
    fn eq(&self, other: &str) -> bool {
        self.value == other
    }
}

impl PartialEq<&str> for LocatableString {
    fn eq(&self, other: &&str) -> bool {
        self.value == *other
    }
}

// ============================================================================
// TESTS
// ============================================================================
