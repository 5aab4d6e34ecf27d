//! Non-fatal parser notices and the sinks that receive them.

use crate::location::Range;
use serde::Serialize;
use std::fmt;
use std::sync::{Mutex, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum WarningKind {
    /// A backslash sequence that is not a known escape; kept verbatim.
    InvalidEscape,
    /// Accepted syntax that has a modern replacement.
    SyntaxDeprecation,
}

/// A warning raised while parsing. Parsing always continues afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParserWarning {
    pub kind: WarningKind,
    pub location: Range,
    pub value: Option<String>,
    pub message: String,
}

impl ParserWarning {
    pub fn new(
        kind: WarningKind,
        location: Range,
        value: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            location,
            value,
            message: message.into(),
        }
    }
}

impl fmt::Display for ParserWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.location)
    }
}

// ============================================================================
// SINKS
// ============================================================================

/// Receiver for parser warnings.
pub trait WarningSink: Send + Sync {
    fn warn(&self, warning: ParserWarning);
}

/// Forwards warnings to the `tracing` subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingWarnings;

impl WarningSink for TracingWarnings {
    fn warn(&self, warning: ParserWarning) {
        tracing::warn!(
            location = %warning.location,
            kind = ?warning.kind,
            "{}",
            warning.message
        );
    }
}

/// Keeps warnings in memory, in emission order.
#[derive(Debug, Default)]
pub struct CollectingWarnings {
    warnings: Mutex<Vec<ParserWarning>>,
}

impl CollectingWarnings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything collected so far.
    pub fn snapshot(&self) -> Vec<ParserWarning> {
        self.warnings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drain the collected warnings.
    pub fn take(&self) -> Vec<ParserWarning> {
        std::mem::take(&mut *self.warnings.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn len(&self) -> usize {
        self.warnings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl WarningSink for CollectingWarnings {
    fn warn(&self, warning: ParserWarning) {
        self.warnings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(warning);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(message: &str) -> ParserWarning {
        ParserWarning::new(
            WarningKind::InvalidEscape,
            Range::new("f.cf", 1, 5, 1, 10),
            Some("\"\\q\"".to_string()),
            message,
        )
    }

    #[test]
    fn test_collecting_sink_preserves_order() {
        let sink = CollectingWarnings::new();
        sink.warn(sample("first"));
        sink.warn(sample("second"));

        assert_eq!(sink.len(), 2);
        let taken = sink.take();
        assert_eq!(taken[0].message, "first");
        assert_eq!(taken[1].message, "second");
        assert!(sink.is_empty());
    }

    #[test]
    fn test_tracing_sink_accepts_without_subscriber() {
        TracingWarnings.warn(sample("ignored"));
    }

    #[test]
    fn test_warning_display() {
        assert_eq!(
            sample("Invalid escape sequence in string.").to_string(),
            "Invalid escape sequence in string. (f.cf:1:5)"
        );
    }
}
