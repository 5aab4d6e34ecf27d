//! cfparse Core - Shared Front-End Types
//!
//! Pure data structures shared by the lexer, the parser and their callers.
//! This crate contains ONLY data types plus their small helpers - no grammar.
//!
//! ```text
//! Range / Location        source positions (1-based, end column exclusive)
//! Namespace               module identity stamped on every node
//! LocatableString         identifier + position + namespace
//! ParseError              the single fatal error of a failed parse
//! ParserWarning           non-fatal notices routed through a WarningSink
//! ParserConfig            cache and recursion settings
//! ```

pub mod config;
pub mod error;
pub mod location;
pub mod namespace;
pub mod warning;

// Re-export key types for convenience
pub use config::ParserConfig;
pub use error::{ConfigError, ParseError, ParseResult};
pub use location::{LocatableString, Location, Range, INTERNAL_FILE};
pub use namespace::Namespace;
pub use warning::{CollectingWarnings, ParserWarning, TracingWarnings, WarningKind, WarningSink};
