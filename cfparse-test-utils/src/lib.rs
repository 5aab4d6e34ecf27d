//! cfparse Test Utilities
//!
//! Shared test infrastructure for the cfparse workspace:
//! - Proptest generators for identifiers, keywords, constants and model sources
//! - Test fixtures with small, representative models
//! - Parse helpers and assertions for located errors

// Re-export core types for convenience
pub use cfparse_core::{
    CollectingWarnings, LocatableString, Namespace, ParseError, ParseResult, ParserConfig,
    ParserWarning, Range, WarningKind,
};
pub use cfparse_dsl::{parse_source, parse_source_with, Statement, StatementKind, Value};

use std::sync::Arc;

/// Namespace used by every helper in this crate: `test`.
pub fn test_namespace() -> Arc<Namespace> {
    Namespace::from_path("test")
}

/// File name attached to every helper parse.
pub const TEST_FILE: &str = "test.cf";

// ============================================================================
// PARSE HELPERS
// ============================================================================

/// Parse `source`, returning the statements and every warning emitted.
pub fn parse_collecting(source: &str) -> (ParseResult<Vec<Statement>>, Vec<ParserWarning>) {
    let sink = CollectingWarnings::new();
    let result = parse_source(&test_namespace(), TEST_FILE, source, &sink);
    (result, sink.take())
}

/// Parse `source` and panic with the error if it fails.
#[track_caller]
pub fn parse_ok(source: &str) -> Vec<Statement> {
    match parse_collecting(source).0 {
        Ok(statements) => statements,
        Err(e) => panic!("Expected {:?} to parse, got: {}", source, e),
    }
}

/// Parse `source` and panic if it succeeds.
#[track_caller]
pub fn parse_err(source: &str) -> ParseError {
    match parse_collecting(source).0 {
        Ok(statements) => panic!(
            "Expected {:?} to fail, got {} statement(s)",
            source,
            statements.len()
        ),
        Err(e) => e,
    }
}

/// Parse a source that must hold exactly one statement.
#[track_caller]
pub fn parse_single(source: &str) -> Statement {
    let mut statements = parse_ok(source);
    assert_eq!(
        statements.len(),
        1,
        "Expected one statement from {:?}, got {:?}",
        source,
        statements
    );
    statements.remove(0)
}

pub mod generators {
    //! Proptest strategies for generating source fragments.

    use super::*;
    use cfparse_dsl::lexer::RESERVED_KEYWORDS;
    use proptest::prelude::*;

    // === Names ===

    /// Lower-case identifier that is not a reserved keyword.
    pub fn arb_identifier() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9_]{0,12}".prop_filter("reserved keyword", |name| {
            !RESERVED_KEYWORDS.contains(&name.as_str())
        })
    }

    /// Capitalised entity name.
    pub fn arb_class_name() -> impl Strategy<Value = String> {
        "[A-Z][A-Za-z0-9_]{0,12}"
    }

    /// `a::b::C` style class reference.
    pub fn arb_class_ref() -> impl Strategy<Value = String> {
        (prop::collection::vec(arb_identifier(), 0..3), arb_class_name()).prop_map(
            |(mut path, class)| {
                path.push(class);
                path.join("::")
            },
        )
    }

    /// Any reserved keyword.
    pub fn arb_keyword() -> impl Strategy<Value = &'static str> {
        prop::sample::select(RESERVED_KEYWORDS.to_vec())
    }

    /// Reserved keywords that are not complete expressions on their own.
    pub fn arb_non_literal_keyword() -> impl Strategy<Value = &'static str> {
        let keywords: Vec<&'static str> = RESERVED_KEYWORDS
            .iter()
            .copied()
            .filter(|kw| !matches!(*kw, "true" | "false" | "null"))
            .collect();
        prop::sample::select(keywords)
    }

    // === Constants ===

    /// A constant as source text together with the value it folds to.
    pub fn arb_constant() -> impl Strategy<Value = (String, Value)> {
        prop_oneof![
            any::<i32>().prop_map(|i| (i.to_string(), Value::Int(i as i64))),
            any::<bool>().prop_map(|b| (b.to_string(), Value::Bool(b))),
            Just(("null".to_string(), Value::Null)),
            "[a-zA-Z0-9 _.,:;!?-]{0,20}".prop_map(|s| (format!("\"{}\"", s), Value::String(s))),
            (0u32..1000, 0u32..100).prop_map(|(whole, frac)| {
                let text = format!("{}.{}", whole, frac);
                let value = text.parse::<f64>().unwrap_or_default();
                (text, Value::Float(value))
            }),
        ]
    }

    // === Sources ===

    /// `name = constant`
    pub fn arb_assignment() -> impl Strategy<Value = (String, String, Value)> {
        (arb_identifier(), arb_constant()).prop_map(|(name, (text, value))| {
            (format!("{} = {}", name, text), name, value)
        })
    }

    /// An entity definition with distinct attribute names.
    pub fn arb_entity_source() -> impl Strategy<Value = (String, String, usize)> {
        (
            arb_class_name(),
            prop::collection::btree_set(arb_identifier(), 0..6),
        )
            .prop_map(|(name, attributes)| {
                let mut source = format!("entity {}:\n", name);
                for attribute in &attributes {
                    source.push_str(&format!("    string {}\n", attribute));
                }
                source.push_str("end\n");
                (source, name, attributes.len())
            })
    }

    /// Several top-level statements, one per line.
    pub fn arb_model_source() -> impl Strategy<Value = (String, usize)> {
        prop::collection::vec(
            prop_oneof![
                arb_assignment().prop_map(|(source, _, _)| source),
                arb_entity_source().prop_map(|(source, _, _)| source),
                (arb_class_ref(), arb_identifier())
                    .prop_map(|(class, attr)| format!("x = {}({}=1)", class, attr)),
            ],
            0..8,
        )
        .prop_map(|statements| (statements.join("\n"), statements.len()))
    }
}

pub mod fixtures {
    //! Pre-built models for common testing scenarios.

    /// One entity, one implementation, one implement statement.
    pub const ENTITY_MODEL: &str = r#"
entity Host:
    """ A managed machine """
    string name
    string[] tags = ["web"]
    int port = 22
    bool? enabled = null
end

implementation hostConfig for Host:
    self.port = 2222
end

implement Host using hostConfig
"#;

    /// Bidirectional, unidirectional and annotated relations.
    pub const RELATION_MODEL: &str = r#"
entity Host:
end

entity File:
end

Host.files [0:] -- File.host [1]
File.owner [1] -- Host
Host.peers [0:] annotation Host.peered_by [0:]
"#;

    /// Control flow, comprehensions and interpolation inside an implementation.
    pub const CONTROL_FLOW_MODEL: &str = r#"
implementation render for Host:
    for tag in self.tags:
        if tag == "web":
            motd = "Hello {{ self.name }}"
        elif tag in ["db", "cache"]:
            motd = f"{tag} server"
        else:
            motd = null
        end
    end
    names = [h.name for h in self.peers if h.name != self.name]
end
"#;

    /// A model with a deprecated relation and an invalid escape.
    pub const WARNING_MODEL: &str = r#"
Host hosts [0:] -- [1] Cluster cluster
x = "\q"
"#;
}

pub mod assertions {
    //! Assertion functions for located parse results.

    use super::*;

    /// Assert that a result is Ok.
    #[track_caller]
    pub fn assert_ok<T: std::fmt::Debug>(result: &ParseResult<T>) {
        assert!(result.is_ok(), "Expected Ok, got Err: {:?}", result);
    }

    /// Assert that a result is a syntax error with exactly `message`.
    #[track_caller]
    pub fn assert_syntax_error<T: std::fmt::Debug>(result: &ParseResult<T>, message: &str) {
        match result {
            Err(e) => assert_eq!(e.message(), message, "Wrong message for {:?}", e),
            Ok(v) => panic!("Expected syntax error {:?}, got Ok: {:?}", message, v),
        }
    }

    /// Assert the `(lnr, start_char, end_lnr, end_char)` of a range.
    #[track_caller]
    pub fn assert_range(
        range: &Range,
        lnr: usize,
        start_char: usize,
        end_lnr: usize,
        end_char: usize,
    ) {
        assert_eq!(
            (range.lnr, range.start_char, range.end_lnr, range.end_char),
            (lnr, start_char, end_lnr, end_char),
            "Wrong range {}",
            range
        );
    }

    /// Assert that exactly one warning of `kind` was emitted.
    #[track_caller]
    pub fn assert_single_warning(warnings: &[ParserWarning], kind: WarningKind) -> &ParserWarning {
        assert_eq!(warnings.len(), 1, "Expected one warning, got {:?}", warnings);
        assert_eq!(warnings[0].kind, kind, "Wrong warning kind");
        &warnings[0]
    }
}

// ============================================================================
// TESTS
// ============================================================================
