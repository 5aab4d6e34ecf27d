/// Model Parser Tracer - Shows the flow through Source → Tokens → AST
///
/// Usage: cargo run --bin trace_parser <model-file> [namespace]
///
/// Set RUST_LOG=debug to also see the parser's own tracing output.

use cfparse_dsl::{parse_source, CollectingWarnings, Lexer, Namespace};
use std::fs;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: cargo run --bin trace_parser <model-file> [namespace]");
        eprintln!();
        eprintln!("Example:");
        eprintln!("  cargo run --bin trace_parser libs/std/model/_init.cf std");
        std::process::exit(1);
    }

    let path = &args[1];
    let namespace = args
        .get(2)
        .map(|name| Namespace::from_path(name))
        .unwrap_or_else(Namespace::root);

    println!("╔═══════════════════════════════════════════════════════════════");
    println!("║ MODEL PARSER TRACER");
    println!("╚═══════════════════════════════════════════════════════════════\n");

    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("❌ Failed to read {}: {}", path, e);
            std::process::exit(1);
        }
    };

    // Step 1: Tokens
    println!("🔍 TOKENS:");
    println!("─────────────────────────────────────────────────────────────");
    for token in Lexer::new(&content).tokenize() {
        println!(
            "{:>4}:{:<4} {:?}",
            token.span.line, token.span.column, token.kind
        );
    }
    println!();

    // Step 2: AST
    println!("🌳 AST:");
    println!("─────────────────────────────────────────────────────────────");
    let warnings = CollectingWarnings::new();
    let result = parse_source(&namespace, path, &content, &warnings);
    match &result {
        Ok(statements) => match serde_json::to_string_pretty(statements) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("❌ Failed to serialize AST: {}", e),
        },
        Err(e) => println!("❌ {}", e),
    }
    println!();

    // Step 3: Warnings
    let collected = warnings.take();
    println!("⚠️  WARNINGS ({}):", collected.len());
    println!("─────────────────────────────────────────────────────────────");
    for warning in &collected {
        println!("  {}", warning);
    }

    if result.is_err() {
        std::process::exit(2);
    }
    println!("\n✅ Parsed {} successfully", path);
}
