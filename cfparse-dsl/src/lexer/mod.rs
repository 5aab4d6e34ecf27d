//! Lexer module for the configuration language

pub mod token;
pub mod scanner;

pub use token::*;
pub use scanner::*;
