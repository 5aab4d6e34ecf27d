//! Parser module: tokens to statements

pub mod ast;
pub mod diagnostics;
mod expressions;
pub mod parser;
mod statements;

pub use ast::*;
pub use parser::*;
