//! Syntax service for the Java subset the designer reads and writes.
//!
//! The designer only needs the structure of GUI-building code: the class,
//! its fields and methods, local declarations, calls and `new` expressions.
//! Everything else survives as opaque spans.

pub mod ast;
mod lexer;
mod parser;

pub use ast::*;
pub use lexer::{tokenize, Token, TokenKind};
pub use parser::parse;
