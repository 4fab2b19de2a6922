//! df-expr: expression analysis for node expressions.
//!
//! Contains:
//! - lexer / parser (expression text to syntax tree)
//! - scope (which reads are free variables)
//! - printer (canonical text)
//! - analyzer (cached free variables and substitution)

pub mod analyzer;
pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod printer;
pub mod scope;

pub use analyzer::{Analyzer, free_variables, substitute};
pub use ast::Expr;
pub use error::{ParseError, ParseResult};
pub use parser::parse;
pub use printer::unparse;
