//! Rule parsing and in-memory evaluation
//!
//! This module turns rule strings like "(age > 30 AND department = 'Sales')"
//! into an AST and evaluates that AST against a record.

mod ast;
mod evaluator;
pub mod lexer;
pub mod parser;


pub use ast::*;
pub use evaluator::*;
pub(crate) use evaluator::short_circuit;
pub use lexer::{normalize, tokenize, Token};
pub use parser::{parse, parse_rule, Parser};
