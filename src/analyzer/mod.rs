//! The Analyzer module is in charge of taking IPPcode22
//! source text and producing a validated Program from the
//! AST submodule.
//!
//! It does this in a single pass over the input: the lexer strips
//! comments and splits each line, the parser checks every instruction
//! against the registry's signatures and the AST serializes to XML.
//! The first error stops the pass.

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod registry;

use std::io::BufRead;

pub use self::ast::Program;
pub use self::error::ParseError;

/// Reads a whole IPPcode22 source and returns the validated program.
pub fn parse<R: BufRead>(reader: R) -> Result<Program, ParseError> {
    parser::Parser::new(reader).run()
}
