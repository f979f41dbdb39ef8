//! Compiler front end for Prospero, a small scripting language for
//! interactive narrative scenes.
//!
//! The library turns raw script text into a validated syntax tree: scenes,
//! clips, statements, and expressions. Executing the tree, loading files,
//! and presenting anything on screen are a consumer's business.

pub mod analysis;
pub mod ast;
pub mod config;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::Script;
pub use error::CompilerError;

use lexer::Scanner;
use parser::Parser;

/// Compile one complete script source into a [`Script`], or fail with the
/// first lexical or syntax error. Both stages run eagerly: the whole token
/// sequence is materialized before parsing begins.
pub fn compile(source: &str) -> Result<Script, CompilerError> {
    let tokens = Scanner::new(source).tokenize()?;
    let script = Parser::new(tokens).parse()?;
    Ok(script)
}
