use crate::token::{Kind, Token};
use std::error::Error;
use std::fmt;

/// Umbrella error for the file-level compile pipeline.
#[derive(Debug)]
pub enum CompilerError {
    FileNotFound(String),
    Io(std::io::Error),
    Lexical(LexicalError),
    Syntax(SyntaxError),
}

impl Error for CompilerError {}

impl fmt::Display for CompilerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CompilerError::FileNotFound(err) => writeln!(f, "FileNotFoundError: {}", err),
            CompilerError::Io(err) => writeln!(f, "IOError: {}", err),
            CompilerError::Lexical(err) => write!(f, "{}", err),
            CompilerError::Syntax(err) => write!(f, "{}", err),
        }
    }
}

impl From<std::io::Error> for CompilerError {
    fn from(err: std::io::Error) -> Self {
        CompilerError::Io(err)
    }
}

impl From<LexicalError> for CompilerError {
    fn from(err: LexicalError) -> Self {
        CompilerError::Lexical(err)
    }
}

impl From<SyntaxError> for CompilerError {
    fn from(err: SyntaxError) -> Self {
        CompilerError::Syntax(err)
    }
}

/// Fatal scanning failure. Only raised for an unterminated string literal;
/// `line` is the line the string opened on.
#[derive(Debug, PartialEq)]
pub struct LexicalError {
    pub message: String,
    pub line: usize,
}

impl Error for LexicalError {}

impl LexicalError {
    pub fn new(message: impl Into<String>, line: usize) -> Self {
        Self {
            message: message.into(),
            line,
        }
    }
}

impl fmt::Display for LexicalError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "LexicalError: {}\n  --> line {}", self.message, self.line)
    }
}

/// Fatal grammar violation at the parser cursor. Carries the offending
/// token's literal text alongside the expectation message.
#[derive(Debug, PartialEq)]
pub struct SyntaxError {
    pub message: String,
    pub found: String,
    pub line: usize,
}

impl Error for SyntaxError {}

impl SyntaxError {
    pub fn new(message: impl Into<String>, found: impl Into<String>, line: usize) -> Self {
        Self {
            message: message.into(),
            found: found.into(),
            line,
        }
    }

    pub fn from_token(token: &Token, message: impl Into<String>) -> Self {
        let found = if token.kind == Kind::Eof {
            "end of script".to_string()
        } else {
            token.literal.clone()
        };
        Self {
            message: message.into(),
            found,
            line: token.line,
        }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "SyntaxError: {}\n  --> line {}, at '{}'",
            self.message, self.line, self.found
        )
    }
}
