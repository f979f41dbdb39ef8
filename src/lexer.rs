//! Hand-written maximal-munch scanner for scene scripts.
//!
//! The whole source is consumed in one left-to-right pass and materialized
//! as an `eof`-terminated token sequence before parsing starts. Keywords are
//! matched case-insensitively; characters that fit no lexeme class are
//! skipped like whitespace. The only fatal case is a string literal that is
//! still open at end of input.

use crate::error::LexicalError;
use crate::token::{Kind, Token};

pub struct Scanner {
    chars: Vec<char>,
    tokens: Vec<Token>,
    start: usize,
    current: usize,
    line: usize,
}

impl Scanner {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            tokens: Vec::new(),
            start: 0,
            current: 0,
            line: 1,
        }
    }

    /// Consume the entire input and return the token sequence, terminated by
    /// exactly one `Eof` token.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexicalError> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token()?;
        }
        self.tokens
            .push(Token::new(Kind::Eof, String::new(), self.line));
        Ok(self.tokens)
    }

    fn scan_token(&mut self) -> Result<(), LexicalError> {
        let c = self.advance();
        match c {
            ':' => self.add_token(Kind::Colon),
            ';' => self.add_token(Kind::Semi),
            '[' => self.add_token(Kind::LBracket),
            ']' => self.add_token(Kind::RBracket),
            '(' => self.add_token(Kind::LParen),
            ')' => self.add_token(Kind::RParen),
            '+' => self.add_token(Kind::Add),
            '-' => self.add_token(Kind::Subtract),
            '*' => {
                if self.peek() == '*' {
                    self.advance();
                    self.add_token(Kind::Exp);
                } else {
                    self.add_token(Kind::Multiply);
                }
            }
            '/' => self.add_token(Kind::Div),
            '%' => self.add_token(Kind::Mod),
            '"' => self.string()?,
            ' ' | '\t' | '\r' => {}
            '\n' => self.line += 1,
            c if c.is_ascii_digit() => self.number(),
            c if is_identifier_char(c) => self.identifier(),
            // Anything else is treated like whitespace.
            _ => {}
        }
        Ok(())
    }

    fn string(&mut self) -> Result<(), LexicalError> {
        let opening_line = self.line;
        while self.peek() != '"' && !self.is_at_end() {
            if self.peek() == '\n' {
                self.line += 1;
            }
            self.advance();
        }
        if self.is_at_end() {
            return Err(LexicalError::new("unterminated string literal", opening_line));
        }
        self.advance(); // closing quote
        let literal: String = self.chars[self.start + 1..self.current - 1].iter().collect();
        self.tokens.push(Token::new(Kind::Text, literal, self.line));
        Ok(())
    }

    fn number(&mut self) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }
        // A '.' is only part of the number when a digit follows; otherwise it
        // is left for the next scan step.
        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            self.advance();
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }
        let literal = self.lexeme();
        let value = literal.parse::<f64>().ok();
        self.tokens.push(Token {
            kind: Kind::Number,
            literal,
            value,
            line: self.line,
        });
    }

    fn identifier(&mut self) {
        while is_identifier_char(self.peek()) || self.peek().is_ascii_digit() {
            self.advance();
        }
        let literal = self.lexeme().to_lowercase();
        let kind = Kind::keyword(&literal).unwrap_or(Kind::Identifier);
        self.tokens.push(Token::new(kind, literal, self.line));
    }

    fn lexeme(&self) -> String {
        self.chars[self.start..self.current].iter().collect()
    }

    fn add_token(&mut self, kind: Kind) {
        let literal = self.lexeme();
        self.tokens.push(Token::new(kind, literal, self.line));
    }

    fn advance(&mut self) -> char {
        let c = self.chars[self.current];
        self.current += 1;
        c
    }

    fn peek(&self) -> char {
        if self.is_at_end() {
            '\0'
        } else {
            self.chars[self.current]
        }
    }

    fn peek_next(&self) -> char {
        if self.current + 1 >= self.chars.len() {
            '\0'
        } else {
            self.chars[self.current + 1]
        }
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.chars.len()
    }
}

/// Identifier characters are everything that is not a digit, not one of the
/// fixed punctuation/operator characters, and not whitespace or a quote.
fn is_identifier_char(c: char) -> bool {
    !c.is_ascii_digit()
        && !matches!(
            c,
            ':' | ';' | '[' | ']' | '(' | ')' | '+' | '-' | '*' | '/' | '%' | '"' | ' '
                | '\t' | '\r' | '\n' | '\0'
        )
}
