//! VRML 1.0 lexer.
//!
//! Tokenizes the ASCII scene format. Handles:
//! - Braces and brackets
//! - Identifiers (node types, field names, enum values)
//! - Numbers (`1`, `-0.5`, `.25`, `1e-3`)
//! - Double-quoted strings with backslash escapes
//! - The `DEF` and `USE` keywords
//!
//! Whitespace and commas separate tokens. A `#` starts a comment that runs to
//! the end of the line, which also covers the `#VRML V1.0 ascii` header.
//! Characters that start no token are skipped.

use std::iter::Peekable;
use std::str::Chars;

/// Reserved words
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    /// `DEF name`
    Def,
    /// `USE name`
    Use,
}

/// A token in a VRML file.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Left brace `{`.
    OpenBrace,
    /// Right brace `}`.
    CloseBrace,
    /// Left bracket `[`.
    OpenBracket,
    /// Right bracket `]`.
    CloseBracket,
    /// Identifier.
    Identifier(String),
    /// Number literal.
    Number(f64),
    /// String literal (contents without quotes).
    String(String),
    /// Reserved word.
    Keyword(Keyword),
    /// End of input; repeated forever once reached.
    Eof,
}

/// Lexer for VRML 1.0 text.
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input.
    pub fn new(input: &'a str) -> Self {
        Self { chars: input.chars().peekable(), line: 1 }
    }

    /// Current line number (1-indexed).
    pub fn line(&self) -> usize {
        self.line
    }

    /// Get the next token.
    pub fn next_token(&mut self) -> Token {
        loop {
            self.skip_whitespace_and_comments();

            let Some(&ch) = self.chars.peek() else {
                return Token::Eof;
            };

            match ch {
                '{' => return self.single(Token::OpenBrace),
                '}' => return self.single(Token::CloseBrace),
                '[' => return self.single(Token::OpenBracket),
                ']' => return self.single(Token::CloseBracket),
                '"' => {
                    self.chars.next();
                    return Token::String(self.read_string());
                }
                c if c.is_ascii_digit() || matches!(c, '-' | '+' | '.') => return self.read_number(),
                c if c.is_alphabetic() || c == '_' => return self.read_identifier(),
                _ => {
                    self.chars.next();
                }
            }
        }
    }

    /// Tokenize the entire input, excluding the final `Eof`.
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            match self.next_token() {
                Token::Eof => return tokens,
                token => tokens.push(token),
            }
        }
    }

    fn single(&mut self, token: Token) -> Token {
        self.chars.next();
        token
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(&ch) = self.chars.peek() {
            match ch {
                '\n' => {
                    self.line += 1;
                    self.chars.next();
                }
                '#' => {
                    while let Some(&c) = self.chars.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.chars.next();
                    }
                }
                c if c.is_whitespace() || c == ',' => {
                    self.chars.next();
                }
                _ => break,
            }
        }
    }

    fn read_string(&mut self) -> String {
        let mut value = String::new();
        while let Some(c) = self.chars.next() {
            match c {
                '"' => break,
                '\\' => {
                    if let Some(escaped) = self.chars.next() {
                        value.push(escaped);
                    }
                }
                '\n' => {
                    self.line += 1;
                    value.push(c);
                }
                _ => value.push(c),
            }
        }
        value
    }

    fn read_number(&mut self) -> Token {
        let text = self.take_while(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'));
        match text.parse::<f64>() {
            Ok(value) => Token::Number(value),
            Err(_) => Token::Identifier(text),
        }
    }

    fn read_identifier(&mut self) -> Token {
        let text = self.take_while(|c| c.is_alphanumeric() || matches!(c, '_' | '-'));
        match text.as_str() {
            "DEF" => Token::Keyword(Keyword::Def),
            "USE" => Token::Keyword(Keyword::Use),
            _ => Token::Identifier(text),
        }
    }

    fn take_while(&mut self, accept: impl Fn(char) -> bool) -> String {
        let mut text = String::new();
        while let Some(&c) = self.chars.peek() {
            if !accept(c) {
                break;
            }
            text.push(c);
            self.chars.next();
        }
        text
    }
}
