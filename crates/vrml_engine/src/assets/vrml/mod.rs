//! VRML 1.0 text format: lexer and parser

pub mod lexer;
pub mod parser;

pub use lexer::{Keyword, Lexer, Token};
pub use parser::{parse, ParseStats, Parser};
