//! Lexical analysis for Turtle documents

mod lexer;
mod token;

pub use lexer::{tokenize, Lexer};
pub use token::{Token, TokenKind};
