//! Tokenizer for sweet source text (spec §4.1).

mod cursor;
mod error;
mod lexer;
mod token;

pub use error::LexError;
pub use lexer::lex;
pub use token::{keyword, Token, TokenKind};
