//! Recursive-descent parser with Pratt-style expression parsing
//! (spec §4.2). Consumes the token stream produced by `sweetc-lex` and
//! produces an ordered list of top-level [`ast::TopLevel`] items.

pub mod ast;
mod error;
mod expr;
mod items;
mod stmt;
mod types;

pub use ast::*;
pub use error::ParseError;

use sweetc_lex::{Token, TokenKind};
use sweetc_util::Span;

pub fn parse(tokens: Vec<Token>) -> Result<Vec<TopLevel>, ParseError> {
    Parser::new(tokens).parse_program()
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn parse_program(&mut self) -> Result<Vec<TopLevel>, ParseError> {
        let mut items = Vec::new();
        while !self.at(TokenKind::Eof) {
            items.push(self.parse_top_level()?);
        }
        Ok(items)
    }

    fn peek(&self) -> &TokenKind {
        &self.tokens[self.pos].kind
    }

    fn peek_span(&self) -> Span {
        self.tokens[self.pos].span
    }

    fn prev_span(&self) -> Span {
        self.tokens[self.pos.saturating_sub(1)].span
    }

    fn at(&self, kind: TokenKind) -> bool {
        *self.peek() == kind
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos];
        if !matches!(token.kind, TokenKind::Eof) {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if self.at(kind) {
            Ok(self.advance())
        } else {
            Err(ParseError::UnexpectedToken {
                expected: format!("{kind}"),
                got: *self.peek(),
                span: self.peek_span(),
            })
        }
    }

    fn expect_ident(&mut self) -> Result<sweetc_util::Symbol, ParseError> {
        match *self.peek() {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(name)
            }
            other => Err(ParseError::UnexpectedToken {
                expected: "identifier".to_string(),
                got: other,
                span: self.peek_span(),
            }),
        }
    }
}
