//! Top-level item parsing: `import`, `extern`, `fn`/`pub fn`,
//! `var`/`pub var`, `asm` (spec §4.2).

use crate::ast::*;
use crate::error::ParseError;
use crate::Parser;
use sweetc_lex::TokenKind;

impl Parser {
    pub(crate) fn parse_top_level(&mut self) -> Result<TopLevel, ParseError> {
        match *self.peek() {
            TokenKind::Import => Ok(TopLevel::Import(self.parse_import()?)),
            TokenKind::Extern => Ok(TopLevel::Extern(self.parse_extern()?)),
            TokenKind::Asm => Ok(TopLevel::Asm(self.parse_asm_block()?)),
            TokenKind::Var => Ok(TopLevel::Variable(self.parse_variable_def(false)?)),
            TokenKind::Fn => Ok(TopLevel::Function(self.parse_function(false)?)),
            TokenKind::Pub => {
                self.advance();
                match *self.peek() {
                    TokenKind::Fn => Ok(TopLevel::Function(self.parse_function(true)?)),
                    TokenKind::Var => Ok(TopLevel::Variable(self.parse_variable_def(true)?)),
                    other => Err(ParseError::UnexpectedToken {
                        expected: "fn or var after pub".to_string(),
                        got: other,
                        span: self.peek_span(),
                    }),
                }
            }
            other => Err(ParseError::UnexpectedToken {
                expected: "top-level item".to_string(),
                got: other,
                span: self.peek_span(),
            }),
        }
    }

    fn parse_function(&mut self, public: bool) -> Result<FunctionDef, ParseError> {
        let start = self.peek_span();
        self.expect(TokenKind::Fn)?;
        let name = self.expect_ident()?;
        self.expect(TokenKind::LParen)?;

        let mut parameters = Vec::new();
        if !self.at(TokenKind::RParen) {
            loop {
                let pspan = self.peek_span();
                let pname = self.expect_ident()?;
                self.expect(TokenKind::Colon)?;
                let ty = self.parse_type()?;
                parameters.push(Parameter {
                    name: pname,
                    ty,
                    is_variadic: false,
                    span: pspan,
                });
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;

        let return_type = if self.eat(TokenKind::Arrow) {
            Some(self.parse_type()?)
        } else {
            None
        };

        let body = self.parse_block()?;
        let end = self.prev_span();
        Ok(FunctionDef {
            name,
            parameters,
            return_type,
            body,
            public,
            span: start.merge(end),
        })
    }

    fn parse_import(&mut self) -> Result<ImportNode, ParseError> {
        let start = self.peek_span();
        self.expect(TokenKind::Import)?;

        let mut parts = vec![self.expect_ident()?];
        while self.eat(TokenKind::Dot) {
            parts.push(self.expect_ident()?);
        }

        let imported_symbols = if self.eat(TokenKind::Colon) {
            let mut syms = vec![self.expect_ident()?];
            while self.eat(TokenKind::Comma) {
                syms.push(self.expect_ident()?);
            }
            Some(syms)
        } else {
            None
        };

        let end = self.expect(TokenKind::Semicolon)?;
        Ok(ImportNode {
            parts,
            imported_symbols,
            span: start.merge(end.span),
        })
    }

    fn parse_extern(&mut self) -> Result<ExternDecl, ParseError> {
        let start = self.peek_span();
        self.expect(TokenKind::Extern)?;
        let name = self.expect_ident()?;
        self.expect(TokenKind::LParen)?;

        let mut parameters = Vec::new();
        let mut is_variadic = false;
        if !self.at(TokenKind::RParen) {
            loop {
                if self.eat(TokenKind::Dots) {
                    is_variadic = true;
                    if !self.at(TokenKind::RParen) {
                        return Err(ParseError::VariadicNotLast { span: self.peek_span() });
                    }
                    break;
                }
                parameters.push(self.parse_type()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;

        let return_type = if self.eat(TokenKind::Arrow) {
            Some(self.parse_type()?)
        } else {
            None
        };
        let end = self.expect(TokenKind::Semicolon)?;
        Ok(ExternDecl {
            name,
            is_variadic,
            return_type,
            parameters,
            is_variable: false,
            span: start.merge(end.span),
        })
    }
}
