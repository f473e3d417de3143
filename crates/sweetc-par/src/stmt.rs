//! Statement parsing inside a function body (spec §4.2).

use crate::ast::*;
use crate::error::ParseError;
use crate::Parser;
use sweetc_lex::TokenKind;

impl Parser {
    pub(crate) fn parse_block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.expect(TokenKind::LBrace)?;
        let mut stmts = Vec::new();
        while !self.at(TokenKind::RBrace) {
            stmts.push(self.parse_stmt()?);
        }
        self.expect(TokenKind::RBrace)?;
        Ok(stmts)
    }

    fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        match self.peek() {
            TokenKind::Var => Ok(Stmt::VariableDef(self.parse_variable_def(false)?)),
            TokenKind::Return => Ok(Stmt::Return(self.parse_return()?)),
            TokenKind::Asm => Ok(Stmt::Asm(self.parse_asm_block()?)),
            _ => {
                let expr = self.parse_expr()?;
                self.expect(TokenKind::Semicolon)?;
                Ok(Stmt::Expr(expr))
            }
        }
    }

    fn parse_return(&mut self) -> Result<ReturnNode, ParseError> {
        let start = self.peek_span();
        self.expect(TokenKind::Return)?;
        let expr = if self.at(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        let end = self.expect(TokenKind::Semicolon)?;
        Ok(ReturnNode {
            expr,
            span: start.merge(end.span),
        })
    }

    pub(crate) fn parse_variable_def(&mut self, public: bool) -> Result<VariableDef, ParseError> {
        let start = self.peek_span();
        self.expect(TokenKind::Var)?;
        let name = self.expect_ident()?;
        self.expect(TokenKind::Colon)?;
        let ty = self.parse_type()?;
        let value = if self.eat(TokenKind::Assign) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        let end = self.expect(TokenKind::Semicolon)?;
        Ok(VariableDef {
            name,
            ty,
            value,
            public,
            span: start.merge(end.span),
        })
    }

    /// `asm { … }`: tokens are consumed verbatim until the matching `}`,
    /// grouped into instruction strings at each `;`.
    pub(crate) fn parse_asm_block(&mut self) -> Result<AsmBlock, ParseError> {
        let start = self.peek_span();
        self.expect(TokenKind::Asm)?;
        self.expect(TokenKind::LBrace)?;

        let mut instructions = Vec::new();
        let mut current = String::new();
        loop {
            if self.at(TokenKind::RBrace) {
                break;
            }
            if self.at(TokenKind::Eof) {
                return Err(ParseError::MalformedAsm {
                    reason: "unterminated asm block".to_string(),
                    span: self.peek_span(),
                });
            }
            if self.eat(TokenKind::Semicolon) {
                if !current.is_empty() {
                    instructions.push(std::mem::take(&mut current));
                }
                continue;
            }
            let token = self.advance();
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(&token.kind.to_string());
        }
        if !current.is_empty() {
            instructions.push(current);
        }

        let end = self.expect(TokenKind::RBrace)?;
        Ok(AsmBlock {
            instructions,
            span: start.merge(end.span),
        })
    }
}
