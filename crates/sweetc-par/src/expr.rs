//! Expression parsing using Pratt parsing (spec §4.2).
//!
//! # Operator precedence (lowest to highest)
//!
//! | Prec | Operators |
//! |---|---|
//! | 1 | `\|\|` |
//! | 2 | `\|` |
//! | 3 | `^` |
//! | 4 | `&&` |
//! | 5 | `&` |
//! | 6 | `==` `!=` |
//! | 7 | `<` `>` `<=` `>=` |
//! | 8 | `+` `-` |
//! | 9 | `*` `/` `%` |
//!
//! Every level is left-associative. Unary `-`, `&`, `*` bind tighter
//! than any binary operator; postfix `as` binds tighter still.

use crate::ast::*;
use crate::error::ParseError;
use crate::Parser;
use sweetc_lex::TokenKind;

#[doc(hidden)]
pub mod bp {
    pub const MIN: u8 = 0;
    pub const LOGICAL_OR: u8 = 2;
    pub const BITWISE_OR: u8 = 4;
    pub const BITWISE_XOR: u8 = 6;
    pub const LOGICAL_AND: u8 = 8;
    pub const BITWISE_AND: u8 = 10;
    pub const COMPARISON: u8 = 12;
    pub const RELATIONAL: u8 = 14;
    pub const ADDITIVE: u8 = 16;
    pub const MULTIPLICATIVE: u8 = 18;
    pub const UNARY: u8 = 20;
    pub const CAST: u8 = 22;
}

fn infix_binding_power(kind: &TokenKind) -> Option<(BinOp, u8)> {
    use TokenKind::*;
    Some(match kind {
        OrOr => (BinOp::LogOr, bp::LOGICAL_OR),
        Pipe => (BinOp::BitOr, bp::BITWISE_OR),
        Caret => (BinOp::BitXor, bp::BITWISE_XOR),
        AndAnd => (BinOp::LogAnd, bp::LOGICAL_AND),
        Amp => (BinOp::BitAnd, bp::BITWISE_AND),
        Eq => (BinOp::Eq, bp::COMPARISON),
        Ne => (BinOp::Ne, bp::COMPARISON),
        Lt => (BinOp::Lt, bp::RELATIONAL),
        Gt => (BinOp::Gt, bp::RELATIONAL),
        Le => (BinOp::Le, bp::RELATIONAL),
        Ge => (BinOp::Ge, bp::RELATIONAL),
        Plus => (BinOp::Add, bp::ADDITIVE),
        Minus => (BinOp::Sub, bp::ADDITIVE),
        Star => (BinOp::Mul, bp::MULTIPLICATIVE),
        Slash => (BinOp::Div, bp::MULTIPLICATIVE),
        Percent => (BinOp::Mod, bp::MULTIPLICATIVE),
        _ => return None,
    })
}

impl Parser {
    pub(crate) fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_expr_bp(bp::MIN)
    }

    fn parse_expr_bp(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        let mut left = self.parse_prefix()?;

        loop {
            let Some((op, left_bp)) = infix_binding_power(self.peek()) else {
                break;
            };
            if left_bp < min_bp {
                break;
            }
            self.advance();
            let right = self.parse_expr_bp(left_bp + 1)?;
            let span = left.span().merge(right.span());
            left = Expr::Binary(BinaryOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
                span,
            });
        }

        Ok(left)
    }

    /// Unary prefix forms, then the primary expression, then any
    /// postfix `as` casts.
    fn parse_prefix(&mut self) -> Result<Expr, ParseError> {
        let start = self.peek_span();
        let expr = match self.peek() {
            TokenKind::Minus => {
                self.advance();
                let operand = self.parse_expr_bp(bp::UNARY)?;
                let span = start.merge(operand.span());
                negate(operand, span)
            }
            TokenKind::Amp => {
                self.advance();
                let operand = self.parse_expr_bp(bp::UNARY)?;
                let span = start.merge(operand.span());
                Expr::Pointer(PointerLiteral {
                    target: PointerTarget::AddressOf(Box::new(operand)),
                    span,
                })
            }
            TokenKind::Star => {
                self.advance();
                let operand = self.parse_expr_bp(bp::UNARY)?;
                let span = start.merge(operand.span());
                Expr::Deref(Dereference {
                    inner: Box::new(operand),
                    span,
                })
            }
            _ => self.parse_postfix_primary()?,
        };
        let expr = self.parse_cast_suffix(expr)?;
        self.parse_assignment_suffix(expr)
    }

    /// `<target> = <value>`, where `target` is a bare identifier or a
    /// dereference of one; any other left side is a parser error.
    fn parse_assignment_suffix(&mut self, expr: Expr) -> Result<Expr, ParseError> {
        if !self.eat(TokenKind::Assign) {
            return Ok(expr);
        }
        let span_start = expr.span();
        let target = match expr {
            Expr::Access(VariableAccess { parts, span }) => match parts.as_slice() {
                [AccessPart::Name(name)] => AssignTarget::Name(*name),
                _ => return Err(ParseError::AssignToIndexed { span }),
            },
            Expr::Deref(deref) if matches!(*deref.inner, Expr::Call(_)) => {
                return Err(ParseError::DerefOfCall { span: deref.span })
            }
            Expr::Deref(deref) => AssignTarget::Deref(deref.inner),
            other => return Err(ParseError::InvalidAssignmentTarget { span: other.span() }),
        };
        let value = self.parse_expr()?;
        let span = span_start.merge(value.span());
        Ok(Expr::Assign(Assignment {
            target,
            value: Box::new(value),
            span,
        }))
    }

    fn parse_cast_suffix(&mut self, mut expr: Expr) -> Result<Expr, ParseError> {
        while self.eat(TokenKind::As) {
            let target_type = self.parse_type()?;
            let span = expr.span();
            expr = Expr::Cast(Cast {
                expr: Box::new(expr),
                target_type,
                span,
            });
        }
        Ok(expr)
    }

    fn parse_postfix_primary(&mut self) -> Result<Expr, ParseError> {
        let primary = self.parse_primary()?;
        match primary {
            Primary::Expr(e) => Ok(e),
            Primary::Access(access) => {
                if self.at(TokenKind::LParen) {
                    let callee = access.leading_name();
                    let span_start = access.span;
                    self.advance();
                    let arguments = self.parse_call_arguments()?;
                    let end = self.prev_span();
                    return Ok(Expr::Call(FunctionCall {
                        callee,
                        arguments,
                        span: span_start.merge(end),
                    }));
                }
                Ok(Expr::Access(access))
            }
        }
    }

    fn parse_call_arguments(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();
        if !self.at(TokenKind::RParen) {
            loop {
                args.push(self.parse_expr()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(args)
    }

    fn parse_primary(&mut self) -> Result<Primary, ParseError> {
        let span = self.peek_span();
        match self.peek().clone() {
            TokenKind::Number(n) => {
                self.advance();
                let value = NumberValue::Int(n);
                Ok(Primary::Expr(Expr::Number(NumberLiteral { value, span })))
            }
            TokenKind::Float(n) => {
                self.advance();
                Ok(Primary::Expr(Expr::Number(NumberLiteral {
                    value: NumberValue::Float(n),
                    span,
                })))
            }
            TokenKind::Char(c) => {
                self.advance();
                Ok(Primary::Expr(Expr::Char(CharLiteral { value: c, span })))
            }
            TokenKind::Str(s) => {
                self.advance();
                Ok(Primary::Expr(Expr::Str(StringLiteral { value: s, span })))
            }
            TokenKind::Bool(b) => {
                self.advance();
                Ok(Primary::Expr(Expr::Bool(BooleanLiteral { value: b, span })))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(Primary::Expr(inner))
            }
            TokenKind::LBracket => {
                self.advance();
                let mut elements = Vec::new();
                if !self.at(TokenKind::RBracket) {
                    loop {
                        elements.push(self.parse_expr()?);
                        if !self.eat(TokenKind::Comma) {
                            break;
                        }
                    }
                }
                self.expect(TokenKind::RBracket)?;
                let end = self.prev_span();
                Ok(Primary::Expr(Expr::Array(ArrayLiteral {
                    elements,
                    span: span.merge(end),
                })))
            }
            TokenKind::Ident(name) if name.as_str() == "null" => {
                self.advance();
                Ok(Primary::Expr(Expr::Pointer(PointerLiteral {
                    target: PointerTarget::Null,
                    span,
                })))
            }
            TokenKind::Ident(name) => {
                self.advance();
                let mut parts = vec![AccessPart::Name(name)];
                let mut end = span;
                loop {
                    if self.eat(TokenKind::Dot) {
                        let member = self.expect_ident()?;
                        parts.push(AccessPart::Name(member));
                        end = self.prev_span();
                    } else if self.eat(TokenKind::LBracket) {
                        let index = self.parse_expr()?;
                        self.expect(TokenKind::RBracket)?;
                        end = self.prev_span();
                        parts.push(AccessPart::Index(Box::new(index)));
                    } else {
                        break;
                    }
                }
                Ok(Primary::Access(VariableAccess {
                    parts,
                    span: span.merge(end),
                }))
            }
            other => Err(ParseError::UnexpectedToken {
                expected: "expression".to_string(),
                got: other,
                span,
            }),
        }
    }
}

/// `-x` folds into the literal itself when `x` is numeric; otherwise it
/// lowers to `0 - x` (spec §4.2).
fn negate(operand: Expr, span: sweetc_util::Span) -> Expr {
    match operand {
        Expr::Number(NumberLiteral { value: NumberValue::Int(n), .. }) => {
            Expr::Number(NumberLiteral { value: NumberValue::Int(-n), span })
        }
        Expr::Number(NumberLiteral { value: NumberValue::Float(n), .. }) => {
            Expr::Number(NumberLiteral { value: NumberValue::Float(-n), span })
        }
        other => Expr::Binary(BinaryOp {
            left: Box::new(Expr::Number(NumberLiteral { value: NumberValue::Int(0), span })),
            op: BinOp::Sub,
            right: Box::new(other),
            span,
        }),
    }
}

enum Primary {
    Expr(Expr),
    Access(VariableAccess),
}

#[cfg(test)]
mod tests {
    use super::*;
    use sweetc_lex::lex;

    fn parse_one(source: &str) -> Expr {
        let tokens = lex(source).unwrap();
        Parser::new(tokens).parse_expr().unwrap()
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let expr = parse_one("1 + 2 * 3");
        let Expr::Binary(top) = expr else { panic!("expected binary") };
        assert_eq!(top.op, BinOp::Add);
        assert!(matches!(*top.right, Expr::Binary(BinaryOp { op: BinOp::Mul, .. })));
    }

    #[test]
    fn parentheses_override_precedence() {
        let expr = parse_one("(1 + 2) * 3");
        let Expr::Binary(top) = expr else { panic!("expected binary") };
        assert_eq!(top.op, BinOp::Mul);
        assert!(matches!(*top.left, Expr::Binary(BinaryOp { op: BinOp::Add, .. })));
    }

    #[test]
    fn relational_binds_tighter_than_equality() {
        // `a == b < c` parses as `a == (b < c)` per the spec's table,
        // where `==`/`!=` sit at a looser precedence than `<`/`>`/`<=`/`>=`.
        let expr = parse_one("a == b < c");
        let Expr::Binary(top) = expr else { panic!("expected binary") };
        assert_eq!(top.op, BinOp::Eq);
        assert!(matches!(*top.right, Expr::Binary(BinaryOp { op: BinOp::Lt, .. })));
    }

    #[test]
    fn left_associative_subtraction() {
        let expr = parse_one("1 - 2 - 3");
        let Expr::Binary(top) = expr else { panic!("expected binary") };
        assert_eq!(top.op, BinOp::Sub);
        assert!(matches!(*top.left, Expr::Binary(BinaryOp { op: BinOp::Sub, .. })));
        assert!(matches!(*top.right, Expr::Number(_)));
    }

    #[test]
    fn unary_minus_folds_into_number_literal() {
        let expr = parse_one("-5");
        assert!(matches!(
            expr,
            Expr::Number(NumberLiteral { value: NumberValue::Int(-5), .. })
        ));
    }

    #[test]
    fn unary_minus_on_non_numeric_lowers_to_subtraction() {
        let expr = parse_one("-x");
        let Expr::Binary(top) = expr else { panic!("expected binary") };
        assert_eq!(top.op, BinOp::Sub);
        assert!(matches!(*top.left, Expr::Number(NumberLiteral { value: NumberValue::Int(0), .. })));
    }

    #[test]
    fn address_of_builds_pointer_literal() {
        let expr = parse_one("&x");
        assert!(matches!(
            expr,
            Expr::Pointer(PointerLiteral { target: PointerTarget::AddressOf(_), .. })
        ));
    }

    #[test]
    fn repeated_dereference_nests() {
        let expr = parse_one("**p");
        let Expr::Deref(outer) = expr else { panic!("expected deref") };
        assert!(matches!(*outer.inner, Expr::Deref(_)));
    }

    #[test]
    fn null_is_a_pointer_literal() {
        let expr = parse_one("null");
        assert!(matches!(expr, Expr::Pointer(PointerLiteral { target: PointerTarget::Null, .. })));
    }

    #[test]
    fn cast_wraps_expression() {
        let expr = parse_one("x as u8");
        let Expr::Cast(cast) = expr else { panic!("expected cast") };
        assert_eq!(cast.target_type.to_string(), "u8");
    }

    #[test]
    fn call_with_member_access_prefix_uses_leading_identifier() {
        let expr = parse_one("foo(1, 2)");
        let Expr::Call(call) = expr else { panic!("expected call") };
        assert_eq!(call.arguments.len(), 2);
    }

    #[test]
    fn assignment_to_bare_identifier() {
        let expr = parse_one("x = 1");
        let Expr::Assign(assign) = expr else { panic!("expected assignment") };
        assert!(matches!(assign.target, AssignTarget::Name(_)));
    }

    #[test]
    fn assignment_to_indexed_target_is_rejected() {
        let tokens = lex("x[0] = 1").unwrap();
        let err = Parser::new(tokens).parse_expr().unwrap_err();
        assert!(matches!(err, ParseError::AssignToIndexed { .. }));
    }

    #[test]
    fn member_access_builds_parts_list() {
        let expr = parse_one("arr.len");
        let Expr::Access(access) = expr else { panic!("expected access") };
        assert_eq!(access.parts.len(), 2);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use sweetc_lex::lex;

    fn parse_one(source: &str) -> Expr {
        let tokens = lex(source).unwrap();
        Parser::new(tokens).parse_expr().unwrap()
    }

    proptest! {
        /// `*` binds tighter than `+` for any pair of integer operands,
        /// regardless of their magnitude — the shape-level counterpart
        /// to `multiplication_binds_tighter_than_addition` above.
        #[test]
        fn multiplication_always_binds_tighter_than_addition(a in 0i64..1000, b in 0i64..1000, c in 0i64..1000) {
            let expr = parse_one(&format!("{a} + {b} * {c}"));
            let Expr::Binary(top) = expr else { panic!("expected binary") };
            prop_assert_eq!(top.op, BinOp::Add);
            prop_assert!(matches!(*top.right, Expr::Binary(BinaryOp { op: BinOp::Mul, .. })));
        }

        /// Parenthesizing the addition always overrides precedence, no
        /// matter which integers are inside.
        #[test]
        fn parentheses_always_override_precedence(a in 0i64..1000, b in 0i64..1000, c in 0i64..1000) {
            let expr = parse_one(&format!("({a} + {b}) * {c}"));
            let Expr::Binary(top) = expr else { panic!("expected binary") };
            prop_assert_eq!(top.op, BinOp::Mul);
            prop_assert!(matches!(*top.left, Expr::Binary(BinaryOp { op: BinOp::Add, .. })));
        }
    }
}
