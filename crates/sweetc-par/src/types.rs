//! Type-annotation grammar: `<ident>` `*`* `[<n>?]`? (spec §4.2).

use crate::error::ParseError;
use crate::Parser;
use sweetc_lex::TokenKind;
use sweetc_types::Type;

impl Parser {
    pub(crate) fn parse_type(&mut self) -> Result<Type, ParseError> {
        let name = self.expect_ident()?;
        let mut ty = Type::named(name.as_str());

        while self.eat(TokenKind::Star) {
            ty = ty.pointer_to();
        }

        if self.eat(TokenKind::LBracket) {
            let len = match *self.peek() {
                TokenKind::Number(n) => {
                    self.advance();
                    n.max(0) as usize
                }
                _ => 0,
            };
            self.expect(TokenKind::RBracket)?;
            ty = ty.array_of(len);
        }

        Ok(ty)
    }
}

#[cfg(test)]
mod tests {
    use sweetc_lex::lex;

    use super::*;

    fn parse_type_str(source: &str) -> Type {
        let tokens = lex(source).unwrap();
        Parser::new(tokens).parse_type().unwrap()
    }

    #[test]
    fn plain_named_type() {
        let ty = parse_type_str("int");
        assert_eq!(ty.to_string(), "int");
    }

    #[test]
    fn pointer_levels_stack() {
        let ty = parse_type_str("u8**");
        assert_eq!(ty.pointer_level, 2);
    }

    #[test]
    fn array_with_explicit_size() {
        let ty = parse_type_str("int[4]");
        assert!(ty.is_array);
        assert_eq!(ty.array_size, Some(4));
    }

    #[test]
    fn array_with_elided_size() {
        let ty = parse_type_str("int[]");
        assert!(ty.is_array);
        assert_eq!(ty.array_size, Some(0));
    }
}
