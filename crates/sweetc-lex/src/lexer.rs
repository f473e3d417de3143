//! Tokenizer (spec §4.1).
//!
//! Whitespace, line comments (`//...`) and block comments (`/*...*/`,
//! NOT nested — the first `*/` closes the comment regardless of
//! nesting) are skipped between tokens. Symbol matching is greedy: the
//! longest symbol starting at the current position wins.

use crate::cursor::Cursor;
use crate::error::LexError;
use crate::token::{keyword, Token, TokenKind};
use sweetc_util::{Span, Symbol};

pub fn lex(source: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer::new(source);
    lexer.run()
}

struct Lexer<'a> {
    source: &'a str,
    cursor: Cursor<'a>,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            cursor: Cursor::new(source),
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<Token>, LexError> {
        loop {
            self.skip_trivia()?;
            let start = self.cursor.pos();
            let start_line = self.cursor.line();
            let start_col = self.cursor.column();

            let Some(ch) = self.cursor.peek() else {
                let span = Span::point(start, start_line, start_col);
                self.tokens.push(Token::new(TokenKind::Eof, span));
                return Ok(self.tokens);
            };

            let kind = match ch {
                b'"' => self.lex_string()?,
                b'\'' => self.lex_char()?,
                b'0'..=b'9' => self.lex_number()?,
                b'_' | b'a'..=b'z' | b'A'..=b'Z' => self.lex_ident(),
                _ => self.lex_symbol()?,
            };

            let end = self.cursor.pos();
            let span = Span::new(start, end, start_line, start_col);
            self.tokens.push(Token::new(kind, span));
        }
    }

    fn skip_trivia(&mut self) -> Result<(), LexError> {
        loop {
            match self.cursor.peek() {
                Some(b' ' | b'\t' | b'\r' | b'\n') => {
                    self.cursor.advance();
                }
                Some(b'/') if self.cursor.peek_at(1) == Some(b'/') => {
                    while !matches!(self.cursor.peek(), None | Some(b'\n')) {
                        self.cursor.advance();
                    }
                }
                Some(b'/') if self.cursor.peek_at(1) == Some(b'*') => {
                    self.skip_block_comment()?;
                }
                _ => return Ok(()),
            }
        }
    }

    /// Non-nested: scans to the first `*/`, matching the original
    /// implementation this core's grammar was distilled from.
    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        let start = self.cursor.pos();
        let start_line = self.cursor.line();
        let start_col = self.cursor.column();
        self.cursor.advance();
        self.cursor.advance();
        loop {
            match self.cursor.peek() {
                None => {
                    let span = Span::new(start, self.cursor.pos(), start_line, start_col);
                    return Err(LexError::UnterminatedBlockComment { span });
                }
                Some(b'*') if self.cursor.peek_at(1) == Some(b'/') => {
                    self.cursor.advance();
                    self.cursor.advance();
                    return Ok(());
                }
                _ => {
                    self.cursor.advance();
                }
            }
        }
    }

    fn lex_ident(&mut self) -> TokenKind {
        let start = self.cursor.pos();
        while matches!(self.cursor.peek(), Some(b'_' | b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9')) {
            self.cursor.advance();
        }
        let text = self.cursor.slice(start, self.cursor.pos());
        keyword(text).unwrap_or_else(|| TokenKind::Ident(Symbol::intern(text)))
    }

    fn lex_number(&mut self) -> Result<TokenKind, LexError> {
        let start = self.cursor.pos();
        let start_line = self.cursor.line();
        let start_col = self.cursor.column();

        while matches!(self.cursor.peek(), Some(b'0'..=b'9')) {
            self.cursor.advance();
        }

        let mut is_float = false;
        if self.cursor.peek() == Some(b'.') && matches!(self.cursor.peek_at(1), Some(b'0'..=b'9')) {
            is_float = true;
            self.cursor.advance();
            while matches!(self.cursor.peek(), Some(b'0'..=b'9')) {
                self.cursor.advance();
            }
        }

        let text = self.cursor.slice(start, self.cursor.pos());
        let span = Span::new(start, self.cursor.pos(), start_line, start_col);

        if is_float {
            text.parse::<f64>()
                .map(TokenKind::Float)
                .map_err(|_| LexError::InvalidNumber { text: text.to_string(), span })
        } else {
            text.parse::<i128>()
                .map(TokenKind::Number)
                .map_err(|_| LexError::InvalidNumber { text: text.to_string(), span })
        }
    }

    fn lex_string(&mut self) -> Result<TokenKind, LexError> {
        let start = self.cursor.pos();
        let start_line = self.cursor.line();
        let start_col = self.cursor.column();
        self.cursor.advance();

        let body_start = self.cursor.pos();
        loop {
            match self.cursor.peek() {
                None => {
                    let span = Span::new(start, self.cursor.pos(), start_line, start_col);
                    return Err(LexError::UnterminatedString { span });
                }
                Some(b'"') => break,
                Some(b'\\') => {
                    self.cursor.advance();
                    if self.cursor.peek().is_some() {
                        self.cursor.advance();
                    }
                }
                _ => {
                    self.cursor.advance();
                }
            }
        }
        let body = self.cursor.slice(body_start, self.cursor.pos());
        self.cursor.advance();
        Ok(TokenKind::Str(Symbol::intern(body)))
    }

    fn lex_char(&mut self) -> Result<TokenKind, LexError> {
        let start = self.cursor.pos();
        let start_line = self.cursor.line();
        let start_col = self.cursor.column();
        self.cursor.advance();

        let value = match self.cursor.peek() {
            None => {
                let span = Span::new(start, self.cursor.pos(), start_line, start_col);
                return Err(LexError::UnterminatedChar { span });
            }
            Some(b'\'') => {
                let span = Span::new(start, self.cursor.pos(), start_line, start_col);
                return Err(LexError::EmptyChar { span });
            }
            Some(b'\\') => {
                self.cursor.advance();
                let escaped = self.cursor.peek().ok_or_else(|| {
                    let span = Span::new(start, self.cursor.pos(), start_line, start_col);
                    LexError::UnterminatedChar { span }
                })?;
                self.cursor.advance();
                decode_escape(escaped)
            }
            Some(b) => {
                self.cursor.advance();
                b as char
            }
        };

        if self.cursor.peek() != Some(b'\'') {
            let span = Span::new(start, self.cursor.pos(), start_line, start_col);
            return Err(LexError::UnterminatedChar { span });
        }
        self.cursor.advance();
        Ok(TokenKind::Char(value))
    }

    fn lex_symbol(&mut self) -> Result<TokenKind, LexError> {
        let start = self.cursor.pos();
        let start_line = self.cursor.line();
        let start_col = self.cursor.column();
        let remaining = &self.source[start..];

        for len in [3usize, 2, 1] {
            if let Some(fragment) = remaining.get(..len) {
                if let Some(kind) = symbol_token(fragment) {
                    for _ in 0..len {
                        self.cursor.advance();
                    }
                    return Ok(kind);
                }
            }
        }

        let ch = remaining.chars().next().unwrap();
        self.cursor.advance();
        let span = Span::new(start, self.cursor.pos(), start_line, start_col);
        Err(LexError::UnknownSymbol { ch, span })
    }
}

fn decode_escape(b: u8) -> char {
    match b {
        b'n' => '\n',
        b't' => '\t',
        b'r' => '\r',
        b'0' => '\0',
        b'\\' => '\\',
        b'\'' => '\'',
        b'"' => '"',
        other => other as char,
    }
}

fn symbol_token(fragment: &str) -> Option<TokenKind> {
    use TokenKind::*;
    Some(match fragment {
        "..." => Dots,
        "->" => Arrow,
        "==" => Eq,
        "!=" => Ne,
        "<=" => Le,
        ">=" => Ge,
        "&&" => AndAnd,
        "||" => OrOr,
        "^=" => XorAssign,
        "&=" => AndAssign,
        "|=" => OrAssign,
        "=" => Assign,
        "+" => Plus,
        "-" => Minus,
        "*" => Star,
        "/" => Slash,
        "%" => Percent,
        "<" => Lt,
        ">" => Gt,
        "!" => Not,
        "&" => Amp,
        "|" => Pipe,
        "^" => Caret,
        "." => Dot,
        ";" => Semicolon,
        ":" => Colon,
        "(" => LParen,
        ")" => RParen,
        "[" => LBracket,
        "]" => RBracket,
        "{" => LBrace,
        "}" => RBrace,
        "," => Comma,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lexes_simple_function_signature() {
        let kinds = kinds("fn main() -> int {}");
        assert_eq!(
            kinds,
            vec![
                TokenKind::Fn,
                TokenKind::Ident(Symbol::intern("main")),
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::Arrow,
                TokenKind::Ident(Symbol::intern("int")),
                TokenKind::LBrace,
                TokenKind::RBrace,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn greedy_symbol_matching_prefers_longest() {
        assert_eq!(kinds("..."), vec![TokenKind::Dots, TokenKind::Eof]);
        assert_eq!(kinds("<="), vec![TokenKind::Le, TokenKind::Eof]);
        assert_eq!(kinds("<"), vec![TokenKind::Lt, TokenKind::Eof]);
    }

    #[test]
    fn line_comment_is_skipped() {
        assert_eq!(kinds("1 // trailing\n2"), vec![
            TokenKind::Number(1),
            TokenKind::Number(2),
            TokenKind::Eof,
        ]);
    }

    #[test]
    fn block_comment_does_not_nest() {
        // The first `*/` closes the comment; `*/` immediately after
        // leaves a stray `*/` that must lex as two symbol tokens.
        let result = lex("/* /* */ */ 1");
        let kinds: Vec<_> = result.unwrap().into_iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![TokenKind::Star, TokenKind::Slash, TokenKind::Number(1), TokenKind::Eof]
        );
    }

    #[test]
    fn unterminated_string_is_an_error() {
        assert!(matches!(lex("\"abc"), Err(LexError::UnterminatedString { .. })));
    }

    #[test]
    fn unterminated_block_comment_is_an_error() {
        assert!(matches!(lex("/* abc"), Err(LexError::UnterminatedBlockComment { .. })));
    }

    #[test]
    fn char_literal_decodes_escape() {
        assert_eq!(kinds("'\\n'"), vec![TokenKind::Char('\n'), TokenKind::Eof]);
        assert_eq!(kinds("'a'"), vec![TokenKind::Char('a'), TokenKind::Eof]);
    }

    #[test]
    fn empty_char_literal_is_an_error() {
        assert!(matches!(lex("''"), Err(LexError::EmptyChar { .. })));
    }

    #[test]
    fn float_number_is_lexed_distinctly_from_int() {
        assert_eq!(kinds("3.14"), vec![TokenKind::Float(3.14), TokenKind::Eof]);
        assert_eq!(kinds("3"), vec![TokenKind::Number(3), TokenKind::Eof]);
    }

    #[test]
    fn dot_after_integer_without_digit_is_not_consumed_as_float() {
        // `arr.len` on an integer-looking prefix: the `.` belongs to the
        // next token, not to the number.
        assert_eq!(
            kinds("1.len"),
            vec![
                TokenKind::Number(1),
                TokenKind::Dot,
                TokenKind::Ident(Symbol::intern("len")),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn true_false_lex_as_bool_literals_not_identifiers() {
        assert_eq!(kinds("true false"), vec![TokenKind::Bool(true), TokenKind::Bool(false), TokenKind::Eof]);
    }

    #[test]
    fn unknown_symbol_is_reported() {
        assert!(matches!(lex("`"), Err(LexError::UnknownSymbol { ch: '`', .. })));
    }

    #[test]
    fn keeps_line_and_column_across_newlines() {
        let tokens = lex("a\nb").unwrap();
        assert_eq!(tokens[0].span.line, 1);
        assert_eq!(tokens[1].span.line, 2);
        assert_eq!(tokens[1].span.column, 1);
    }
}
