use sweetc_util::Span;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LexError {
    #[error("unknown symbol '{ch}'")]
    UnknownSymbol { ch: char, span: Span },

    #[error("unterminated string literal")]
    UnterminatedString { span: Span },

    #[error("unterminated char literal")]
    UnterminatedChar { span: Span },

    #[error("empty char literal")]
    EmptyChar { span: Span },

    #[error("unterminated block comment")]
    UnterminatedBlockComment { span: Span },

    #[error("invalid number literal '{text}'")]
    InvalidNumber { text: String, span: Span },
}

impl LexError {
    pub fn span(&self) -> Span {
        match self {
            LexError::UnknownSymbol { span, .. }
            | LexError::UnterminatedString { span }
            | LexError::UnterminatedChar { span }
            | LexError::EmptyChar { span }
            | LexError::UnterminatedBlockComment { span }
            | LexError::InvalidNumber { span, .. } => *span,
        }
    }
}
