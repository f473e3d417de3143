//! Aggregates every pipeline stage's error type behind one enum so a
//! caller driving [`crate::compile`] has a single `Result` to match on
//! (spec §7: "the pipeline halts at the first stage that reports an
//! error").

use sweetc_gen::CodegenError;
use sweetc_lex::LexError;
use sweetc_par::ParseError;
use sweetc_sem::{ImportError, TypeError};
use sweetc_util::Span;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error(transparent)]
    Codegen(#[from] CodegenError),
}

impl CompileError {
    pub fn span(&self) -> Span {
        match self {
            CompileError::Lex(e) => e.span(),
            CompileError::Parse(e) => e.span(),
            CompileError::Import(e) => e.span(),
            CompileError::Type(e) => e.span(),
            CompileError::Codegen(e) => e.span(),
        }
    }
}
