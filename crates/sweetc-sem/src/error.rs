//! Errors raised by the importer and the type checker (spec §7).

use sweetc_types::Type;
use sweetc_util::Span;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("module file not found: {path}")]
    ModuleNotFound { path: String, span: Span },

    #[error("{reason}")]
    Io { reason: String, span: Span },
}

impl ImportError {
    pub fn span(&self) -> Span {
        match self {
            ImportError::ModuleNotFound { span, .. } => *span,
            ImportError::Io { span, .. } => *span,
        }
    }
}

#[derive(Debug, Error)]
pub enum TypeError {
    #[error("undefined variable '{name}'")]
    UndefinedVariable { name: String, span: Span },

    #[error("undefined function '{name}'")]
    UndefinedFunction { name: String, span: Span },

    #[error("duplicate definition of '{name}'")]
    DuplicateDefinition { name: String, span: Span },

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: Type,
        found: Type,
        span: Span,
    },

    #[error("arity mismatch: expected {expected} argument(s), found {found}")]
    ArityMismatch {
        expected: usize,
        found: usize,
        span: Span,
    },

    #[error("unknown member '{member}' on type {ty}")]
    UnknownMember {
        member: String,
        ty: Type,
        span: Span,
    },

    #[error("empty array literal has no element type")]
    EmptyArrayLiteral { span: Span },

    #[error("cannot dereference non-pointer type {ty}")]
    DerefOfNonPointer { ty: Type, span: Span },

    #[error("cannot dereference void*")]
    DerefOfVoidPointer { span: Span },

    #[error("literal {value} is out of range for type {ty}")]
    LiteralOutOfRange {
        value: String,
        ty: Type,
        span: Span,
    },

    #[error("unsupported operand type '{ty}' for binary operator")]
    UnsupportedOperand { ty: Type, span: Span },
}

impl TypeError {
    pub fn span(&self) -> Span {
        match self {
            TypeError::UndefinedVariable { span, .. }
            | TypeError::UndefinedFunction { span, .. }
            | TypeError::DuplicateDefinition { span, .. }
            | TypeError::TypeMismatch { span, .. }
            | TypeError::ArityMismatch { span, .. }
            | TypeError::UnknownMember { span, .. }
            | TypeError::EmptyArrayLiteral { span }
            | TypeError::DerefOfNonPointer { span, .. }
            | TypeError::DerefOfVoidPointer { span }
            | TypeError::LiteralOutOfRange { span, .. }
            | TypeError::UnsupportedOperand { span, .. } => *span,
        }
    }
}
