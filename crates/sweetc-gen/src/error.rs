//! Errors raised by the code generator (spec §7).

use sweetc_util::Span;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodegenError {
    #[error("array-typed locals and parameters are not supported by codegen")]
    ArraysNotSupported { span: Span },

    #[error("indexed access is not supported by codegen")]
    IndexedAccessNotSupported { span: Span },

    #[error("member access ({what}) is not supported by codegen")]
    MemberAccessNotSupported { what: String, span: Span },

    #[error("more than 6 parameters are not supported by codegen")]
    TooManyParameters { span: Span },

    #[error("operator '{op}' has no codegen lowering")]
    UnsupportedOperator { op: String, span: Span },

    #[error("codegen for {what} is not implemented")]
    UnsupportedNode { what: String, span: Span },

    #[error("assignment target must be a bare identifier")]
    InvalidAssignmentTarget { span: Span },

    #[error("assignment to undefined local '{name}'")]
    UndefinedLocal { name: String, span: Span },
}

impl CodegenError {
    pub fn span(&self) -> Span {
        match self {
            CodegenError::ArraysNotSupported { span }
            | CodegenError::IndexedAccessNotSupported { span }
            | CodegenError::MemberAccessNotSupported { span, .. }
            | CodegenError::TooManyParameters { span }
            | CodegenError::UnsupportedOperator { span, .. }
            | CodegenError::UnsupportedNode { span, .. }
            | CodegenError::InvalidAssignmentTarget { span }
            | CodegenError::UndefinedLocal { span, .. } => *span,
        }
    }
}
