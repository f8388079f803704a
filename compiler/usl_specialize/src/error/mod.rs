//! Specialization errors.

use usl_diagnostic::{Diagnostic, ErrorCode};
use usl_ir::{Name, PrimitiveType, Span, Type};

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum SpecializeError {
    /// A condition names an option that has no value for this permutation.
    #[error("option `{name}` is not bound")]
    UnresolvedOption { name: Name, span: Span },

    #[error("condition is not a constant boolean: {reason}")]
    NonConstantCondition { reason: String, span: Span },

    #[error("option `{name}` is declared as `{declared}` but bound to a `{bound}` value")]
    OptionTypeMismatch {
        name: Name,
        declared: Type,
        bound: PrimitiveType,
        span: Span,
    },
}

impl SpecializeError {
    pub(crate) fn non_constant(reason: impl Into<String>, span: Span) -> Self {
        SpecializeError::NonConstantCondition {
            reason: reason.into(),
            span,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            SpecializeError::UnresolvedOption { span, .. }
            | SpecializeError::NonConstantCondition { span, .. }
            | SpecializeError::OptionTypeMismatch { span, .. } => *span,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            SpecializeError::UnresolvedOption { .. } => ErrorCode::E2001,
            SpecializeError::NonConstantCondition { .. } => ErrorCode::E2002,
            SpecializeError::OptionTypeMismatch { .. } => ErrorCode::E2003,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.code()).with_message(self.to_string());
        match self {
            SpecializeError::UnresolvedOption { name, span } => diag
                .with_label(*span, format!("`{name}` used here"))
                .with_note("every option used by an `optional` block must be bound"),
            SpecializeError::NonConstantCondition { span, .. } => {
                diag.with_label(*span, "evaluated at specialization time")
            }
            SpecializeError::OptionTypeMismatch { span, .. } => {
                diag.with_label(*span, "option declared here")
            }
        }
    }
}
