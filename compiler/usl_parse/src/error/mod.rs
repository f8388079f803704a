//! Parse error types.

use usl_diagnostic::{Diagnostic, ErrorCode};
use usl_ir::{Name, SourcePos, Span, Token, TokenKind};
use usl_lexer::LexError;

/// A grammar violation. Parsing stops at the first one.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("expected {expected}, found {found} at {pos}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
        pos: SourcePos,
    },

    #[error("expected expression, found {found} at {pos}")]
    ExpectedExpression {
        found: String,
        span: Span,
        pos: SourcePos,
    },

    #[error("unknown type `{name}` at {pos}")]
    UnknownType {
        name: Name,
        span: Span,
        pos: SourcePos,
    },

    #[error(transparent)]
    Attribute(#[from] AttributeError),

    #[error("library `{name}` could not be resolved at {pos}")]
    UnresolvedLibrary {
        name: String,
        span: Span,
        pos: SourcePos,
    },

    #[error("library `{name}` includes itself at {pos}")]
    IncludeCycle {
        name: String,
        span: Span,
        pos: SourcePos,
    },

    #[error("integer literal `{value}` does not fit in an int at {pos}")]
    IntegerOutOfRange {
        value: i64,
        span: Span,
        pos: SourcePos,
    },

    #[error(transparent)]
    Lex(#[from] LexError),
}

impl ParseError {
    /// Mismatch between what the grammar wants and the token at hand.
    pub fn unexpected(expected: impl Into<String>, found: &Token) -> Self {
        ParseError::UnexpectedToken {
            expected: expected.into(),
            found: describe(&found.kind),
            span: found.span,
            pos: found.pos,
        }
    }

    pub fn expected_expression(found: &Token) -> Self {
        ParseError::ExpectedExpression {
            found: describe(&found.kind),
            span: found.span,
            pos: found.pos,
        }
    }

    /// Move the error to `span`/`pos`, keeping its message.
    #[must_use]
    pub(crate) fn relocate(mut self, to: Span, at: SourcePos) -> Self {
        match &mut self {
            ParseError::UnexpectedToken { span, pos, .. }
            | ParseError::ExpectedExpression { span, pos, .. }
            | ParseError::UnknownType { span, pos, .. }
            | ParseError::UnresolvedLibrary { span, pos, .. }
            | ParseError::IncludeCycle { span, pos, .. }
            | ParseError::IntegerOutOfRange { span, pos, .. } => {
                *span = to;
                *pos = at;
            }
            ParseError::Attribute(err) => {
                err.span = to;
                err.pos = at;
            }
            ParseError::Lex(err) => {
                err.span = to;
                err.pos = at;
            }
        }
        self
    }

    pub fn span(&self) -> Span {
        match self {
            ParseError::UnexpectedToken { span, .. }
            | ParseError::ExpectedExpression { span, .. }
            | ParseError::UnknownType { span, .. }
            | ParseError::UnresolvedLibrary { span, .. }
            | ParseError::IncludeCycle { span, .. }
            | ParseError::IntegerOutOfRange { span, .. } => *span,
            ParseError::Attribute(err) => err.span,
            ParseError::Lex(err) => err.span,
        }
    }

    pub fn pos(&self) -> SourcePos {
        match self {
            ParseError::UnexpectedToken { pos, .. }
            | ParseError::ExpectedExpression { pos, .. }
            | ParseError::UnknownType { pos, .. }
            | ParseError::UnresolvedLibrary { pos, .. }
            | ParseError::IncludeCycle { pos, .. }
            | ParseError::IntegerOutOfRange { pos, .. } => *pos,
            ParseError::Attribute(err) => err.pos,
            ParseError::Lex(err) => err.pos,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ParseError::UnexpectedToken { .. } => ErrorCode::E1001,
            ParseError::ExpectedExpression { .. } => ErrorCode::E1002,
            ParseError::UnknownType { .. } => ErrorCode::E1003,
            ParseError::Attribute(err) => err.code(),
            ParseError::UnresolvedLibrary { .. } => ErrorCode::E1009,
            ParseError::IncludeCycle { .. } => ErrorCode::E1010,
            ParseError::IntegerOutOfRange { .. } => ErrorCode::E1011,
            ParseError::Lex(err) => err.code(),
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ParseError::Lex(err) => err.to_diagnostic(),
            ParseError::Attribute(err) => err.to_diagnostic(),
            ParseError::UnexpectedToken {
                expected, found, ..
            } => Diagnostic::error(self.code())
                .with_message(format!("expected {expected}, found {found}"))
                .with_label(self.span(), format!("expected {expected}")),
            ParseError::UnknownType { name, .. } => Diagnostic::error(self.code())
                .with_message(format!("unknown type `{name}`"))
                .with_label(self.span(), "not a built-in type or declared struct"),
            ParseError::IntegerOutOfRange { .. } => Diagnostic::error(self.code())
                .with_message(self.to_string())
                .with_label(self.span(), "out of range")
                .with_note("only a negated literal may reach -2147483648"),
            ParseError::ExpectedExpression { .. }
            | ParseError::UnresolvedLibrary { .. }
            | ParseError::IncludeCycle { .. } => Diagnostic::error(self.code())
                .with_message(self.to_string())
                .with_label(self.span(), "here"),
        }
    }
}

/// Token description for messages: keywords and symbols in backticks,
/// identifiers and literals with their text.
pub(crate) fn describe(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Ident(name) => format!("identifier `{name}`"),
        TokenKind::Int(v) => format!("integer `{v}`"),
        TokenKind::UInt(v) => format!("integer `{v}u`"),
        TokenKind::Float(bits) => format!("float `{:?}`", f32::from_bits(*bits)),
        other => other.display_name().to_string(),
    }
}

/// An attribute that is unknown, misplaced, repeated, missing or has a
/// bad argument.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at {pos}")]
pub struct AttributeError {
    pub kind: AttributeErrorKind,
    pub span: Span,
    pub pos: SourcePos,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AttributeErrorKind {
    #[error("unknown attribute `{0}`")]
    Unknown(Name),

    #[error("invalid argument for attribute `{attribute}`: {reason}")]
    InvalidArgument { attribute: Name, reason: String },

    #[error("{target} requires a `{attribute}` attribute")]
    Missing {
        target: &'static str,
        attribute: &'static str,
    },

    #[error("attribute `{0}` is given more than once")]
    Duplicate(Name),

    #[error("attribute `{attribute}` is not allowed on {target}")]
    NotAllowed {
        attribute: Name,
        target: &'static str,
    },
}

impl AttributeError {
    pub fn code(&self) -> ErrorCode {
        match self.kind {
            AttributeErrorKind::Unknown(_) => ErrorCode::E1004,
            AttributeErrorKind::InvalidArgument { .. } => ErrorCode::E1005,
            AttributeErrorKind::Missing { .. } => ErrorCode::E1006,
            AttributeErrorKind::Duplicate(_) => ErrorCode::E1007,
            AttributeErrorKind::NotAllowed { .. } => ErrorCode::E1008,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.code())
            .with_message(self.kind.to_string())
            .with_label(self.span, "attribute here")
    }
}
