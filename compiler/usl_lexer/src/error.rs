use usl_diagnostic::{Diagnostic, ErrorCode};
use usl_ir::{SourcePos, Span};

/// Why a token could not be produced.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, thiserror::Error)]
pub enum LexErrorKind {
    #[default]
    #[error("invalid character")]
    InvalidCharacter,
    #[error("malformed number literal")]
    MalformedNumber,
    #[error("unterminated block comment")]
    UnterminatedComment,
}

/// A lexing failure with the offending text and where it starts.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{kind} `{text}` at {pos}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
    pub pos: SourcePos,
    pub text: String,
}

impl LexError {
    pub fn code(&self) -> ErrorCode {
        match self.kind {
            LexErrorKind::InvalidCharacter => ErrorCode::E0001,
            LexErrorKind::MalformedNumber => ErrorCode::E0002,
            LexErrorKind::UnterminatedComment => ErrorCode::E0003,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let label = match self.kind {
            LexErrorKind::UnterminatedComment => "comment starts here",
            LexErrorKind::InvalidCharacter | LexErrorKind::MalformedNumber => "here",
        };
        let span = match self.kind {
            LexErrorKind::UnterminatedComment => Span::new(self.span.start, self.span.start.saturating_add(2)),
            LexErrorKind::InvalidCharacter | LexErrorKind::MalformedNumber => self.span,
        };
        Diagnostic::error(self.code())
            .with_message(format!("{}: `{}`", self.kind, truncate(&self.text)))
            .with_label(span, label)
    }
}

fn truncate(text: &str) -> &str {
    match text.char_indices().nth(24) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}
