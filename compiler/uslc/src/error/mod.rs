//! Errors of the whole pipeline.

use usl_codegen::CodegenError;
use usl_diagnostic::{Diagnostic, ErrorCode};
use usl_ir::Span;
use usl_parse::ParseError;
use usl_reflect::ReflectError;
use usl_specialize::SpecializeError;

/// Failure of any phase, tagged with the phase it came from.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum CompileError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Specialize(#[from] SpecializeError),

    #[error(transparent)]
    Reflect(#[from] ReflectError),

    #[error(transparent)]
    Codegen(#[from] CodegenError),
}

impl CompileError {
    pub fn span(&self) -> Option<Span> {
        match self {
            CompileError::Parse(err) => Some(err.span()),
            CompileError::Specialize(err) => Some(err.span()),
            CompileError::Reflect(err) => err.span(),
            CompileError::Codegen(err) => err.span(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            CompileError::Parse(err) => err.code(),
            CompileError::Specialize(err) => err.code(),
            CompileError::Reflect(err) => err.code(),
            CompileError::Codegen(err) => err.code(),
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            CompileError::Parse(err) => err.to_diagnostic(),
            CompileError::Specialize(err) => err.to_diagnostic(),
            CompileError::Reflect(err) => err.to_diagnostic(),
            CompileError::Codegen(err) => err.to_diagnostic(),
        }
    }

    /// Report against the source it came from, without colors.
    pub fn render(&self, source_name: &str, source: &str) -> String {
        usl_diagnostic::render(&self.to_diagnostic(), source_name, source, false)
    }
}
