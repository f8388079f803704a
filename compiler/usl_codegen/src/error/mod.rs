//! Code generation errors.

use usl_diagnostic::{Diagnostic, ErrorCode};
use usl_ir::{Name, ShaderStage, Span};

use crate::glsl::GlslVersion;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CodegenError {
    /// The target cannot express `construct`. `required` is the lowest
    /// target version that can, if any.
    #[error(
        "{construct} is not supported by GLSL {configured}{}",
        requirement(.required.as_ref())
    )]
    UnsupportedConstruct {
        construct: String,
        required: Option<GlslVersion>,
        configured: GlslVersion,
        span: Span,
    },

    #[error("externals `{first}` and `{second}` both map to binding {binding}")]
    BindingConflict {
        first: Name,
        second: Name,
        binding: u32,
        span: Span,
        first_span: Span,
    },

    #[error("no entry function{}", for_stage(.stage.as_ref()))]
    MissingEntryPoint { stage: Option<ShaderStage> },

    #[error("entry functions `{first}` and `{second}` both qualify{}", for_stage(.stage.as_ref()))]
    AmbiguousEntryPoint {
        stage: Option<ShaderStage>,
        first: Name,
        second: Name,
    },

    #[error("assembler failed: {message}")]
    Assembler { message: String },
}

fn requirement(required: Option<&GlslVersion>) -> String {
    required.map_or_else(String::new, |v| format!(" (requires {v})"))
}

fn for_stage(stage: Option<&ShaderStage>) -> String {
    stage.map_or_else(String::new, |s| format!(" for stage `{s}`"))
}

impl CodegenError {
    pub(crate) fn assembler(message: impl Into<String>) -> Self {
        CodegenError::Assembler {
            message: message.into(),
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            CodegenError::UnsupportedConstruct { span, .. }
            | CodegenError::BindingConflict { span, .. } => Some(*span),
            CodegenError::MissingEntryPoint { .. }
            | CodegenError::AmbiguousEntryPoint { .. }
            | CodegenError::Assembler { .. } => None,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            CodegenError::UnsupportedConstruct { .. } => ErrorCode::E4001,
            CodegenError::BindingConflict { .. } => ErrorCode::E4002,
            CodegenError::MissingEntryPoint { .. } => ErrorCode::E4003,
            CodegenError::AmbiguousEntryPoint { .. } => ErrorCode::E4004,
            CodegenError::Assembler { .. } => ErrorCode::E4005,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.code()).with_message(self.to_string());
        match self {
            CodegenError::UnsupportedConstruct { span, required, .. } => {
                let diag = diag.with_label(*span, "cannot be generated");
                match required {
                    Some(version) => diag.with_note(format!("raise the target to GLSL {version}")),
                    None => diag,
                }
            }
            CodegenError::BindingConflict {
                span, first_span, ..
            } => diag
                .with_label(*span, "collides after flattening descriptor sets")
                .with_secondary_label(*first_span, "binding first used here")
                .with_note("adjust `set`/`binding` or raise `bindings_per_set`"),
            CodegenError::MissingEntryPoint { .. } | CodegenError::AmbiguousEntryPoint { .. } => {
                diag.with_note("extract a single stage or set a fixed stage")
            }
            CodegenError::Assembler { .. } => diag,
        }
    }
}
