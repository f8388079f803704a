//! Extraction and reflection errors.

use usl_diagnostic::{Diagnostic, ErrorCode};
use usl_ir::{Name, ShaderStage, Span};

/// Which interface block a location collision happened in.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum InterfaceDirection {
    Input,
    Output,
}

impl std::fmt::Display for InterfaceDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            InterfaceDirection::Input => "input",
            InterfaceDirection::Output => "output",
        })
    }
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ReflectError {
    #[error("no entry function for stage `{stage}`")]
    StageNotFound { stage: ShaderStage },

    #[error("{direction} `{name}` uses location {location}, already taken by `{other}`")]
    DuplicateLocation {
        name: Name,
        other: Name,
        location: u32,
        direction: InterfaceDirection,
        span: Span,
    },

    #[error("external `{name}` uses set {set} binding {binding}, already taken by `{other}`")]
    DuplicateBinding {
        name: Name,
        other: Name,
        set: u32,
        binding: u32,
        span: Span,
    },

    #[error("struct `{name}` is declared twice with different fields")]
    StructRedefinition { name: Name, span: Span },

    #[error("`{name}` does not name a variable, input, output, external or const")]
    UndefinedIdentifier { name: Name, span: Span },

    #[error("call to undefined function `{name}`")]
    UndefinedFunction { name: Name, span: Span },

    #[error("stage `{stage}` has two entry functions: `{first}` and `{second}`")]
    DuplicateEntryPoint {
        stage: ShaderStage,
        first: Name,
        second: Name,
        span: Span,
        first_span: Span,
    },

    #[error("`optional` block in a tree that was not specialized")]
    UnspecializedOptional { span: Span },
}

impl ReflectError {
    pub fn span(&self) -> Option<Span> {
        match self {
            ReflectError::StageNotFound { .. } => None,
            ReflectError::DuplicateLocation { span, .. }
            | ReflectError::DuplicateBinding { span, .. }
            | ReflectError::StructRedefinition { span, .. }
            | ReflectError::UndefinedIdentifier { span, .. }
            | ReflectError::UndefinedFunction { span, .. }
            | ReflectError::DuplicateEntryPoint { span, .. }
            | ReflectError::UnspecializedOptional { span } => Some(*span),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ReflectError::StageNotFound { .. } => ErrorCode::E3001,
            ReflectError::DuplicateLocation { .. } => ErrorCode::E3002,
            ReflectError::DuplicateBinding { .. } => ErrorCode::E3003,
            ReflectError::StructRedefinition { .. } => ErrorCode::E3004,
            ReflectError::UndefinedIdentifier { .. } => ErrorCode::E3005,
            ReflectError::UndefinedFunction { .. } => ErrorCode::E3006,
            ReflectError::DuplicateEntryPoint { .. } => ErrorCode::E3007,
            ReflectError::UnspecializedOptional { .. } => ErrorCode::E3008,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.code()).with_message(self.to_string());
        match self {
            ReflectError::StageNotFound { stage } => diag.with_note(format!(
                "mark a function with `[entry({stage})]` to compile this stage"
            )),
            ReflectError::DuplicateLocation { span, .. }
            | ReflectError::DuplicateBinding { span, .. } => {
                diag.with_label(*span, "reachable from this stage")
            }
            ReflectError::StructRedefinition { span, .. } => {
                diag.with_label(*span, "conflicting declaration")
            }
            ReflectError::UndefinedIdentifier { span, .. } => {
                diag.with_label(*span, "not found in this scope")
            }
            ReflectError::UndefinedFunction { span, .. } => {
                diag.with_label(*span, "neither declared nor built in")
            }
            ReflectError::DuplicateEntryPoint {
                span, first_span, ..
            } => diag
                .with_label(*span, "second entry function")
                .with_secondary_label(*first_span, "first entry function"),
            ReflectError::UnspecializedOptional { span } => diag
                .with_label(*span, "unresolved block")
                .with_note("run the specializer before extracting stages"),
        }
    }
}
