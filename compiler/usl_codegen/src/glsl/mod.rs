//! GLSL backend.
//!
//! Emits one translation unit for one stage. The tree is expected to come
//! out of stage extraction: every `option`, `optional` and `include` must
//! already be gone, and the entry function is printed as `void main()`.
//!
//! Binding model: with Vulkan semantics at 4.50 each external keeps its
//! `set`/`binding` pair. Otherwise sets are flattened into one binding
//! namespace (`set * bindings_per_set + binding`), and below 4.20 (3.10 ES)
//! no binding qualifier is written at all.

mod context;
mod order;

use std::fmt;

use usl_ir::{ShaderStage, Span, Statement};

use crate::emitter::{emit_lines, Emitter};
use crate::{Backend, CodegenError};

/// `#version` of the generated text. 4.50 is `GlslVersion::new(4, 50)`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub struct GlslVersion {
    pub major: u32,
    pub minor: u32,
}

impl GlslVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        GlslVersion { major, minor }
    }

    /// Number written after `#version`.
    pub fn number(self) -> u32 {
        self.major * 100 + self.minor
    }

    pub fn from_number(number: u32) -> Self {
        GlslVersion::new(number / 100, number % 100)
    }
}

impl fmt::Display for GlslVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.major, self.minor)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlslSettings {
    pub version: GlslVersion,
    /// GLSL ES instead of desktop GLSL.
    pub es: bool,
    /// Vulkan semantics: descriptor sets, `gl_VertexIndex`.
    pub vulkan: bool,
    /// Generate this stage's entry function even if the tree has others.
    pub fixed_stage: Option<ShaderStage>,
    /// Bindings reserved per set when sets are flattened.
    pub bindings_per_set: u32,
}

impl Default for GlslSettings {
    fn default() -> Self {
        GlslSettings {
            version: GlslVersion::new(4, 50),
            es: false,
            vulkan: false,
            fixed_stage: None,
            bindings_per_set: 16,
        }
    }
}

impl GlslSettings {
    /// GLSL 4.50 with Vulkan semantics.
    pub fn vulkan() -> Self {
        GlslSettings {
            vulkan: true,
            ..GlslSettings::default()
        }
    }

    pub fn es(version: GlslVersion) -> Self {
        GlslSettings {
            version,
            es: true,
            ..GlslSettings::default()
        }
    }

    #[must_use]
    pub fn with_stage(mut self, stage: ShaderStage) -> Self {
        self.fixed_stage = Some(stage);
        self
    }

    pub(crate) fn uses_descriptor_sets(&self) -> bool {
        self.vulkan && !self.es && self.version.number() >= 450
    }

    pub(crate) fn has_binding_qualifier(&self) -> bool {
        self.supports(420, 310)
    }

    /// Whether the configured version reaches `desktop` (or `es` for
    /// GLSL ES), both as `#version` numbers.
    pub(crate) fn supports(&self, desktop: u32, es: u32) -> bool {
        let needed = if self.es { es } else { desktop };
        self.version.number() >= needed
    }

    pub(crate) fn require(
        &self,
        construct: &str,
        desktop: u32,
        es: u32,
        span: Span,
    ) -> Result<(), CodegenError> {
        if self.supports(desktop, es) {
            return Ok(());
        }
        let needed = if self.es { es } else { desktop };
        Err(CodegenError::UnsupportedConstruct {
            construct: construct.to_owned(),
            required: Some(GlslVersion::from_number(needed)),
            configured: self.version,
            span,
        })
    }

    pub(crate) fn unsupported(&self, construct: &str, span: Span) -> CodegenError {
        CodegenError::UnsupportedConstruct {
            construct: construct.to_owned(),
            required: None,
            configured: self.version,
            span,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct GlslWriter {
    settings: GlslSettings,
}

impl GlslWriter {
    pub fn new(settings: GlslSettings) -> Self {
        GlslWriter { settings }
    }

    pub fn settings(&self) -> &GlslSettings {
        &self.settings
    }

    pub fn render(&self, ast: &Statement) -> Result<String, CodegenError> {
        context::render(&self.settings, ast)
    }
}

impl Backend for GlslWriter {
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(version = %self.settings.version, es = self.settings.es)
    )]
    fn generate(&self, ast: &Statement, out: &mut dyn Emitter) -> Result<(), CodegenError> {
        let text = self.render(ast)?;
        emit_lines(out, &text);
        Ok(())
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
