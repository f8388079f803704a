//! Backends for USL shaders.
//!
//! Text backends implement [`Backend`] and write into an [`Emitter`]:
//! [`LangWriter`] prints the source language back, [`GlslWriter`] emits
//! GLSL for one stage. [`SpirvWriter`] implements [`BinaryBackend`] by
//! assembling Vulkan GLSL.
//!
//! Every backend is given a tree that has been specialized and, for
//! GLSL and SPIR-V, extracted down to one stage. Generation is a pure
//! function of the tree and the backend's settings.

mod emitter;
mod error;
mod glsl;
mod lang;
mod spirv;
mod syntax;

pub use emitter::{emit_lines, Emitter, StringEmitter};
pub use error::CodegenError;
pub use glsl::{GlslSettings, GlslVersion, GlslWriter};
pub use lang::LangWriter;
pub use spirv::{words as spirv_words, Assembler, GlslangAssembler, SpirvWriter, SPIRV_MAGIC};

use usl_ir::Statement;

/// Generates text from a tree.
pub trait Backend {
    fn generate(&self, ast: &Statement, out: &mut dyn Emitter) -> Result<(), CodegenError>;
}

/// Generates a binary module from a tree.
pub trait BinaryBackend {
    /// Appends the module's words to `out`.
    fn compile(&self, ast: &Statement, out: &mut Vec<u32>) -> Result<(), CodegenError>;
}
