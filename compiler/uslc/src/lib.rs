//! USL shader compiler.
//!
//! Runs the whole pipeline over one shader file:
//!
//! ```text
//! source ──► ShaderCompiler::parse ──► UberShader
//!                                          │ create_instance(options)
//!                                          ▼
//!                                  UberShaderInstance
//!                                          │ extract_stage / reflection
//!                                          ▼
//!                      generate_lang │ generate_glsl │ compile_spirv
//! ```
//!
//! Each phase lives in its own crate (`usl_lexer`, `usl_parse`,
//! `usl_specialize`, `usl_reflect`, `usl_codegen`); this crate ties them
//! together and folds their errors into [`CompileError`].

mod compiler;
mod error;

use std::sync::Once;

pub use compiler::{CompilerOptions, ShaderCompiler, UberShader, UberShaderInstance};
pub use error::CompileError;

pub use usl_codegen::{
    Assembler, GlslSettings, GlslVersion, GlslangAssembler, StringEmitter, SPIRV_MAGIC,
};
pub use usl_ir::ShaderStage;
pub use usl_parse::SourceLibraries;
pub use usl_reflect::{AstReflection, ExternalKind};
pub use usl_specialize::{OptionValue, SpecializationConfig};

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Safe to call more than once. Does nothing when `RUST_LOG` is unset.
/// Enable with `RUST_LOG=usl_reflect=debug` or `RUST_LOG=uslc=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
