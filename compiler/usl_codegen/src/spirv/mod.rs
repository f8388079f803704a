//! SPIR-V backend.
//!
//! GLSL with Vulkan semantics is generated for one stage and handed to an
//! [`Assembler`]. The default assembler runs `glslangValidator`; tests and
//! embedders can plug in their own.

use std::fs;
use std::path::PathBuf;
use std::process::Command;

use usl_ir::{ShaderStage, Statement};

use crate::glsl::{GlslSettings, GlslWriter};
use crate::{Backend, BinaryBackend, CodegenError, StringEmitter};

/// First word of every SPIR-V module.
pub const SPIRV_MAGIC: u32 = 0x0723_0203;

/// Turns GLSL text for one stage into SPIR-V words.
pub trait Assembler {
    fn assemble(&self, source: &str, stage: ShaderStage) -> Result<Vec<u32>, CodegenError>;
}

/// Assembles by running `glslangValidator -V` on scratch files.
#[derive(Clone, Debug)]
pub struct GlslangAssembler {
    program: PathBuf,
}

impl Default for GlslangAssembler {
    fn default() -> Self {
        GlslangAssembler {
            program: PathBuf::from("glslangValidator"),
        }
    }
}

impl GlslangAssembler {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        GlslangAssembler {
            program: program.into(),
        }
    }
}

impl Assembler for GlslangAssembler {
    #[tracing::instrument(level = "debug", skip(self, source), fields(program = %self.program.display()))]
    fn assemble(&self, source: &str, stage: ShaderStage) -> Result<Vec<u32>, CodegenError> {
        let dir = tempfile::tempdir()
            .map_err(|e| CodegenError::assembler(format!("cannot create scratch directory: {e}")))?;
        let input = dir.path().join(format!("shader.{}", stage.file_extension()));
        let output = dir.path().join("shader.spv");
        fs::write(&input, source)
            .map_err(|e| CodegenError::assembler(format!("cannot write {}: {e}", input.display())))?;

        let result = Command::new(&self.program)
            .arg("-V")
            .arg("-S")
            .arg(stage.file_extension())
            .arg("-o")
            .arg(&output)
            .arg(&input)
            .output()
            .map_err(|e| {
                CodegenError::assembler(format!("cannot run {}: {e}", self.program.display()))
            })?;
        if !result.status.success() {
            // glslangValidator reports compile errors on stdout.
            let mut message = String::from_utf8_lossy(&result.stderr).trim().to_owned();
            if message.is_empty() {
                message = String::from_utf8_lossy(&result.stdout).trim().to_owned();
            }
            tracing::debug!(status = %result.status, "assembler failed");
            return Err(CodegenError::assembler(message));
        }

        let bytes = fs::read(&output)
            .map_err(|e| CodegenError::assembler(format!("cannot read {}: {e}", output.display())))?;
        words(&bytes)
    }
}

/// Little-endian words of a SPIR-V binary, checked for the magic number.
pub fn words(bytes: &[u8]) -> Result<Vec<u32>, CodegenError> {
    if bytes.len() % 4 != 0 {
        return Err(CodegenError::assembler(format!(
            "SPIR-V size {} is not a multiple of 4",
            bytes.len()
        )));
    }
    let words: Vec<u32> = bytes
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    match words.first() {
        Some(&SPIRV_MAGIC) => Ok(words),
        Some(other) => Err(CodegenError::assembler(format!(
            "bad SPIR-V magic {other:#010x}"
        ))),
        None => Err(CodegenError::assembler("empty SPIR-V module".to_owned())),
    }
}

/// Compiles one stage of an extracted tree to SPIR-V.
#[derive(Clone, Debug)]
pub struct SpirvWriter<A = GlslangAssembler> {
    glsl: GlslWriter,
    stage: ShaderStage,
    assembler: A,
}

impl<A: Assembler> SpirvWriter<A> {
    pub fn new(stage: ShaderStage, assembler: A) -> Self {
        SpirvWriter::with_settings(GlslSettings::vulkan(), stage, assembler)
    }

    /// Vulkan semantics and the stage are always forced on `settings`.
    pub fn with_settings(mut settings: GlslSettings, stage: ShaderStage, assembler: A) -> Self {
        settings.vulkan = true;
        settings.fixed_stage = Some(stage);
        SpirvWriter {
            glsl: GlslWriter::new(settings),
            stage,
            assembler,
        }
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn settings(&self) -> &GlslSettings {
        self.glsl.settings()
    }
}

impl<A: Assembler> BinaryBackend for SpirvWriter<A> {
    #[tracing::instrument(level = "debug", skip_all, fields(stage = %self.stage))]
    fn compile(&self, ast: &Statement, out: &mut Vec<u32>) -> Result<(), CodegenError> {
        let mut source = StringEmitter::new();
        self.glsl.generate(ast, &mut source)?;
        let words = self.assembler.assemble(source.as_str(), self.stage)?;
        tracing::debug!(words = words.len(), "assembled");
        out.extend(words);
        Ok(())
    }
}
