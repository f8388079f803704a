//! The pipeline behind one compiler instance.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use usl_codegen::{
    Assembler, BinaryBackend, GlslSettings, GlslWriter, LangWriter, SpirvWriter,
};
use usl_ir::visitor::deep_copy;
use usl_ir::{BuiltinRegistry, Name, ShaderStage, Statement, StatementKind};
use usl_parse::{LibraryResolver, ParseError};
use usl_reflect::{AstReflection, ExtractedStage, StageExtractor};
use usl_specialize::{OptionValue, SpecializationConfig, Specializer};

use crate::CompileError;

/// Everything a compiler instance is configured with.
#[derive(Clone, Default)]
pub struct CompilerOptions {
    pub registry: BuiltinRegistry,
    /// Resolves `include` directives. Without one includes stay in the
    /// tree as `Include` statements.
    pub libraries: Option<Arc<dyn LibraryResolver>>,
    pub specialization: SpecializationConfig,
}

impl CompilerOptions {
    #[must_use]
    pub fn with_libraries(mut self, resolver: impl LibraryResolver + 'static) -> Self {
        self.libraries = Some(Arc::new(resolver));
        self
    }
}

impl fmt::Debug for CompilerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompilerOptions")
            .field("registry", &self.registry)
            .field("libraries", &self.libraries.is_some())
            .field("specialization", &self.specialization)
            .finish()
    }
}

/// Parses uber-shaders. Instances share nothing, so several compilers
/// with different registries can coexist.
#[derive(Clone, Debug, Default)]
pub struct ShaderCompiler {
    options: CompilerOptions,
}

impl ShaderCompiler {
    pub fn new(options: CompilerOptions) -> Self {
        ShaderCompiler { options }
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    #[tracing::instrument(level = "debug", skip_all, fields(len = source.len()))]
    pub fn parse(&self, source: &str) -> Result<UberShader, CompileError> {
        let tokens = usl_lexer::tokenize(source).map_err(ParseError::from)?;
        let ast = match &self.options.libraries {
            Some(libraries) => {
                usl_parse::parse_with_libraries(&tokens, &self.options.registry, &**libraries)?
            }
            None => usl_parse::parse(&tokens, &self.options.registry)?,
        };
        Ok(UberShader {
            ast,
            config: self.options.specialization,
        })
    }
}

/// A parsed shader file with its options still open.
#[derive(Clone, Debug)]
pub struct UberShader {
    ast: Statement,
    config: SpecializationConfig,
}

impl UberShader {
    pub fn new(ast: Statement) -> Self {
        UberShader {
            ast,
            config: SpecializationConfig::default(),
        }
    }

    pub fn ast(&self) -> &Statement {
        &self.ast
    }

    /// Options declared at file scope, in declaration order.
    pub fn option_names(&self) -> Vec<&Name> {
        self.ast
            .as_statements()
            .iter()
            .filter_map(|item| match &item.kind {
                StatementKind::DeclareOptions(options) => Some(options),
                _ => None,
            })
            .flatten()
            .map(|option| &option.name)
            .collect()
    }

    /// Specialize one permutation. The uber-shader is left untouched and
    /// can instantiate any number of permutations.
    pub fn create_instance<N, V>(
        &self,
        options: impl IntoIterator<Item = (N, V)>,
    ) -> Result<UberShaderInstance, CompileError>
    where
        N: Into<Name>,
        V: Into<OptionValue>,
    {
        let mut specializer = Specializer::with_config(self.config);
        for (name, value) in options {
            specializer.set_option(name, value);
        }
        let ast = specializer.process(&self.ast)?;
        UberShaderInstance::new(ast)
    }
}

/// One permutation, ready for per-stage extraction and generation.
/// Reflection is computed once per stage and kept until [`clear`].
///
/// [`clear`]: UberShaderInstance::clear
#[derive(Debug)]
pub struct UberShaderInstance {
    ast: Statement,
    extractor: StageExtractor,
    reflections: FxHashMap<ShaderStage, AstReflection>,
}

impl UberShaderInstance {
    pub fn new(ast: Statement) -> Result<Self, CompileError> {
        let mut extractor = StageExtractor::new();
        extractor.load(deep_copy(&ast))?;
        Ok(UberShaderInstance {
            ast,
            extractor,
            reflections: FxHashMap::default(),
        })
    }

    /// The specialized tree, every stage included.
    pub fn ast(&self) -> &Statement {
        &self.ast
    }

    /// Stages that have an entry function.
    pub fn stages(&self) -> Vec<ShaderStage> {
        self.extractor.stages()
    }

    /// The per-stage tree. Its reflection is cached on the way.
    pub fn extract_stage(&mut self, stage: ShaderStage) -> Result<Statement, CompileError> {
        let ExtractedStage {
            ast, reflection, ..
        } = self.extractor.extract(stage)?;
        self.reflections.insert(stage, reflection);
        Ok(ast)
    }

    pub fn reflection(&mut self, stage: ShaderStage) -> Result<&AstReflection, CompileError> {
        if !self.reflections.contains_key(&stage) {
            self.extract_stage(stage)?;
        }
        self.reflections
            .get(&stage)
            .ok_or(CompileError::Reflect(usl_reflect::ReflectError::StageNotFound {
                stage,
            }))
    }

    /// The specialized tree in source form, all stages included.
    pub fn generate_lang(&self) -> Result<String, CompileError> {
        Ok(LangWriter::new().render(&self.ast)?)
    }

    /// GLSL for one stage. The stage is pinned on a copy of `settings`.
    pub fn generate_glsl(
        &mut self,
        stage: ShaderStage,
        settings: &GlslSettings,
    ) -> Result<String, CompileError> {
        let ast = self.extract_stage(stage)?;
        let writer = GlslWriter::new(settings.clone().with_stage(stage));
        Ok(writer.render(&ast)?)
    }

    pub fn compile_spirv<A: Assembler>(
        &mut self,
        stage: ShaderStage,
        assembler: A,
    ) -> Result<Vec<u32>, CompileError> {
        let ast = self.extract_stage(stage)?;
        let mut words = Vec::new();
        SpirvWriter::new(stage, assembler).compile(&ast, &mut words)?;
        Ok(words)
    }

    /// Drop cached reflection. The instance stays usable.
    pub fn clear(&mut self) {
        self.reflections.clear();
    }
}
