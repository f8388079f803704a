//! Built-in registry.
//!
//! Type names and built-in function names are not keywords of the source
//! language. The parser asks a `BuiltinRegistry` whether an identifier
//! names a type (then `T(args)` is a cast) or a built-in (then `f(args)`
//! is a built-in call). Each compiler instance owns its own registry, so
//! dialects and test fixtures never see each other's registrations.

use rustc_hash::FxHashMap;

use crate::{ImageDim, Name, PrimitiveType, Type};

/// Functions provided by the target rather than declared in source.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum BuiltinFunction {
    Sample,
    Dot,
    Cross,
    Normalize,
    Length,
    Distance,
    Reflect,
    Min,
    Max,
    Clamp,
    Mix,
    Step,
    SmoothStep,
    Pow,
    Exp,
    Log,
    Sqrt,
    InverseSqrt,
    Abs,
    Sign,
    Floor,
    Ceil,
    Fract,
    Sin,
    Cos,
    Tan,
    Transpose,
    Inverse,
}

impl BuiltinFunction {
    pub const ALL: [BuiltinFunction; 28] = [
        BuiltinFunction::Sample,
        BuiltinFunction::Dot,
        BuiltinFunction::Cross,
        BuiltinFunction::Normalize,
        BuiltinFunction::Length,
        BuiltinFunction::Distance,
        BuiltinFunction::Reflect,
        BuiltinFunction::Min,
        BuiltinFunction::Max,
        BuiltinFunction::Clamp,
        BuiltinFunction::Mix,
        BuiltinFunction::Step,
        BuiltinFunction::SmoothStep,
        BuiltinFunction::Pow,
        BuiltinFunction::Exp,
        BuiltinFunction::Log,
        BuiltinFunction::Sqrt,
        BuiltinFunction::InverseSqrt,
        BuiltinFunction::Abs,
        BuiltinFunction::Sign,
        BuiltinFunction::Floor,
        BuiltinFunction::Ceil,
        BuiltinFunction::Fract,
        BuiltinFunction::Sin,
        BuiltinFunction::Cos,
        BuiltinFunction::Tan,
        BuiltinFunction::Transpose,
        BuiltinFunction::Inverse,
    ];

    /// Canonical source-language spelling.
    pub fn name(self) -> &'static str {
        match self {
            BuiltinFunction::Sample => "sample",
            BuiltinFunction::SmoothStep => "smoothstep",
            BuiltinFunction::InverseSqrt => "inversesqrt",
            other => other.glsl_name(),
        }
    }

    /// GLSL spelling.
    pub fn glsl_name(self) -> &'static str {
        match self {
            BuiltinFunction::Sample => "texture",
            BuiltinFunction::Dot => "dot",
            BuiltinFunction::Cross => "cross",
            BuiltinFunction::Normalize => "normalize",
            BuiltinFunction::Length => "length",
            BuiltinFunction::Distance => "distance",
            BuiltinFunction::Reflect => "reflect",
            BuiltinFunction::Min => "min",
            BuiltinFunction::Max => "max",
            BuiltinFunction::Clamp => "clamp",
            BuiltinFunction::Mix => "mix",
            BuiltinFunction::Step => "step",
            BuiltinFunction::SmoothStep => "smoothstep",
            BuiltinFunction::Pow => "pow",
            BuiltinFunction::Exp => "exp",
            BuiltinFunction::Log => "log",
            BuiltinFunction::Sqrt => "sqrt",
            BuiltinFunction::InverseSqrt => "inversesqrt",
            BuiltinFunction::Abs => "abs",
            BuiltinFunction::Sign => "sign",
            BuiltinFunction::Floor => "floor",
            BuiltinFunction::Ceil => "ceil",
            BuiltinFunction::Fract => "fract",
            BuiltinFunction::Sin => "sin",
            BuiltinFunction::Cos => "cos",
            BuiltinFunction::Tan => "tan",
            BuiltinFunction::Transpose => "transpose",
            BuiltinFunction::Inverse => "inverse",
        }
    }

    /// Lowest desktop GLSL version (as `major * 100 + minor * 10`) that
    /// provides the function under its GLSL spelling.
    pub fn min_glsl_version(self) -> u32 {
        match self {
            BuiltinFunction::Sample => 130,
            BuiltinFunction::Transpose => 120,
            BuiltinFunction::Inverse => 140,
            _ => 110,
        }
    }

    /// Same as `min_glsl_version` for GLSL ES.
    pub fn min_glsl_es_version(self) -> u32 {
        match self {
            BuiltinFunction::Sample | BuiltinFunction::Transpose | BuiltinFunction::Inverse => 300,
            _ => 100,
        }
    }
}

/// Names the parser resolves without an in-language declaration.
#[derive(Clone, Debug)]
pub struct BuiltinRegistry {
    types: FxHashMap<Name, Type>,
    functions: FxHashMap<Name, BuiltinFunction>,
}

impl BuiltinRegistry {
    /// Registry of the default dialect: every scalar, vector, matrix and
    /// sampler spelling plus every `BuiltinFunction` under its canonical
    /// name.
    pub fn new() -> Self {
        let mut registry = Self::empty();

        registry.register_type("void", Type::Void);
        for primitive in PrimitiveType::ALL {
            registry.register_type(primitive.name(), Type::Primitive(primitive));
            for size in 2..=4 {
                let ty = Type::vector(primitive, size);
                registry.register_type(ty.base_name(), ty);
            }
        }
        for columns in 2..=4 {
            for rows in 2..=4 {
                let ty = Type::Matrix {
                    component: PrimitiveType::Float,
                    columns,
                    rows,
                };
                registry.register_type(ty.base_name(), ty);
            }
        }
        // `mat3x3` is accepted as well as `mat3`
        for size in 2..=4 {
            registry.register_type(
                format!("mat{size}x{size}"),
                Type::Matrix {
                    component: PrimitiveType::Float,
                    columns: size,
                    rows: size,
                },
            );
        }
        for sampled in [PrimitiveType::Float, PrimitiveType::Int, PrimitiveType::UInt] {
            for dim in ImageDim::ALL {
                let ty = Type::Sampler { sampled, dim };
                registry.register_type(ty.base_name(), ty);
            }
        }

        for builtin in BuiltinFunction::ALL {
            registry.register_function(builtin.name(), builtin);
        }
        registry
    }

    /// Registry that knows no names at all.
    pub fn empty() -> Self {
        BuiltinRegistry {
            types: FxHashMap::default(),
            functions: FxHashMap::default(),
        }
    }

    pub fn register_type(&mut self, name: impl Into<Name>, ty: Type) {
        self.types.insert(name.into(), ty);
    }

    /// Register `name` as a spelling of `builtin`; aliases are allowed.
    pub fn register_function(&mut self, name: impl Into<Name>, builtin: BuiltinFunction) {
        self.functions.insert(name.into(), builtin);
    }

    pub fn lookup_type(&self, name: &str) -> Option<&Type> {
        self.types.get(name)
    }

    pub fn lookup_function(&self, name: &str) -> Option<BuiltinFunction> {
        self.functions.get(name).copied()
    }

    pub fn is_type(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }
}

impl Default for BuiltinRegistry {
    fn default() -> Self {
        Self::new()
    }
}
