//! Shader types and stage tags.
//!
//! Type spellings follow one convention shared by the source language and
//! the GLSL backend: a primitive prefix (`i`, `u`, `b`, or none for float)
//! followed by `vec`/`mat`/`sampler` and an arity or dimensionality.

use std::fmt;

use crate::Name;

/// Scalar component type.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum PrimitiveType {
    Bool,
    Int,
    UInt,
    Float,
}

impl PrimitiveType {
    pub const ALL: [PrimitiveType; 4] = [
        PrimitiveType::Bool,
        PrimitiveType::Int,
        PrimitiveType::UInt,
        PrimitiveType::Float,
    ];

    /// Scalar spelling: `bool`, `int`, `uint`, `float`.
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveType::Bool => "bool",
            PrimitiveType::Int => "int",
            PrimitiveType::UInt => "uint",
            PrimitiveType::Float => "float",
        }
    }

    /// Prefix used for vector and sampler spellings.
    pub fn prefix(self) -> &'static str {
        match self {
            PrimitiveType::Bool => "b",
            PrimitiveType::Int => "i",
            PrimitiveType::UInt => "u",
            PrimitiveType::Float => "",
        }
    }

    #[inline]
    pub fn is_integer(self) -> bool {
        matches!(self, PrimitiveType::Int | PrimitiveType::UInt)
    }
}

/// Image dimensionality of a sampler.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum ImageDim {
    Dim1D,
    Dim2D,
    Dim3D,
    Cube,
    Dim2DArray,
}

impl ImageDim {
    pub const ALL: [ImageDim; 5] = [
        ImageDim::Dim1D,
        ImageDim::Dim2D,
        ImageDim::Dim3D,
        ImageDim::Cube,
        ImageDim::Dim2DArray,
    ];

    pub fn suffix(self) -> &'static str {
        match self {
            ImageDim::Dim1D => "1D",
            ImageDim::Dim2D => "2D",
            ImageDim::Dim3D => "3D",
            ImageDim::Cube => "Cube",
            ImageDim::Dim2DArray => "2DArray",
        }
    }
}

/// Array length.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum ArraySize {
    Fixed(u32),
    /// `T[]`: sized by context, e.g. the tail of a storage buffer.
    Implicit,
}

/// A shader type. Equality is structural.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Type {
    Void,
    Primitive(PrimitiveType),
    /// `size` is 2 to 4.
    Vector {
        component: PrimitiveType,
        size: u8,
    },
    Matrix {
        component: PrimitiveType,
        columns: u8,
        rows: u8,
    },
    Array {
        element: Box<Type>,
        size: ArraySize,
    },
    Sampler {
        sampled: PrimitiveType,
        dim: ImageDim,
    },
    Struct(Name),
}

impl Type {
    pub const FLOAT: Type = Type::Primitive(PrimitiveType::Float);
    pub const INT: Type = Type::Primitive(PrimitiveType::Int);
    pub const UINT: Type = Type::Primitive(PrimitiveType::UInt);
    pub const BOOL: Type = Type::Primitive(PrimitiveType::Bool);

    pub fn vector(component: PrimitiveType, size: u8) -> Self {
        Type::Vector { component, size }
    }

    pub fn array(element: Type, size: ArraySize) -> Self {
        Type::Array {
            element: Box::new(element),
            size,
        }
    }

    pub fn struct_named(name: impl Into<Name>) -> Self {
        Type::Struct(name.into())
    }

    /// The struct this type names, looking through arrays.
    pub fn struct_name(&self) -> Option<&Name> {
        match self {
            Type::Struct(name) => Some(name),
            Type::Array { element, .. } => element.struct_name(),
            _ => None,
        }
    }

    /// Innermost non-array type.
    pub fn base(&self) -> &Type {
        match self {
            Type::Array { element, .. } => element.base(),
            other => other,
        }
    }

    /// Scalar component of a primitive, vector or matrix (through arrays).
    pub fn component(&self) -> Option<PrimitiveType> {
        match self.base() {
            Type::Primitive(p)
            | Type::Vector { component: p, .. }
            | Type::Matrix { component: p, .. } => Some(*p),
            _ => None,
        }
    }

    pub fn is_sampler(&self) -> bool {
        matches!(self.base(), Type::Sampler { .. })
    }

    /// Array dimensions from outermost to innermost.
    pub fn array_dims(&self) -> Vec<ArraySize> {
        let mut dims = Vec::new();
        let mut ty = self;
        while let Type::Array { element, size } = ty {
            dims.push(*size);
            ty = element;
        }
        dims
    }

    /// Spelling of the innermost type: `vec3`, `mat2x3`, `usampler2D`, a
    /// struct name. Arrays are written by the caller from `array_dims`.
    pub fn base_name(&self) -> String {
        match self.base() {
            Type::Void => "void".to_string(),
            Type::Primitive(p) => p.name().to_string(),
            Type::Vector { component, size } => format!("{}vec{size}", component.prefix()),
            Type::Matrix {
                component,
                columns,
                rows,
            } => {
                let prefix = component.prefix();
                if columns == rows {
                    format!("{prefix}mat{columns}")
                } else {
                    format!("{prefix}mat{columns}x{rows}")
                }
            }
            Type::Sampler { sampled, dim } => {
                format!("{}sampler{}", sampled.prefix(), dim.suffix())
            }
            Type::Struct(name) => name.to_string(),
            // base() never returns an array
            Type::Array { .. } => String::new(),
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Source-language spelling: the base name followed by `[N]`/`[]` suffixes.
impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base_name())?;
        for dim in self.array_dims() {
            match dim {
                ArraySize::Fixed(n) => write!(f, "[{n}]")?,
                ArraySize::Implicit => f.write_str("[]")?,
            }
        }
        Ok(())
    }
}

/// Pipeline stage an entry function belongs to.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Compute,
}

impl ShaderStage {
    pub const ALL: [ShaderStage; 3] = [
        ShaderStage::Vertex,
        ShaderStage::Fragment,
        ShaderStage::Compute,
    ];

    /// Canonical attribute spelling.
    pub fn name(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
            ShaderStage::Compute => "compute",
        }
    }

    /// Parse a stage attribute argument (`vertex`/`vert`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "vertex" | "vert" => Some(ShaderStage::Vertex),
            "fragment" | "frag" => Some(ShaderStage::Fragment),
            "compute" | "comp" => Some(ShaderStage::Compute),
            _ => None,
        }
    }

    /// Conventional file extension for GLSL tools.
    pub fn file_extension(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vert",
            ShaderStage::Fragment => "frag",
            ShaderStage::Compute => "comp",
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Interface variable bound to a fixed-function value instead of a location.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum BuiltinVariable {
    Position,
    FragDepth,
    VertexIndex,
    InstanceIndex,
    GlobalInvocationId,
    LocalInvocationId,
    WorkgroupId,
}

impl BuiltinVariable {
    pub const ALL: [BuiltinVariable; 7] = [
        BuiltinVariable::Position,
        BuiltinVariable::FragDepth,
        BuiltinVariable::VertexIndex,
        BuiltinVariable::InstanceIndex,
        BuiltinVariable::GlobalInvocationId,
        BuiltinVariable::LocalInvocationId,
        BuiltinVariable::WorkgroupId,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BuiltinVariable::Position => "position",
            BuiltinVariable::FragDepth => "frag_depth",
            BuiltinVariable::VertexIndex => "vertex_index",
            BuiltinVariable::InstanceIndex => "instance_index",
            BuiltinVariable::GlobalInvocationId => "global_invocation_id",
            BuiltinVariable::LocalInvocationId => "local_invocation_id",
            BuiltinVariable::WorkgroupId => "workgroup_id",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.name() == name)
    }
}

impl fmt::Display for BuiltinVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
