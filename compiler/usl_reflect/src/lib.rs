//! Stage extraction and reflection for USL shaders.
//!
//! A specialized tree may hold several entry functions. For one stage,
//! [`StageExtractor`] keeps only the declarations reachable from that
//! stage's entry function and reports the resulting interface in an
//! [`AstReflection`]:
//!
//! ```text
//! let mut extractor = StageExtractor::new();
//! extractor.load(specialized)?;
//! let fragment = extractor.extract(ShaderStage::Fragment)?;
//! for external in fragment.reflection.externals() { ... }
//! ```
//!
//! Declarations live in a [`DeclarationIndex`] arena, one vector per
//! kind; dependencies are name sets, resolved against the arena only
//! while computing the closure.

mod dependency;
mod error;
mod extract;
mod index;
mod reflection;

pub use dependency::{DependencyCollector, DependencyData};
pub use error::{InterfaceDirection, ReflectError};
pub use extract::{extract_stage, ExtractedStage, StageExtractor};
pub use index::{Declaration, DeclarationIndex, DeclarationKey};
pub use reflection::{
    AstReflection, EntryPointInfo, ExternalInfo, ExternalKind, InterfaceInfo, StructInfo,
};
