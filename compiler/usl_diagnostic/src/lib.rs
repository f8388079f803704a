//! Diagnostics for the shader compiler.
//!
//! Every phase error converts into a [`Diagnostic`]: an [`ErrorCode`], a
//! message, labeled spans and notes. [`render`] turns one into a
//! human-readable report over the source text.

mod diagnostic;
mod error_code;
mod render;

pub use diagnostic::{Diagnostic, Label};
pub use error_code::ErrorCode;
pub use render::render;
