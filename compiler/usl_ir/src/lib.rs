//! USL IR - core data structures of the shader compiler.
//!
//! This crate contains everything the pipeline phases share:
//! - Spans and line/column positions for diagnostics
//! - Names for identifiers
//! - Tokens and `TokenList` for lexer output
//! - Types, expressions and statements (closed sum types)
//! - The built-in registry threaded through the parser
//! - Visitors: read-only, mutating and cloning
//!
//! # Design Philosophy
//!
//! - **Closed sum types**: every traversal is an exhaustive `match`, so
//!   adding a node kind fails to compile until every pass handles it.
//! - **Tree ownership**: nodes own their children through `Box`/`Vec`;
//!   cloning a tree never aliases a subtree.
//! - **No globals**: built-in names live in a `BuiltinRegistry` value.

pub mod ast;
mod builtins;
mod name;
mod span;
mod token;
mod types;
pub mod visitor;

pub use ast::{
    AssignOp, BinaryOp, ConditionalBranch, ConstDeclaration, ConstantValue, EntryPoint,
    Expression, ExpressionKind, ExpressionTag, ExternalVariable, FunctionDeclaration,
    IncludePath, InterfaceSlot, InterfaceVariable, OptionDeclaration, Parameter, Precedence,
    Statement, StatementKind, StatementTag, StructDeclaration, StructField, Swizzle, SwizzleSet,
    UnaryOp, VariableDeclaration,
};
pub use builtins::{BuiltinFunction, BuiltinRegistry};
pub use name::Name;
pub use span::{SourcePos, Span};
pub use token::{Token, TokenKind, TokenList};
pub use types::{ArraySize, BuiltinVariable, ImageDim, PrimitiveType, ShaderStage, Type};
pub use visitor::{AstCloner, DeepCopy, Visitor, VisitorMut};
