//! Grammar productions.
//!
//! Each module extends `Parser` with methods for one part of the language:
//!
//! - `item`: file-level declarations, blocks, `optional`, `include`
//! - `stmt`: statements inside function bodies
//! - `expr`: expressions by precedence climbing
//! - `ty`: type names and array suffixes

mod expr;
mod item;
mod stmt;
mod ty;
