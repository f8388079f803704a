//! Forward declaration scan.

use rustc_hash::FxHashSet;
use usl_ir::{Name, Token, TokenKind};

/// Every name following a `struct` keyword.
pub(crate) fn struct_names(tokens: &[Token]) -> FxHashSet<Name> {
    tokens
        .windows(2)
        .filter_map(|pair| match pair {
            [first, second] if first.kind == TokenKind::Struct => match &second.kind {
                TokenKind::Ident(name) => Some(name.clone()),
                _ => None,
            },
            _ => None,
        })
        .collect()
}
