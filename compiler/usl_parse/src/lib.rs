//! Recursive descent parser for USL.
//!
//! Turns a `TokenList` into the root `Statement` of a shader file (a
//! `Sequence` of declarations). Type names are resolved while parsing:
//! built-in spellings through the `BuiltinRegistry`, user structs through a
//! pre-pass that collects every `struct NAME` in the token stream, so
//! declarations may appear in any order.
//!
//! `include` directives are either spliced at the token level through a
//! [`LibraryResolver`] or kept as `Include` statements.

mod attr;
mod cursor;
mod error;
mod grammar;
mod include;
mod prepass;

use rustc_hash::FxHashSet;
use usl_ir::{BuiltinRegistry, Name, Statement, Token, TokenKind, TokenList};

use cursor::Cursor;

pub use error::{AttributeError, AttributeErrorKind, ParseError};
pub use include::{splice_includes, LibraryResolver, SourceLibraries};

/// Parser state.
pub struct Parser<'a> {
    cursor: Cursor<'a>,
    registry: &'a BuiltinRegistry,
    /// Struct names known from the pre-pass.
    structs: FxHashSet<Name>,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token], registry: &'a BuiltinRegistry) -> Self {
        Parser {
            cursor: Cursor::new(tokens),
            registry,
            structs: prepass::struct_names(tokens),
        }
    }

    /// Parse the whole token stream as a file.
    pub fn parse_file(mut self) -> Result<Statement, ParseError> {
        let start = self.cursor.current_span();
        let items = self.parse_items_until(&TokenKind::Eof)?;
        self.cursor.expect(&TokenKind::Eof)?;
        let span = if items.is_empty() {
            start
        } else {
            start.merge(self.cursor.previous_span())
        };
        Ok(Statement::sequence(items, span))
    }
}

/// Parse a lexed file. `include` directives are kept as statements.
#[tracing::instrument(level = "debug", skip_all, fields(tokens = tokens.len()))]
pub fn parse(tokens: &TokenList, registry: &BuiltinRegistry) -> Result<Statement, ParseError> {
    Parser::new(tokens.as_slice(), registry).parse_file()
}

/// Parse a lexed file, splicing `include` directives through `resolver`.
#[tracing::instrument(level = "debug", skip_all, fields(tokens = tokens.len()))]
pub fn parse_with_libraries(
    tokens: &TokenList,
    registry: &BuiltinRegistry,
    resolver: &dyn LibraryResolver,
) -> Result<Statement, ParseError> {
    let spliced = splice_includes(tokens.as_slice(), resolver)?;
    Parser::new(&spliced, registry).parse_file()
}

/// Lex and parse `source` in one step.
pub fn parse_source(source: &str, registry: &BuiltinRegistry) -> Result<Statement, ParseError> {
    let tokens = usl_lexer::tokenize(source)?;
    parse(&tokens, registry)
}
