//! Token-level library inclusion.
//!
//! `include a.b;` is replaced by the tokens of library `a.b` before the
//! grammar runs, so included declarations behave exactly as if they were
//! written in place. A library included a second time is skipped.
//!
//! Library tokens carry offsets into the library text, which diagnostics
//! rendered against the including source cannot use. Spliced tokens, and
//! errors raised inside a library, are therefore located at the top-level
//! `include` directive that pulled them in.

use rustc_hash::{FxHashMap, FxHashSet};
use usl_ir::{SourcePos, Span, Token, TokenKind, TokenList};
use usl_lexer::LexError;

use crate::ParseError;

/// Supplies the tokens of a named library.
pub trait LibraryResolver {
    /// Tokens of `name` (dotted spelling), `Ok(None)` if the library is
    /// unknown.
    fn resolve(&self, name: &str) -> Result<Option<TokenList>, LexError>;
}

/// Resolver over in-memory library sources, lexed on demand.
#[derive(Clone, Debug, Default)]
pub struct SourceLibraries {
    sources: FxHashMap<String, String>,
}

impl SourceLibraries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `source` under the dotted library name `name`.
    pub fn insert(&mut self, name: impl Into<String>, source: impl Into<String>) {
        self.sources.insert(name.into(), source.into());
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.insert(name, source);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sources.contains_key(name)
    }
}

impl LibraryResolver for SourceLibraries {
    fn resolve(&self, name: &str) -> Result<Option<TokenList>, LexError> {
        self.sources
            .get(name)
            .map(|source| usl_lexer::tokenize(source))
            .transpose()
    }
}

/// Replace every `include` directive in `tokens` with the library tokens.
#[tracing::instrument(level = "debug", skip_all)]
pub fn splice_includes(
    tokens: &[Token],
    resolver: &dyn LibraryResolver,
) -> Result<Vec<Token>, ParseError> {
    let mut splicer = Splicer {
        resolver,
        stack: Vec::new(),
        included: FxHashSet::default(),
        origin: None,
    };
    let mut out = Vec::with_capacity(tokens.len());
    splicer.splice(tokens, &mut out)?;
    Ok(out)
}

struct Splicer<'r> {
    resolver: &'r dyn LibraryResolver,
    /// Libraries currently being expanded, outermost first.
    stack: Vec<String>,
    included: FxHashSet<String>,
    /// Location of the top-level directive being expanded.
    origin: Option<(Span, SourcePos)>,
}

impl Splicer<'_> {
    fn splice(&mut self, tokens: &[Token], out: &mut Vec<Token>) -> Result<(), ParseError> {
        let mut i = 0;
        while let Some(token) = tokens.get(i) {
            if token.kind != TokenKind::Include {
                out.push(self.relocate(token));
                i += 1;
                continue;
            }

            let (name, next) = read_path(tokens, i).map_err(|err| self.relocate_error(err))?;
            let directive = tokens
                .get(next - 1)
                .map_or(token.span, |semi| token.span.merge(semi.span));
            let (span, pos) = self.origin.unwrap_or((directive, token.pos));
            i = next;

            if self.stack.contains(&name) {
                return Err(ParseError::IncludeCycle { name, span, pos });
            }
            if !self.included.insert(name.clone()) {
                tracing::debug!(library = %name, "already included");
                continue;
            }

            let library = self
                .resolver
                .resolve(&name)
                .map_err(|err| ParseError::from(err).relocate(span, pos))?
                .ok_or_else(|| ParseError::UnresolvedLibrary {
                    name: name.clone(),
                    span,
                    pos,
                })?;
            tracing::debug!(library = %name, tokens = library.len(), "splicing library");

            let outer = self.origin.replace((span, pos));
            self.stack.push(name);
            self.splice(library.without_eof(), out)?;
            self.stack.pop();
            self.origin = outer;
        }
        Ok(())
    }

    fn relocate(&self, token: &Token) -> Token {
        match self.origin {
            Some((span, pos)) => Token::new(token.kind.clone(), span, pos),
            None => token.clone(),
        }
    }

    fn relocate_error(&self, err: ParseError) -> ParseError {
        match self.origin {
            Some((span, pos)) => err.relocate(span, pos),
            None => err,
        }
    }
}

/// Read `include IDENT ('.' IDENT)* ';'` starting at `start`; returns the
/// dotted name and the index after the semicolon.
fn read_path(tokens: &[Token], start: usize) -> Result<(String, usize), ParseError> {
    let mut segments: Vec<&str> = Vec::new();
    let mut i = start + 1;
    loop {
        match tokens.get(i).map(|t| &t.kind) {
            Some(TokenKind::Ident(name)) => segments.push(name.as_str()),
            _ => return Err(unexpected_at(tokens, i, "library name")),
        }
        i += 1;
        match tokens.get(i).map(|t| &t.kind) {
            Some(TokenKind::Dot) => i += 1,
            Some(TokenKind::Semicolon) => return Ok((segments.join("."), i + 1)),
            _ => return Err(unexpected_at(tokens, i, "`.` or `;`")),
        }
    }
}

fn unexpected_at(tokens: &[Token], i: usize, expected: &str) -> ParseError {
    match tokens.get(i).or_else(|| tokens.last()) {
        Some(token) => ParseError::unexpected(expected, token),
        None => ParseError::unexpected(expected, &Token::dummy(TokenKind::Eof)),
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
