//! Lexer for USL using logos.
//!
//! Produces a `TokenList` that always ends with `TokenKind::Eof`. Whitespace
//! and comments are dropped; every token keeps its byte span and its
//! line/column. Lexing is all-or-nothing: the first malformed token aborts
//! the pass with a `LexError`.

mod error;
mod line_index;
mod raw_token;

use logos::Logos;
use usl_ir::{Span, Token, TokenKind, TokenList};

pub use error::{LexError, LexErrorKind};
pub use line_index::LineIndex;

use raw_token::RawToken;

/// Lex `source` into tokens.
#[tracing::instrument(level = "debug", skip_all, fields(len = source.len()))]
pub fn tokenize(source: &str) -> Result<TokenList, LexError> {
    let index = LineIndex::new(source);
    let mut tokens = TokenList::with_capacity(source.len() / 4 + 1);
    let mut lexer = RawToken::lexer(source);

    while let Some(result) = lexer.next() {
        let range = lexer.span();
        let span = Span::from_range(range.clone());
        let pos = index.position(range.start);
        match result {
            Ok(raw) => tokens.push(Token::new(raw.into_kind(lexer.slice()), span, pos)),
            Err(kind) => {
                tracing::debug!(%pos, ?kind, "lex error");
                return Err(LexError {
                    kind,
                    span,
                    pos,
                    text: lexer.slice().to_string(),
                });
            }
        }
    }

    let end = source.len();
    tokens.push(Token::new(
        TokenKind::Eof,
        Span::from_range(end..end),
        index.position(end),
    ));
    tracing::trace!(count = tokens.len(), "tokenized");
    Ok(tokens)
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
