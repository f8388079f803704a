//! Token navigation for the parser.

use usl_ir::{Name, SourcePos, Span, Token, TokenKind};

use crate::ParseError;

static EOF: Token = Token {
    kind: TokenKind::Eof,
    span: Span::DUMMY,
    pos: SourcePos::new(0, 0),
};

/// Position in a token slice. Reading past the end yields `Eof`.
pub struct Cursor<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Cursor { tokens, pos: 0 }
    }

    #[inline]
    pub fn current(&self) -> &'a Token {
        self.tokens.get(self.pos).unwrap_or(&EOF)
    }

    #[inline]
    pub fn current_kind(&self) -> &'a TokenKind {
        &self.current().kind
    }

    #[inline]
    pub fn current_span(&self) -> Span {
        self.current().span
    }

    /// Span of the last consumed token, or the current one at the start.
    pub fn previous_span(&self) -> Span {
        match self.pos.checked_sub(1).and_then(|i| self.tokens.get(i)) {
            Some(token) => token.span,
            None => self.current_span(),
        }
    }

    /// Kind of the token `n` positions ahead; `0` is the current token.
    pub fn peek_kind_at(&self, n: usize) -> &'a TokenKind {
        self.tokens
            .get(self.pos + n)
            .map_or(&EOF.kind, |token| &token.kind)
    }

    #[inline]
    pub fn peek_next_kind(&self) -> &'a TokenKind {
        self.peek_kind_at(1)
    }

    /// Same variant as `kind`, payload ignored.
    #[inline]
    pub fn check(&self, kind: &TokenKind) -> bool {
        self.current_kind().same_kind(kind)
    }

    #[inline]
    pub fn check_ident(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Ident(_))
    }

    /// The current token is the identifier `text`.
    pub fn check_ident_named(&self, text: &str) -> bool {
        matches!(self.current_kind(), TokenKind::Ident(name) if name == text)
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.check(&TokenKind::Eof)
    }

    pub fn advance(&mut self) -> &'a Token {
        let token = self.current();
        if !self.is_at_end() {
            self.pos += 1;
        }
        tracing::trace!(token = ?token.kind, "advance");
        token
    }

    /// Consume the current token if it matches `kind`.
    pub fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn expect(&mut self, kind: &TokenKind) -> Result<&'a Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(ParseError::unexpected(kind.display_name(), self.current()))
        }
    }

    pub fn expect_ident(&mut self) -> Result<(Name, Span), ParseError> {
        let token = self.current();
        if let TokenKind::Ident(name) = &token.kind {
            self.advance();
            Ok((name.clone(), token.span))
        } else {
            Err(ParseError::unexpected("identifier", token))
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
