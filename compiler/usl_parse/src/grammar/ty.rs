//! Type parsing.

use usl_ir::{ArraySize, Name, TokenKind, Type};

use crate::{ParseError, Parser};

impl Parser<'_> {
    /// Built-in type spelling or declared struct.
    pub(crate) fn lookup_type(&self, name: &Name) -> Option<Type> {
        if let Some(ty) = self.registry.lookup_type(name) {
            return Some(ty.clone());
        }
        self.structs
            .contains(name)
            .then(|| Type::Struct(name.clone()))
    }

    pub(crate) fn is_type_name(&self, name: &Name) -> bool {
        self.registry.is_type(name) || self.structs.contains(name)
    }

    /// `IDENT ('[' INT? ']')*`
    pub(crate) fn parse_type(&mut self) -> Result<Type, ParseError> {
        let token = self.cursor.current();
        let TokenKind::Ident(name) = &token.kind else {
            return Err(ParseError::unexpected("type", token));
        };
        let base = self.lookup_type(name).ok_or_else(|| ParseError::UnknownType {
            name: name.clone(),
            span: token.span,
            pos: token.pos,
        })?;
        self.cursor.advance();
        self.parse_array_suffix(base)
    }

    /// Array dimensions after a type name; the first one written is the
    /// outermost.
    pub(crate) fn parse_array_suffix(&mut self, base: Type) -> Result<Type, ParseError> {
        let mut dims = Vec::new();
        while self.cursor.eat(&TokenKind::LBracket) {
            let token = self.cursor.current();
            let size = match token.kind {
                TokenKind::RBracket => ArraySize::Implicit,
                TokenKind::UInt(n) => ArraySize::Fixed(n),
                TokenKind::Int(n) => match u32::try_from(n) {
                    Ok(n) => ArraySize::Fixed(n),
                    Err(_) => return Err(ParseError::unexpected("array size", token)),
                },
                _ => return Err(ParseError::unexpected("array size", token)),
            };
            if size != ArraySize::Implicit {
                self.cursor.advance();
            }
            self.cursor.expect(&TokenKind::RBracket)?;
            dims.push(size);
        }
        Ok(dims.into_iter().rev().fold(base, Type::array))
    }

    /// Whether the tokens ahead read `Type name`, with optional array
    /// brackets after the type.
    pub(crate) fn at_declaration(&self) -> bool {
        let TokenKind::Ident(name) = self.cursor.current_kind() else {
            return false;
        };
        if !self.is_type_name(name) {
            return false;
        }
        let mut n = 1;
        while self.cursor.peek_kind_at(n) == &TokenKind::LBracket {
            n += 1;
            if matches!(
                self.cursor.peek_kind_at(n),
                TokenKind::Int(_) | TokenKind::UInt(_)
            ) {
                n += 1;
            }
            if self.cursor.peek_kind_at(n) != &TokenKind::RBracket {
                return false;
            }
            n += 1;
        }
        matches!(self.cursor.peek_kind_at(n), TokenKind::Ident(_))
    }
}
