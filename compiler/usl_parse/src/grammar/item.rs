//! File-level declarations.

use usl_ir::{
    ConstDeclaration, ExternalVariable, FunctionDeclaration, IncludePath, InterfaceVariable,
    Name, OptionDeclaration, Parameter, Span, Statement, StatementKind, StructDeclaration,
    StructField, TokenKind, Type, VariableDeclaration,
};

use crate::attr::{Attribute, AttributeArg, AttributeList};
use crate::{ParseError, Parser};

impl Parser<'_> {
    /// Items up to (not including) `end`.
    pub(crate) fn parse_items_until(
        &mut self,
        end: &TokenKind,
    ) -> Result<Vec<Statement>, ParseError> {
        let mut items = Vec::new();
        while !self.cursor.check(end) && !self.cursor.is_at_end() {
            items.push(self.parse_item()?);
        }
        Ok(items)
    }

    fn parse_item(&mut self) -> Result<Statement, ParseError> {
        let start = self.cursor.current();
        let attrs = self.parse_attributes()?;

        match self.cursor.current_kind() {
            TokenKind::Struct => {
                attrs.expect_none("a struct")?;
                self.parse_struct(start.span)
            }
            TokenKind::Input | TokenKind::Output | TokenKind::External | TokenKind::Option => {
                attrs.expect_none("a declaration block")?;
                self.parse_block(start.span)
            }
            TokenKind::Const if self.cursor.peek_next_kind() == &TokenKind::LBrace => {
                attrs.expect_none("a declaration block")?;
                self.parse_block(start.span)
            }
            TokenKind::Const => {
                attrs.expect_none("a variable")?;
                self.parse_variable_declaration()
            }
            TokenKind::Optional => {
                attrs.expect_none("an optional block")?;
                self.parse_optional(true)
            }
            TokenKind::Include => {
                attrs.expect_none("an include")?;
                self.parse_include()
            }
            TokenKind::Ident(_) => {
                let ty = self.parse_type()?;
                let (name, _) = self.cursor.expect_ident()?;
                if self.cursor.check(&TokenKind::LParen) {
                    let entry = attrs.entry_point()?;
                    let mut function = self.parse_function(ty, name)?;
                    function.entry = entry;
                    Ok(Statement::new(
                        StatementKind::DeclareFunction(function),
                        self.span_from(start.span),
                    ))
                } else {
                    attrs.expect_none("a variable")?;
                    self.finish_variable(start.span, false, ty, name)
                }
            }
            _ => Err(ParseError::unexpected("declaration", self.cursor.current())),
        }
    }

    /// Zero or more `[a, b(1)]` groups in front of a declaration.
    fn parse_attributes(&mut self) -> Result<AttributeList, ParseError> {
        let start = self.cursor.current();
        let mut attrs = Vec::new();
        while self.cursor.eat(&TokenKind::LBracket) {
            loop {
                attrs.push(self.parse_attribute()?);
                if !self.cursor.eat(&TokenKind::Comma) {
                    break;
                }
            }
            self.cursor.expect(&TokenKind::RBracket)?;
        }
        Ok(AttributeList::new(attrs, start.span, start.pos))
    }

    fn parse_attribute(&mut self) -> Result<Attribute, ParseError> {
        let token = self.cursor.current();
        let (name, _) = self.cursor.expect_ident()?;
        let mut args = Vec::new();
        if self.cursor.eat(&TokenKind::LParen) {
            loop {
                let arg = self.cursor.current();
                args.push(match &arg.kind {
                    TokenKind::Int(v) => match u32::try_from(*v) {
                        Ok(v) => AttributeArg::Int(v),
                        Err(_) => return Err(ParseError::unexpected("attribute argument", arg)),
                    },
                    TokenKind::UInt(v) => AttributeArg::Int(*v),
                    TokenKind::Ident(name) => AttributeArg::Ident(name.clone()),
                    _ => return Err(ParseError::unexpected("attribute argument", arg)),
                });
                self.cursor.advance();
                if !self.cursor.eat(&TokenKind::Comma) {
                    break;
                }
            }
            self.cursor.expect(&TokenKind::RParen)?;
        }
        Ok(Attribute {
            name,
            args,
            span: self.span_from(token.span),
            pos: token.pos,
        })
    }

    /// `struct NAME { field: Type; ... }`
    fn parse_struct(&mut self, start: Span) -> Result<Statement, ParseError> {
        self.cursor.expect(&TokenKind::Struct)?;
        let (name, _) = self.cursor.expect_ident()?;
        self.cursor.expect(&TokenKind::LBrace)?;
        let mut fields = Vec::new();
        while !self.cursor.check(&TokenKind::RBrace) && !self.cursor.is_at_end() {
            let (field, _) = self.cursor.expect_ident()?;
            self.cursor.expect(&TokenKind::Colon)?;
            let ty = self.parse_type()?;
            self.cursor.expect(&TokenKind::Semicolon)?;
            fields.push(StructField { name: field, ty });
        }
        self.cursor.expect(&TokenKind::RBrace)?;
        self.cursor.eat(&TokenKind::Semicolon);
        Ok(Statement::new(
            StatementKind::DeclareStruct(StructDeclaration { name, fields }),
            self.span_from(start),
        ))
    }

    /// `input { }`, `output { }`, `external { }`, `option { }`, `const { }`
    fn parse_block(&mut self, start: Span) -> Result<Statement, ParseError> {
        let keyword = self.cursor.advance();
        self.cursor.expect(&TokenKind::LBrace)?;
        let kind = match keyword.kind {
            TokenKind::Input => {
                StatementKind::DeclareInputs(self.parse_entries(Self::parse_interface_entry)?)
            }
            TokenKind::Output => {
                StatementKind::DeclareOutputs(self.parse_entries(Self::parse_interface_entry)?)
            }
            TokenKind::External => {
                StatementKind::DeclareExternals(self.parse_entries(Self::parse_external_entry)?)
            }
            TokenKind::Option => {
                StatementKind::DeclareOptions(self.parse_entries(Self::parse_option_entry)?)
            }
            _ => StatementKind::DeclareConsts(self.parse_entries(Self::parse_const_entry)?),
        };
        self.cursor.expect(&TokenKind::RBrace)?;
        self.cursor.eat(&TokenKind::Semicolon);
        Ok(Statement::new(kind, self.span_from(start)))
    }

    fn parse_entries<T>(
        &mut self,
        mut entry: impl FnMut(&mut Self) -> Result<T, ParseError>,
    ) -> Result<Vec<T>, ParseError> {
        let mut entries = Vec::new();
        while !self.cursor.check(&TokenKind::RBrace) && !self.cursor.is_at_end() {
            entries.push(entry(self)?);
        }
        Ok(entries)
    }

    /// `[attrs] Type name` shared by every block entry.
    fn parse_entry_head(&mut self) -> Result<(AttributeList, Type, Name, Span), ParseError> {
        let start = self.cursor.current_span();
        let attrs = self.parse_attributes()?;
        let ty = self.parse_type()?;
        let (name, _) = self.cursor.expect_ident()?;
        Ok((attrs, ty, name, start))
    }

    fn parse_interface_entry(&mut self) -> Result<InterfaceVariable, ParseError> {
        let (attrs, ty, name, start) = self.parse_entry_head()?;
        self.cursor.expect(&TokenKind::Semicolon)?;
        let slot = attrs.interface_slot()?;
        Ok(InterfaceVariable {
            name,
            ty,
            slot,
            span: self.span_from(start),
        })
    }

    fn parse_external_entry(&mut self) -> Result<ExternalVariable, ParseError> {
        let (attrs, ty, name, start) = self.parse_entry_head()?;
        self.cursor.expect(&TokenKind::Semicolon)?;
        let (set, binding, storage) = attrs.external_binding()?;
        Ok(ExternalVariable {
            name,
            ty,
            set,
            binding,
            storage,
            span: self.span_from(start),
        })
    }

    fn parse_option_entry(&mut self) -> Result<OptionDeclaration, ParseError> {
        let (attrs, ty, name, start) = self.parse_entry_head()?;
        attrs.expect_none("an option")?;
        let default = if self.cursor.eat(&TokenKind::Eq) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        self.cursor.expect(&TokenKind::Semicolon)?;
        Ok(OptionDeclaration {
            name,
            ty,
            default,
            span: self.span_from(start),
        })
    }

    fn parse_const_entry(&mut self) -> Result<ConstDeclaration, ParseError> {
        let (attrs, ty, name, start) = self.parse_entry_head()?;
        attrs.expect_none("a constant")?;
        self.cursor.expect(&TokenKind::Eq)?;
        let value = self.parse_expression()?;
        self.cursor.expect(&TokenKind::Semicolon)?;
        Ok(ConstDeclaration {
            name,
            ty,
            value,
            span: self.span_from(start),
        })
    }

    /// Parameters and body after `Type name`.
    fn parse_function(
        &mut self,
        return_type: Type,
        name: Name,
    ) -> Result<FunctionDeclaration, ParseError> {
        self.cursor.expect(&TokenKind::LParen)?;
        let mut parameters = Vec::new();
        if !self.cursor.check(&TokenKind::RParen) {
            loop {
                let start = self.cursor.current_span();
                let ty = self.parse_type()?;
                let (param, _) = self.cursor.expect_ident()?;
                parameters.push(Parameter {
                    name: param,
                    ty,
                    span: self.span_from(start),
                });
                if !self.cursor.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.cursor.expect(&TokenKind::RParen)?;
        let body = self.parse_block_body()?;
        Ok(FunctionDeclaration {
            name,
            parameters,
            return_type,
            body,
            entry: None,
        })
    }

    /// `const? Type name (= expr)? ;`
    pub(crate) fn parse_variable_declaration(&mut self) -> Result<Statement, ParseError> {
        let start = self.cursor.current_span();
        let is_const = self.cursor.eat(&TokenKind::Const);
        let ty = self.parse_type()?;
        let (name, _) = self.cursor.expect_ident()?;
        self.finish_variable(start, is_const, ty, name)
    }

    fn finish_variable(
        &mut self,
        start: Span,
        is_const: bool,
        ty: Type,
        name: Name,
    ) -> Result<Statement, ParseError> {
        let initializer = if self.cursor.eat(&TokenKind::Eq) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        self.cursor.expect(&TokenKind::Semicolon)?;
        Ok(Statement::new(
            StatementKind::DeclareVariable(VariableDeclaration {
                name,
                ty,
                is_const,
                initializer,
            }),
            self.span_from(start),
        ))
    }

    /// `optional (cond) { ... } else ...`. At file level the bodies hold
    /// declarations, inside functions they hold statements.
    pub(crate) fn parse_optional(&mut self, items: bool) -> Result<Statement, ParseError> {
        let start = self.cursor.expect(&TokenKind::Optional)?.span;
        self.cursor.expect(&TokenKind::LParen)?;
        let condition = self.parse_expression()?;
        self.cursor.expect(&TokenKind::RParen)?;
        let body = self.parse_optional_body(items)?;
        let else_body = if !self.cursor.eat(&TokenKind::Else) {
            None
        } else if self.cursor.check(&TokenKind::Optional) {
            Some(Box::new(self.parse_optional(items)?))
        } else {
            Some(Box::new(self.parse_optional_body(items)?))
        };
        Ok(Statement::new(
            StatementKind::Optional {
                condition,
                body: Box::new(body),
                else_body,
            },
            self.span_from(start),
        ))
    }

    fn parse_optional_body(&mut self, items: bool) -> Result<Statement, ParseError> {
        let start = self.cursor.current_span();
        let statements = if items {
            self.cursor.expect(&TokenKind::LBrace)?;
            let items = self.parse_items_until(&TokenKind::RBrace)?;
            self.cursor.expect(&TokenKind::RBrace)?;
            items
        } else {
            self.parse_block_body()?
        };
        Ok(Statement::sequence(statements, self.span_from(start)))
    }

    /// `include a.b;` kept as a statement.
    fn parse_include(&mut self) -> Result<Statement, ParseError> {
        let start = self.cursor.expect(&TokenKind::Include)?.span;
        let mut segments = vec![self.cursor.expect_ident()?.0];
        while self.cursor.eat(&TokenKind::Dot) {
            segments.push(self.cursor.expect_ident()?.0);
        }
        self.cursor.expect(&TokenKind::Semicolon)?;
        Ok(Statement::new(
            StatementKind::Include(IncludePath { segments }),
            self.span_from(start),
        ))
    }
}
