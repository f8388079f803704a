//! Statements inside function bodies.

use usl_ir::{ConditionalBranch, Statement, StatementKind, TokenKind};

use crate::{ParseError, Parser};

impl Parser<'_> {
    pub(crate) fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        let start = self.cursor.current_span();
        let kind = match self.cursor.current_kind() {
            TokenKind::LBrace => StatementKind::Sequence(self.parse_block_body()?),
            TokenKind::If => return self.parse_if(),
            TokenKind::For => return self.parse_for(),
            TokenKind::While => {
                self.cursor.advance();
                let condition = self.parse_condition()?;
                let body = self.parse_statement()?;
                StatementKind::While {
                    condition,
                    body: Box::new(body),
                }
            }
            TokenKind::Do => {
                self.cursor.advance();
                let body = self.parse_statement()?;
                self.cursor.expect(&TokenKind::While)?;
                let condition = self.parse_condition()?;
                self.cursor.expect(&TokenKind::Semicolon)?;
                StatementKind::DoWhile {
                    body: Box::new(body),
                    condition,
                }
            }
            TokenKind::Break => self.keyword_statement(StatementKind::Break)?,
            TokenKind::Continue => self.keyword_statement(StatementKind::Continue)?,
            TokenKind::Discard => self.keyword_statement(StatementKind::Discard)?,
            TokenKind::Return => {
                self.cursor.advance();
                let value = if self.cursor.check(&TokenKind::Semicolon) {
                    None
                } else {
                    Some(self.parse_expression()?)
                };
                self.cursor.expect(&TokenKind::Semicolon)?;
                StatementKind::Return(value)
            }
            TokenKind::Optional => return self.parse_optional(false),
            TokenKind::Const => return self.parse_variable_declaration(),
            _ if self.at_declaration() => return self.parse_variable_declaration(),
            _ => {
                let expr = self.parse_expression()?;
                self.cursor.expect(&TokenKind::Semicolon)?;
                StatementKind::Expression(expr)
            }
        };
        Ok(Statement::new(kind, self.span_from(start)))
    }

    /// `'{' stmt* '}'`
    pub(crate) fn parse_block_body(&mut self) -> Result<Vec<Statement>, ParseError> {
        self.cursor.expect(&TokenKind::LBrace)?;
        let mut statements = Vec::new();
        while !self.cursor.check(&TokenKind::RBrace) && !self.cursor.is_at_end() {
            statements.push(self.parse_statement()?);
        }
        self.cursor.expect(&TokenKind::RBrace)?;
        Ok(statements)
    }

    fn keyword_statement(&mut self, kind: StatementKind) -> Result<StatementKind, ParseError> {
        self.cursor.advance();
        self.cursor.expect(&TokenKind::Semicolon)?;
        Ok(kind)
    }

    /// `'(' expr ')'`
    fn parse_condition(&mut self) -> Result<usl_ir::Expression, ParseError> {
        self.cursor.expect(&TokenKind::LParen)?;
        let condition = self.parse_expression()?;
        self.cursor.expect(&TokenKind::RParen)?;
        Ok(condition)
    }

    /// `if` with its `else if` chain folded into one statement.
    fn parse_if(&mut self) -> Result<Statement, ParseError> {
        let start = self.cursor.expect(&TokenKind::If)?.span;
        let mut branches = vec![self.parse_branch()?];
        let mut else_body = None;
        while self.cursor.eat(&TokenKind::Else) {
            if self.cursor.eat(&TokenKind::If) {
                branches.push(self.parse_branch()?);
            } else {
                else_body = Some(Box::new(self.parse_statement()?));
                break;
            }
        }
        Ok(Statement::new(
            StatementKind::Branch {
                branches,
                else_body,
            },
            self.span_from(start),
        ))
    }

    fn parse_branch(&mut self) -> Result<ConditionalBranch, ParseError> {
        let condition = self.parse_condition()?;
        let body = self.parse_statement()?;
        Ok(ConditionalBranch { condition, body })
    }

    /// `for (init; condition; step) body`, every header part optional.
    fn parse_for(&mut self) -> Result<Statement, ParseError> {
        let start = self.cursor.expect(&TokenKind::For)?.span;
        self.cursor.expect(&TokenKind::LParen)?;

        let init = if self.cursor.eat(&TokenKind::Semicolon) {
            None
        } else if self.cursor.check(&TokenKind::Const) || self.at_declaration() {
            Some(Box::new(self.parse_variable_declaration()?))
        } else {
            let init_start = self.cursor.current_span();
            let expr = self.parse_expression()?;
            self.cursor.expect(&TokenKind::Semicolon)?;
            Some(Box::new(Statement::new(
                StatementKind::Expression(expr),
                self.span_from(init_start),
            )))
        };

        let condition = if self.cursor.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.cursor.expect(&TokenKind::Semicolon)?;

        let step = if self.cursor.check(&TokenKind::RParen) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.cursor.expect(&TokenKind::RParen)?;

        let body = self.parse_statement()?;
        Ok(Statement::new(
            StatementKind::For {
                init,
                condition,
                step,
                body: Box::new(body),
            },
            self.span_from(start),
        ))
    }
}
