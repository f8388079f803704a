//! Expression parsing.
//!
//! Assignment and the ternary are handled by dedicated levels; binary
//! operators go through one precedence-climbing loop driven by
//! `BinaryOp::precedence`.

use usl_ir::{
    AssignOp, BinaryOp, ConstantValue, Expression, ExpressionKind, Precedence, Span, Swizzle,
    Token, TokenKind, UnaryOp,
};

use crate::{ParseError, Parser};

fn binary_op(kind: &TokenKind) -> Option<BinaryOp> {
    let op = match kind {
        TokenKind::PipePipe => BinaryOp::Or,
        TokenKind::AmpAmp => BinaryOp::And,
        TokenKind::Pipe => BinaryOp::BitOr,
        TokenKind::Caret => BinaryOp::BitXor,
        TokenKind::Amp => BinaryOp::BitAnd,
        TokenKind::EqEq => BinaryOp::Eq,
        TokenKind::NotEq => BinaryOp::NotEq,
        TokenKind::Lt => BinaryOp::Lt,
        TokenKind::LtEq => BinaryOp::LtEq,
        TokenKind::Gt => BinaryOp::Gt,
        TokenKind::GtEq => BinaryOp::GtEq,
        TokenKind::Shl => BinaryOp::Shl,
        TokenKind::Shr => BinaryOp::Shr,
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Sub,
        TokenKind::Star => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::Percent => BinaryOp::Rem,
        _ => return None,
    };
    Some(op)
}

fn assign_op(kind: &TokenKind) -> Option<AssignOp> {
    let op = match kind {
        TokenKind::Eq => AssignOp::Assign,
        TokenKind::PlusEq => AssignOp::AddAssign,
        TokenKind::MinusEq => AssignOp::SubAssign,
        TokenKind::StarEq => AssignOp::MulAssign,
        TokenKind::SlashEq => AssignOp::DivAssign,
        _ => return None,
    };
    Some(op)
}

impl Parser<'_> {
    pub(crate) fn parse_expression(&mut self) -> Result<Expression, ParseError> {
        self.parse_assignment()
    }

    /// Right-associative: `a = b = c` assigns `c` to `b` first.
    fn parse_assignment(&mut self) -> Result<Expression, ParseError> {
        let target = self.parse_ternary()?;
        let Some(op) = assign_op(self.cursor.current_kind()) else {
            return Ok(target);
        };
        self.cursor.advance();
        let value = self.parse_assignment()?;
        let span = target.span.merge(value.span);
        Ok(Expression::new(
            ExpressionKind::Assign {
                op,
                target: Box::new(target),
                value: Box::new(value),
            },
            span,
        ))
    }

    fn parse_ternary(&mut self) -> Result<Expression, ParseError> {
        let condition = self.parse_binary(Precedence::Or)?;
        if !self.cursor.eat(&TokenKind::Question) {
            return Ok(condition);
        }
        let then_expr = self.parse_expression()?;
        self.cursor.expect(&TokenKind::Colon)?;
        let else_expr = self.parse_ternary()?;
        let span = condition.span.merge(else_expr.span);
        Ok(Expression::new(
            ExpressionKind::Ternary {
                condition: Box::new(condition),
                then_expr: Box::new(then_expr),
                else_expr: Box::new(else_expr),
            },
            span,
        ))
    }

    /// Binary operators binding at least as tightly as `min`.
    fn parse_binary(&mut self, min: Precedence) -> Result<Expression, ParseError> {
        let mut left = self.parse_unary()?;
        while let Some(op) = binary_op(self.cursor.current_kind()) {
            let precedence = op.precedence();
            if precedence < min {
                break;
            }
            self.cursor.advance();
            let right = self.parse_binary(precedence.next())?;
            let span = left.span.merge(right.span);
            left = Expression::new(
                ExpressionKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            );
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expression, ParseError> {
        let start = self.cursor.current_span();
        let op = match self.cursor.current_kind() {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Bang => UnaryOp::Not,
            TokenKind::Tilde => UnaryOp::BitNot,
            // unary plus is a no-op
            TokenKind::Plus => {
                self.cursor.advance();
                return self.parse_unary();
            }
            _ => return self.parse_postfix(),
        };
        self.cursor.advance();
        if op == UnaryOp::Neg {
            if let Some(min) = self.negated_int_min(start) {
                return Ok(min);
            }
        }
        let operand = self.parse_unary()?;
        let span = start.merge(operand.span);
        Ok(Expression::new(
            ExpressionKind::Unary {
                op,
                operand: Box::new(operand),
            },
            span,
        ))
    }

    /// `-2147483648` as a single constant; its magnitude alone is not an
    /// `int`. Smaller literals keep the unary minus.
    fn negated_int_min(&mut self, start: Span) -> Option<Expression> {
        let token = self.cursor.current();
        if token.kind != TokenKind::Int(i64::from(i32::MAX) + 1) {
            return None;
        }
        let span = start.merge(token.span);
        self.cursor.advance();
        Some(Expression::constant(ConstantValue::Int(i32::MIN), span))
    }

    /// Indexing, field access and swizzles.
    fn parse_postfix(&mut self) -> Result<Expression, ParseError> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.cursor.eat(&TokenKind::LBracket) {
                let index = self.parse_expression()?;
                self.cursor.expect(&TokenKind::RBracket)?;
                let span = expr.span.merge(self.cursor.previous_span());
                expr = Expression::new(
                    ExpressionKind::AccessIndex {
                        base: Box::new(expr),
                        index: Box::new(index),
                    },
                    span,
                );
            } else if self.cursor.eat(&TokenKind::Dot) {
                let (member, member_span) = self.cursor.expect_ident()?;
                let span = expr.span.merge(member_span);
                let kind = match Swizzle::parse(&member) {
                    Some(swizzle) => ExpressionKind::Swizzle {
                        base: Box::new(expr),
                        swizzle,
                    },
                    None => ExpressionKind::AccessField {
                        base: Box::new(expr),
                        field: member,
                    },
                };
                expr = Expression::new(kind, span);
            } else {
                return Ok(expr);
            }
        }
    }

    fn parse_primary(&mut self) -> Result<Expression, ParseError> {
        let token = self.cursor.current();
        let value = match token.kind {
            TokenKind::Int(v) => match i32::try_from(v) {
                Ok(v) => ConstantValue::Int(v),
                Err(_) => {
                    return Err(ParseError::IntegerOutOfRange {
                        value: v,
                        span: token.span,
                        pos: token.pos,
                    })
                }
            },
            TokenKind::UInt(v) => ConstantValue::UInt(v),
            TokenKind::Float(bits) => ConstantValue::Float(f32::from_bits(bits)),
            TokenKind::True => ConstantValue::Bool(true),
            TokenKind::False => ConstantValue::Bool(false),
            TokenKind::LParen => {
                self.cursor.advance();
                let inner = self.parse_expression()?;
                self.cursor.expect(&TokenKind::RParen)?;
                return Ok(inner);
            }
            TokenKind::Ident(_) => return self.parse_identifier(token),
            _ => return Err(ParseError::expected_expression(token)),
        };
        self.cursor.advance();
        Ok(Expression::constant(value, token.span))
    }

    /// A name in expression position: constructor/cast, built-in call,
    /// user call or variable, tried in that order.
    fn parse_identifier(&mut self, token: &Token) -> Result<Expression, ParseError> {
        let TokenKind::Ident(name) = &token.kind else {
            return Err(ParseError::expected_expression(token));
        };

        if let Some(ty) = self.lookup_type(name) {
            self.cursor.advance();
            let target = self.parse_array_suffix(ty)?;
            if !self.cursor.check(&TokenKind::LParen) {
                return Err(ParseError::unexpected("`(` after type name", self.cursor.current()));
            }
            let args = self.parse_arguments()?;
            return Ok(Expression::new(
                ExpressionKind::Cast { target, args },
                self.span_from(token.span),
            ));
        }

        self.cursor.advance();
        if !self.cursor.check(&TokenKind::LParen) {
            return Ok(Expression::variable(name.clone(), token.span));
        }

        let args = self.parse_arguments()?;
        let kind = match self.registry.lookup_function(name) {
            Some(builtin) => ExpressionKind::CallBuiltin { builtin, args },
            None => ExpressionKind::CallFunction {
                name: name.clone(),
                args,
            },
        };
        Ok(Expression::new(kind, self.span_from(token.span)))
    }

    /// `'(' (expr (',' expr)*)? ')'`
    fn parse_arguments(&mut self) -> Result<Vec<Expression>, ParseError> {
        self.cursor.expect(&TokenKind::LParen)?;
        let mut args = Vec::new();
        if self.cursor.eat(&TokenKind::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expression()?);
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.cursor.expect(&TokenKind::RParen)?;
        Ok(args)
    }

    /// Span from `start` to the end of the last consumed token.
    pub(crate) fn span_from(&self, start: Span) -> Span {
        start.merge(self.cursor.previous_span())
    }
}
