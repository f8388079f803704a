//! Statement and expression printing shared by the text backends.
//!
//! Both the source language and GLSL are C-like: control flow, operators
//! and calls print the same way. A [`Dialect`] supplies what differs:
//! built-in spellings, renamed variables, declarators, and everything
//! that is not plain control flow.
//!
//! Layout rules: four spaces per level, `{` on the header line, and a
//! body that is not a block goes on its own, indented line.

use usl_ir::{
    BuiltinFunction, Expression, ExpressionKind, ExpressionTag, Name, Precedence, Span, Statement,
    StatementKind, Type, VariableDeclaration,
};

use crate::CodegenError;

const INDENT: &str = "    ";

pub(crate) trait Dialect {
    fn builtin_function(
        &self,
        builtin: BuiltinFunction,
        span: Span,
    ) -> Result<&'static str, CodegenError>;

    /// Spelling of a variable reference.
    fn variable<'n>(&'n self, name: &'n Name) -> &'n str {
        name
    }

    /// `ty name` as written in a declaration.
    fn declarator(&self, ty: &Type, name: &str) -> String;

    /// Declarations and `optional` blocks.
    fn write_item(&self, w: &mut SourceWriter<'_>, stmt: &Statement) -> Result<(), CodegenError>;
}

pub(crate) struct SourceWriter<'d> {
    dialect: &'d dyn Dialect,
    out: String,
    depth: usize,
    /// The current line has text and no newline yet.
    open: bool,
}

impl<'d> SourceWriter<'d> {
    pub fn new(dialect: &'d dyn Dialect) -> Self {
        SourceWriter {
            dialect,
            out: String::new(),
            depth: 0,
            open: false,
        }
    }

    pub fn finish(self) -> String {
        self.out
    }

    pub fn push(&mut self, text: &str) {
        if !self.open {
            for _ in 0..self.depth {
                self.out.push_str(INDENT);
            }
            self.open = true;
        }
        self.out.push_str(text);
    }

    /// End the current line, if one is open.
    pub fn close(&mut self) {
        if self.open {
            self.out.push('\n');
            self.open = false;
        }
    }

    pub fn line(&mut self, text: &str) {
        self.push(text);
        self.close();
    }

    pub fn blank_line(&mut self) {
        self.close();
        if !self.out.is_empty() && !self.out.ends_with("\n\n") {
            self.out.push('\n');
        }
    }

    pub fn indent(&mut self) {
        self.depth += 1;
    }

    pub fn dedent(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// `text` after a closing brace on the same line, else on a new line.
    pub fn follow(&mut self, text: &str) {
        if self.open {
            self.out.push(' ');
        }
        self.push(text);
    }

    /// `{`, the statements indented, then `}` with the line left open.
    pub fn block(&mut self, statements: &[Statement]) -> Result<(), CodegenError> {
        self.push("{");
        self.close();
        self.indent();
        for stmt in statements {
            self.statement(stmt)?;
        }
        self.dedent();
        self.push("}");
        Ok(())
    }

    /// Body of `if`, loops and `optional` after its header.
    pub fn body(&mut self, body: &Statement) -> Result<(), CodegenError> {
        if let StatementKind::Sequence(statements) = &body.kind {
            self.out.push(' ');
            self.block(statements)
        } else {
            self.close();
            self.indent();
            self.statement(body)?;
            self.dedent();
            Ok(())
        }
    }

    pub fn statement(&mut self, stmt: &Statement) -> Result<(), CodegenError> {
        match &stmt.kind {
            StatementKind::Branch {
                branches,
                else_body,
            } => {
                for (i, branch) in branches.iter().enumerate() {
                    self.follow(if i == 0 { "if (" } else { "else if (" });
                    self.expression(&branch.condition)?;
                    self.push(")");
                    self.body(&branch.body)?;
                }
                if let Some(else_body) = else_body {
                    self.follow("else");
                    self.body(else_body)?;
                }
            }
            StatementKind::For {
                init,
                condition,
                step,
                body,
            } => {
                self.push("for (");
                if let Some(init) = init {
                    self.inline_statement(init)?;
                }
                self.push(";");
                if let Some(condition) = condition {
                    self.push(" ");
                    self.expression(condition)?;
                }
                self.push(";");
                if let Some(step) = step {
                    self.push(" ");
                    self.expression(step)?;
                }
                self.push(")");
                self.body(body)?;
            }
            StatementKind::While { condition, body } => {
                self.push("while (");
                self.expression(condition)?;
                self.push(")");
                self.body(body)?;
            }
            StatementKind::DoWhile { body, condition } => {
                self.push("do");
                self.body(body)?;
                self.follow("while (");
                self.expression(condition)?;
                self.push(");");
            }
            StatementKind::DeclareVariable(decl) => {
                self.variable_declaration(decl)?;
                self.push(";");
            }
            StatementKind::Expression(expr) => {
                self.expression(expr)?;
                self.push(";");
            }
            StatementKind::Break => self.push("break;"),
            StatementKind::Continue => self.push("continue;"),
            StatementKind::Discard => self.push("discard;"),
            StatementKind::Return(None) => self.push("return;"),
            StatementKind::Return(Some(value)) => {
                self.push("return ");
                self.expression(value)?;
                self.push(";");
            }
            StatementKind::Sequence(statements) => self.block(statements)?,
            StatementKind::DeclareStruct(_)
            | StatementKind::DeclareInputs(_)
            | StatementKind::DeclareOutputs(_)
            | StatementKind::DeclareExternals(_)
            | StatementKind::DeclareOptions(_)
            | StatementKind::DeclareConsts(_)
            | StatementKind::DeclareFunction(_)
            | StatementKind::Optional { .. }
            | StatementKind::Include(_) => {
                let dialect = self.dialect;
                dialect.write_item(self, stmt)?;
            }
        }
        self.close();
        Ok(())
    }

    /// The init clause of a `for`, without its `;`.
    fn inline_statement(&mut self, stmt: &Statement) -> Result<(), CodegenError> {
        match &stmt.kind {
            StatementKind::DeclareVariable(decl) => self.variable_declaration(decl),
            StatementKind::Expression(expr) => self.expression(expr),
            // the parser only builds the two forms above
            _ => self.statement(stmt),
        }
    }

    pub fn variable_declaration(&mut self, decl: &VariableDeclaration) -> Result<(), CodegenError> {
        if decl.is_const {
            self.push("const ");
        }
        let declarator = self.dialect.declarator(&decl.ty, &decl.name);
        self.push(&declarator);
        if let Some(init) = &decl.initializer {
            self.push(" = ");
            self.expression(init)?;
        }
        Ok(())
    }

    pub fn expression(&mut self, expr: &Expression) -> Result<(), CodegenError> {
        let dialect = self.dialect;
        match &expr.kind {
            ExpressionKind::Constant(value) => {
                if value.is_negative() {
                    self.push(&format!("({value})"));
                } else {
                    self.push(&value.to_string());
                }
            }
            ExpressionKind::Variable(name) => self.push(dialect.variable(name)),
            ExpressionKind::AccessIndex { base, index } => {
                self.operand(base, Precedence::Postfix, false)?;
                self.push("[");
                self.expression(index)?;
                self.push("]");
            }
            ExpressionKind::AccessField { base, field } => {
                self.operand(base, Precedence::Postfix, false)?;
                self.push(".");
                self.push(field);
            }
            ExpressionKind::Swizzle { base, swizzle } => {
                self.operand(base, Precedence::Postfix, false)?;
                self.push(".");
                self.push(&swizzle.to_string());
            }
            ExpressionKind::Assign { op, target, value } => {
                self.operand(target, Precedence::Ternary, false)?;
                self.push(" ");
                self.push(op.as_symbol());
                self.push(" ");
                self.expression(value)?;
            }
            ExpressionKind::Unary { op, operand } => {
                self.push(op.as_symbol());
                // `-(-x)`: never let two prefix operators touch
                if operand.tag() == ExpressionTag::Unary {
                    self.parenthesized(operand)?;
                } else {
                    self.operand(operand, Precedence::Unary, false)?;
                }
            }
            ExpressionKind::Binary { op, left, right } => {
                let prec = op.precedence();
                self.operand(left, prec, false)?;
                self.push(" ");
                self.push(op.as_symbol());
                self.push(" ");
                self.operand(right, prec, true)?;
            }
            ExpressionKind::CallFunction { name, args } => {
                self.push(name);
                self.arguments(args)?;
            }
            ExpressionKind::CallBuiltin { builtin, args } => {
                self.push(dialect.builtin_function(*builtin, expr.span)?);
                self.arguments(args)?;
            }
            ExpressionKind::Cast { target, args } => {
                self.push(&target.to_string());
                self.arguments(args)?;
            }
            ExpressionKind::Ternary {
                condition,
                then_expr,
                else_expr,
            } => {
                self.operand(condition, Precedence::Ternary, true)?;
                self.push(" ? ");
                self.expression(then_expr)?;
                self.push(" : ");
                self.operand(else_expr, Precedence::Ternary, false)?;
            }
        }
        Ok(())
    }

    /// An operand that needs parentheses when it binds weaker than `min`,
    /// or as weak as `min` when `strict`.
    fn operand(
        &mut self,
        expr: &Expression,
        min: Precedence,
        strict: bool,
    ) -> Result<(), CodegenError> {
        let prec = expr.precedence();
        let negative = matches!(&expr.kind, ExpressionKind::Constant(v) if v.is_negative());
        if !negative && (prec < min || (strict && prec == min)) {
            self.parenthesized(expr)
        } else {
            self.expression(expr)
        }
    }

    fn parenthesized(&mut self, expr: &Expression) -> Result<(), CodegenError> {
        self.push("(");
        self.expression(expr)?;
        self.push(")");
        Ok(())
    }

    fn arguments(&mut self, args: &[Expression]) -> Result<(), CodegenError> {
        self.push("(");
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.expression(arg)?;
        }
        self.push(")");
        Ok(())
    }
}
