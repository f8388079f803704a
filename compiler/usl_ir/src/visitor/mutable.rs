//! Mutating traversal.

use crate::ast::{Expression, ExpressionKind, FunctionDeclaration, Statement, StatementKind};
use crate::{Span, Type};

/// AST visitor over mutable nodes.
///
/// Defaults descend into every child; `visit_span` is called once for each
/// span stored in the tree.
pub trait VisitorMut {
    fn visit_statement_mut(&mut self, stmt: &mut Statement) {
        walk_statement_mut(self, stmt);
    }

    fn visit_expression_mut(&mut self, expr: &mut Expression) {
        walk_expression_mut(self, expr);
    }

    fn visit_function_mut(&mut self, func: &mut FunctionDeclaration) {
        walk_function_mut(self, func);
    }

    fn visit_type_mut(&mut self, ty: &mut Type) {
        let _ = ty;
    }

    fn visit_span(&mut self, span: &mut Span) {
        let _ = span;
    }
}

pub fn walk_statement_mut<V: VisitorMut + ?Sized>(visitor: &mut V, stmt: &mut Statement) {
    visitor.visit_span(&mut stmt.span);
    match &mut stmt.kind {
        StatementKind::Branch {
            branches,
            else_body,
        } => {
            for branch in branches {
                visitor.visit_expression_mut(&mut branch.condition);
                visitor.visit_statement_mut(&mut branch.body);
            }
            if let Some(else_body) = else_body {
                visitor.visit_statement_mut(else_body);
            }
        }
        StatementKind::For {
            init,
            condition,
            step,
            body,
        } => {
            if let Some(init) = init {
                visitor.visit_statement_mut(init);
            }
            if let Some(condition) = condition {
                visitor.visit_expression_mut(condition);
            }
            if let Some(step) = step {
                visitor.visit_expression_mut(step);
            }
            visitor.visit_statement_mut(body);
        }
        StatementKind::While { condition, body } | StatementKind::DoWhile { body, condition } => {
            visitor.visit_expression_mut(condition);
            visitor.visit_statement_mut(body);
        }
        StatementKind::DeclareVariable(decl) => {
            visitor.visit_type_mut(&mut decl.ty);
            if let Some(init) = &mut decl.initializer {
                visitor.visit_expression_mut(init);
            }
        }
        StatementKind::DeclareStruct(decl) => {
            for field in &mut decl.fields {
                visitor.visit_type_mut(&mut field.ty);
            }
        }
        StatementKind::DeclareInputs(vars) | StatementKind::DeclareOutputs(vars) => {
            for var in vars {
                visitor.visit_span(&mut var.span);
                visitor.visit_type_mut(&mut var.ty);
            }
        }
        StatementKind::DeclareExternals(vars) => {
            for var in vars {
                visitor.visit_span(&mut var.span);
                visitor.visit_type_mut(&mut var.ty);
            }
        }
        StatementKind::DeclareOptions(options) => {
            for option in options {
                visitor.visit_span(&mut option.span);
                visitor.visit_type_mut(&mut option.ty);
                if let Some(default) = &mut option.default {
                    visitor.visit_expression_mut(default);
                }
            }
        }
        StatementKind::DeclareConsts(consts) => {
            for constant in consts {
                visitor.visit_span(&mut constant.span);
                visitor.visit_type_mut(&mut constant.ty);
                visitor.visit_expression_mut(&mut constant.value);
            }
        }
        StatementKind::DeclareFunction(func) => visitor.visit_function_mut(func),
        StatementKind::Expression(expr) | StatementKind::Return(Some(expr)) => {
            visitor.visit_expression_mut(expr);
        }
        StatementKind::Sequence(statements) => {
            for stmt in statements {
                visitor.visit_statement_mut(stmt);
            }
        }
        StatementKind::Optional {
            condition,
            body,
            else_body,
        } => {
            visitor.visit_expression_mut(condition);
            visitor.visit_statement_mut(body);
            if let Some(else_body) = else_body {
                visitor.visit_statement_mut(else_body);
            }
        }
        StatementKind::Return(None)
        | StatementKind::Break
        | StatementKind::Continue
        | StatementKind::Discard
        | StatementKind::Include(_) => {}
    }
}

pub fn walk_function_mut<V: VisitorMut + ?Sized>(visitor: &mut V, func: &mut FunctionDeclaration) {
    for param in &mut func.parameters {
        visitor.visit_span(&mut param.span);
        visitor.visit_type_mut(&mut param.ty);
    }
    visitor.visit_type_mut(&mut func.return_type);
    for stmt in &mut func.body {
        visitor.visit_statement_mut(stmt);
    }
}

pub fn walk_expression_mut<V: VisitorMut + ?Sized>(visitor: &mut V, expr: &mut Expression) {
    visitor.visit_span(&mut expr.span);
    match &mut expr.kind {
        ExpressionKind::Constant(_) | ExpressionKind::Variable(_) => {}
        ExpressionKind::AccessIndex { base, index } => {
            visitor.visit_expression_mut(base);
            visitor.visit_expression_mut(index);
        }
        ExpressionKind::AccessField { base, .. } | ExpressionKind::Swizzle { base, .. } => {
            visitor.visit_expression_mut(base);
        }
        ExpressionKind::Assign { target, value, .. } => {
            visitor.visit_expression_mut(target);
            visitor.visit_expression_mut(value);
        }
        ExpressionKind::Unary { operand, .. } => visitor.visit_expression_mut(operand),
        ExpressionKind::Binary { left, right, .. } => {
            visitor.visit_expression_mut(left);
            visitor.visit_expression_mut(right);
        }
        ExpressionKind::CallFunction { args, .. } | ExpressionKind::CallBuiltin { args, .. } => {
            for arg in args {
                visitor.visit_expression_mut(arg);
            }
        }
        ExpressionKind::Cast { target, args } => {
            visitor.visit_type_mut(target);
            for arg in args {
                visitor.visit_expression_mut(arg);
            }
        }
        ExpressionKind::Ternary {
            condition,
            then_expr,
            else_expr,
        } => {
            visitor.visit_expression_mut(condition);
            visitor.visit_expression_mut(then_expr);
            visitor.visit_expression_mut(else_expr);
        }
    }
}

struct SpanEraser;

impl VisitorMut for SpanEraser {
    fn visit_span(&mut self, span: &mut Span) {
        *span = Span::DUMMY;
    }
}

/// Reset every span in the tree to `Span::DUMMY`, so two trees parsed from
/// differently formatted text compare equal when their structure does.
pub fn erase_spans(stmt: &mut Statement) {
    SpanEraser.visit_statement_mut(stmt);
}
