//! AST traversal.
//!
//! Three traversal flavors over the same closed node types:
//!
//! - [`Visitor`]: read-only. Every `visit_*` method defaults to the
//!   matching `walk_*` function, which descends into all children, so a
//!   concrete visitor only overrides the node kinds it cares about.
//! - [`VisitorMut`]: same shape over `&mut` nodes; may rewrite children
//!   in place.
//! - [`AstCloner`]: rebuilds a fresh tree, with hooks to replace or drop
//!   nodes on the way (the specializer is a cloner).
//!
//! The `walk_*` functions match exhaustively on `StatementKind` and
//! `ExpressionKind`: a new node kind does not compile until every walker
//! handles it.
//!
//! # Example
//!
//! ```text
//! struct CountDiscards {
//!     count: usize,
//! }
//!
//! impl<'ast> Visitor<'ast> for CountDiscards {
//!     fn visit_statement(&mut self, stmt: &'ast Statement) {
//!         if let StatementKind::Discard = stmt.kind {
//!             self.count += 1;
//!         }
//!         walk_statement(self, stmt);
//!     }
//! }
//! ```

mod cloner;
mod mutable;

pub use cloner::{
    deep_copy, rebuild_expression, rebuild_statement, rebuild_statements, AstCloner, DeepCopy,
};
pub use mutable::{erase_spans, walk_expression_mut, walk_statement_mut, VisitorMut};

use crate::ast::{
    Expression, ExpressionKind, FunctionDeclaration, Statement, StatementKind,
    StructDeclaration, VariableDeclaration,
};
use crate::Type;

/// Read-only AST visitor.
///
/// Override `visit_*` methods to add behavior at specific nodes and call
/// the matching `walk_*` function to continue into children.
pub trait Visitor<'ast> {
    fn visit_statement(&mut self, stmt: &'ast Statement) {
        walk_statement(self, stmt);
    }

    fn visit_expression(&mut self, expr: &'ast Expression) {
        walk_expression(self, expr);
    }

    fn visit_function(&mut self, func: &'ast FunctionDeclaration) {
        walk_function(self, func);
    }

    fn visit_struct(&mut self, decl: &'ast StructDeclaration) {
        for field in &decl.fields {
            self.visit_type(&field.ty);
        }
    }

    fn visit_variable_declaration(&mut self, decl: &'ast VariableDeclaration) {
        self.visit_type(&decl.ty);
        if let Some(init) = &decl.initializer {
            self.visit_expression(init);
        }
    }

    /// Called for every type written in the source: declarations, casts,
    /// parameters and return types.
    fn visit_type(&mut self, ty: &'ast Type) {
        let _ = ty;
    }
}

pub fn walk_statement<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, stmt: &'ast Statement) {
    match &stmt.kind {
        StatementKind::Branch {
            branches,
            else_body,
        } => {
            for branch in branches {
                visitor.visit_expression(&branch.condition);
                visitor.visit_statement(&branch.body);
            }
            if let Some(else_body) = else_body {
                visitor.visit_statement(else_body);
            }
        }
        StatementKind::For {
            init,
            condition,
            step,
            body,
        } => {
            if let Some(init) = init {
                visitor.visit_statement(init);
            }
            if let Some(condition) = condition {
                visitor.visit_expression(condition);
            }
            if let Some(step) = step {
                visitor.visit_expression(step);
            }
            visitor.visit_statement(body);
        }
        StatementKind::While { condition, body } | StatementKind::DoWhile { body, condition } => {
            visitor.visit_expression(condition);
            visitor.visit_statement(body);
        }
        StatementKind::DeclareVariable(decl) => visitor.visit_variable_declaration(decl),
        StatementKind::DeclareStruct(decl) => visitor.visit_struct(decl),
        StatementKind::DeclareInputs(vars) | StatementKind::DeclareOutputs(vars) => {
            for var in vars {
                visitor.visit_type(&var.ty);
            }
        }
        StatementKind::DeclareExternals(vars) => {
            for var in vars {
                visitor.visit_type(&var.ty);
            }
        }
        StatementKind::DeclareOptions(options) => {
            for option in options {
                visitor.visit_type(&option.ty);
                if let Some(default) = &option.default {
                    visitor.visit_expression(default);
                }
            }
        }
        StatementKind::DeclareConsts(consts) => {
            for constant in consts {
                visitor.visit_type(&constant.ty);
                visitor.visit_expression(&constant.value);
            }
        }
        StatementKind::DeclareFunction(func) => visitor.visit_function(func),
        StatementKind::Expression(expr) | StatementKind::Return(Some(expr)) => {
            visitor.visit_expression(expr);
        }
        StatementKind::Sequence(statements) => {
            for stmt in statements {
                visitor.visit_statement(stmt);
            }
        }
        StatementKind::Optional {
            condition,
            body,
            else_body,
        } => {
            visitor.visit_expression(condition);
            visitor.visit_statement(body);
            if let Some(else_body) = else_body {
                visitor.visit_statement(else_body);
            }
        }
        StatementKind::Return(None)
        | StatementKind::Break
        | StatementKind::Continue
        | StatementKind::Discard
        | StatementKind::Include(_) => {}
    }
}

pub fn walk_function<'ast, V: Visitor<'ast> + ?Sized>(
    visitor: &mut V,
    func: &'ast FunctionDeclaration,
) {
    for param in &func.parameters {
        visitor.visit_type(&param.ty);
    }
    visitor.visit_type(&func.return_type);
    for stmt in &func.body {
        visitor.visit_statement(stmt);
    }
}

pub fn walk_expression<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, expr: &'ast Expression) {
    match &expr.kind {
        ExpressionKind::Constant(_) | ExpressionKind::Variable(_) => {}
        ExpressionKind::AccessIndex { base, index } => {
            visitor.visit_expression(base);
            visitor.visit_expression(index);
        }
        ExpressionKind::AccessField { base, .. } | ExpressionKind::Swizzle { base, .. } => {
            visitor.visit_expression(base);
        }
        ExpressionKind::Assign { target, value, .. } => {
            visitor.visit_expression(target);
            visitor.visit_expression(value);
        }
        ExpressionKind::Unary { operand, .. } => visitor.visit_expression(operand),
        ExpressionKind::Binary { left, right, .. } => {
            visitor.visit_expression(left);
            visitor.visit_expression(right);
        }
        ExpressionKind::CallFunction { args, .. } | ExpressionKind::CallBuiltin { args, .. } => {
            for arg in args {
                visitor.visit_expression(arg);
            }
        }
        ExpressionKind::Cast { target, args } => {
            visitor.visit_type(target);
            for arg in args {
                visitor.visit_expression(arg);
            }
        }
        ExpressionKind::Ternary {
            condition,
            then_expr,
            else_expr,
        } => {
            visitor.visit_expression(condition);
            visitor.visit_expression(then_expr);
            visitor.visit_expression(else_expr);
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
