//! Rebuilding traversal.
//!
//! An `AstCloner` produces a brand-new tree from a borrowed one. Hooks can
//! substitute expressions, splice statement lists, or fail; the default
//! for every hook is a structural copy.

use std::convert::Infallible;

use crate::ast::{
    ConditionalBranch, ConstDeclaration, Expression, ExpressionKind, ExternalVariable,
    FunctionDeclaration, InterfaceVariable, OptionDeclaration, Parameter, Statement,
    StatementKind, StructDeclaration, StructField, VariableDeclaration,
};
use crate::Type;

pub trait AstCloner {
    type Error;

    fn clone_statement(&mut self, stmt: &Statement) -> Result<Statement, Self::Error> {
        rebuild_statement(self, stmt)
    }

    /// Clone an ordered statement list: a sequence or a function body.
    /// Overriding this is how a cloner drops or splices statements.
    fn clone_statements(&mut self, stmts: &[Statement]) -> Result<Vec<Statement>, Self::Error> {
        rebuild_statements(self, stmts)
    }

    fn clone_expression(&mut self, expr: &Expression) -> Result<Expression, Self::Error> {
        rebuild_expression(self, expr)
    }

    fn clone_type(&mut self, ty: &Type) -> Result<Type, Self::Error> {
        Ok(ty.clone())
    }
}

/// The identity cloner: a full, independent deep copy.
pub struct DeepCopy;

impl AstCloner for DeepCopy {
    type Error = Infallible;
}

pub fn deep_copy(stmt: &Statement) -> Statement {
    match DeepCopy.clone_statement(stmt) {
        Ok(copy) => copy,
        Err(never) => match never {},
    }
}

pub fn rebuild_statements<C: AstCloner + ?Sized>(
    cloner: &mut C,
    stmts: &[Statement],
) -> Result<Vec<Statement>, C::Error> {
    stmts.iter().map(|stmt| cloner.clone_statement(stmt)).collect()
}

fn boxed<C: AstCloner + ?Sized>(
    cloner: &mut C,
    stmt: &Statement,
) -> Result<Box<Statement>, C::Error> {
    cloner.clone_statement(stmt).map(Box::new)
}

fn boxed_expr<C: AstCloner + ?Sized>(
    cloner: &mut C,
    expr: &Expression,
) -> Result<Box<Expression>, C::Error> {
    cloner.clone_expression(expr).map(Box::new)
}

fn expressions<C: AstCloner + ?Sized>(
    cloner: &mut C,
    exprs: &[Expression],
) -> Result<Vec<Expression>, C::Error> {
    exprs.iter().map(|e| cloner.clone_expression(e)).collect()
}

fn interface_variables<C: AstCloner + ?Sized>(
    cloner: &mut C,
    vars: &[InterfaceVariable],
) -> Result<Vec<InterfaceVariable>, C::Error> {
    vars.iter()
        .map(|var| -> Result<InterfaceVariable, C::Error> {
            Ok(InterfaceVariable {
                name: var.name.clone(),
                ty: cloner.clone_type(&var.ty)?,
                slot: var.slot,
                span: var.span,
            })
        })
        .collect()
}

pub fn rebuild_statement<C: AstCloner + ?Sized>(
    cloner: &mut C,
    stmt: &Statement,
) -> Result<Statement, C::Error> {
    let kind = match &stmt.kind {
        StatementKind::Branch {
            branches,
            else_body,
        } => StatementKind::Branch {
            branches: branches
                .iter()
                .map(|branch| -> Result<ConditionalBranch, C::Error> {
                    Ok(ConditionalBranch {
                        condition: cloner.clone_expression(&branch.condition)?,
                        body: cloner.clone_statement(&branch.body)?,
                    })
                })
                .collect::<Result<_, _>>()?,
            else_body: else_body.as_deref().map(|s| boxed(cloner, s)).transpose()?,
        },
        StatementKind::For {
            init,
            condition,
            step,
            body,
        } => StatementKind::For {
            init: init.as_deref().map(|s| boxed(cloner, s)).transpose()?,
            condition: condition
                .as_ref()
                .map(|e| cloner.clone_expression(e))
                .transpose()?,
            step: step.as_ref().map(|e| cloner.clone_expression(e)).transpose()?,
            body: boxed(cloner, body)?,
        },
        StatementKind::While { condition, body } => StatementKind::While {
            condition: cloner.clone_expression(condition)?,
            body: boxed(cloner, body)?,
        },
        StatementKind::DoWhile { body, condition } => StatementKind::DoWhile {
            body: boxed(cloner, body)?,
            condition: cloner.clone_expression(condition)?,
        },
        StatementKind::DeclareVariable(decl) => {
            StatementKind::DeclareVariable(VariableDeclaration {
                name: decl.name.clone(),
                ty: cloner.clone_type(&decl.ty)?,
                is_const: decl.is_const,
                initializer: decl
                    .initializer
                    .as_ref()
                    .map(|e| cloner.clone_expression(e))
                    .transpose()?,
            })
        }
        StatementKind::DeclareStruct(decl) => StatementKind::DeclareStruct(StructDeclaration {
            name: decl.name.clone(),
            fields: decl
                .fields
                .iter()
                .map(|field| -> Result<StructField, C::Error> {
                    Ok(StructField {
                        name: field.name.clone(),
                        ty: cloner.clone_type(&field.ty)?,
                    })
                })
                .collect::<Result<_, _>>()?,
        }),
        StatementKind::DeclareInputs(vars) => {
            StatementKind::DeclareInputs(interface_variables(cloner, vars)?)
        }
        StatementKind::DeclareOutputs(vars) => {
            StatementKind::DeclareOutputs(interface_variables(cloner, vars)?)
        }
        StatementKind::DeclareExternals(vars) => StatementKind::DeclareExternals(
            vars.iter()
                .map(|var| -> Result<ExternalVariable, C::Error> {
                    Ok(ExternalVariable {
                        ty: cloner.clone_type(&var.ty)?,
                        ..var.clone()
                    })
                })
                .collect::<Result<_, _>>()?,
        ),
        StatementKind::DeclareOptions(options) => StatementKind::DeclareOptions(
            options
                .iter()
                .map(|option| -> Result<OptionDeclaration, C::Error> {
                    Ok(OptionDeclaration {
                        name: option.name.clone(),
                        ty: cloner.clone_type(&option.ty)?,
                        default: option
                            .default
                            .as_ref()
                            .map(|e| cloner.clone_expression(e))
                            .transpose()?,
                        span: option.span,
                    })
                })
                .collect::<Result<_, _>>()?,
        ),
        StatementKind::DeclareConsts(consts) => StatementKind::DeclareConsts(
            consts
                .iter()
                .map(|constant| -> Result<ConstDeclaration, C::Error> {
                    Ok(ConstDeclaration {
                        name: constant.name.clone(),
                        ty: cloner.clone_type(&constant.ty)?,
                        value: cloner.clone_expression(&constant.value)?,
                        span: constant.span,
                    })
                })
                .collect::<Result<_, _>>()?,
        ),
        StatementKind::DeclareFunction(func) => {
            StatementKind::DeclareFunction(FunctionDeclaration {
                name: func.name.clone(),
                parameters: func
                    .parameters
                    .iter()
                    .map(|param| -> Result<Parameter, C::Error> {
                        Ok(Parameter {
                            name: param.name.clone(),
                            ty: cloner.clone_type(&param.ty)?,
                            span: param.span,
                        })
                    })
                    .collect::<Result<_, _>>()?,
                return_type: cloner.clone_type(&func.return_type)?,
                body: cloner.clone_statements(&func.body)?,
                entry: func.entry,
            })
        }
        StatementKind::Expression(expr) => {
            StatementKind::Expression(cloner.clone_expression(expr)?)
        }
        StatementKind::Break => StatementKind::Break,
        StatementKind::Continue => StatementKind::Continue,
        StatementKind::Return(value) => StatementKind::Return(
            value
                .as_ref()
                .map(|e| cloner.clone_expression(e))
                .transpose()?,
        ),
        StatementKind::Discard => StatementKind::Discard,
        StatementKind::Sequence(statements) => {
            StatementKind::Sequence(cloner.clone_statements(statements)?)
        }
        StatementKind::Optional {
            condition,
            body,
            else_body,
        } => StatementKind::Optional {
            condition: cloner.clone_expression(condition)?,
            body: boxed(cloner, body)?,
            else_body: else_body.as_deref().map(|s| boxed(cloner, s)).transpose()?,
        },
        StatementKind::Include(path) => StatementKind::Include(path.clone()),
    };
    Ok(Statement::new(kind, stmt.span))
}

pub fn rebuild_expression<C: AstCloner + ?Sized>(
    cloner: &mut C,
    expr: &Expression,
) -> Result<Expression, C::Error> {
    let kind = match &expr.kind {
        ExpressionKind::Constant(value) => ExpressionKind::Constant(*value),
        ExpressionKind::Variable(name) => ExpressionKind::Variable(name.clone()),
        ExpressionKind::AccessIndex { base, index } => ExpressionKind::AccessIndex {
            base: boxed_expr(cloner, base)?,
            index: boxed_expr(cloner, index)?,
        },
        ExpressionKind::AccessField { base, field } => ExpressionKind::AccessField {
            base: boxed_expr(cloner, base)?,
            field: field.clone(),
        },
        ExpressionKind::Assign { op, target, value } => ExpressionKind::Assign {
            op: *op,
            target: boxed_expr(cloner, target)?,
            value: boxed_expr(cloner, value)?,
        },
        ExpressionKind::Unary { op, operand } => ExpressionKind::Unary {
            op: *op,
            operand: boxed_expr(cloner, operand)?,
        },
        ExpressionKind::Binary { op, left, right } => ExpressionKind::Binary {
            op: *op,
            left: boxed_expr(cloner, left)?,
            right: boxed_expr(cloner, right)?,
        },
        ExpressionKind::CallFunction { name, args } => ExpressionKind::CallFunction {
            name: name.clone(),
            args: expressions(cloner, args)?,
        },
        ExpressionKind::CallBuiltin { builtin, args } => ExpressionKind::CallBuiltin {
            builtin: *builtin,
            args: expressions(cloner, args)?,
        },
        ExpressionKind::Cast { target, args } => ExpressionKind::Cast {
            target: cloner.clone_type(target)?,
            args: expressions(cloner, args)?,
        },
        ExpressionKind::Swizzle { base, swizzle } => ExpressionKind::Swizzle {
            base: boxed_expr(cloner, base)?,
            swizzle: swizzle.clone(),
        },
        ExpressionKind::Ternary {
            condition,
            then_expr,
            else_expr,
        } => ExpressionKind::Ternary {
            condition: boxed_expr(cloner, condition)?,
            then_expr: boxed_expr(cloner, then_expr)?,
            else_expr: boxed_expr(cloner, else_expr)?,
        },
    };
    Ok(Expression::new(kind, expr.span))
}
