//! Constant evaluation of `optional` conditions.

use usl_ir::{BinaryOp, ConstantValue, Expression, ExpressionKind, Name, Span, UnaryOp};

use crate::SpecializeError;

/// Supplies option values to the evaluator.
pub(crate) trait OptionLookup {
    fn lookup(&self, name: &Name, span: Span) -> Result<ConstantValue, SpecializeError>;
}

/// Reduce `expr` to a constant.
pub(crate) fn evaluate(
    expr: &Expression,
    options: &dyn OptionLookup,
) -> Result<ConstantValue, SpecializeError> {
    match &expr.kind {
        ExpressionKind::Constant(value) => Ok(*value),
        ExpressionKind::Variable(name) => options.lookup(name, expr.span),
        ExpressionKind::Unary { op, operand } => {
            let value = evaluate(operand, options)?;
            unary(*op, value).ok_or_else(|| {
                SpecializeError::non_constant(
                    format!(
                        "`{}` cannot be applied to a {} value",
                        op.as_symbol(),
                        value.primitive().name()
                    ),
                    expr.span,
                )
            })
        }
        ExpressionKind::Binary { op, left, right } => {
            // both sides are resolved so every option a condition names
            // must be bound, even when the left side decides the result
            let l = evaluate(left, options)?;
            let r = evaluate(right, options)?;
            binary(*op, l, r).ok_or_else(|| {
                SpecializeError::non_constant(
                    format!(
                        "`{}` is not defined for {} and {} operands",
                        op.as_symbol(),
                        l.primitive().name(),
                        r.primitive().name()
                    ),
                    expr.span,
                )
            })
        }
        ExpressionKind::Ternary {
            condition,
            then_expr,
            else_expr,
        } => match evaluate(condition, options)? {
            ConstantValue::Bool(true) => evaluate(then_expr, options),
            ConstantValue::Bool(false) => evaluate(else_expr, options),
            _ => Err(SpecializeError::non_constant(
                "ternary condition is not a boolean",
                condition.span,
            )),
        },
        ExpressionKind::AccessIndex { .. }
        | ExpressionKind::AccessField { .. }
        | ExpressionKind::Assign { .. }
        | ExpressionKind::CallFunction { .. }
        | ExpressionKind::CallBuiltin { .. }
        | ExpressionKind::Cast { .. }
        | ExpressionKind::Swizzle { .. } => Err(SpecializeError::non_constant(
            format!("{:?} expressions are evaluated at run time", expr.tag()),
            expr.span,
        )),
    }
}

/// Evaluate a condition that must be boolean.
pub(crate) fn evaluate_condition(
    expr: &Expression,
    options: &dyn OptionLookup,
) -> Result<bool, SpecializeError> {
    let value = evaluate(expr, options)?;
    value.as_bool().ok_or_else(|| {
        SpecializeError::non_constant(
            format!("condition has type {}", value.primitive().name()),
            expr.span,
        )
    })
}

fn unary(op: UnaryOp, value: ConstantValue) -> Option<ConstantValue> {
    use ConstantValue as C;
    match (op, value) {
        (UnaryOp::Not, C::Bool(b)) => Some(C::Bool(!b)),
        (UnaryOp::Neg, C::Int(i)) => i.checked_neg().map(C::Int),
        (UnaryOp::Neg, C::Float(f)) => Some(C::Float(-f)),
        (UnaryOp::BitNot, C::Int(i)) => Some(C::Int(!i)),
        (UnaryOp::BitNot, C::UInt(u)) => Some(C::UInt(!u)),
        _ => None,
    }
}

/// Operands of one kind; int and float mix as float.
enum Operands {
    Bool(bool, bool),
    Int(i32, i32),
    UInt(u32, u32),
    Float(f32, f32),
}

#[expect(clippy::cast_precision_loss, reason = "GLSL converts int to float the same way")]
fn operands(l: ConstantValue, r: ConstantValue) -> Option<Operands> {
    use ConstantValue as C;
    match (l, r) {
        (C::Bool(a), C::Bool(b)) => Some(Operands::Bool(a, b)),
        (C::Int(a), C::Int(b)) => Some(Operands::Int(a, b)),
        (C::UInt(a), C::UInt(b)) => Some(Operands::UInt(a, b)),
        (C::Float(a), C::Float(b)) => Some(Operands::Float(a, b)),
        (C::Int(a), C::Float(b)) => Some(Operands::Float(a as f32, b)),
        (C::Float(a), C::Int(b)) => Some(Operands::Float(a, b as f32)),
        _ => None,
    }
}

fn binary(op: BinaryOp, l: ConstantValue, r: ConstantValue) -> Option<ConstantValue> {
    use ConstantValue as C;
    let operands = operands(l, r)?;

    if op.is_comparison() {
        let ordering = match operands {
            Operands::Bool(a, b) => a.partial_cmp(&b),
            Operands::Int(a, b) => a.partial_cmp(&b),
            Operands::UInt(a, b) => a.partial_cmp(&b),
            Operands::Float(a, b) => a.partial_cmp(&b),
        };
        let is_bool = matches!(operands, Operands::Bool(..));
        let result = match op {
            BinaryOp::Eq => ordering.is_some_and(std::cmp::Ordering::is_eq),
            BinaryOp::NotEq => !ordering.is_some_and(std::cmp::Ordering::is_eq),
            // ordering of booleans is not defined
            _ if is_bool => return None,
            BinaryOp::Lt => ordering.is_some_and(std::cmp::Ordering::is_lt),
            BinaryOp::LtEq => ordering.is_some_and(std::cmp::Ordering::is_le),
            BinaryOp::Gt => ordering.is_some_and(std::cmp::Ordering::is_gt),
            _ => ordering.is_some_and(std::cmp::Ordering::is_ge),
        };
        return Some(C::Bool(result));
    }

    match (op, operands) {
        (BinaryOp::And, Operands::Bool(a, b)) => Some(C::Bool(a && b)),
        (BinaryOp::Or, Operands::Bool(a, b)) => Some(C::Bool(a || b)),
        (_, Operands::Bool(..)) | (BinaryOp::And | BinaryOp::Or, _) => None,
        (_, Operands::Int(a, b)) => int_op(op, a, b).map(C::Int),
        (_, Operands::UInt(a, b)) => uint_op(op, a, b).map(C::UInt),
        (_, Operands::Float(a, b)) => float_op(op, a, b).map(C::Float),
    }
}

fn int_op(op: BinaryOp, a: i32, b: i32) -> Option<i32> {
    match op {
        BinaryOp::Add => a.checked_add(b),
        BinaryOp::Sub => a.checked_sub(b),
        BinaryOp::Mul => a.checked_mul(b),
        BinaryOp::Div => a.checked_div(b),
        BinaryOp::Rem => a.checked_rem(b),
        BinaryOp::BitAnd => Some(a & b),
        BinaryOp::BitOr => Some(a | b),
        BinaryOp::BitXor => Some(a ^ b),
        BinaryOp::Shl => u32::try_from(b).ok().and_then(|b| a.checked_shl(b)),
        BinaryOp::Shr => u32::try_from(b).ok().and_then(|b| a.checked_shr(b)),
        _ => None,
    }
}

fn uint_op(op: BinaryOp, a: u32, b: u32) -> Option<u32> {
    match op {
        BinaryOp::Add => a.checked_add(b),
        BinaryOp::Sub => a.checked_sub(b),
        BinaryOp::Mul => a.checked_mul(b),
        BinaryOp::Div => a.checked_div(b),
        BinaryOp::Rem => a.checked_rem(b),
        BinaryOp::BitAnd => Some(a & b),
        BinaryOp::BitOr => Some(a | b),
        BinaryOp::BitXor => Some(a ^ b),
        BinaryOp::Shl => a.checked_shl(b),
        BinaryOp::Shr => a.checked_shr(b),
        _ => None,
    }
}

fn float_op(op: BinaryOp, a: f32, b: f32) -> Option<f32> {
    let value = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => a / b,
        _ => return None,
    };
    value.is_finite().then_some(value)
}
