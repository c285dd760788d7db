//! Implicit conversions. Each one rewrites the operand in place by wrapping it
//! in an explicit node, so the tree carries every conversion the language
//! performs.

use log::debug;

use crate::ast::{Expr, UnaryOp};
use crate::types::{Specifier, Type};

/// Array to pointer through an inserted address-of, `char` to `int` through
/// an inserted cast. Returns the resulting type.
pub(crate) fn promote(expr: &mut Expr) -> Type {
    if expr.ty.is_array() {
        let promoted = expr.ty.promote();
        debug!("promoting {} to {}", expr.ty, promoted);
        rewrite(expr, |operand| Expr::unary(UnaryOp::AddrOf, operand, promoted));
    } else if expr.ty == Type::char() {
        debug!("promoting {} to {}", expr.ty, Type::int());
        rewrite(expr, |operand| Expr::cast(operand, Type::int()));
    }

    expr.ty.clone()
}

/// Widen a numeric operand toward `target` without ever narrowing it, then
/// promote. Only `char` sources and `long` targets need an explicit cast.
pub(crate) fn extend(expr: &mut Expr, target: &Type) -> Type {
    if expr.ty != *target
        && expr.ty.is_numeric()
        && target.is_numeric()
        && (expr.ty.specifier() == Specifier::Char || target.specifier() == Specifier::Long)
    {
        debug!("extending {} to {}", expr.ty, target);
        let target = target.clone();
        rewrite(expr, |operand| Expr::cast(operand, target));
    }

    promote(expr)
}

/// Convert as if by assignment to `target`.
pub(crate) fn convert(expr: &mut Expr, target: &Type) -> Type {
    if expr.ty.is_array() && target.is_pointer() {
        promote(expr);
    }

    if expr.ty != *target && expr.ty.is_numeric() && target.is_numeric() {
        debug!("assigning {} to {}", expr.ty, target);
        let target = target.clone();
        rewrite(expr, |operand| Expr::cast(operand, target));
    }

    expr.ty.clone()
}

/// Replace `expr` with a node built around its old value.
fn rewrite(expr: &mut Expr, wrap: impl FnOnce(Expr) -> Expr) {
    let operand = std::mem::replace(expr, Expr::number(0, Type::int()));
    *expr = wrap(operand);
}
