//! Constant-expression evaluation (§4.H), JLS §15.28/§15.29.
//!
//! Folds an [`ExprNode`] down to a [`Const`] using strict `float`/`double`
//! arithmetic (JLS §15.4: every `float`/`double` operator in Java is
//! FP-strict since Java 17 - no fused multiply-add contraction, ever) and
//! the binary numeric promotion rules of JLS §5.6.2.
use crate::ast::{BinaryOp, ExprNode, QualifiedName, UnaryOp};
use crate::diagnostic::{Diagnostic, Diagnostics, ErrorKind};
use crate::sym::ClassSymbol;
use crate::types::const_value::Const;

/// Promotes a constant to `int`, `long`, `float`, or `double` per JLS
/// §5.6.1 (unary) - used before applying a unary numeric operator.
fn unary_promote(c: Const) -> Const {
    match c {
        Const::Byte(b) => Const::Int(i32::from(b)),
        Const::Short(s) => Const::Int(i32::from(s)),
        Const::Char(c) => Const::Int(i32::from(c)),
        Const::Boolean(_) | Const::Int(_) | Const::Long(_) | Const::Float(_) | Const::Double(_) | Const::String(_) => c,
    }
}

/// The result of binary numeric promotion (JLS §5.6.2): both operands
/// widened to a common type.
enum Promoted {
    Int(i32, i32),
    Long(i64, i64),
    Float(f32, f32),
    Double(f64, f64),
}

fn binary_promote(left: Const, right: Const) -> Option<Promoted> {
    let left = unary_promote(left);
    let right = unary_promote(right);
    match (left, right) {
        (Const::Double(a), b) => Some(Promoted::Double(a, as_f64(b)?)),
        (a, Const::Double(b)) => Some(Promoted::Double(as_f64(a)?, b)),
        (Const::Float(a), b) => Some(Promoted::Float(a, as_f32(b)?)),
        (a, Const::Float(b)) => Some(Promoted::Float(as_f32(a)?, b)),
        (Const::Long(a), b) => Some(Promoted::Long(a, as_i64(b)?)),
        (a, Const::Long(b)) => Some(Promoted::Long(as_i64(a)?, b)),
        (Const::Int(a), Const::Int(b)) => Some(Promoted::Int(a, b)),
        _ => None,
    }
}

fn as_f64(c: Const) -> Option<f64> {
    match c {
        Const::Int(i) => Some(f64::from(i)),
        Const::Long(l) => Some(l as f64),
        Const::Float(f) => Some(f64::from(f)),
        Const::Double(d) => Some(d),
        _ => None,
    }
}

fn as_f32(c: Const) -> Option<f32> {
    match c {
        Const::Int(i) => Some(i as f32),
        Const::Long(l) => Some(l as f32),
        Const::Float(f) => Some(f),
        _ => None,
    }
}

fn as_i64(c: Const) -> Option<i64> {
    match c {
        Const::Int(i) => Some(i64::from(i)),
        Const::Long(l) => Some(l),
        _ => None,
    }
}

/// Evaluates `expr` to a constant, resolving any referenced name via
/// `resolve_name`, and logging an [`ErrorKind::ExpressionError`] diagnostic
/// attributed to `owner` if it is not a constant expression.
///
/// Returns `None` in that case, same as the rest of the binder's
/// best-effort-result-plus-logged-diagnostic shape (e.g.
/// [`crate::type_binder::bind_type`] returning [`crate::types::ty::Type::Error`]).
pub fn eval_const(
    expr: &ExprNode,
    resolve_name: &dyn Fn(&QualifiedName) -> Option<Const>,
    owner: &ClassSymbol,
    diagnostics: &mut Diagnostics,
) -> Option<Const> {
    match eval_const_inner(expr, resolve_name) {
        Ok(value) => Some(value),
        Err(reason) => {
            diagnostics.log(Diagnostic::error(
                ErrorKind::ExpressionError(reason),
                Some(owner.clone()),
            ));
            None
        }
    }
}

fn eval_const_inner(
    expr: &ExprNode,
    resolve_name: &dyn Fn(&QualifiedName) -> Option<Const>,
) -> Result<Const, String> {
    match expr {
        ExprNode::Literal(c) => Ok(c.clone()),
        ExprNode::Paren(inner) => eval_const_inner(inner, resolve_name),
        ExprNode::Name(name) => resolve_name(name)
            .ok_or_else(|| format!("{} is not a constant", name.simple_name())),
        ExprNode::Unary(op, inner) => eval_unary(*op, eval_const_inner(inner, resolve_name)?),
        ExprNode::Binary(left, op, right) => {
            let l = eval_const_inner(left, resolve_name)?;
            let r = eval_const_inner(right, resolve_name)?;
            eval_binary(l, *op, r)
        }
        ExprNode::Conditional(cond, then_branch, else_branch) => {
            match eval_const_inner(cond, resolve_name)? {
                Const::Boolean(true) => eval_const_inner(then_branch, resolve_name),
                Const::Boolean(false) => eval_const_inner(else_branch, resolve_name),
                _ => Err("conditional expression guard is not boolean".to_owned()),
            }
        }
        ExprNode::Cast(ty, inner) => {
            let value = eval_const_inner(inner, resolve_name)?;
            eval_cast(ty, value)
        }
        ExprNode::ClassLiteral(_) => Err("a class literal is not a constant expression".to_owned()),
    }
}

fn eval_unary(op: UnaryOp, value: Const) -> Result<Const, String> {
    match (op, unary_promote(value)) {
        (UnaryOp::Plus, v @ (Const::Int(_) | Const::Long(_) | Const::Float(_) | Const::Double(_))) => Ok(v),
        (UnaryOp::Minus, Const::Int(i)) => Ok(Const::Int(i.wrapping_neg())),
        (UnaryOp::Minus, Const::Long(l)) => Ok(Const::Long(l.wrapping_neg())),
        (UnaryOp::Minus, Const::Float(f)) => Ok(Const::Float(-f)),
        (UnaryOp::Minus, Const::Double(d)) => Ok(Const::Double(-d)),
        (UnaryOp::BitwiseNot, Const::Int(i)) => Ok(Const::Int(!i)),
        (UnaryOp::BitwiseNot, Const::Long(l)) => Ok(Const::Long(!l)),
        (UnaryOp::LogicalNot, Const::Boolean(b)) => Ok(Const::Boolean(!b)),
        _ => Err("operator not applicable to operand type".to_owned()),
    }
}

/// Renders `c` the way `String.valueOf` would for string concatenation
/// (JLS §15.18.1), used when one operand of a `+` is already a `String`.
fn stringify_const(c: &Const) -> String {
    match c {
        Const::Boolean(b) => b.to_string(),
        Const::Byte(b) => b.to_string(),
        Const::Short(s) => s.to_string(),
        Const::Char(c) => char::from_u32(u32::from(*c)).unwrap_or('\u{FFFD}').to_string(),
        Const::Int(i) => i.to_string(),
        Const::Long(l) => l.to_string(),
        Const::Float(f) => stringify_java_double(f64::from(*f)),
        Const::Double(d) => stringify_java_double(*d),
        Const::String(s) => s.clone(),
    }
}

/// Approximates `Double.toString`/`Float.toString`: Java always keeps a
/// `.0` on a whole-numbered float, where Rust's `Display` drops it.
fn stringify_java_double(d: f64) -> String {
    if d.is_nan() {
        "NaN".to_owned()
    } else if d.is_infinite() {
        if d > 0.0 { "Infinity".to_owned() } else { "-Infinity".to_owned() }
    } else if d == d.trunc() && d.abs() < 1e7 {
        format!("{d:.1}")
    } else {
        d.to_string()
    }
}

fn eval_binary(left: Const, op: BinaryOp, right: Const) -> Result<Const, String> {
    use BinaryOp::{Add, LogicalAnd, LogicalOr, ShiftLeft, ShiftRight, UnsignedShiftRight};

    if matches!(op, LogicalAnd | LogicalOr) {
        return match (left, right) {
            (Const::Boolean(a), Const::Boolean(b)) => Ok(Const::Boolean(match op {
                LogicalAnd => a && b,
                LogicalOr => a || b,
                _ => unreachable!(),
            })),
            _ => Err("logical operator requires boolean operands".to_owned()),
        };
    }

    if matches!(op, ShiftLeft | ShiftRight | UnsignedShiftRight) {
        return eval_shift(left, op, right);
    }

    if op == Add && (matches!(left, Const::String(_)) || matches!(right, Const::String(_))) {
        return Ok(Const::String(format!("{}{}", stringify_const(&left), stringify_const(&right))));
    }

    let promoted = binary_promote(left, right)
        .ok_or_else(|| "operands are not of compatible numeric type".to_owned())?;

    match promoted {
        Promoted::Int(a, b) => eval_int(a, op, b),
        Promoted::Long(a, b) => eval_long(a, op, b),
        Promoted::Float(a, b) => eval_float(a, op, b),
        Promoted::Double(a, b) => eval_double(a, op, b),
    }
}

fn eval_shift(left: Const, op: BinaryOp, right: Const) -> Result<Const, String> {
    let left = unary_promote(left);
    let shift_amount = match unary_promote(right) {
        Const::Int(i) => i,
        Const::Long(l) => l as i32,
        _ => return Err("shift distance must be integral".to_owned()),
    };
    match left {
        Const::Int(i) => {
            let dist = (shift_amount & 0x1f) as u32;
            Ok(Const::Int(match op {
                BinaryOp::ShiftLeft => i.wrapping_shl(dist),
                BinaryOp::ShiftRight => i.wrapping_shr(dist),
                BinaryOp::UnsignedShiftRight => ((i as u32).wrapping_shr(dist)) as i32,
                _ => unreachable!(),
            }))
        }
        Const::Long(l) => {
            let dist = (shift_amount & 0x3f) as u32;
            Ok(Const::Long(match op {
                BinaryOp::ShiftLeft => l.wrapping_shl(dist),
                BinaryOp::ShiftRight => l.wrapping_shr(dist),
                BinaryOp::UnsignedShiftRight => ((l as u64).wrapping_shr(dist)) as i64,
                _ => unreachable!(),
            }))
        }
        _ => Err("shift operand must be int or long".to_owned()),
    }
}

macro_rules! eval_integral_ops {
    ($name:ident, $ty:ty, $wrap:expr) => {
        fn $name(a: $ty, op: BinaryOp, b: $ty) -> Result<Const, String> {
            use BinaryOp::{
                Add, BitwiseAnd, BitwiseOr, BitwiseXor, Divide, Equal, GreaterEqual, GreaterThan,
                LessEqual, LessThan, Multiply, NotEqual, Remainder, Subtract,
            };
            match op {
                Add => Ok($wrap(a.wrapping_add(b))),
                Subtract => Ok($wrap(a.wrapping_sub(b))),
                Multiply => Ok($wrap(a.wrapping_mul(b))),
                Divide => {
                    if b == 0 {
                        Err("division by zero in constant expression".to_owned())
                    } else {
                        Ok($wrap(a.wrapping_div(b)))
                    }
                }
                Remainder => {
                    if b == 0 {
                        Err("division by zero in constant expression".to_owned())
                    } else {
                        Ok($wrap(a.wrapping_rem(b)))
                    }
                }
                BitwiseAnd => Ok($wrap(a & b)),
                BitwiseOr => Ok($wrap(a | b)),
                BitwiseXor => Ok($wrap(a ^ b)),
                Equal => Ok(Const::Boolean(a == b)),
                NotEqual => Ok(Const::Boolean(a != b)),
                LessThan => Ok(Const::Boolean(a < b)),
                LessEqual => Ok(Const::Boolean(a <= b)),
                GreaterThan => Ok(Const::Boolean(a > b)),
                GreaterEqual => Ok(Const::Boolean(a >= b)),
                _ => Err("operator not applicable to integral operands".to_owned()),
            }
        }
    };
}

eval_integral_ops!(eval_int, i32, Const::Int);
eval_integral_ops!(eval_long, i64, Const::Long);

macro_rules! eval_fp_ops {
    ($name:ident, $ty:ty, $wrap:expr) => {
        fn $name(a: $ty, op: BinaryOp, b: $ty) -> Result<Const, String> {
            use BinaryOp::{
                Add, Divide, Equal, GreaterEqual, GreaterThan, LessEqual, LessThan, Multiply,
                NotEqual, Remainder, Subtract,
            };
            match op {
                Add => Ok($wrap(a + b)),
                Subtract => Ok($wrap(a - b)),
                Multiply => Ok($wrap(a * b)),
                Divide => Ok($wrap(a / b)),
                Remainder => Ok($wrap(a % b)),
                Equal => Ok(Const::Boolean(a == b)),
                NotEqual => Ok(Const::Boolean(a != b)),
                LessThan => Ok(Const::Boolean(a < b)),
                LessEqual => Ok(Const::Boolean(a <= b)),
                GreaterThan => Ok(Const::Boolean(a > b)),
                GreaterEqual => Ok(Const::Boolean(a >= b)),
                _ => Err("operator not applicable to floating-point operands".to_owned()),
            }
        }
    };
}

eval_fp_ops!(eval_float, f32, Const::Float);
eval_fp_ops!(eval_double, f64, Const::Double);

fn eval_cast(ty: &crate::ast::TypeNode, value: Const) -> Result<Const, String> {
    use crate::ast::TypeNode;
    use crate::types::primitive::PrimitiveType;
    let TypeNode::Primitive(target) = ty else {
        return Err("only primitive casts are constant expressions".to_owned());
    };
    let as_i64 = match &value {
        Const::Int(i) => i64::from(*i),
        Const::Long(l) => *l,
        Const::Char(c) => i64::from(*c),
        Const::Short(s) => i64::from(*s),
        Const::Byte(b) => i64::from(*b),
        Const::Float(f) => *f as i64,
        Const::Double(d) => *d as i64,
        _ => 0,
    };
    Ok(match target {
        PrimitiveType::Byte => Const::Byte(as_i64 as i8),
        PrimitiveType::Short => Const::Short(as_i64 as i16),
        PrimitiveType::Char => Const::Char(as_i64 as u16),
        PrimitiveType::Int => Const::Int(as_i64 as i32),
        PrimitiveType::Long => Const::Long(as_i64),
        PrimitiveType::Float => Const::Float(as_i64 as f32),
        PrimitiveType::Double => Const::Double(as_i64 as f64),
        PrimitiveType::Boolean => return Err("cannot cast to boolean".to_owned()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_names(_: &QualifiedName) -> Option<Const> {
        None
    }

    fn eval(expr: &ExprNode) -> (Option<Const>, Diagnostics) {
        let mut diagnostics = Diagnostics::new();
        let owner = ClassSymbol::new("a/B");
        let value = eval_const(expr, &no_names, &owner, &mut diagnostics);
        (value, diagnostics)
    }

    #[test]
    fn folds_integer_addition() {
        let expr = ExprNode::Binary(
            Box::new(ExprNode::Literal(Const::Int(2))),
            BinaryOp::Add,
            Box::new(ExprNode::Literal(Const::Int(3))),
        );
        assert_eq!(eval(&expr).0, Some(Const::Int(5)));
    }

    #[test]
    fn promotes_int_and_double_to_double() {
        let expr = ExprNode::Binary(
            Box::new(ExprNode::Literal(Const::Int(1))),
            BinaryOp::Add,
            Box::new(ExprNode::Literal(Const::Double(0.5))),
        );
        assert_eq!(eval(&expr).0, Some(Const::Double(1.5)));
    }

    #[test]
    fn division_by_zero_int_is_an_error() {
        let expr = ExprNode::Binary(
            Box::new(ExprNode::Literal(Const::Int(1))),
            BinaryOp::Divide,
            Box::new(ExprNode::Literal(Const::Int(0))),
        );
        let (value, diagnostics) = eval(&expr);
        assert_eq!(value, None);
        assert!(diagnostics.has_errors());
    }

    #[test]
    fn division_by_zero_double_is_infinity_not_an_error() {
        let expr = ExprNode::Binary(
            Box::new(ExprNode::Literal(Const::Double(1.0))),
            BinaryOp::Divide,
            Box::new(ExprNode::Literal(Const::Double(0.0))),
        );
        let (value, diagnostics) = eval(&expr);
        assert_eq!(value, Some(Const::Double(f64::INFINITY)));
        assert!(!diagnostics.has_errors());
    }

    #[test]
    fn string_concatenation() {
        let expr = ExprNode::Binary(
            Box::new(ExprNode::Literal(Const::String("a".into()))),
            BinaryOp::Add,
            Box::new(ExprNode::Literal(Const::String("b".into()))),
        );
        assert_eq!(eval(&expr).0, Some(Const::String("ab".into())));
    }

    #[test]
    fn string_concatenation_stringifies_a_non_string_operand() {
        let expr = ExprNode::Binary(
            Box::new(ExprNode::Literal(Const::String("x".into()))),
            BinaryOp::Add,
            Box::new(ExprNode::Literal(Const::Int(1))),
        );
        assert_eq!(eval(&expr).0, Some(Const::String("x1".into())));
    }

    #[test]
    fn string_concatenation_works_with_string_on_the_right_operand_too() {
        let expr = ExprNode::Binary(
            Box::new(ExprNode::Literal(Const::Boolean(true))),
            BinaryOp::Add,
            Box::new(ExprNode::Literal(Const::String("!".into()))),
        );
        assert_eq!(eval(&expr).0, Some(Const::String("true!".into())));
    }

    #[test]
    fn shift_distance_is_masked_for_int() {
        let expr = ExprNode::Binary(
            Box::new(ExprNode::Literal(Const::Int(1))),
            BinaryOp::ShiftLeft,
            Box::new(ExprNode::Literal(Const::Int(33))),
        );
        assert_eq!(eval(&expr).0, Some(Const::Int(2)));
    }

    #[test]
    fn conditional_picks_branch_by_guard() {
        let expr = ExprNode::Conditional(
            Box::new(ExprNode::Literal(Const::Boolean(false))),
            Box::new(ExprNode::Literal(Const::Int(1))),
            Box::new(ExprNode::Literal(Const::Int(2))),
        );
        assert_eq!(eval(&expr).0, Some(Const::Int(2)));
    }

    #[test]
    fn unresolved_name_is_an_error() {
        let expr = ExprNode::Name(QualifiedName::new(vec!["X".into()]));
        let (value, diagnostics) = eval(&expr);
        assert_eq!(value, None);
        assert!(diagnostics.has_errors());
    }

    #[test]
    fn class_literal_is_not_a_constant_expression() {
        let expr = ExprNode::ClassLiteral(crate::ast::TypeNode::Primitive(
            crate::types::primitive::PrimitiveType::Int,
        ));
        let (value, diagnostics) = eval(&expr);
        assert_eq!(value, None);
        assert!(diagnostics.has_errors());
    }
}
