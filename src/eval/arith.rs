//! Built-in operators on scalar values.
//!
//! Operands arrive already promoted to a common type, so every arm pairs two
//! values of the same variant. Integer arithmetic wraps; shift counts are
//! masked to the operand width.

use std::cmp::Ordering;

use rust_decimal::Decimal;

use sharpexpr_core::{BinaryOp, RuntimeError, UnaryOp, Value};

fn compare(op: BinaryOp, ordering: Option<Ordering>) -> Result<Value, RuntimeError> {
    use Ordering::*;
    let Some(ordering) = ordering else {
        // NaN compares false except for `!=`.
        return Ok(Value::Bool(op == BinaryOp::NotEqual));
    };
    Ok(Value::Bool(match op {
        BinaryOp::Equal => ordering == Equal,
        BinaryOp::NotEqual => ordering != Equal,
        BinaryOp::Less => ordering == Less,
        BinaryOp::LessEqual => ordering != Greater,
        BinaryOp::Greater => ordering == Greater,
        BinaryOp::GreaterEqual => ordering != Less,
        other => return Err(unsupported(other, "comparison")),
    }))
}

fn unsupported(op: BinaryOp, operands: &str) -> RuntimeError {
    RuntimeError::invalid_tree(format!("operator '{}' is not defined for {operands} operands", op.token()))
}

macro_rules! integer_op {
    ($op:expr, $a:expr, $b:expr, $variant:ident) => {{
        let (a, b) = ($a, $b);
        Ok(Value::$variant(match $op {
            BinaryOp::Add => a.wrapping_add(b),
            BinaryOp::Sub => a.wrapping_sub(b),
            BinaryOp::Mul => a.wrapping_mul(b),
            BinaryOp::Div | BinaryOp::Rem if b == 0 => return Err(RuntimeError::DivideByZero),
            BinaryOp::Div => a.checked_div(b).ok_or(RuntimeError::Overflow)?,
            BinaryOp::Rem => a.checked_rem(b).ok_or(RuntimeError::Overflow)?,
            BinaryOp::BitAnd => a & b,
            BinaryOp::BitOr => a | b,
            BinaryOp::BitXor => a ^ b,
            op => return compare(op, a.partial_cmp(&b)),
        }))
    }};
}

macro_rules! float_op {
    ($op:expr, $a:expr, $b:expr, $variant:ident) => {{
        let (a, b) = ($a, $b);
        Ok(Value::$variant(match $op {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => a / b,
            BinaryOp::Rem => a % b,
            op => return compare(op, a.partial_cmp(&b)),
        }))
    }};
}

macro_rules! shift_op {
    ($op:expr, $a:expr, $count:expr, $variant:ident) => {{
        let (a, count) = ($a, $count as u32);
        Ok(Value::$variant(match $op {
            BinaryOp::Shl => a.wrapping_shl(count),
            BinaryOp::Shr => a.wrapping_shr(count),
            op => return Err(unsupported(op, "shift")),
        }))
    }};
}

fn decimal_op(op: BinaryOp, a: Decimal, b: Decimal) -> Result<Value, RuntimeError> {
    let result = match op {
        BinaryOp::Add => a.checked_add(b),
        BinaryOp::Sub => a.checked_sub(b),
        BinaryOp::Mul => a.checked_mul(b),
        BinaryOp::Div | BinaryOp::Rem if b.is_zero() => return Err(RuntimeError::DivideByZero),
        BinaryOp::Div => a.checked_div(b),
        BinaryOp::Rem => a.checked_rem(b),
        op => return compare(op, a.partial_cmp(&b)),
    };
    result.map(Value::Decimal).ok_or(RuntimeError::Overflow)
}

fn bool_op(op: BinaryOp, a: bool, b: bool) -> Result<Value, RuntimeError> {
    Ok(Value::Bool(match op {
        BinaryOp::BitAnd | BinaryOp::AndAlso => a & b,
        BinaryOp::BitOr | BinaryOp::OrElse => a | b,
        BinaryOp::BitXor => a ^ b,
        BinaryOp::Equal => a == b,
        BinaryOp::NotEqual => a != b,
        op => return Err(unsupported(op, "Boolean")),
    }))
}

/// `==` on reference operands: strings by content, everything else by identity.
fn reference_equals(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::String(x), Value::String(y)) => x == y,
        _ => a == b,
    }
}

/// Apply a built-in binary operator to two non-null operands.
pub fn binary(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, RuntimeError> {
    use Value::*;

    if op.is_shift() {
        let Int32(count) = right else {
            return Err(unsupported(op, right.kind_name()));
        };
        return match left {
            Int8(a) => shift_op!(op, *a, *count, Int8),
            UInt8(a) => shift_op!(op, *a, *count, UInt8),
            Int16(a) => shift_op!(op, *a, *count, Int16),
            UInt16(a) => shift_op!(op, *a, *count, UInt16),
            Int32(a) => shift_op!(op, *a, *count, Int32),
            UInt32(a) => shift_op!(op, *a, *count, UInt32),
            Int64(a) => shift_op!(op, *a, *count, Int64),
            UInt64(a) => shift_op!(op, *a, *count, UInt64),
            other => Err(unsupported(op, other.kind_name())),
        };
    }

    match (left, right) {
        (Int8(a), Int8(b)) => integer_op!(op, *a, *b, Int8),
        (UInt8(a), UInt8(b)) => integer_op!(op, *a, *b, UInt8),
        (Int16(a), Int16(b)) => integer_op!(op, *a, *b, Int16),
        (UInt16(a), UInt16(b)) => integer_op!(op, *a, *b, UInt16),
        (Int32(a), Int32(b)) => integer_op!(op, *a, *b, Int32),
        (UInt32(a), UInt32(b)) => integer_op!(op, *a, *b, UInt32),
        (Int64(a), Int64(b)) => integer_op!(op, *a, *b, Int64),
        (UInt64(a), UInt64(b)) => integer_op!(op, *a, *b, UInt64),
        (Float(a), Float(b)) => float_op!(op, *a, *b, Float),
        (Double(a), Double(b)) => float_op!(op, *a, *b, Double),
        (Value::Decimal(a), Value::Decimal(b)) => decimal_op(op, *a, *b),
        (Bool(a), Bool(b)) => bool_op(op, *a, *b),
        (Char(a), Char(b)) => compare(op, a.partial_cmp(b)),
        (Enum { bits: a, .. }, Enum { bits: b, .. }) if op.is_comparison() => compare(op, a.partial_cmp(b)),
        _ if op.is_equality() => Ok(Bool(reference_equals(left, right) == (op == BinaryOp::Equal))),
        _ => Err(unsupported(op, left.kind_name())),
    }
}

/// `null` operands of a built-in operator: equality compares nullness,
/// ordering is false and arithmetic yields `null`.
pub fn binary_with_null(op: BinaryOp, left: &Value, right: &Value) -> Value {
    match op {
        BinaryOp::Equal => Value::Bool(left.is_null() && right.is_null()),
        BinaryOp::NotEqual => Value::Bool(left.is_null() != right.is_null()),
        _ if op.is_relational() => Value::Bool(false),
        _ => Value::Null,
    }
}

macro_rules! integer_unary {
    ($op:expr, $a:expr, $variant:ident) => {{
        let a = $a;
        Ok(Value::$variant(match $op {
            UnaryOp::Negate => a.wrapping_neg(),
            UnaryOp::Plus => a,
            UnaryOp::Not | UnaryOp::OnesComplement => !a,
        }))
    }};
}

/// Apply a built-in unary operator to a non-null operand.
pub fn unary(op: UnaryOp, operand: &Value) -> Result<Value, RuntimeError> {
    use Value::*;

    match (op, operand) {
        (_, Int8(a)) => integer_unary!(op, *a, Int8),
        (_, UInt8(a)) => integer_unary!(op, *a, UInt8),
        (_, Int16(a)) => integer_unary!(op, *a, Int16),
        (_, UInt16(a)) => integer_unary!(op, *a, UInt16),
        (_, Int32(a)) => integer_unary!(op, *a, Int32),
        (_, UInt32(a)) => integer_unary!(op, *a, UInt32),
        (_, Int64(a)) => integer_unary!(op, *a, Int64),
        (_, UInt64(a)) => integer_unary!(op, *a, UInt64),
        (UnaryOp::Negate, Float(a)) => Ok(Float(-a)),
        (UnaryOp::Negate, Double(a)) => Ok(Double(-a)),
        (UnaryOp::Negate, Value::Decimal(a)) => Ok(Value::Decimal(-*a)),
        (UnaryOp::Plus, Float(_) | Double(_) | Value::Decimal(_)) => Ok(operand.clone()),
        (UnaryOp::Not, Bool(b)) => Ok(Bool(!b)),
        _ => Err(RuntimeError::invalid_tree(format!(
            "operator '{}' is not defined for {}",
            op.token(),
            operand.kind_name()
        ))),
    }
}
