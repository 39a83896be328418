//! Built-in operator tables.

use sharpexpr_core::{BinaryOp, DataType, PrimitiveKind, UnaryOp};

/// Result type of a built-in binary operation on two non-nullable operands,
/// or `None` when the combination is not built in.
pub fn primitive_binary(op: BinaryOp, left: &DataType, right: &DataType) -> Option<DataType> {
    if left.is_bool() && right.is_bool() {
        return match op {
            BinaryOp::BitAnd
            | BinaryOp::BitOr
            | BinaryOp::BitXor
            | BinaryOp::Equal
            | BinaryOp::NotEqual
            | BinaryOp::AndAlso
            | BinaryOp::OrElse => Some(DataType::bool()),
            _ => None,
        };
    }

    let l = left.primitive_kind()?;
    let r = right.primitive_kind()?;

    if op.is_shift() {
        return (l.is_integer() && r == PrimitiveKind::Int32).then_some(*left);
    }
    if l != r || !l.is_numeric() {
        return None;
    }

    match op {
        _ if op.is_comparison() => Some(DataType::bool()),
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem
            if l != PrimitiveKind::Char =>
        {
            Some(*left)
        }
        _ if op.is_bitwise() && l.is_integer() => Some(*left),
        _ => None,
    }
}

/// Result type of a built-in unary operation.
pub fn primitive_unary(op: UnaryOp, operand: &DataType) -> Option<DataType> {
    let kind = operand.primitive_kind()?;
    let ok = match op {
        UnaryOp::Negate => {
            kind.is_numeric() && !matches!(kind, PrimitiveKind::Char | PrimitiveKind::UInt64)
        }
        UnaryOp::Plus => kind.is_numeric() && kind != PrimitiveKind::Char,
        UnaryOp::Not => kind == PrimitiveKind::Bool || kind.is_integer(),
        UnaryOp::OnesComplement => kind.is_integer(),
    };
    ok.then_some(*operand)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(kind: PrimitiveKind) -> DataType {
        DataType::primitive(kind)
    }

    #[test]
    fn arithmetic_requires_matching_numeric_types() {
        let int = t(PrimitiveKind::Int32);
        let long = t(PrimitiveKind::Int64);
        assert_eq!(primitive_binary(BinaryOp::Add, &int, &int), Some(int));
        assert_eq!(primitive_binary(BinaryOp::Add, &int, &long), None);
        assert_eq!(
            primitive_binary(BinaryOp::Less, &long, &long),
            Some(DataType::bool())
        );
        let dec = t(PrimitiveKind::Decimal);
        assert_eq!(primitive_binary(BinaryOp::Rem, &dec, &dec), Some(dec));
    }

    #[test]
    fn bitwise_only_for_integers_and_bool() {
        let double = t(PrimitiveKind::Double);
        let uint = t(PrimitiveKind::UInt32);
        assert_eq!(primitive_binary(BinaryOp::BitAnd, &double, &double), None);
        assert_eq!(primitive_binary(BinaryOp::BitXor, &uint, &uint), Some(uint));
        assert_eq!(
            primitive_binary(BinaryOp::BitOr, &DataType::bool(), &DataType::bool()),
            Some(DataType::bool())
        );
        assert_eq!(
            primitive_binary(BinaryOp::Add, &DataType::bool(), &DataType::bool()),
            None
        );
    }

    #[test]
    fn shifts_take_an_int_count() {
        let long = t(PrimitiveKind::Int64);
        let int = t(PrimitiveKind::Int32);
        assert_eq!(primitive_binary(BinaryOp::Shl, &long, &int), Some(long));
        assert_eq!(primitive_binary(BinaryOp::Shr, &long, &long), None);
        assert_eq!(primitive_binary(BinaryOp::Shl, &t(PrimitiveKind::Float), &int), None);
    }

    #[test]
    fn unary_tables() {
        let int = t(PrimitiveKind::Int32);
        let ulong = t(PrimitiveKind::UInt64);
        assert_eq!(primitive_unary(UnaryOp::Negate, &int), Some(int));
        assert_eq!(primitive_unary(UnaryOp::Negate, &ulong), None);
        assert_eq!(primitive_unary(UnaryOp::Not, &int), Some(int));
        assert_eq!(primitive_unary(UnaryOp::Not, &DataType::bool()), Some(DataType::bool()));
        assert_eq!(primitive_unary(UnaryOp::OnesComplement, &DataType::bool()), None);
        assert_eq!(primitive_unary(UnaryOp::Plus, &t(PrimitiveKind::Char)), None);
    }
}
