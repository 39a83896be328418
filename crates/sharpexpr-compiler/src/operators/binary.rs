//! Binary operator resolution.
//!
//! Tries, in order:
//! 1. User-defined `op_*` methods on either operand type
//! 2. Built-in operations on primitives
//! 3. String and reference equality
//! 4. Lifted operations on two identical `T?` operands

use sharpexpr_core::{BinaryOp, BindError, DataType};
use sharpexpr_registry::TypeRegistry;

use super::{OperatorResolution, primitive::primitive_binary, user_operator};

/// Resolve `left op right`. `Ok(None)` means the operator does not apply.
pub fn resolve_binary(
    registry: &TypeRegistry,
    op: BinaryOp,
    left: &DataType,
    right: &DataType,
) -> Result<Option<OperatorResolution>, BindError> {
    if let Some(name) = op.method_name()
        && let Some(resolution) = user_operator(registry, name, &[*left, *right], &[*left, *right])?
    {
        return Ok(Some(resolution));
    }

    if let Some(result_type) = primitive_binary(op, left, right) {
        return Ok(Some(OperatorResolution::Primitive { result_type }));
    }

    if op.is_equality() && reference_comparable(registry, left, right) {
        return Ok(Some(OperatorResolution::Primitive {
            result_type: DataType::bool(),
        }));
    }

    if left.is_nullable() && left == right {
        let inner = left.underlying();
        if let Some(result_type) = primitive_binary(op, &inner, &inner) {
            let result_type = if op.is_comparison() {
                result_type
            } else {
                DataType::nullable(result_type.type_hash)
            };
            return Ok(Some(OperatorResolution::Primitive { result_type }));
        }
    }

    Ok(None)
}

/// Two reference types where one is assignable to the other.
fn reference_comparable(registry: &TypeRegistry, left: &DataType, right: &DataType) -> bool {
    registry.is_reference_type(left)
        && registry.is_reference_type(right)
        && (registry.is_assignable_from(left, right) || registry.is_assignable_from(right, left))
}
