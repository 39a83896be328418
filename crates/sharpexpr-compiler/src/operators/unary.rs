//! Unary operator resolution.

use sharpexpr_core::{BindError, DataType, UnaryOp};
use sharpexpr_registry::TypeRegistry;

use super::{OperatorResolution, primitive::primitive_unary, user_operator};

/// Resolve `op operand`. Nullable operands lift the built-in operation.
pub fn resolve_unary(
    registry: &TypeRegistry,
    op: UnaryOp,
    operand: &DataType,
) -> Result<Option<OperatorResolution>, BindError> {
    if let Some(resolution) = user_operator(registry, op.method_name(), &[*operand], &[*operand])? {
        return Ok(Some(resolution));
    }

    if let Some(result_type) = primitive_unary(op, operand) {
        return Ok(Some(OperatorResolution::Primitive { result_type }));
    }

    if operand.is_nullable()
        && let Some(inner) = primitive_unary(op, &operand.underlying())
    {
        return Ok(Some(OperatorResolution::Primitive {
            result_type: DataType::nullable(inner.type_hash),
        }));
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sharpexpr_core::primitives;

    #[test]
    fn lifted_negation() {
        let registry = TypeRegistry::with_primitives();
        let maybe = DataType::nullable(primitives::DOUBLE);
        let neg = resolve_unary(&registry, UnaryOp::Negate, &maybe).unwrap().unwrap();
        assert_eq!(neg.result_type(), maybe);
        assert!(resolve_unary(&registry, UnaryOp::Negate, &DataType::string())
            .unwrap()
            .is_none());
    }
}
