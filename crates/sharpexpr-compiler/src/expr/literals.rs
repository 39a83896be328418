//! Literal constants.
//!
//! Literals arrive already typed, so a constant node takes the value's own
//! runtime type.

use sharpexpr_core::Value;

use crate::typed::TypedExpr;

pub(super) fn build_literal(value: &Value) -> TypedExpr {
    TypedExpr::constant(value.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sharpexpr_core::{DataType, PrimitiveKind};

    #[test]
    fn literal_types() {
        assert_eq!(
            build_literal(&Value::UInt32(0x8000_0000)).data_type(),
            DataType::primitive(PrimitiveKind::UInt32)
        );
        assert_eq!(build_literal(&Value::from("s")).data_type(), DataType::string());
        assert_eq!(build_literal(&Value::Null).data_type(), DataType::object());
    }
}
