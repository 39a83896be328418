//! Unary expressions and casts.

use sharpexpr_core::{BindError, DataType, PrimitiveKind, UnaryOp, Value};
use sharpexpr_syntax::{Expr, Identifier, UnaryType};

use super::{ExpressionBuilder, Result, convert_to, retype_null};
use crate::conversion::find_explicit_conversion;
use crate::operators::{OperatorResolution, resolve_unary};
use crate::typed::TypedExpr;

pub(super) fn build_unary(
    builder: &ExpressionBuilder<'_>,
    op: &Identifier,
    kind: UnaryType,
    operand: &Expr,
) -> Result<TypedExpr> {
    let operand = builder.build(operand)?;
    let op_kind = match kind {
        UnaryType::Convert => return cast(builder, op, operand),
        UnaryType::Negate => UnaryOp::Negate,
        UnaryType::Not => UnaryOp::Not,
        UnaryType::OnesComplement => UnaryOp::OnesComplement,
        UnaryType::UnaryPlus => UnaryOp::Plus,
    };

    let registry = builder.registry();
    let original_type = operand.data_type();
    let enum_kind = registry.enum_underlying(&original_type);
    let underlying = enum_kind.map_or(original_type, DataType::primitive);
    let mut operand = convert_to(operand, underlying);

    if op_kind == UnaryOp::Negate {
        // int.MinValue and long.MinValue arrive as unsigned literals.
        match &operand {
            TypedExpr::Constant {
                value: Value::UInt32(0x8000_0000),
                ..
            } => return Ok(TypedExpr::constant(Value::Int32(i32::MIN))),
            TypedExpr::Constant {
                value: Value::UInt64(0x8000_0000_0000_0000),
                ..
            } => return Ok(TypedExpr::constant(Value::Int64(i64::MIN))),
            _ => {}
        }
        if underlying.is_primitive(PrimitiveKind::UInt32) {
            operand = TypedExpr::convert(operand, DataType::primitive(PrimitiveKind::Int64));
        }
    }
    if matches!(
        underlying.primitive_kind(),
        Some(PrimitiveKind::Int8 | PrimitiveKind::UInt8 | PrimitiveKind::Int16 | PrimitiveKind::UInt16)
    ) {
        operand = TypedExpr::convert(operand, DataType::int32());
    }

    let operand_type = operand.data_type();
    let not_applicable = || BindError::UnsupportedUnaryOperator {
        op: op.to_string(),
        operand: builder.type_name(&operand_type),
    };
    let result = match resolve_unary(registry, op_kind, &operand_type)? {
        Some(OperatorResolution::Primitive { result_type }) => TypedExpr::Unary {
            op: op_kind,
            operand: Box::new(operand),
            data_type: result_type,
            method: None,
        },
        Some(OperatorResolution::Method { method }) => {
            let operand = builder
                .adapt_arguments(&method.params, vec![operand])?
                .pop()
                .ok_or_else(not_applicable)?;
            TypedExpr::Unary {
                op: op_kind,
                operand: Box::new(operand),
                data_type: method.return_type,
                method: Some(method),
            }
        }
        None => return Err(not_applicable()),
    };

    if enum_kind.is_some() && op_kind == UnaryOp::OnesComplement {
        return Ok(TypedExpr::convert(result, original_type));
    }
    Ok(result)
}

/// `(T)operand`; the operator token names the target type.
fn cast(builder: &ExpressionBuilder<'_>, type_name: &Identifier, operand: TypedExpr) -> Result<TypedExpr> {
    let registry = builder.registry();
    let target = builder
        .binder()
        .bind_type(type_name)
        .ok_or_else(|| BindError::unresolved(type_name.name()))?;
    let source = operand.data_type();

    if source == target || (registry.is_reference_type(&source) && registry.is_assignable_from(&target, &source)) {
        return Ok(operand);
    }
    if operand.is_null_constant() && registry.accepts_null(&target) {
        return Ok(retype_null(target));
    }
    match find_explicit_conversion(registry, &source, &target) {
        Some(conversion) => Ok(conversion.apply(operand, target)),
        None => Err(BindError::UnsupportedUnaryOperator {
            op: type_name.to_string(),
            operand: builder.type_name(&source),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use sharpexpr_core::TypeEntry;
    use sharpexpr_registry::TypeRegistry;

    use crate::binder::DefaultBinder;

    fn setup() -> (Arc<TypeRegistry>, DefaultBinder) {
        let mut registry = sharpexpr_modules::standard_registry().unwrap();
        let flags = TypeEntry::enumeration("App", "Flags", PrimitiveKind::UInt8).with_enum_value("One", 1);
        let flags = registry.register(flags).unwrap();
        let registry = Arc::new(registry);
        let mut binder = DefaultBinder::new(Arc::clone(&registry));
        binder.register_type(flags, false).unwrap();
        (registry, binder)
    }

    fn build(expr: Expr) -> std::result::Result<TypedExpr, BindError> {
        let (_, binder) = setup();
        ExpressionBuilder::new(&binder).build(&expr)
    }

    fn show(expr: Expr) -> String {
        let (registry, binder) = setup();
        let typed = ExpressionBuilder::new(&binder).build(&expr).unwrap();
        typed.display(&registry).to_string()
    }

    #[test]
    fn signed_minimums_fold() {
        let min32 = build(Expr::negate(Expr::literal(0x8000_0000u32))).unwrap();
        assert!(matches!(min32, TypedExpr::Constant { value: Value::Int32(i32::MIN), .. }));
        let min64 = build(Expr::negate(Expr::literal(0x8000_0000_0000_0000u64))).unwrap();
        assert!(matches!(min64, TypedExpr::Constant { value: Value::Int64(i64::MIN), .. }));
    }

    #[test]
    fn negation_widens() {
        assert_eq!(show(Expr::negate(Expr::literal(5u32))), "-Convert(5, Int64)");
        assert_eq!(show(Expr::negate(Expr::literal(5i16))), "-Convert(5, Int32)");
        assert_eq!(
            build(Expr::negate(Expr::literal(5u64))).unwrap_err().to_string(),
            "Operator '-' cannot be applied to operand of type 'System.UInt64'."
        );
        assert_eq!(
            build(Expr::negate(Expr::literal("x"))).unwrap_err().to_string(),
            "Operator '-' cannot be applied to operand of type 'System.String'."
        );
    }

    #[test]
    fn not_and_complement() {
        assert_eq!(show(Expr::not(Expr::literal(true))), "Not(True)");
        let flags = Expr::member(Expr::reference("Flags"), "One");
        assert_eq!(
            show(Expr::unary("~", UnaryType::OnesComplement, flags)),
            "Convert(~Convert(Convert(Flags.One, Byte), Int32), Flags)"
        );
    }

    #[test]
    fn casts() {
        assert_eq!(show(Expr::cast("long", Expr::literal(1))), "Convert(1, Int64)");
        assert_eq!(show(Expr::cast("object", Expr::literal("s"))), r#""s""#);
        assert_eq!(show(Expr::cast("int", Expr::literal(1))), "1");

        let typed = build(Expr::cast("string", Expr::null())).unwrap();
        assert_eq!(typed.data_type(), DataType::string());

        assert_eq!(
            build(Expr::cast("int", Expr::literal("1"))).unwrap_err().to_string(),
            "Operator 'int' cannot be applied to operand of type 'System.String'."
        );
        assert_eq!(
            build(Expr::cast("Nope", Expr::literal(1))).unwrap_err(),
            BindError::unresolved("Nope")
        );
    }
}
