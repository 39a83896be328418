//! Runtime conversions for [`TypedExpr::Convert`](sharpexpr_compiler::TypedExpr) nodes.
//!
//! Numeric conversions are unchecked (wrapping), except that conversions out
//! of `decimal` and from floating types into `decimal` raise
//! [`RuntimeError::Overflow`] like the checked .NET conversions they mirror.

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};

use sharpexpr_core::{DataType, PrimitiveKind, RuntimeError, Value};
use sharpexpr_registry::TypeRegistry;

/// Convert `value`, statically typed `source`, to `target`.
pub fn convert_value(
    registry: &TypeRegistry,
    value: Value,
    source: &DataType,
    target: &DataType,
) -> Result<Value, RuntimeError> {
    if value.is_null() {
        return if registry.accepts_null(target) {
            Ok(Value::Null)
        } else if source.nullable {
            Err(RuntimeError::NullableWithoutValue)
        } else {
            Err(RuntimeError::NullReference)
        };
    }

    let target = target.underlying();
    if registry.is_reference_type(&target) {
        return reference_cast(registry, value, &target);
    }

    // Unboxing needs the exact runtime type.
    let boxed = registry.is_reference_type(source);
    if boxed && value.data_type() != target {
        return Err(invalid_cast(registry, &value, &target));
    }

    if let Some(underlying) = registry.enum_underlying(&target) {
        let bits = match to_kind(&value, underlying)?.as_integer() {
            Some(bits) => bits as i64,
            None => return Err(invalid_cast(registry, &value, &target)),
        };
        return Ok(Value::Enum {
            type_hash: target.type_hash,
            bits,
        });
    }

    match target.primitive_kind() {
        Some(kind) => to_kind(&value, kind).map_err(|err| match err {
            RuntimeError::InvalidCast { .. } => invalid_cast(registry, &value, &target),
            other => other,
        }),
        None if value.data_type() == target => Ok(value),
        None => Err(invalid_cast(registry, &value, &target)),
    }
}

/// Reference conversions leave the value untouched once the runtime type checks out.
fn reference_cast(registry: &TypeRegistry, value: Value, target: &DataType) -> Result<Value, RuntimeError> {
    if registry.is_assignable_from(target, &value.data_type()) {
        Ok(value)
    } else {
        Err(invalid_cast(registry, &value, target))
    }
}

fn invalid_cast(registry: &TypeRegistry, value: &Value, target: &DataType) -> RuntimeError {
    RuntimeError::InvalidCast {
        from: registry.qualified_type_name(&value.data_type()),
        to: registry.qualified_type_name(target),
    }
}

/// Numeric conversion between scalar kinds. Enums convert through their bits.
pub fn to_kind(value: &Value, kind: PrimitiveKind) -> Result<Value, RuntimeError> {
    if value.primitive_kind() == Some(kind) {
        return Ok(value.clone());
    }
    if let Some(i) = value.as_integer() {
        return from_integer(i, kind);
    }
    match value {
        Value::Float(f) => from_float(f64::from(*f), kind),
        Value::Double(f) => from_float(*f, kind),
        Value::Decimal(d) => from_decimal(*d, kind),
        other => Err(RuntimeError::InvalidCast {
            from: other.kind_name().to_string(),
            to: kind.name().to_string(),
        }),
    }
}

/// Truncate `i` to `kind`, wrapping like an unchecked cast.
pub fn wrap_integer(i: i128, kind: PrimitiveKind) -> Option<Value> {
    Some(match kind {
        PrimitiveKind::Int8 => Value::Int8(i as i8),
        PrimitiveKind::UInt8 => Value::UInt8(i as u8),
        PrimitiveKind::Int16 => Value::Int16(i as i16),
        PrimitiveKind::UInt16 => Value::UInt16(i as u16),
        PrimitiveKind::Int32 => Value::Int32(i as i32),
        PrimitiveKind::UInt32 => Value::UInt32(i as u32),
        PrimitiveKind::Int64 => Value::Int64(i as i64),
        PrimitiveKind::UInt64 => Value::UInt64(i as u64),
        PrimitiveKind::Char => Value::Char(char::from_u32(u32::from(i as u16)).unwrap_or('\u{FFFD}')),
        _ => return None,
    })
}

fn from_integer(i: i128, kind: PrimitiveKind) -> Result<Value, RuntimeError> {
    if let Some(value) = wrap_integer(i, kind) {
        return Ok(value);
    }
    Ok(match kind {
        PrimitiveKind::Float => Value::Float(i as f32),
        PrimitiveKind::Double => Value::Double(i as f64),
        PrimitiveKind::Decimal => {
            Value::Decimal(Decimal::from_i128(i).ok_or(RuntimeError::Overflow)?)
        }
        other => {
            return Err(RuntimeError::InvalidCast {
                from: "Int64".to_string(),
                to: other.name().to_string(),
            });
        }
    })
}

fn from_float(f: f64, kind: PrimitiveKind) -> Result<Value, RuntimeError> {
    Ok(match kind {
        PrimitiveKind::Float => Value::Float(f as f32),
        PrimitiveKind::Double => Value::Double(f),
        PrimitiveKind::Decimal => Value::Decimal(Decimal::from_f64(f).ok_or(RuntimeError::Overflow)?),
        PrimitiveKind::UInt64 => Value::UInt64(f as u64),
        PrimitiveKind::Bool => {
            return Err(RuntimeError::InvalidCast {
                from: "Double".to_string(),
                to: kind.name().to_string(),
            });
        }
        // Saturate to the widest signed type, then wrap to the target.
        other => from_integer(i128::from(f as i64), other)?,
    })
}

fn from_decimal(d: Decimal, kind: PrimitiveKind) -> Result<Value, RuntimeError> {
    match kind {
        PrimitiveKind::Float => d.to_f32().map(Value::Float).ok_or(RuntimeError::Overflow),
        PrimitiveKind::Double => d.to_f64().map(Value::Double).ok_or(RuntimeError::Overflow),
        PrimitiveKind::Bool => Err(RuntimeError::InvalidCast {
            from: "Decimal".to_string(),
            to: kind.name().to_string(),
        }),
        _ => {
            let i = d.trunc().to_i128().ok_or(RuntimeError::Overflow)?;
            let value = from_integer(i, kind)?;
            if value.as_integer() == Some(i) {
                Ok(value)
            } else {
                Err(RuntimeError::Overflow)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sharpexpr_core::{TypeEntry, primitives};

    fn registry() -> TypeRegistry {
        let mut registry = sharpexpr_modules::standard_registry().unwrap();
        registry
            .register(TypeEntry::enumeration("App", "Level", PrimitiveKind::Int32).with_enum_value("High", 3))
            .unwrap();
        registry
    }

    fn t(kind: PrimitiveKind) -> DataType {
        DataType::primitive(kind)
    }

    #[test]
    fn numeric_conversions_wrap() {
        assert_eq!(to_kind(&Value::Int32(300), PrimitiveKind::UInt8).unwrap(), Value::UInt8(44));
        assert_eq!(to_kind(&Value::Int32(-1), PrimitiveKind::UInt32).unwrap(), Value::UInt32(u32::MAX));
        assert_eq!(to_kind(&Value::Double(2.9), PrimitiveKind::Int32).unwrap(), Value::Int32(2));
        assert_eq!(to_kind(&Value::Double(-2.9), PrimitiveKind::Int64).unwrap(), Value::Int64(-2));
        assert_eq!(to_kind(&Value::Char('A'), PrimitiveKind::Int32).unwrap(), Value::Int32(65));
        assert_eq!(to_kind(&Value::Int32(97), PrimitiveKind::Char).unwrap(), Value::Char('a'));
        assert_eq!(
            to_kind(&Value::Int32(5), PrimitiveKind::Decimal).unwrap(),
            Value::Decimal(Decimal::from(5))
        );
    }

    #[test]
    fn decimal_conversions_are_checked() {
        let big = Value::Decimal(Decimal::from(1_000));
        assert!(matches!(to_kind(&big, PrimitiveKind::UInt8), Err(RuntimeError::Overflow)));
        let small = Value::Decimal(Decimal::new(1275, 1));
        assert_eq!(to_kind(&small, PrimitiveKind::Int32).unwrap(), Value::Int32(127));
        assert!(matches!(
            to_kind(&Value::Double(f64::NAN), PrimitiveKind::Decimal),
            Err(RuntimeError::Overflow)
        ));
    }

    #[test]
    fn enums_nullables_and_boxes() {
        let registry = registry();
        let object = DataType::object();
        let level_type = registry.iter().find(|e| e.name == "Level").unwrap().data_type();

        let high = convert_value(&registry, Value::Int32(3), &DataType::int32(), &level_type).unwrap();
        assert_eq!(
            high,
            Value::Enum {
                type_hash: level_type.type_hash,
                bits: 3
            }
        );
        let back = convert_value(&registry, high, &level_type, &DataType::int32()).unwrap();
        assert_eq!(back, Value::Int32(3));

        let maybe = DataType::nullable(primitives::INT32);
        assert_eq!(
            convert_value(&registry, Value::Null, &DataType::object(), &maybe).unwrap(),
            Value::Null
        );
        assert!(matches!(
            convert_value(&registry, Value::Null, &maybe, &DataType::int32()),
            Err(RuntimeError::NullableWithoutValue)
        ));

        let boxed = convert_value(&registry, Value::Int32(1), &DataType::int32(), &object).unwrap();
        assert_eq!(boxed, Value::Int32(1));
        assert_eq!(
            convert_value(&registry, boxed.clone(), &object, &DataType::int32()).unwrap(),
            Value::Int32(1)
        );
        let err = convert_value(&registry, boxed, &object, &t(PrimitiveKind::Int64)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unable to cast object of type 'System.Int32' to type 'System.Int64'."
        );
        let err = convert_value(&registry, Value::from("x"), &object, &t(PrimitiveKind::Int32)).unwrap_err();
        assert!(matches!(err, RuntimeError::InvalidCast { .. }));
    }
}
