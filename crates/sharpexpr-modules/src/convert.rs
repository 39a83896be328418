//! `Convert`: runtime conversions from `object`.
//!
//! Every method takes an `object`, so any argument binds through boxing and
//! the work happens on the runtime value. Floating inputs round half to even
//! before an integral conversion; out-of-range results fail with
//! [`RuntimeError::Overflow`].

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use sharpexpr_core::{
    DataType, MethodEntry, NativeFn, Param, PrimitiveKind, RegistrationError, RuntimeError,
    TypeEntry, Value, arg, eq_ignore_case,
};
use sharpexpr_registry::TypeRegistry;

fn format_error(s: &str) -> RuntimeError {
    RuntimeError::Format {
        message: format!("The input string '{s}' was not in a correct format."),
    }
}

fn invalid_cast(value: &Value, to: &str) -> RuntimeError {
    RuntimeError::InvalidCast {
        from: value.kind_name().to_string(),
        to: to.to_string(),
    }
}

/// Integral view of `value` for `To{Int32,Int64}`, before range checking.
fn integral(value: &Value, to: &str) -> Result<i128, RuntimeError> {
    if let Some(v) = value.as_integer() {
        return Ok(v);
    }
    match value {
        Value::Null => Ok(0),
        Value::Bool(b) => Ok(i128::from(*b)),
        Value::Float(f) => from_float(f64::from(*f)),
        Value::Double(f) => from_float(*f),
        Value::Decimal(d) => d.round().to_i128().ok_or(RuntimeError::Overflow),
        Value::String(s) => s.trim().parse::<i128>().map_err(|_| format_error(s)),
        other => Err(invalid_cast(other, to)),
    }
}

fn from_float(f: f64) -> Result<i128, RuntimeError> {
    let rounded = f.round_ties_even();
    if rounded.is_finite() && rounded.abs() < 1e38 {
        Ok(rounded as i128)
    } else {
        Err(RuntimeError::Overflow)
    }
}

fn to_int32(value: &Value) -> Result<i32, RuntimeError> {
    i32::try_from(integral(value, "Int32")?).map_err(|_| RuntimeError::Overflow)
}

fn to_int64(value: &Value) -> Result<i64, RuntimeError> {
    i64::try_from(integral(value, "Int64")?).map_err(|_| RuntimeError::Overflow)
}

pub fn to_double(value: &Value) -> Result<f64, RuntimeError> {
    if let Some(v) = value.as_integer() {
        return Ok(v as f64);
    }
    match value {
        Value::Null => Ok(0.0),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::Float(f) => Ok(f64::from(*f)),
        Value::Double(f) => Ok(*f),
        Value::Decimal(d) => d.to_f64().ok_or(RuntimeError::Overflow),
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| format_error(s)),
        other => Err(invalid_cast(other, "Double")),
    }
}

fn to_decimal(value: &Value) -> Result<Decimal, RuntimeError> {
    if let Some(v) = value.as_integer() {
        return Decimal::try_from_i128_with_scale(v, 0).map_err(|_| RuntimeError::Overflow);
    }
    match value {
        Value::Null => Ok(Decimal::ZERO),
        Value::Bool(b) => Ok(if *b { Decimal::ONE } else { Decimal::ZERO }),
        Value::Float(f) => Decimal::from_f32(*f).ok_or(RuntimeError::Overflow),
        Value::Double(f) => Decimal::from_f64(*f).ok_or(RuntimeError::Overflow),
        Value::Decimal(d) => Ok(*d),
        Value::String(s) => Decimal::from_str(s.trim()).map_err(|_| format_error(s)),
        other => Err(invalid_cast(other, "Decimal")),
    }
}

fn to_boolean(value: &Value) -> Result<bool, RuntimeError> {
    if let Some(v) = value.as_integer() {
        return Ok(v != 0);
    }
    match value {
        Value::Null => Ok(false),
        Value::Bool(b) => Ok(*b),
        Value::Float(f) => Ok(*f != 0.0),
        Value::Double(f) => Ok(*f != 0.0),
        Value::Decimal(d) => Ok(!d.is_zero()),
        Value::String(s) => match s.trim() {
            t if eq_ignore_case(t, "true") => Ok(true),
            t if eq_ignore_case(t, "false") => Ok(false),
            _ => Err(RuntimeError::Format {
                message: format!("String '{s}' was not recognized as a valid Boolean."),
            }),
        },
        other => Err(invalid_cast(other, "Boolean")),
    }
}

fn to_char(value: &Value) -> Result<char, RuntimeError> {
    match value {
        Value::Null => Ok('\0'),
        Value::Char(c) => Ok(*c),
        Value::String(s) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(c),
                _ => Err(RuntimeError::Format {
                    message: "String must be exactly one character long.".into(),
                }),
            }
        }
        other => match other.as_integer() {
            Some(v) if other.primitive_kind().is_some_and(PrimitiveKind::is_integer) => {
                u16::try_from(v)
                    .ok()
                    .and_then(|u| char::from_u32(u32::from(u)))
                    .ok_or(RuntimeError::Overflow)
            }
            _ => Err(invalid_cast(other, "Char")),
        },
    }
}

fn converter<R, F>(name: &str, ret: DataType, f: F) -> MethodEntry
where
    R: Into<Value>,
    F: Fn(&Value) -> Result<R, RuntimeError> + Send + Sync + 'static,
{
    MethodEntry::static_fn(
        name,
        vec![Param::new("value", DataType::object())],
        ret,
        NativeFn::new(move |_, args| {
            let value: Value = arg(args, 0)?;
            f(&value).map(Into::into)
        }),
    )
}

pub fn convert() -> TypeEntry {
    TypeEntry::static_class("System", "Convert")
        .with_method(converter("ToInt32", DataType::int32(), to_int32))
        .with_method(converter("ToInt64", PrimitiveKind::Int64.into(), to_int64))
        .with_method(converter("ToDouble", PrimitiveKind::Double.into(), to_double))
        .with_method(converter("ToDecimal", PrimitiveKind::Decimal.into(), to_decimal))
        .with_method(converter("ToBoolean", DataType::bool(), to_boolean))
        .with_method(converter("ToChar", PrimitiveKind::Char.into(), to_char))
        .with_method(converter("ToString", DataType::string(), |v: &Value| {
            Ok::<_, RuntimeError>(Value::string(v.to_string()))
        }))
}

pub fn install(registry: &mut TypeRegistry) -> Result<(), RegistrationError> {
    registry.register(convert())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_conversions_round_half_to_even() {
        assert_eq!(to_int32(&Value::Double(2.5)).unwrap(), 2);
        assert_eq!(to_int32(&Value::Double(3.5)).unwrap(), 4);
        assert_eq!(to_int32(&Value::from("  42 ")).unwrap(), 42);
        assert_eq!(to_int32(&Value::Bool(true)).unwrap(), 1);
        assert_eq!(to_int32(&Value::Null).unwrap(), 0);
    }

    #[test]
    fn out_of_range_overflows() {
        assert!(matches!(
            to_int32(&Value::Int64(i64::MAX)),
            Err(RuntimeError::Overflow)
        ));
        assert!(matches!(
            to_int64(&Value::Double(f64::NAN)),
            Err(RuntimeError::Overflow)
        ));
    }

    #[test]
    fn bad_strings_are_format_errors() {
        assert!(matches!(
            to_int32(&Value::from("abc")),
            Err(RuntimeError::Format { .. })
        ));
        assert!(to_boolean(&Value::from("TRUE")).unwrap());
    }

    #[test]
    fn char_conversions() {
        assert_eq!(to_char(&Value::Int32(65)).unwrap(), 'A');
        assert_eq!(to_char(&Value::from("z")).unwrap(), 'z');
        assert!(to_char(&Value::Bool(true)).is_err());
    }

    #[test]
    fn decimal_from_double() {
        assert_eq!(
            to_decimal(&Value::Double(1.5)).unwrap(),
            Decimal::new(15, 1)
        );
        assert_eq!(to_double(&Value::Decimal(Decimal::new(25, 1))).unwrap(), 2.5);
    }
}
