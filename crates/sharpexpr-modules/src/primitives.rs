//! Members of the scalar types: limits, parsing and classification.

use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;
use sharpexpr_core::{
    DataType, MemberEntry, MethodEntry, NativeFn, Param, PrimitiveKind, RegistrationError,
    RuntimeError, Value, arg,
};
use sharpexpr_registry::TypeRegistry;

/// Parse with invariant rules; surrounding whitespace is allowed.
pub fn parse<T>(s: &str) -> Result<Value, RuntimeError>
where
    T: FromStr + Into<Value>,
{
    s.trim()
        .parse::<T>()
        .map(Into::into)
        .map_err(|_| RuntimeError::Format {
            message: format!("The input string '{s}' was not in a correct format."),
        })
}

fn parse_method<T>(kind: PrimitiveKind) -> MethodEntry
where
    T: FromStr + Into<Value> + 'static,
{
    MethodEntry::static_fn(
        "Parse",
        vec![Param::new("s", DataType::string())],
        DataType::primitive(kind),
        NativeFn::new(|_, args| {
            let s: Arc<str> = arg(args, 0)?;
            parse::<T>(&s)
        }),
    )
}

fn compare_to<T>(kind: PrimitiveKind) -> MethodEntry
where
    T: sharpexpr_core::FromValue + PartialOrd + 'static,
{
    MethodEntry::instance(
        "CompareTo",
        vec![Param::new("value", DataType::primitive(kind))],
        DataType::int32(),
        NativeFn::method1(|a: T, b: T| match a.partial_cmp(&b) {
            Some(std::cmp::Ordering::Less) => -1,
            Some(std::cmp::Ordering::Greater) => 1,
            _ => 0,
        }),
    )
}

macro_rules! numeric_members {
    ($registry:expr; $($kind:ident => $ty:ty),* $(,)?) => {$(
        let entry = $registry.get_mut(PrimitiveKind::$kind.type_hash())?;
        entry.add_member(MemberEntry::constant("MinValue", Value::from(<$ty>::MIN)));
        entry.add_member(MemberEntry::constant("MaxValue", Value::from(<$ty>::MAX)));
        entry.add_method(parse_method::<$ty>(PrimitiveKind::$kind));
        entry.add_method(compare_to::<$ty>(PrimitiveKind::$kind));
    )*};
}

pub fn install(registry: &mut TypeRegistry) -> Result<(), RegistrationError> {
    numeric_members!(registry;
        Int8 => i8,
        UInt8 => u8,
        Int16 => i16,
        UInt16 => u16,
        Int32 => i32,
        UInt32 => u32,
        Int64 => i64,
        UInt64 => u64,
        Float => f32,
        Double => f64,
        Decimal => Decimal,
    );

    install_floating(registry)?;
    install_decimal(registry)?;
    install_bool(registry)?;
    install_char(registry)?;
    Ok(())
}

fn install_floating(registry: &mut TypeRegistry) -> Result<(), RegistrationError> {
    let double = registry.get_mut(PrimitiveKind::Double.type_hash())?;
    double.add_member(MemberEntry::constant("Epsilon", Value::Double(f64::from_bits(1))));
    double.add_member(MemberEntry::constant("NaN", Value::Double(f64::NAN)));
    double.add_member(MemberEntry::constant("PositiveInfinity", Value::Double(f64::INFINITY)));
    double.add_member(MemberEntry::constant("NegativeInfinity", Value::Double(f64::NEG_INFINITY)));
    let unary = |name: &str, f: fn(f64) -> bool| {
        MethodEntry::static_fn(
            name,
            vec![Param::new("d", DataType::primitive(PrimitiveKind::Double))],
            DataType::bool(),
            NativeFn::from_fn1(f),
        )
    };
    double.add_method(unary("IsNaN", f64::is_nan));
    double.add_method(unary("IsInfinity", f64::is_infinite));
    double.add_method(unary("IsFinite", f64::is_finite));

    let float = registry.get_mut(PrimitiveKind::Float.type_hash())?;
    float.add_member(MemberEntry::constant("Epsilon", Value::Float(f32::from_bits(1))));
    float.add_member(MemberEntry::constant("NaN", Value::Float(f32::NAN)));
    float.add_member(MemberEntry::constant("PositiveInfinity", Value::Float(f32::INFINITY)));
    float.add_member(MemberEntry::constant("NegativeInfinity", Value::Float(f32::NEG_INFINITY)));
    float.add_method(MethodEntry::static_fn(
        "IsNaN",
        vec![Param::new("f", DataType::primitive(PrimitiveKind::Float))],
        DataType::bool(),
        NativeFn::from_fn1(f32::is_nan),
    ));
    Ok(())
}

fn install_decimal(registry: &mut TypeRegistry) -> Result<(), RegistrationError> {
    let decimal = registry.get_mut(PrimitiveKind::Decimal.type_hash())?;
    decimal.add_member(MemberEntry::constant("Zero", Value::Decimal(Decimal::ZERO)));
    decimal.add_member(MemberEntry::constant("One", Value::Decimal(Decimal::ONE)));
    decimal.add_member(MemberEntry::constant("MinusOne", Value::Decimal(Decimal::NEGATIVE_ONE)));
    Ok(())
}

fn install_bool(registry: &mut TypeRegistry) -> Result<(), RegistrationError> {
    let boolean = registry.get_mut(PrimitiveKind::Bool.type_hash())?;
    boolean.add_member(MemberEntry::constant("TrueString", Value::from("True")));
    boolean.add_member(MemberEntry::constant("FalseString", Value::from("False")));
    boolean.add_method(MethodEntry::static_fn(
        "Parse",
        vec![Param::new("value", DataType::string())],
        DataType::bool(),
        NativeFn::new(|_, args| {
            let s: Arc<str> = arg(args, 0)?;
            match s.trim() {
                t if t.eq_ignore_ascii_case("true") => Ok(Value::Bool(true)),
                t if t.eq_ignore_ascii_case("false") => Ok(Value::Bool(false)),
                _ => Err(RuntimeError::Format {
                    message: format!("String '{s}' was not recognized as a valid Boolean."),
                }),
            }
        }),
    ));
    Ok(())
}

fn install_char(registry: &mut TypeRegistry) -> Result<(), RegistrationError> {
    let char_type = DataType::primitive(PrimitiveKind::Char);
    let entry = registry.get_mut(PrimitiveKind::Char.type_hash())?;
    entry.add_member(MemberEntry::constant("MinValue", Value::Char('\0')));
    entry.add_member(MemberEntry::constant("MaxValue", Value::Char('\u{FFFF}')));

    let predicates: [(&str, fn(char) -> bool); 7] = [
        ("IsDigit", |c| c.is_ascii_digit()),
        ("IsLetter", char::is_alphabetic),
        ("IsLetterOrDigit", char::is_alphanumeric),
        ("IsWhiteSpace", char::is_whitespace),
        ("IsUpper", char::is_uppercase),
        ("IsLower", char::is_lowercase),
        ("IsPunctuation", |c| c.is_ascii_punctuation()),
    ];
    for (name, predicate) in predicates {
        entry.add_method(MethodEntry::static_fn(
            name,
            vec![Param::new("c", char_type)],
            DataType::bool(),
            NativeFn::from_fn1(predicate),
        ));
    }
    entry.add_method(MethodEntry::static_fn(
        "ToUpper",
        vec![Param::new("c", char_type)],
        char_type,
        NativeFn::from_fn1(|c: char| c.to_uppercase().next().unwrap_or(c)),
    ));
    entry.add_method(MethodEntry::static_fn(
        "ToLower",
        vec![Param::new("c", char_type)],
        char_type,
        NativeFn::from_fn1(|c: char| c.to_lowercase().next().unwrap_or(c)),
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_and_reports_format_errors() {
        assert_eq!(parse::<i32>(" 42 ").unwrap(), Value::Int32(42));
        let err = parse::<i32>("4x2").unwrap_err();
        assert!(err.to_string().contains("'4x2'"));
    }

    #[test]
    fn limits_are_registered() {
        let registry = crate::standard_registry().unwrap();
        let max = registry.find_members(&DataType::int32(), "MaxValue", true);
        assert_eq!(max.len(), 1);
        assert_eq!(max[0].getter.call(None, &[]).unwrap(), Value::Int32(i32::MAX));
        let is_digit = registry.find_methods(&DataType::primitive(PrimitiveKind::Char), "isdigit", true);
        assert_eq!(
            is_digit[0].native.call(None, &[Value::Char('7')]).unwrap(),
            Value::Bool(true)
        );
    }
}
