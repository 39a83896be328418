//! `Math` and `MathF`: constants and numeric functions.
//!
//! Overload sets mirror the host language closely enough that overload
//! resolution picks the same member it would there (`Math.Max(1.0, 15)` binds
//! the `double` overload).

use rust_decimal::Decimal;
use sharpexpr_core::{
    DataType, MemberEntry, MethodEntry, NativeFn, Param, PrimitiveKind, RegistrationError,
    RuntimeError, TypeEntry, Value, arg,
};
use sharpexpr_registry::TypeRegistry;

use PrimitiveKind as K;

// =============================================================================
// HELPERS
// =============================================================================

fn ty(kind: PrimitiveKind) -> DataType {
    DataType::primitive(kind)
}

fn unary(name: &str, kind: PrimitiveKind, ret: PrimitiveKind, native: NativeFn) -> MethodEntry {
    MethodEntry::static_fn(name, vec![Param::new("x", ty(kind))], ty(ret), native)
}

fn binary(name: &str, kind: PrimitiveKind, native: NativeFn) -> MethodEntry {
    MethodEntry::static_fn(
        name,
        vec![Param::new("val1", ty(kind)), Param::new("val2", ty(kind))],
        ty(kind),
        native,
    )
}

/// NaN-propagating max/min.
fn fmax(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() { f64::NAN } else { a.max(b) }
}

fn fmin(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() { f64::NAN } else { a.min(b) }
}

/// Round half to even at `digits` decimal places.
pub fn round_to(value: f64, digits: i32) -> f64 {
    if digits == 0 {
        return value.round_ties_even();
    }
    let scale = 10_f64.powi(digits);
    (value * scale).round_ties_even() / scale
}

fn overflow_if_none<T: Into<Value>>(value: Option<T>) -> Result<Value, RuntimeError> {
    value.map(Into::into).ok_or(RuntimeError::Overflow)
}

fn sign<T: PartialOrd + Default>(value: T) -> i32 {
    let zero = T::default();
    if value > zero {
        1
    } else if value < zero {
        -1
    } else {
        0
    }
}

macro_rules! max_min {
    ($entry:expr; $($kind:ident => $ty:ty),* $(,)?) => {$(
        $entry.add_method(binary(
            "Max",
            PrimitiveKind::$kind,
            NativeFn::from_fn2(|a: $ty, b: $ty| if a >= b { a } else { b }),
        ));
        $entry.add_method(binary(
            "Min",
            PrimitiveKind::$kind,
            NativeFn::from_fn2(|a: $ty, b: $ty| if a <= b { a } else { b }),
        ));
    )*};
}

macro_rules! checked_abs {
    ($entry:expr; $($kind:ident => $ty:ty),* $(,)?) => {$(
        $entry.add_method(unary(
            "Abs",
            PrimitiveKind::$kind,
            PrimitiveKind::$kind,
            NativeFn::new(|_, args| {
                let x: $ty = arg(args, 0)?;
                overflow_if_none(x.checked_abs())
            }),
        ));
    )*};
}

// =============================================================================
// MATH
// =============================================================================

pub fn math() -> TypeEntry {
    let mut entry = TypeEntry::static_class("System", "Math");
    entry.add_member(MemberEntry::constant("PI", Value::Double(std::f64::consts::PI)));
    entry.add_member(MemberEntry::constant("E", Value::Double(std::f64::consts::E)));
    entry.add_member(MemberEntry::constant("Tau", Value::Double(std::f64::consts::TAU)));

    checked_abs!(entry; Int8 => i8, Int16 => i16, Int32 => i32, Int64 => i64);
    entry.add_method(unary("Abs", K::Float, K::Float, NativeFn::from_fn1(f32::abs)));
    entry.add_method(unary("Abs", K::Double, K::Double, NativeFn::from_fn1(f64::abs)));
    entry.add_method(unary("Abs", K::Decimal, K::Decimal, NativeFn::from_fn1(|d: Decimal| d.abs())));

    max_min!(entry;
        UInt8 => u8,
        Int8 => i8,
        Int16 => i16,
        UInt16 => u16,
        Int32 => i32,
        UInt32 => u32,
        Int64 => i64,
        UInt64 => u64,
        Decimal => Decimal,
    );
    entry.add_method(binary("Max", K::Float, NativeFn::from_fn2(|a: f32, b: f32| fmax(a.into(), b.into()) as f32)));
    entry.add_method(binary("Min", K::Float, NativeFn::from_fn2(|a: f32, b: f32| fmin(a.into(), b.into()) as f32)));
    entry.add_method(binary("Max", K::Double, NativeFn::from_fn2(fmax)));
    entry.add_method(binary("Min", K::Double, NativeFn::from_fn2(fmin)));

    entry.add_method(unary("Sign", K::Int32, K::Int32, NativeFn::from_fn1(sign::<i32>)));
    entry.add_method(unary("Sign", K::Int64, K::Int32, NativeFn::from_fn1(sign::<i64>)));
    entry.add_method(unary("Sign", K::Decimal, K::Int32, NativeFn::from_fn1(sign::<Decimal>)));
    entry.add_method(unary(
        "Sign",
        K::Double,
        K::Int32,
        NativeFn::new(|_, args| {
            let x: f64 = arg(args, 0)?;
            if x.is_nan() {
                return Err(RuntimeError::Format {
                    message: "Function does not accept floating point Not-a-Number values.".into(),
                });
            }
            Ok(Value::Int32(sign(x)))
        }),
    ));

    let double_fns: [(&str, fn(f64) -> f64); 13] = [
        ("Sqrt", f64::sqrt),
        ("Exp", f64::exp),
        ("Log", f64::ln),
        ("Log10", f64::log10),
        ("Log2", f64::log2),
        ("Sin", f64::sin),
        ("Cos", f64::cos),
        ("Tan", f64::tan),
        ("Atan", f64::atan),
        ("Floor", f64::floor),
        ("Ceiling", f64::ceil),
        ("Truncate", f64::trunc),
        ("Round", f64::round_ties_even),
    ];
    for (name, f) in double_fns {
        entry.add_method(unary(name, K::Double, K::Double, NativeFn::from_fn1(f)));
    }
    entry.add_method(binary("Pow", K::Double, NativeFn::from_fn2(f64::powf)));
    entry.add_method(binary("Atan2", K::Double, NativeFn::from_fn2(f64::atan2)));
    entry.add_method(binary("Log", K::Double, NativeFn::from_fn2(|a: f64, b: f64| a.log(b))));
    entry.add_method(MethodEntry::static_fn(
        "Round",
        vec![Param::new("value", ty(K::Double)), Param::new("digits", ty(K::Int32))],
        ty(K::Double),
        NativeFn::from_fn2(round_to),
    ));

    let decimal_fns: [(&str, fn(Decimal) -> Decimal); 4] = [
        ("Floor", |d| d.floor()),
        ("Ceiling", |d| d.ceil()),
        ("Truncate", |d| d.trunc()),
        ("Round", |d| d.round()),
    ];
    for (name, f) in decimal_fns {
        entry.add_method(unary(name, K::Decimal, K::Decimal, NativeFn::from_fn1(f)));
    }

    entry.add_method(MethodEntry::static_fn(
        "Clamp",
        vec![
            Param::new("value", ty(K::Int32)),
            Param::new("min", ty(K::Int32)),
            Param::new("max", ty(K::Int32)),
        ],
        ty(K::Int32),
        NativeFn::from_fn3(|v: i32, lo: i32, hi: i32| v.max(lo).min(hi)),
    ));
    entry.add_method(MethodEntry::static_fn(
        "Clamp",
        vec![
            Param::new("value", ty(K::Double)),
            Param::new("min", ty(K::Double)),
            Param::new("max", ty(K::Double)),
        ],
        ty(K::Double),
        NativeFn::from_fn3(|v: f64, lo: f64, hi: f64| fmin(fmax(v, lo), hi)),
    ));
    entry
}

// =============================================================================
// MATHF
// =============================================================================

pub fn mathf() -> TypeEntry {
    let mut entry = TypeEntry::static_class("System", "MathF");
    entry.add_member(MemberEntry::constant("PI", Value::Float(std::f32::consts::PI)));
    entry.add_member(MemberEntry::constant("E", Value::Float(std::f32::consts::E)));

    let float_fns: [(&str, fn(f32) -> f32); 6] = [
        ("Abs", f32::abs),
        ("Sqrt", f32::sqrt),
        ("Floor", f32::floor),
        ("Ceiling", f32::ceil),
        ("Round", f32::round_ties_even),
        ("Truncate", f32::trunc),
    ];
    for (name, f) in float_fns {
        entry.add_method(unary(name, K::Float, K::Float, NativeFn::from_fn1(f)));
    }
    entry.add_method(binary("Max", K::Float, NativeFn::from_fn2(|a: f32, b: f32| fmax(a.into(), b.into()) as f32)));
    entry.add_method(binary("Min", K::Float, NativeFn::from_fn2(|a: f32, b: f32| fmin(a.into(), b.into()) as f32)));
    entry.add_method(binary("Pow", K::Float, NativeFn::from_fn2(f32::powf)));
    entry
}

pub fn install(registry: &mut TypeRegistry) -> Result<(), RegistrationError> {
    registry.register(math())?;
    registry.register(mathf())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sharpexpr_core::library;

    #[test]
    fn entries_use_library_hashes() {
        assert_eq!(math().type_hash, library::MATH);
        assert_eq!(mathf().type_hash, library::MATHF);
    }

    #[test]
    fn rounding_is_half_to_even() {
        assert_eq!(round_to(2.5, 0), 2.0);
        assert_eq!(round_to(3.5, 0), 4.0);
        assert_eq!(round_to(1.2345, 2), 1.23);
    }

    #[test]
    fn abs_of_min_value_overflows() {
        let entry = math();
        let abs = entry
            .methods
            .iter()
            .find(|m| m.name == "Abs" && m.params[0].data_type == DataType::int32())
            .unwrap();
        assert!(matches!(
            abs.native.call(None, &[Value::Int32(i32::MIN)]),
            Err(RuntimeError::Overflow)
        ));
        assert_eq!(abs.native.call(None, &[Value::Int32(-4)]).unwrap(), Value::Int32(4));
    }

    #[test]
    fn max_propagates_nan() {
        assert!(fmax(f64::NAN, 1.0).is_nan());
        assert_eq!(fmax(1.0, 15.0), 15.0);
    }
}
