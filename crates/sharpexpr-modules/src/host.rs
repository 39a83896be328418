//! Plumbing shared by the library structs (`TimeSpan`, `DateTime`, `Guid`).

use std::cmp::Ordering;

use sharpexpr_core::{DataType, FromValue, MethodEntry, NativeFn, Param, TypeEntry, Value};

/// Carry a Rust struct as a value object of the given library type.
macro_rules! host_value {
    ($ty:ty, $name:literal, $hash:expr) => {
        impl From<$ty> for sharpexpr_core::Value {
            fn from(v: $ty) -> Self {
                sharpexpr_core::Value::Object(sharpexpr_core::ObjectRef::value($hash, v))
            }
        }

        impl sharpexpr_core::FromValue for $ty {
            const EXPECTED: &'static str = $name;

            fn from_value(value: &sharpexpr_core::Value) -> Option<Self> {
                value
                    .as_object()
                    .and_then(|object| object.downcast_ref::<$ty>())
                    .cloned()
            }
        }
    };
}

pub(crate) use host_value;

/// Bits of an enum argument; `0` when absent.
pub(crate) fn flags(value: &Value) -> i64 {
    match value {
        Value::Enum { bits, .. } => *bits,
        _ => 0,
    }
}

const EQUALITY: [(&str, fn(Ordering) -> bool); 2] = [
    ("op_Equality", Ordering::is_eq),
    ("op_Inequality", Ordering::is_ne),
];

const ORDERING: [(&str, fn(Ordering) -> bool); 4] = [
    ("op_LessThan", Ordering::is_lt),
    ("op_LessThanOrEqual", Ordering::is_le),
    ("op_GreaterThan", Ordering::is_gt),
    ("op_GreaterThanOrEqual", Ordering::is_ge),
];

/// Register `==`/`!=`, plus `<`, `<=`, `>`, `>=` when `ordered`.
pub(crate) fn relational<T>(entry: &mut TypeEntry, ordered: bool)
where
    T: FromValue + PartialOrd + 'static,
{
    let ty = entry.data_type();
    let extra: &[(&str, fn(Ordering) -> bool)] = if ordered { &ORDERING } else { &[] };
    for &(name, test) in EQUALITY.iter().chain(extra) {
        entry.add_method(MethodEntry::static_fn(
            name,
            vec![Param::new("left", ty), Param::new("right", ty)],
            DataType::bool(),
            NativeFn::from_fn2(move |a: T, b: T| a.partial_cmp(&b).is_some_and(test)),
        ));
    }
}
