//! `System.Object` members inherited by every type.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use sharpexpr_core::{
    DataType, MethodEntry, NativeFn, Param, RegistrationError, Value, arg, primitives,
};
use sharpexpr_registry::TypeRegistry;

/// Identity for reference values, `null == null`, never for boxed scalars.
pub fn reference_equals(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::String(x), Value::String(y)) => Arc::ptr_eq(x, y),
        (Value::Object(x), Value::Object(y)) => x.ptr_eq(y),
        (Value::Array(_), Value::Array(_)) | (Value::Delegate(_), Value::Delegate(_)) => a == b,
        _ => false,
    }
}

fn hash_code(value: &Value) -> i32 {
    let mut hasher = DefaultHasher::new();
    value.to_string().hash(&mut hasher);
    hasher.finish() as i32
}

pub fn install(registry: &mut TypeRegistry) -> Result<(), RegistrationError> {
    let object = registry.get_mut(primitives::OBJECT)?;
    object.add_method(MethodEntry::instance(
        "ToString",
        vec![],
        DataType::string(),
        NativeFn::method0(|this: Value| this.to_string()),
    ));
    object.add_method(MethodEntry::instance(
        "Equals",
        vec![Param::new("obj", DataType::object())],
        DataType::bool(),
        NativeFn::method1(|this: Value, other: Value| this == other),
    ));
    object.add_method(MethodEntry::instance(
        "GetHashCode",
        vec![],
        DataType::int32(),
        NativeFn::method0(|this: Value| hash_code(&this)),
    ));
    object.add_method(MethodEntry::static_fn(
        "Equals",
        vec![
            Param::new("objA", DataType::object()),
            Param::new("objB", DataType::object()),
        ],
        DataType::bool(),
        NativeFn::from_fn2(|a: Value, b: Value| a == b),
    ));
    object.add_method(MethodEntry::static_fn(
        "ReferenceEquals",
        vec![
            Param::new("objA", DataType::object()),
            Param::new("objB", DataType::object()),
        ],
        DataType::bool(),
        NativeFn::new(|_, args| {
            let a: Value = arg(args, 0)?;
            let b: Value = arg(args, 1)?;
            Ok(Value::Bool(reference_equals(&a, &b)))
        }),
    ));
    Ok(())
}
