//! `System.Array`, the shared entry behind every array type.

use sharpexpr_core::{
    ArrayValue, DataType, MemberEntry, MethodEntry, NativeFn, Param, RegistrationError, Value,
    primitives,
};
use sharpexpr_registry::TypeRegistry;

pub fn install(registry: &mut TypeRegistry) -> Result<(), RegistrationError> {
    let entry = registry.get_mut(primitives::ARRAY)?;
    entry.add_member(MemberEntry::property(
        "Length",
        DataType::int32(),
        NativeFn::method0(|a: ArrayValue| a.len() as i32),
    ));
    entry.add_member(MemberEntry::property(
        "Rank",
        DataType::int32(),
        NativeFn::method0(|_: ArrayValue| 1_i32),
    ));
    entry.add_method(MethodEntry::instance(
        "GetValue",
        vec![Param::new("index", DataType::int32())],
        DataType::object(),
        NativeFn::new(|this, args| {
            let array: ArrayValue = sharpexpr_core::receiver(this)?;
            let index: i32 = sharpexpr_core::arg(args, 0)?;
            array
                .get(i64::from(index))
                .cloned()
                .ok_or(sharpexpr_core::RuntimeError::IndexOutOfRange)
        }),
    ));
    entry.add_method(MethodEntry::instance(
        "Contains",
        vec![Param::new("value", DataType::object())],
        DataType::bool(),
        NativeFn::method1(|a: ArrayValue, v: Value| a.items.contains(&v)),
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_and_get_value() {
        let registry = crate::standard_registry().unwrap();
        let array_type = DataType::int32().array_of();
        let array = Value::Array(ArrayValue::new(
            DataType::int32(),
            vec![Value::Int32(4), Value::Int32(5)],
        ));
        let length = &registry.find_members(&array_type, "Length", false)[0];
        assert_eq!(length.getter.call(Some(&array), &[]).unwrap(), Value::Int32(2));
        let get = &registry.find_methods(&array_type, "GetValue", false)[0];
        assert_eq!(get.native.call(Some(&array), &[Value::Int32(1)]).unwrap(), Value::Int32(5));
        assert!(get.native.call(Some(&array), &[Value::Int32(2)]).is_err());
    }
}
