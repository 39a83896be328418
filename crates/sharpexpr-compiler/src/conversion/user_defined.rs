//! User-defined conversion operators.
//!
//! Hosts declare conversions as static `op_Implicit` / `op_Explicit` methods
//! taking the source type and returning the target type.

use std::sync::Arc;

use sharpexpr_core::{DataType, MethodEntry};
use sharpexpr_registry::TypeRegistry;

pub const IMPLICIT_OPERATOR: &str = "op_Implicit";
pub const EXPLICIT_OPERATOR: &str = "op_Explicit";

/// Find `op_Implicit(source) -> target` declared on the source type.
pub fn find_implicit_operator(
    registry: &TypeRegistry,
    source: &DataType,
    target: &DataType,
) -> Option<Arc<MethodEntry>> {
    find_operator_on(registry, source, IMPLICIT_OPERATOR, source, target)
}

/// Find any conversion operator usable by a cast: implicit before explicit,
/// source type before target type.
pub fn find_cast_operator(
    registry: &TypeRegistry,
    source: &DataType,
    target: &DataType,
) -> Option<Arc<MethodEntry>> {
    [IMPLICIT_OPERATOR, EXPLICIT_OPERATOR]
        .into_iter()
        .flat_map(|name| [(name, source), (name, target)])
        .find_map(|(name, owner)| find_operator_on(registry, owner, name, source, target))
}

fn find_operator_on(
    registry: &TypeRegistry,
    owner: &DataType,
    name: &str,
    source: &DataType,
    target: &DataType,
) -> Option<Arc<MethodEntry>> {
    if owner.is_array() || owner.is_nullable() {
        return None;
    }
    registry
        .get(owner.type_hash)?
        .methods
        .iter()
        .find(|m| {
            m.is_static
                && m.name == name
                && m.return_type == *target
                && m.params.len() == 1
                && m.params[0].data_type == *source
        })
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sharpexpr_core::{NativeFn, Param, TypeEntry, Value};

    fn registry_with_meters() -> (TypeRegistry, DataType) {
        let mut registry = TypeRegistry::with_primitives();
        let meters = TypeEntry::value_type("Units", "Meters");
        let dt = meters.data_type();
        let meters = meters
            .with_method(MethodEntry::static_fn(
                IMPLICIT_OPERATOR,
                vec![Param::new("m", dt)],
                DataType::primitive(sharpexpr_core::PrimitiveKind::Double),
                NativeFn::constant(Value::Double(1.0)),
            ))
            .with_method(MethodEntry::static_fn(
                EXPLICIT_OPERATOR,
                vec![Param::new("m", dt)],
                DataType::int32(),
                NativeFn::constant(Value::Int32(1)),
            ));
        registry.register(meters).unwrap();
        (registry, dt)
    }

    #[test]
    fn implicit_operator_matches_exact_signature() {
        let (registry, meters) = registry_with_meters();
        let double = DataType::primitive(sharpexpr_core::PrimitiveKind::Double);
        assert!(find_implicit_operator(&registry, &meters, &double).is_some());
        assert!(find_implicit_operator(&registry, &meters, &DataType::bool()).is_none());
        assert!(find_implicit_operator(&registry, &meters, &DataType::int32()).is_none());
    }

    #[test]
    fn cast_operator_falls_back_to_explicit() {
        let (registry, meters) = registry_with_meters();
        let found = find_cast_operator(&registry, &meters, &DataType::int32()).unwrap();
        assert_eq!(found.name, EXPLICIT_OPERATOR);
    }
}
