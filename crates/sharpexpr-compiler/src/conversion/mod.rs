//! Type conversion rules.
//!
//! Decides whether a value of one type can be used as another, and which
//! node (if any) the conversion needs in the typed tree.
//!
//! ## Implicit conversions
//!
//! Checked in this order:
//! 1. Identity
//! 2. Reference upcast (the source is a reference type assignable to the target)
//! 3. Scalar widening from the table in [`primitive`]
//! 4. A user-defined `op_Implicit` on the source type
//! 5. Boxing a value type to `object` or an implemented interface
//! 6. Lifting `T` (or a widening of it) into `T?`
//!
//! ## Explicit conversions
//!
//! Everything implicit, plus numeric and enum casts, unboxing and reference
//! downcasts, `T?` unwrapping, and `op_Implicit`/`op_Explicit` on either side.

mod primitive;
mod user_defined;

use std::sync::Arc;

use sharpexpr_core::{DataType, MethodEntry};
use sharpexpr_registry::TypeRegistry;

use crate::typed::TypedExpr;

pub use primitive::{PrimitiveSet, can_convert_primitive, uses_primitive_table};
pub use user_defined::{
    EXPLICIT_OPERATOR, IMPLICIT_OPERATOR, find_cast_operator, find_implicit_operator,
};

/// How a value reaches its target type.
#[derive(Debug, Clone)]
pub enum Conversion {
    /// Types already match.
    Identity,
    /// Reference upcast; the value passes through unchanged.
    Reference,
    /// Scalar widening.
    Primitive,
    /// Value type to `object` or an interface it implements.
    Boxing,
    /// `T` to `T?`.
    Lift,
    /// Only valid under a cast: narrowing, enum casts, unboxing, downcasts.
    Explicit,
    /// A user-defined conversion operator.
    Operator(Arc<MethodEntry>),
}

impl Conversion {
    /// No node is inserted for these.
    pub fn is_pass_through(&self) -> bool {
        matches!(self, Conversion::Identity | Conversion::Reference)
    }

    /// Wrap `expr` so that it produces `target`.
    pub fn apply(self, expr: TypedExpr, target: DataType) -> TypedExpr {
        match self {
            Conversion::Identity | Conversion::Reference => expr,
            Conversion::Operator(method) => TypedExpr::Convert {
                operand: Box::new(expr),
                target,
                method: Some(method),
            },
            _ => TypedExpr::convert(expr, target),
        }
    }
}

/// Find a conversion usable without a cast.
pub fn find_implicit_conversion(
    registry: &TypeRegistry,
    source: &DataType,
    target: &DataType,
) -> Option<Conversion> {
    if source == target {
        return Some(Conversion::Identity);
    }
    if registry.is_reference_type(source) && registry.is_assignable_from(target, source) {
        return Some(Conversion::Reference);
    }
    if can_convert_primitive(source, target) {
        return Some(Conversion::Primitive);
    }
    if let Some(method) = find_implicit_operator(registry, source, target) {
        return Some(Conversion::Operator(method));
    }
    if target.is_nullable() {
        let inner = target.underlying();
        if *source == inner || can_convert_primitive(source, &inner) {
            return Some(Conversion::Lift);
        }
    } else if registry.is_value_type(source) && registry.is_assignable_from(target, source) {
        return Some(Conversion::Boxing);
    }
    None
}

/// Find a conversion usable under an explicit cast.
pub fn find_explicit_conversion(
    registry: &TypeRegistry,
    source: &DataType,
    target: &DataType,
) -> Option<Conversion> {
    if let Some(conversion) = find_implicit_conversion(registry, source, target) {
        return Some(conversion);
    }

    let numeric_like = |t: &DataType| t.is_numeric() || registry.is_enum(t);
    let (from, to) = (source.underlying(), target.underlying());

    if numeric_like(&from) && numeric_like(&to) {
        return Some(Conversion::Explicit);
    }
    if (source.is_nullable() || target.is_nullable()) && from == to {
        return Some(Conversion::Explicit);
    }
    // Unboxing and downcasts run the assignability check backwards.
    if registry.is_assignable_from(source, target) {
        return Some(Conversion::Explicit);
    }
    if registry.is_interface(target) && registry.is_reference_type(source) && !source.is_array() {
        return Some(Conversion::Explicit);
    }
    find_cast_operator(registry, source, target).map(Conversion::Operator)
}
