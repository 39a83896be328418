//! Overload resolution.
//!
//! Picks the single most specific callable among same-named candidates for a
//! list of concrete argument types.
//!
//! ## Algorithm
//!
//! 1. Filter candidates by shape: exact arity, extra arguments absorbed by a
//!    trailing `params` array, or missing trailing parameters that all have
//!    defaults (a missing `params` parameter becomes an empty array).
//! 2. Filter by argument compatibility: identity, `object` parameters, the
//!    scalar widening table for scalar parameters, assignability otherwise.
//! 3. Rank the survivors pairwise (see [`ranking`]). The winner must be
//!    strictly more specific than every other survivor; otherwise the call is
//!    ambiguous. This makes the outcome independent of candidate order.

mod ranking;

use std::sync::Arc;

use sharpexpr_core::{DataType, MemberEntry, MethodEntry, Param, TypeHash};
use sharpexpr_registry::TypeRegistry;
use tracing::trace;

use crate::conversion::{can_convert_primitive, uses_primitive_table};

/// Anything with a parameter list that can take part in overload resolution.
pub trait Signature {
    fn params(&self) -> &[Param];
    fn declaring_type(&self) -> TypeHash;
}

impl Signature for MethodEntry {
    fn params(&self) -> &[Param] {
        &self.params
    }

    fn declaring_type(&self) -> TypeHash {
        self.declaring_type
    }
}

/// Indexers take part through their index parameters.
impl Signature for MemberEntry {
    fn params(&self) -> &[Param] {
        &self.params
    }

    fn declaring_type(&self) -> TypeHash {
        self.declaring_type
    }
}

impl<T: Signature + ?Sized> Signature for Arc<T> {
    fn params(&self) -> &[Param] {
        (**self).params()
    }

    fn declaring_type(&self) -> TypeHash {
        (**self).declaring_type()
    }
}

/// Outcome of resolving one call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// `index` into the candidate list. `expanded` holds the `params` element
    /// type when the call uses the expanded form.
    Match {
        index: usize,
        expanded: Option<DataType>,
    },
    NoMatch,
    /// Indices of the candidates that tie for best.
    Ambiguous(Vec<usize>),
}

/// A candidate that survived filtering.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Applicable<'a> {
    pub index: usize,
    pub params: &'a [Param],
    pub declaring_type: TypeHash,
    pub expanded: Option<DataType>,
}

/// Resolve `arg_types` against `candidates`.
pub fn resolve<S: Signature>(
    registry: &TypeRegistry,
    candidates: &[S],
    arg_types: &[DataType],
) -> Resolution {
    let applicable: Vec<Applicable<'_>> = candidates
        .iter()
        .enumerate()
        .filter_map(|(index, candidate)| {
            let params = candidate.params();
            let expanded = applicable_form(registry, params, arg_types)?;
            Some(Applicable {
                index,
                params,
                declaring_type: candidate.declaring_type(),
                expanded,
            })
        })
        .collect();

    trace!(
        candidates = candidates.len(),
        applicable = applicable.len(),
        args = arg_types.len(),
        "overload filter"
    );

    match applicable.as_slice() {
        [] => Resolution::NoMatch,
        [only] => Resolution::Match {
            index: only.index,
            expanded: only.expanded,
        },
        _ => ranking::select_best(registry, &applicable, arg_types),
    }
}

/// Whether `params` accepts `arg_types`. The inner option is the `params`
/// element type when the expanded form is used.
pub fn applicable_form(
    registry: &TypeRegistry,
    params: &[Param],
    arg_types: &[DataType],
) -> Option<Option<DataType>> {
    let Some(last) = params.last() else {
        return arg_types.is_empty().then_some(None);
    };
    let last_index = params.len() - 1;

    let expanded = if params.len() > arg_types.len() {
        // Missing arguments must all be covered by defaults, except that the
        // final parameter may instead be an empty `params` array.
        if !params[arg_types.len()..last_index].iter().all(Param::has_default) {
            return None;
        }
        if last.has_default() {
            None
        } else if last.is_variadic {
            Some(last.data_type.element_type()?)
        } else {
            return None;
        }
    } else if params.len() < arg_types.len() {
        if !last.is_variadic {
            return None;
        }
        Some(last.data_type.element_type()?)
    } else if last.is_variadic && !registry.is_assignable_from(&last.data_type, &arg_types[last_index]) {
        Some(last.data_type.element_type()?)
    } else {
        None
    };

    let fixed = if expanded.is_some() { last_index } else { arg_types.len() };
    let fixed_ok = params
        .iter()
        .zip(arg_types)
        .take(fixed)
        .all(|(param, arg)| is_compatible(registry, &param.data_type, arg));
    if !fixed_ok {
        return None;
    }

    if let Some(element) = expanded {
        let rest = arg_types.get(last_index..).unwrap_or_default();
        if !rest.iter().all(|arg| is_compatible(registry, &element, arg)) {
            return None;
        }
    }
    Some(expanded)
}

/// Can an argument of type `arg` bind to a parameter of type `param`?
pub fn is_compatible(registry: &TypeRegistry, param: &DataType, arg: &DataType) -> bool {
    if param == arg || param.is_object() {
        return true;
    }
    if uses_primitive_table(param) {
        can_convert_primitive(arg, param)
    } else {
        registry.is_assignable_from(param, arg)
    }
}
