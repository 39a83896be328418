//! Most-specific candidate selection.
//!
//! Two applicable candidates are compared like this:
//!
//! - a candidate used in its normal form beats one that needs `params`
//!   expansion;
//! - otherwise each argument position votes for the candidate whose parameter
//!   type is closer to the argument type. A position where neither type is
//!   closer makes the pair incomparable;
//! - if nobody got a vote, the candidate with more parameters wins;
//! - identical signatures fall back to the more derived declaring type.

use sharpexpr_core::{DataType, Param, PrimitiveKind};
use sharpexpr_registry::TypeRegistry;
use tracing::debug;

use super::{Applicable, Resolution};
use crate::conversion::can_convert_primitive;

/// Which of two candidates is more specific.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preference {
    First,
    Second,
    Neither,
}

/// Pick the candidate that beats every other one.
///
/// A single pass finds the only possible winner: once the true winner is seen
/// nothing can displace it. A second pass confirms it beats everyone. Without
/// a winner, every candidate that no other candidate beats is reported.
pub(crate) fn select_best(
    registry: &TypeRegistry,
    applicable: &[Applicable<'_>],
    arg_types: &[DataType],
) -> Resolution {
    let beats = |a: usize, b: usize| {
        compare(registry, &applicable[a], &applicable[b], arg_types) == Preference::First
    };

    let mut best = 0;
    for i in 1..applicable.len() {
        if beats(i, best) {
            best = i;
        }
    }

    if (0..applicable.len()).all(|i| i == best || beats(best, i)) {
        let winner = &applicable[best];
        return Resolution::Match {
            index: winner.index,
            expanded: winner.expanded,
        };
    }

    let undominated: Vec<usize> = (0..applicable.len())
        .filter(|&i| !(0..applicable.len()).any(|j| j != i && beats(j, i)))
        .collect();
    // A preference cycle leaves nobody undominated.
    let tied = if undominated.is_empty() {
        (0..applicable.len()).collect()
    } else {
        undominated
    };

    let mut indices: Vec<usize> = tied.into_iter().map(|i| applicable[i].index).collect();
    indices.sort_unstable();
    debug!(candidates = ?indices, "ambiguous overload");
    Resolution::Ambiguous(indices)
}

/// Compare two applicable candidates, including the declaring-type tie-break.
pub(crate) fn compare(
    registry: &TypeRegistry,
    a: &Applicable<'_>,
    b: &Applicable<'_>,
    arg_types: &[DataType],
) -> Preference {
    let preference = compare_params(registry, a, b, arg_types);
    if preference != Preference::Neither {
        return preference;
    }

    if !same_signature(a.params, b.params) {
        return Preference::Neither;
    }
    let depth_a = registry.hierarchy_depth(&DataType::simple(a.declaring_type));
    let depth_b = registry.hierarchy_depth(&DataType::simple(b.declaring_type));
    match depth_a.cmp(&depth_b) {
        std::cmp::Ordering::Greater => Preference::First,
        std::cmp::Ordering::Less => Preference::Second,
        std::cmp::Ordering::Equal => Preference::Neither,
    }
}

fn compare_params(
    registry: &TypeRegistry,
    a: &Applicable<'_>,
    b: &Applicable<'_>,
    arg_types: &[DataType],
) -> Preference {
    match (a.expanded, b.expanded) {
        (Some(_), None) => return Preference::Second,
        (None, Some(_)) => return Preference::First,
        _ => {}
    }

    let mut a_closer = false;
    let mut b_closer = false;

    for (i, arg) in arg_types.iter().enumerate() {
        let ca = param_type_at(a, i);
        let cb = param_type_at(b, i);
        if ca == cb {
            continue;
        }
        match most_specific_type(registry, &ca, &cb, arg) {
            Preference::Neither => return Preference::Neither,
            Preference::First => a_closer = true,
            Preference::Second => b_closer = true,
        }
    }

    match (a_closer, b_closer) {
        (true, false) => Preference::First,
        (false, true) => Preference::Second,
        (false, false) => match a.params.len().cmp(&b.params.len()) {
            std::cmp::Ordering::Greater => Preference::First,
            std::cmp::Ordering::Less => Preference::Second,
            std::cmp::Ordering::Equal => Preference::Neither,
        },
        (true, true) => Preference::Neither,
    }
}

/// Parameter type receiving argument `i`; expanded `params` arguments use the
/// element type.
fn param_type_at(candidate: &Applicable<'_>, i: usize) -> DataType {
    let last = candidate.params.len().saturating_sub(1);
    match candidate.expanded {
        Some(element) if i >= last => element,
        _ => candidate.params[i].data_type,
    }
}

/// Which of `c1` and `c2` is closer to the argument type `arg`.
pub fn most_specific_type(
    registry: &TypeRegistry,
    c1: &DataType,
    c2: &DataType,
    arg: &DataType,
) -> Preference {
    if c1 == c2 {
        return Preference::Neither;
    }
    if c1 == arg {
        return Preference::First;
    }
    if c2 == arg {
        return Preference::Second;
    }

    let (c1_from_c2, c2_from_c1) = if is_table_primitive(c1) && is_table_primitive(c2) {
        (can_convert_primitive(c2, c1), can_convert_primitive(c1, c2))
    } else {
        (
            registry.is_assignable_from(c1, c2),
            registry.is_assignable_from(c2, c1),
        )
    };

    match (c1_from_c2, c2_from_c1) {
        (true, false) => Preference::Second,
        (false, true) => Preference::First,
        _ => Preference::Neither,
    }
}

/// `decimal` is compared by assignability, like any other struct.
fn is_table_primitive(data_type: &DataType) -> bool {
    data_type
        .primitive_kind()
        .is_some_and(|kind| kind != PrimitiveKind::Decimal)
}

fn same_signature(a: &[Param], b: &[Param]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.data_type == y.data_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overload::resolve;
    use sharpexpr_core::{MethodEntry, NativeFn, TypeEntry, Value};

    fn method(params: &[DataType]) -> MethodEntry {
        MethodEntry::static_fn(
            "Max",
            params.iter().map(|&dt| Param::new("p", dt)).collect(),
            DataType::void(),
            NativeFn::constant(Value::Null),
        )
    }

    fn kind(k: PrimitiveKind) -> DataType {
        DataType::primitive(k)
    }

    fn permutations<T: Clone>(items: &[T]) -> Vec<Vec<T>> {
        if items.len() <= 1 {
            return vec![items.to_vec()];
        }
        let mut out = Vec::new();
        for i in 0..items.len() {
            let mut rest = items.to_vec();
            let head = rest.remove(i);
            for mut tail in permutations(&rest) {
                tail.insert(0, head.clone());
                out.push(tail);
            }
        }
        out
    }

    fn winner_name(registry: &TypeRegistry, candidates: &[MethodEntry], args: &[DataType]) -> Option<Vec<DataType>> {
        match resolve(registry, candidates, args) {
            Resolution::Match { index, .. } => Some(candidates[index].param_types().collect()),
            _ => None,
        }
    }

    #[test]
    fn floating_overload_wins_for_mixed_arguments() {
        let registry = TypeRegistry::with_primitives();
        let candidates = vec![
            method(&[DataType::int32(), DataType::int32()]),
            method(&[kind(PrimitiveKind::Int64), kind(PrimitiveKind::Int64)]),
            method(&[kind(PrimitiveKind::Float), kind(PrimitiveKind::Float)]),
            method(&[kind(PrimitiveKind::Double), kind(PrimitiveKind::Double)]),
        ];
        let args = [kind(PrimitiveKind::Double), DataType::int32()];
        assert_eq!(
            winner_name(&registry, &candidates, &args),
            Some(vec![kind(PrimitiveKind::Double), kind(PrimitiveKind::Double)])
        );
        let ints = [DataType::int32(), DataType::int32()];
        assert_eq!(
            winner_name(&registry, &candidates, &ints),
            Some(vec![DataType::int32(), DataType::int32()])
        );
    }

    #[test]
    fn resolution_is_order_independent() {
        let registry = TypeRegistry::with_primitives();
        let candidates = vec![
            method(&[DataType::int32(), DataType::object()]),
            method(&[DataType::object(), DataType::int32()]),
            method(&[kind(PrimitiveKind::Int64), kind(PrimitiveKind::Int64)]),
            method(&[DataType::int32(), DataType::int32()]),
        ];
        let args = [DataType::int32(), DataType::int32()];
        for order in permutations(&candidates) {
            assert_eq!(
                winner_name(&registry, &order, &args),
                Some(vec![DataType::int32(), DataType::int32()])
            );
        }
    }

    #[test]
    fn conflicting_votes_are_ambiguous_in_every_order() {
        let registry = TypeRegistry::with_primitives();
        let candidates = vec![
            method(&[DataType::int32(), DataType::object()]),
            method(&[DataType::object(), DataType::int32()]),
        ];
        let args = [DataType::int32(), DataType::int32()];
        for order in permutations(&candidates) {
            assert_eq!(resolve(&registry, &order, &args), Resolution::Ambiguous(vec![0, 1]));
        }
    }

    #[test]
    fn ambiguity_reports_the_same_candidates_in_every_order() {
        let registry = TypeRegistry::with_primitives();
        let long = kind(PrimitiveKind::Int64);
        let candidates = vec![
            method(&[DataType::int32(), long]),
            method(&[long, DataType::int32()]),
            method(&[long, long]),
            method(&[kind(PrimitiveKind::Double), kind(PrimitiveKind::Double)]),
        ];
        let args = [DataType::int32(), DataType::int32()];
        for order in permutations(&candidates) {
            let Resolution::Ambiguous(tied) = resolve(&registry, &order, &args) else {
                panic!("expected an ambiguity");
            };
            let tied: Vec<Vec<DataType>> =
                tied.iter().map(|&i| order[i].param_types().collect()).collect();
            assert_eq!(tied.len(), 2);
            assert!(tied.contains(&vec![DataType::int32(), long]));
            assert!(tied.contains(&vec![long, DataType::int32()]));
        }
    }

    #[test]
    fn normal_form_beats_expanded_form() {
        let registry = TypeRegistry::with_primitives();
        let candidates = vec![
            MethodEntry::static_fn(
                "Concat",
                vec![Param::variadic("values", DataType::string())],
                DataType::string(),
                NativeFn::constant(Value::Null),
            ),
            method(&[DataType::string(), DataType::string()]),
        ];
        let args = [DataType::string(), DataType::string()];
        assert_eq!(
            resolve(&registry, &candidates, &args),
            Resolution::Match {
                index: 1,
                expanded: None
            }
        );
    }

    #[test]
    fn identical_signatures_prefer_derived_declaring_type() {
        let mut registry = TypeRegistry::with_primitives();
        let base = TypeEntry::class("Zoo", "Animal");
        let base_hash = base.type_hash;
        registry.register(base).unwrap();
        let derived = TypeEntry::class("Zoo", "Dog").with_base(base_hash);
        let derived_hash = derived.type_hash;
        registry.register(derived).unwrap();

        let mut on_base = method(&[DataType::int32()]);
        on_base.declaring_type = base_hash;
        let mut on_derived = method(&[DataType::int32()]);
        on_derived.declaring_type = derived_hash;

        for order in permutations(&[on_base, on_derived]) {
            match resolve(&registry, &order, &[DataType::int32()]) {
                Resolution::Match { index, .. } => {
                    assert_eq!(order[index].declaring_type, derived_hash)
                }
                other => panic!("expected a match, got {other:?}"),
            }
        }
    }

    #[test]
    fn unrelated_identical_signatures_are_ambiguous() {
        let registry = TypeRegistry::with_primitives();
        let candidates = vec![method(&[DataType::int32()]), method(&[DataType::int32()])];
        assert_eq!(
            resolve(&registry, &candidates, &[DataType::int32()]),
            Resolution::Ambiguous(vec![0, 1])
        );
    }

    #[test]
    fn most_specific_type_prefers_narrower_scalar() {
        let registry = TypeRegistry::with_primitives();
        let long = kind(PrimitiveKind::Int64);
        let double = kind(PrimitiveKind::Double);
        let short = kind(PrimitiveKind::Int16);
        assert_eq!(most_specific_type(&registry, &long, &double, &short), Preference::First);
        assert_eq!(
            most_specific_type(&registry, &DataType::object(), &DataType::string(), &DataType::string()),
            Preference::Second
        );
    }
}
