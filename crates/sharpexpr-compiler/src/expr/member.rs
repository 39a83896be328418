//! Member access and indexing.
//!
//! `target.Name` reads a field or property off a type (static) or a value
//! (instance). `target[args]` is either a single-index array access or an
//! indexed property chosen by overload resolution.

use std::sync::Arc;

use sharpexpr_core::{BindError, DataType, MemberEntry, primitives};
use sharpexpr_syntax::Expr;

use super::identifiers::resolve_symbol;
use super::{ExpressionBuilder, Result, Symbol};
use crate::conversion::{can_convert_primitive, find_implicit_operator};
use crate::overload::{Resolution, resolve};
use crate::typed::TypedExpr;

/// The left side of `target.member`: a type for static access, a value otherwise.
pub(super) fn resolve_target(builder: &ExpressionBuilder<'_>, target: &Expr) -> Result<Symbol> {
    match target {
        Expr::Reference(name) => resolve_symbol(builder, name),
        other => Ok(Symbol::Value(builder.build(other)?)),
    }
}

/// Owner type, static flag and instance for a resolved target.
pub(super) fn split_target(symbol: Symbol) -> (DataType, bool, Option<TypedExpr>) {
    match symbol {
        Symbol::Type(data_type) => (data_type, true, None),
        Symbol::Value(value) => (value.data_type(), false, Some(value)),
    }
}

/// Member read node; `Array.Length` becomes an array-length node.
pub(super) fn member_access(instance: Option<TypedExpr>, member: Arc<MemberEntry>) -> TypedExpr {
    match instance {
        Some(array) if member.declaring_type == primitives::ARRAY && member.name == "Length" => {
            TypedExpr::ArrayLength {
                array: Box::new(array),
            }
        }
        instance => TypedExpr::member(instance, member),
    }
}

pub(super) fn build_member(builder: &ExpressionBuilder<'_>, target: &Expr, member: &Expr) -> Result<TypedExpr> {
    let symbol = resolve_target(builder, target)?;
    let Expr::Reference(name) = member else {
        return Err(BindError::IdentifierExpected {
            expr: member.to_string(),
        });
    };
    let (owner, is_static, instance) = split_target(symbol);
    let found = builder
        .binder()
        .bind_member(Some(&owner), name, is_static)?
        .ok_or_else(|| BindError::unresolved(name.name()))?;
    Ok(member_access(instance, found))
}

pub(super) fn build_index(builder: &ExpressionBuilder<'_>, target: &Expr, args: &[Expr]) -> Result<TypedExpr> {
    let instance = builder.build(target)?;
    let args = builder.build_all(args)?;
    let data_type = instance.data_type();

    if data_type.is_array() {
        return array_index(builder, instance, args);
    }

    let registry = builder.registry();
    let indexers = registry.indexers(&data_type);
    if indexers.is_empty() {
        return Err(BindError::NotIndexable {
            type_name: builder.type_name(&data_type),
        });
    }

    let arg_types: Vec<DataType> = args.iter().map(TypedExpr::data_type).collect();
    match resolve(registry, &indexers, &arg_types) {
        Resolution::Match { index, .. } => {
            let indexer = Arc::clone(&indexers[index]);
            let args = builder.adapt_arguments(&indexer.params, args)?;
            Ok(TypedExpr::Index {
                instance: Box::new(instance),
                indexer,
                args,
            })
        }
        outcome => {
            let listed: Vec<usize> = match outcome {
                Resolution::Ambiguous(tied) => tied,
                _ => (0..indexers.len()).collect(),
            };
            let mut candidates: Vec<String> = listed
                .into_iter()
                .map(|i| registry.member_candidate(&indexers[i]))
                .collect();
            candidates.sort();
            Err(BindError::AmbiguousMatch { candidates })
        }
    }
}

fn array_index(
    builder: &ExpressionBuilder<'_>,
    array: TypedExpr,
    mut args: Vec<TypedExpr>,
) -> Result<TypedExpr> {
    let int = DataType::int32();
    let index = match (args.pop(), args.is_empty()) {
        (Some(index), true) => index,
        _ => return Err(BindError::generic("Incorrect number of indexes.")),
    };

    let source = index.data_type();
    let index = if source == int {
        index
    } else if can_convert_primitive(&source, &int) {
        TypedExpr::convert(index, int)
    } else if let Some(method) = find_implicit_operator(builder.registry(), &source, &int) {
        TypedExpr::Convert {
            operand: Box::new(index),
            target: int,
            method: Some(method),
        }
    } else {
        return Err(BindError::MissingImplicitConversion {
            from: builder.type_name(&source),
            to: builder.type_name(&int),
        });
    };

    Ok(TypedExpr::ArrayIndex {
        array: Box::new(array),
        index: Box::new(index),
    })
}
