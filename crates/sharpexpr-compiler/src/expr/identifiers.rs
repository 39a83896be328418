//! Bare name resolution.

use sharpexpr_core::BindError;
use sharpexpr_syntax::{Expr, Identifier};

use super::member::member_access;
use super::{ExpressionBuilder, Result, Symbol};
use crate::typed::TypedExpr;

/// Types win over members; an unqualified member lookup is static, except
/// that a binder with a receiver may answer with one of its instance members.
pub(super) fn try_resolve_symbol(
    builder: &ExpressionBuilder<'_>,
    name: &Identifier,
) -> Result<Option<Symbol>> {
    let binder = builder.binder();
    if let Some(data_type) = binder.bind_type(name) {
        return Ok(Some(Symbol::Type(data_type)));
    }
    let Some(member) = binder.bind_member(None, name, true)? else {
        return Ok(None);
    };
    let receiver = builder.receiver_for(member.is_static, name)?;
    Ok(Some(Symbol::Value(member_access(receiver, member))))
}

pub(super) fn resolve_symbol(builder: &ExpressionBuilder<'_>, name: &Identifier) -> Result<Symbol> {
    try_resolve_symbol(builder, name)?.ok_or_else(|| BindError::unresolved(name.name()))
}

/// A reference in value position.
pub(super) fn build_reference(
    builder: &ExpressionBuilder<'_>,
    expr: &Expr,
    name: &Identifier,
) -> Result<TypedExpr> {
    match resolve_symbol(builder, name)? {
        Symbol::Value(value) => Ok(value),
        Symbol::Type(_) => Err(BindError::generic(format!(
            "'{expr}' is a type, which is not valid in the given context."
        ))),
    }
}
