//! Expression builder.
//!
//! [`ExpressionBuilder`] walks a parsed [`Expr`] once, bottom-up, and produces
//! a [`TypedExpr`]. It holds no state besides its [`Binder`]:
//!
//! - names go through the binder (types first, then members, then methods)
//! - implicit conversions, enum unwrapping and numeric promotions become
//!   explicit [`TypedExpr::Convert`] nodes
//! - calls, indexers and user-defined operators are pinned to one overload and
//!   their arguments adapted to its parameter list
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use sharpexpr_compiler::{DefaultBinder, ExpressionBuilder};
//! use sharpexpr_syntax::Expr;
//!
//! let registry = Arc::new(sharpexpr_modules::standard_registry().unwrap());
//! let binder = DefaultBinder::new(registry);
//! let expr = Expr::binary(
//!     "+",
//!     Expr::binary("+", Expr::literal("a"), Expr::literal("b")),
//!     Expr::literal("c"),
//! );
//! let typed = ExpressionBuilder::new(&binder).build(&expr).unwrap();
//! assert_eq!(
//!     typed.display(binder.registry()).to_string(),
//!     r#"Concat("a", "b", "c")"#
//! );
//! ```

mod binary;
mod calls;
mod identifiers;
mod literals;
mod member;
mod ternary;
mod unary;

use sharpexpr_core::{BindError, DataType, Param, Value};
use sharpexpr_registry::TypeRegistry;
use sharpexpr_syntax::{Expr, Identifier};

use crate::binder::Binder;
use crate::conversion::{find_explicit_conversion, find_implicit_conversion};
use crate::overload::applicable_form;
use crate::typed::TypedExpr;

type Result<T> = std::result::Result<T, BindError>;

/// What a bare name resolved to.
#[derive(Debug, Clone)]
pub(crate) enum Symbol {
    Type(DataType),
    Value(TypedExpr),
}

/// Builds typed expressions against a [`Binder`].
#[derive(Clone, Copy)]
pub struct ExpressionBuilder<'a> {
    binder: &'a dyn Binder,
}

impl<'a> ExpressionBuilder<'a> {
    pub fn new(binder: &'a dyn Binder) -> Self {
        Self { binder }
    }

    pub fn binder(&self) -> &'a dyn Binder {
        self.binder
    }

    pub fn registry(&self) -> &'a TypeRegistry {
        self.binder.types()
    }

    /// Bind `expr`. The first semantic error aborts the build.
    pub fn build(&self, expr: &Expr) -> Result<TypedExpr> {
        match expr {
            Expr::Reference(name) => identifiers::build_reference(self, expr, name),
            Expr::Literal(value) => Ok(literals::build_literal(value)),
            Expr::Binary { op, left, right } => binary::build_binary(self, op, left, right),
            Expr::Unary { op, kind, operand } => unary::build_unary(self, op, *kind, operand),
            Expr::Call { callee, args } => calls::build_call(self, callee, args),
            Expr::Indexer { target, args } => member::build_index(self, target, args),
            Expr::MemberAccess { target, member } => member::build_member(self, target, member),
            Expr::Conditional {
                test,
                if_true,
                if_false,
            } => ternary::build_conditional(self, test, if_true, if_false),
            Expr::Parenthesized(inner) => self.build(inner),
        }
    }

    fn build_all(&self, exprs: &[Expr]) -> Result<Vec<TypedExpr>> {
        exprs.iter().map(|e| self.build(e)).collect()
    }

    // =========================================================================
    // Conversions
    // =========================================================================

    /// Qualified type name for diagnostics.
    pub(crate) fn type_name(&self, data_type: &DataType) -> String {
        self.registry().qualified_type_name(data_type)
    }

    /// Apply an implicit conversion, or hand the expression back untouched.
    pub(crate) fn try_implicit(
        &self,
        expr: TypedExpr,
        target: &DataType,
    ) -> std::result::Result<TypedExpr, TypedExpr> {
        if expr.is_null_constant() && self.registry().accepts_null(target) {
            return Ok(retype_null(*target));
        }
        match find_implicit_conversion(self.registry(), &expr.data_type(), target) {
            Some(conversion) => Ok(conversion.apply(expr, *target)),
            None => Err(expr),
        }
    }

    pub(crate) fn require_implicit(&self, expr: TypedExpr, target: &DataType) -> Result<TypedExpr> {
        self.try_implicit(expr, target)
            .map_err(|expr| BindError::MissingImplicitConversion {
                from: self.type_name(&expr.data_type()),
                to: self.type_name(target),
            })
    }

    /// Receiver for a member found by an unqualified lookup.
    pub(crate) fn receiver_for(&self, is_static: bool, name: &Identifier) -> Result<Option<TypedExpr>> {
        if is_static {
            return Ok(None);
        }
        match self.binder.context() {
            Some(context) => Ok(Some(context.clone())),
            None => Err(BindError::generic(format!(
                "An object reference is required for the non-static member '{name}'."
            ))),
        }
    }

    // =========================================================================
    // Arguments
    // =========================================================================

    /// Adapt `args` to `params`: convert fixed arguments, pack the expanded
    /// `params` tail into an array, and fill omitted trailing parameters with
    /// their defaults (or an empty `params` array).
    pub(crate) fn adapt_arguments(&self, params: &[Param], args: Vec<TypedExpr>) -> Result<Vec<TypedExpr>> {
        let arg_types: Vec<DataType> = args.iter().map(TypedExpr::data_type).collect();
        let expanded = applicable_form(self.registry(), params, &arg_types).ok_or_else(|| {
            BindError::generic("Argument types do not match the selected overload.")
        })?;
        let variadic_at = expanded.map(|_| params.len() - 1);

        let mut args = args.into_iter();
        let mut adapted = Vec::with_capacity(params.len());
        for (position, param) in params.iter().enumerate() {
            if let (Some(at), Some(element)) = (variadic_at, expanded)
                && at == position
            {
                let items = args
                    .by_ref()
                    .map(|arg| self.argument(arg, &element))
                    .collect::<Result<Vec<_>>>()?;
                adapted.push(TypedExpr::NewArray { element, items });
                break;
            }
            let arg = match args.next() {
                Some(arg) => self.argument(arg, &param.data_type)?,
                None => self.omitted(param)?,
            };
            adapted.push(arg);
        }
        Ok(adapted)
    }

    fn argument(&self, arg: TypedExpr, target: &DataType) -> Result<TypedExpr> {
        match self.try_implicit(arg, target) {
            Ok(arg) => Ok(arg),
            Err(arg) => {
                let source = arg.data_type();
                match find_explicit_conversion(self.registry(), &source, target) {
                    Some(conversion) => Ok(conversion.apply(arg, *target)),
                    None => Err(BindError::MissingImplicitConversion {
                        from: self.type_name(&source),
                        to: self.type_name(target),
                    }),
                }
            }
        }
    }

    fn omitted(&self, param: &Param) -> Result<TypedExpr> {
        match &param.default {
            Some(Value::Null) => Ok(retype_null(param.data_type)),
            Some(value) => self.argument(TypedExpr::constant(value.clone()), &param.data_type),
            None if param.is_variadic => Ok(TypedExpr::NewArray {
                element: param
                    .data_type
                    .element_type()
                    .unwrap_or_else(DataType::object),
                items: Vec::new(),
            }),
            None => Err(BindError::generic(format!(
                "No argument given for parameter '{}'.",
                param.name
            ))),
        }
    }
}

/// `null` typed as `target`.
fn retype_null(target: DataType) -> TypedExpr {
    TypedExpr::Constant {
        value: Value::Null,
        data_type: target,
    }
}

/// Wrap `expr` in a conversion to `target` unless it already has that type.
fn convert_to(expr: TypedExpr, target: DataType) -> TypedExpr {
    if expr.data_type() == target {
        expr
    } else {
        TypedExpr::convert(expr, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use sharpexpr_core::PrimitiveKind;

    use crate::binder::DefaultBinder;

    fn binder() -> DefaultBinder {
        DefaultBinder::new(Arc::new(sharpexpr_modules::standard_registry().unwrap()))
    }

    fn int(v: i32) -> TypedExpr {
        TypedExpr::constant(Value::Int32(v))
    }

    #[test]
    fn adapt_packs_expanded_params() {
        let binder = binder();
        let builder = ExpressionBuilder::new(&binder);
        let params = vec![
            Param::new("first", DataType::string()),
            Param::variadic("rest", DataType::primitive(PrimitiveKind::Int64)),
        ];
        let adapted = builder
            .adapt_arguments(
                &params,
                vec![TypedExpr::constant(Value::from("x")), int(1), int(2)],
            )
            .unwrap();
        assert_eq!(adapted.len(), 2);
        let TypedExpr::NewArray { element, items } = &adapted[1] else {
            panic!("expected a packed array");
        };
        assert_eq!(*element, DataType::primitive(PrimitiveKind::Int64));
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].data_type(), DataType::primitive(PrimitiveKind::Int64));
    }

    #[test]
    fn adapt_forwards_an_array_to_params() {
        let binder = binder();
        let builder = ExpressionBuilder::new(&binder);
        let params = vec![Param::variadic("items", DataType::object())];
        let array = TypedExpr::NewArray {
            element: DataType::object(),
            items: vec![int(1)],
        };
        let adapted = builder.adapt_arguments(&params, vec![array]).unwrap();
        let TypedExpr::NewArray { items, .. } = &adapted[0] else {
            panic!("expected the array itself");
        };
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn adapt_fills_defaults_and_empty_params() {
        let binder = binder();
        let builder = ExpressionBuilder::new(&binder);
        let params = vec![
            Param::new("a", DataType::int32()),
            Param::new("b", DataType::primitive(PrimitiveKind::Double)).with_default(Value::Int32(2)),
            Param::variadic("rest", DataType::string()),
        ];
        let adapted = builder.adapt_arguments(&params, vec![int(1)]).unwrap();
        assert_eq!(adapted.len(), 3);
        assert_eq!(adapted[1].data_type(), DataType::primitive(PrimitiveKind::Double));
        assert!(matches!(&adapted[2], TypedExpr::NewArray { items, .. } if items.is_empty()));
    }

    #[test]
    fn instance_members_need_a_receiver() {
        let binder = binder();
        let builder = ExpressionBuilder::new(&binder);
        let err = builder
            .receiver_for(false, &Identifier::new("Ping"))
            .unwrap_err();
        assert!(matches!(err, BindError::Generic { .. }));
        assert!(builder.receiver_for(true, &Identifier::new("Ping")).unwrap().is_none());
    }
}
