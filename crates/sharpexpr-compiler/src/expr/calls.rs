//! Method and delegate calls.

use std::sync::Arc;

use sharpexpr_core::{BindError, DataType, MethodEntry};
use sharpexpr_syntax::{Expr, Identifier};

use super::identifiers::try_resolve_symbol;
use super::member::{member_access, resolve_target, split_target};
use super::{ExpressionBuilder, Result, Symbol};
use crate::typed::TypedExpr;

pub(super) fn build_call(builder: &ExpressionBuilder<'_>, callee: &Expr, args: &[Expr]) -> Result<TypedExpr> {
    let args = builder.build_all(args)?;
    let arg_types: Vec<DataType> = args.iter().map(TypedExpr::data_type).collect();

    match callee {
        Expr::MemberAccess { target, member } => {
            let symbol = resolve_target(builder, target)?;
            let Expr::Reference(name) = member.as_ref() else {
                return Err(BindError::MethodNameExpected {
                    expr: callee.to_string(),
                });
            };
            let (owner, is_static, instance) = split_target(symbol);

            // A field or property of delegate type is called through `Invoke`.
            if let Some(found) = builder.binder().bind_member(Some(&owner), name, is_static)? {
                if !builder.registry().is_delegate(&found.data_type) {
                    return Err(BindError::NonInvocableMember {
                        expr: name.to_string(),
                    });
                }
                let delegate = member_access(instance, found);
                return invoke_delegate(builder, callee, delegate, args, &arg_types);
            }

            let method = builder
                .binder()
                .bind_method(Some(&owner), name, &arg_types, is_static)?
                .ok_or_else(|| BindError::unresolved(name.name()))?;
            finish_call(builder, instance, method, args)
        }
        Expr::Reference(name) => match try_resolve_symbol(builder, name)? {
            Some(Symbol::Value(value)) => {
                if !builder.registry().is_delegate(&value.data_type()) {
                    return Err(BindError::NonInvocableMember {
                        expr: name.to_string(),
                    });
                }
                invoke_delegate(builder, callee, value, args, &arg_types)
            }
            Some(Symbol::Type(_)) => Err(BindError::NonInvocableMember {
                expr: name.to_string(),
            }),
            None => unqualified_call(builder, name, args, &arg_types),
        },
        other => Err(BindError::MethodNameExpected {
            expr: other.to_string(),
        }),
    }
}

/// `Name(args)`: a static import, or a method on the receiver.
fn unqualified_call(
    builder: &ExpressionBuilder<'_>,
    name: &Identifier,
    args: Vec<TypedExpr>,
    arg_types: &[DataType],
) -> Result<TypedExpr> {
    let method = builder
        .binder()
        .bind_method(None, name, arg_types, true)?
        .ok_or_else(|| BindError::unresolved(name.name()))?;
    let instance = builder.receiver_for(method.is_static, name)?;
    finish_call(builder, instance, method, args)
}

fn invoke_delegate(
    builder: &ExpressionBuilder<'_>,
    callee: &Expr,
    delegate: TypedExpr,
    args: Vec<TypedExpr>,
    arg_types: &[DataType],
) -> Result<TypedExpr> {
    let delegate_type = delegate.data_type();
    let invoke = builder
        .binder()
        .bind_method(Some(&delegate_type), &Identifier::new("Invoke"), arg_types, false)?
        .ok_or_else(|| BindError::generic(format!("Unable to resolve a method: {callee}.")))?;
    finish_call(builder, Some(delegate), invoke, args)
}

fn finish_call(
    builder: &ExpressionBuilder<'_>,
    instance: Option<TypedExpr>,
    method: Arc<MethodEntry>,
    args: Vec<TypedExpr>,
) -> Result<TypedExpr> {
    let args = builder.adapt_arguments(&method.params, args)?;
    Ok(TypedExpr::call(instance, method, args))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sharpexpr_core::{MemberEntry, NativeFn, Param, PrimitiveKind, TypeEntry, Value};
    use sharpexpr_registry::TypeRegistry;

    use crate::binder::{ContextBinder, DefaultBinder};

    fn double() -> DataType {
        DataType::primitive(PrimitiveKind::Double)
    }

    fn registry() -> (Arc<TypeRegistry>, DataType) {
        let mut registry = sharpexpr_modules::standard_registry().unwrap();
        let doubler = TypeEntry::delegate(
            "App",
            "Doubler",
            vec![Param::new("x", DataType::int32())],
            DataType::int32(),
        );
        let doubler_type = doubler.data_type();
        registry.register(doubler).unwrap();
        let user = TypeEntry::class("App", "User")
            .with_member(MemberEntry::property(
                "Name",
                DataType::string(),
                NativeFn::constant(Value::Null),
            ))
            .with_member(MemberEntry::property(
                "Twice",
                doubler_type,
                NativeFn::constant(Value::Null),
            ))
            .with_member(MemberEntry::static_property(
                "Shared",
                doubler_type,
                NativeFn::constant(Value::Null),
            ))
            .with_method(MethodEntry::instance(
                "Greet",
                vec![Param::new("other", DataType::string())],
                DataType::string(),
                NativeFn::constant(Value::Null),
            ));
        let user_type = user.data_type();
        registry.register(user).unwrap();
        (Arc::new(registry), user_type)
    }

    #[test]
    fn static_method_with_promoted_argument() {
        let (registry, _) = registry();
        let binder = DefaultBinder::new(Arc::clone(&registry));
        let call = ExpressionBuilder::new(&binder)
            .build(&Expr::method_call(
                Expr::reference("Math"),
                "Max",
                vec![Expr::literal(1.0), Expr::literal(15)],
            ))
            .unwrap();
        assert_eq!(call.data_type(), double());
        assert_eq!(
            call.display(&registry).to_string(),
            "Max(1, Convert(15, Double))"
        );
    }

    #[test]
    fn instance_calls_on_values_and_receiver() {
        let (registry, user) = registry();
        let binder = ContextBinder::with_receiver(Arc::clone(&registry), "u", user).unwrap();
        let builder = ExpressionBuilder::new(&binder);

        let upper = builder
            .build(&Expr::method_call(Expr::reference("name"), "ToUpper", vec![]))
            .unwrap();
        assert_eq!(upper.display(&registry).to_string(), "u.Name.ToUpper()");

        let greet = builder
            .build(&Expr::call(Expr::reference("greet"), vec![Expr::literal("x")]))
            .unwrap();
        assert_eq!(greet.display(&registry).to_string(), r#"u.Greet("x")"#);
    }

    #[test]
    fn delegates_are_invoked() {
        let (registry, user) = registry();
        let binder = ContextBinder::with_receiver(Arc::clone(&registry), "u", user).unwrap();
        let builder = ExpressionBuilder::new(&binder);

        let twice = builder
            .build(&Expr::call(Expr::reference("twice"), vec![Expr::literal(4)]))
            .unwrap();
        assert_eq!(twice.data_type(), DataType::int32());
        assert_eq!(twice.display(&registry).to_string(), "u.Twice.Invoke(4)");

        let shared = builder
            .build(&Expr::method_call(Expr::reference("User"), "Shared", vec![Expr::literal(2)]))
            .unwrap();
        assert_eq!(shared.display(&registry).to_string(), "User.Shared.Invoke(2)");

        let err = builder
            .build(&Expr::call(Expr::reference("twice"), vec![Expr::literal("x")]))
            .unwrap_err();
        assert_eq!(err.to_string(), "Unable to resolve a method: twice.");
    }

    #[test]
    fn call_errors() {
        let (registry, user) = registry();
        let binder = ContextBinder::with_receiver(Arc::clone(&registry), "u", user).unwrap();
        let builder = ExpressionBuilder::new(&binder);

        let err = builder
            .build(&Expr::call(Expr::reference("name"), vec![]))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Non-invocable member 'name' cannot be used like a method."
        );

        let err = builder
            .build(&Expr::method_call(Expr::literal("s"), "Length", vec![]))
            .unwrap_err();
        assert!(matches!(err, BindError::NonInvocableMember { .. }));

        let err = builder
            .build(&Expr::call(Expr::literal(1), vec![]))
            .unwrap_err();
        assert_eq!(err.to_string(), "Method name expected (expression: 1).");

        let err = builder
            .build(&Expr::call(Expr::reference("Nope"), vec![]))
            .unwrap_err();
        assert_eq!(err, BindError::unresolved("Nope"));

        let err = builder
            .build(&Expr::call(Expr::reference("Math"), vec![]))
            .unwrap_err();
        assert!(matches!(err, BindError::NonInvocableMember { .. }));
    }

    #[test]
    fn instance_method_without_receiver() {
        let (registry, _) = registry();
        let mut binder = DefaultBinder::new(Arc::clone(&registry));
        let user = registry.iter().find(|e| e.name == "User").unwrap().type_hash;
        binder.register_type(user, true).unwrap();
        let err = ExpressionBuilder::new(&binder)
            .build(&Expr::method_call(Expr::reference("User"), "Greet", vec![Expr::literal("x")]))
            .unwrap_err();
        assert_eq!(err, BindError::unresolved("Greet"));
    }
}
