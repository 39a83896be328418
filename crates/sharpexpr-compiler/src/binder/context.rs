//! Binder with an implicit receiver.

use std::sync::Arc;

use tracing::trace;

use sharpexpr_core::{BindError, DataType, MemberEntry, MethodEntry, RegistrationError, TypeHash};
use sharpexpr_registry::TypeRegistry;
use sharpexpr_syntax::Identifier;

use crate::typed::TypedExpr;

use super::{Binder, DefaultBinder};

/// A [`DefaultBinder`] plus a receiver expression.
///
/// Unqualified static queries are first retried as instance queries against
/// the receiver's type, so `name` in an expression bound to a `User` resolves
/// to `receiver.Name`.
#[derive(Debug, Clone)]
pub struct ContextBinder {
    inner: DefaultBinder,
    context: TypedExpr,
}

impl ContextBinder {
    /// Wrap `inner`. The receiver's type is also imported as static, unless it
    /// is `object`, an array or a nullable type.
    pub fn new(mut inner: DefaultBinder, context: TypedExpr) -> Result<Self, RegistrationError> {
        let receiver = context.data_type();
        if !receiver.is_object() && !receiver.is_array() && !receiver.nullable {
            inner.register_type(receiver.type_hash, true)?;
        }
        Ok(Self { inner, context })
    }

    /// Receiver as a named parameter of type `data_type`.
    pub fn with_receiver(
        registry: Arc<TypeRegistry>,
        name: &str,
        data_type: DataType,
    ) -> Result<Self, RegistrationError> {
        Self::new(
            DefaultBinder::new(registry),
            TypedExpr::parameter(name, data_type),
        )
    }

    pub fn register_type(
        &mut self,
        type_hash: TypeHash,
        import_as_static: bool,
    ) -> Result<(), RegistrationError> {
        self.inner.register_type(type_hash, import_as_static)
    }

    pub fn receiver_type(&self) -> DataType {
        self.context.data_type()
    }
}

impl Binder for ContextBinder {
    fn types(&self) -> &TypeRegistry {
        self.inner.types()
    }

    fn context(&self) -> Option<&TypedExpr> {
        Some(&self.context)
    }

    fn bind_type(&self, name: &Identifier) -> Option<DataType> {
        self.inner.bind_type(name)
    }

    fn bind_member(
        &self,
        owner: Option<&DataType>,
        name: &Identifier,
        is_static: bool,
    ) -> Result<Option<Arc<MemberEntry>>, BindError> {
        if owner.is_none() && is_static {
            let receiver = self.receiver_type();
            if let Some(member) = self.inner.bind_member(Some(&receiver), name, false)? {
                trace!(name = %name, "bound to receiver member");
                return Ok(Some(member));
            }
        }
        self.inner.bind_member(owner, name, is_static)
    }

    fn bind_method(
        &self,
        owner: Option<&DataType>,
        name: &Identifier,
        arg_types: &[DataType],
        is_static: bool,
    ) -> Result<Option<Arc<MethodEntry>>, BindError> {
        if owner.is_none() && is_static {
            let receiver = self.receiver_type();
            if let Some(method) = self
                .inner
                .bind_method(Some(&receiver), name, arg_types, false)?
            {
                trace!(name = %name, "bound to receiver method");
                return Ok(Some(method));
            }
        }
        self.inner.bind_method(owner, name, arg_types, is_static)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sharpexpr_core::{NativeFn, Param, TypeEntry, Value};

    fn user_registry() -> (Arc<TypeRegistry>, DataType) {
        let mut registry = sharpexpr_modules::standard_registry().unwrap();
        let user = TypeEntry::class("App", "User")
            .with_member(MemberEntry::property(
                "Name",
                DataType::string(),
                NativeFn::constant(Value::Null),
            ))
            .with_member(MemberEntry::static_property(
                "Count",
                DataType::int32(),
                NativeFn::constant(Value::Int32(3)),
            ))
            .with_method(MethodEntry::instance(
                "Greet",
                vec![Param::new("other", DataType::string())],
                DataType::string(),
                NativeFn::constant(Value::Null),
            ));
        let data_type = user.data_type();
        registry.register(user).unwrap();
        (Arc::new(registry), data_type)
    }

    #[test]
    fn bare_names_hit_receiver_first() {
        let (registry, user) = user_registry();
        let binder = ContextBinder::with_receiver(registry, "u", user).unwrap();

        let name = binder
            .bind_member(None, &Identifier::new("name"), true)
            .unwrap()
            .unwrap();
        assert!(!name.is_static);
        assert_eq!(name.declaring_type, user.type_hash);

        let greet = binder
            .bind_method(None, &Identifier::new("greet"), &[DataType::string()], true)
            .unwrap()
            .unwrap();
        assert!(!greet.is_static);
    }

    #[test]
    fn receiver_type_is_imported_as_static() {
        let (registry, user) = user_registry();
        let binder = ContextBinder::with_receiver(registry, "u", user).unwrap();

        assert_eq!(binder.bind_type(&Identifier::new("user")), Some(user));
        let count = binder
            .bind_member(None, &Identifier::new("count"), true)
            .unwrap()
            .unwrap();
        assert!(count.is_static);
    }

    #[test]
    fn falls_back_to_library_lookup() {
        let (registry, user) = user_registry();
        let binder = ContextBinder::with_receiver(registry, "u", user).unwrap();
        let double = DataType::primitive(sharpexpr_core::PrimitiveKind::Double);

        let max = binder
            .bind_method(None, &Identifier::new("Max"), &[double, double], true)
            .unwrap()
            .unwrap();
        assert!(max.is_static);
        assert!(binder.context().is_some());
    }

    #[test]
    fn object_receiver_is_not_imported() {
        let (registry, _) = user_registry();
        let binder = ContextBinder::with_receiver(registry, "o", DataType::object()).unwrap();
        assert_eq!(binder.receiver_type(), DataType::object());
        assert!(binder
            .bind_member(None, &Identifier::new("name"), true)
            .unwrap()
            .is_none());
    }
}
