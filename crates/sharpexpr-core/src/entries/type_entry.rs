use std::sync::Arc;

use crate::{
    DataType, NativeFn, PrimitiveKind, RuntimeError, TypeHash, Value, primitives,
};

use super::{MemberEntry, MethodEntry, Param};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    /// Built-in scalar (including `decimal`).
    Primitive(PrimitiveKind),
    Class,
    Struct,
    Enum { underlying: PrimitiveKind },
    Interface,
    /// Signature is exposed through the `Invoke` instance method.
    Delegate,
    /// A class with only static members (`Math`, `Convert`).
    Static,
}

/// Registry entry for a type.
#[derive(Debug, Clone)]
pub struct TypeEntry {
    pub type_hash: TypeHash,
    pub name: String,
    /// Dotted namespace; empty for the global namespace.
    pub namespace: String,
    pub kind: TypeKind,
    pub base: Option<TypeHash>,
    pub interfaces: Vec<TypeHash>,
    pub members: Vec<Arc<MemberEntry>>,
    pub methods: Vec<Arc<MethodEntry>>,
}

impl TypeEntry {
    pub fn new(namespace: &str, name: &str, kind: TypeKind) -> Self {
        let qualified = qualify(namespace, name);
        let base = match kind {
            TypeKind::Interface => None,
            _ => Some(primitives::OBJECT),
        };
        Self {
            type_hash: TypeHash::from_name(&qualified),
            name: name.to_string(),
            namespace: namespace.to_string(),
            kind,
            base,
            interfaces: Vec::new(),
            members: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn primitive(kind: PrimitiveKind) -> Self {
        Self::new("System", kind.name(), TypeKind::Primitive(kind))
    }

    pub fn class(namespace: &str, name: &str) -> Self {
        Self::new(namespace, name, TypeKind::Class)
    }

    pub fn value_type(namespace: &str, name: &str) -> Self {
        Self::new(namespace, name, TypeKind::Struct)
    }

    pub fn static_class(namespace: &str, name: &str) -> Self {
        Self::new(namespace, name, TypeKind::Static)
    }

    pub fn interface(namespace: &str, name: &str) -> Self {
        Self::new(namespace, name, TypeKind::Interface)
    }

    pub fn enumeration(namespace: &str, name: &str, underlying: PrimitiveKind) -> Self {
        Self::new(namespace, name, TypeKind::Enum { underlying })
    }

    /// A delegate type. Calls go through an `Invoke` method that forwards to
    /// the [`DelegateRef`](crate::DelegateRef) held by the receiver.
    pub fn delegate(namespace: &str, name: &str, params: Vec<Param>, return_type: DataType) -> Self {
        let invoke = NativeFn::new(|this, args| match this {
            Some(Value::Delegate(d)) => d.invoke(args),
            Some(Value::Null) | None => Err(RuntimeError::NullReference),
            Some(other) => Err(RuntimeError::InvalidCast {
                from: other.kind_name().to_string(),
                to: "Delegate".to_string(),
            }),
        });
        Self::new(namespace, name, TypeKind::Delegate).with_method(MethodEntry::instance(
            "Invoke",
            params,
            return_type,
            invoke,
        ))
    }

    pub fn with_base(mut self, base: TypeHash) -> Self {
        self.base = Some(base);
        self
    }

    /// Roots the hierarchy; only `object` has no base.
    pub fn without_base(mut self) -> Self {
        self.base = None;
        self
    }

    pub fn with_interface(mut self, interface: TypeHash) -> Self {
        self.interfaces.push(interface);
        self
    }

    pub fn with_member(mut self, member: MemberEntry) -> Self {
        self.add_member(member);
        self
    }

    pub fn with_method(mut self, method: MethodEntry) -> Self {
        self.add_method(method);
        self
    }

    pub fn add_member(&mut self, mut member: MemberEntry) {
        member.declaring_type = self.type_hash;
        self.members.push(Arc::new(member));
    }

    pub fn add_method(&mut self, mut method: MethodEntry) {
        method.declaring_type = self.type_hash;
        self.methods.push(Arc::new(method));
    }

    /// Add a named enum constant. Only meaningful for enum entries.
    pub fn with_enum_value(self, name: &str, bits: i64) -> Self {
        let data_type = self.data_type();
        let value = Value::Enum {
            type_hash: self.type_hash,
            bits,
        };
        self.with_member(MemberEntry::constant_of(name, data_type, value))
    }

    pub fn data_type(&self) -> DataType {
        DataType::simple(self.type_hash)
    }

    pub fn qualified_name(&self) -> String {
        qualify(&self.namespace, &self.name)
    }

    pub fn enum_underlying(&self) -> Option<PrimitiveKind> {
        match self.kind {
            TypeKind::Enum { underlying } => Some(underlying),
            _ => None,
        }
    }

    /// Value types are never `null` and are boxed when converted to `object`.
    pub fn is_value_type(&self) -> bool {
        matches!(
            self.kind,
            TypeKind::Primitive(_) | TypeKind::Struct | TypeKind::Enum { .. }
        )
    }

    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }

    pub fn is_delegate(&self) -> bool {
        self.kind == TypeKind::Delegate
    }

    /// Name of an enum value, for display.
    pub fn enum_name_of(&self, bits: i64) -> Option<&str> {
        self.members
            .iter()
            .filter(|m| m.is_static)
            .find(|m| {
                matches!(m.getter.call(None, &[]), Ok(Value::Enum { bits: b, .. }) if b == bits)
            })
            .map(|m| m.name.as_str())
    }
}

fn qualify(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{namespace}.{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_entries_share_primitive_hashes() {
        for kind in PrimitiveKind::ALL {
            assert_eq!(TypeEntry::primitive(kind).type_hash, kind.type_hash());
        }
    }

    #[test]
    fn members_get_declaring_type() {
        let entry = TypeEntry::class("App", "User").with_member(MemberEntry::property(
            "Name",
            DataType::string(),
            NativeFn::constant(Value::from("x")),
        ));
        assert_eq!(entry.qualified_name(), "App.User");
        assert_eq!(entry.members[0].declaring_type, entry.type_hash);
        assert_eq!(entry.base, Some(primitives::OBJECT));
    }

    #[test]
    fn enum_values_are_typed_constants() {
        let entry = TypeEntry::enumeration("App", "Color", PrimitiveKind::Int32)
            .with_enum_value("Red", 1)
            .with_enum_value("Blue", 2);
        let blue = &entry.members[1];
        assert!(blue.is_static);
        assert_eq!(blue.data_type, entry.data_type());
        assert_eq!(entry.enum_name_of(2), Some("Blue"));
        assert_eq!(entry.enum_underlying(), Some(PrimitiveKind::Int32));
    }

    #[test]
    fn delegate_invoke_forwards_to_value() {
        let entry = TypeEntry::delegate(
            "App",
            "Doubler",
            vec![Param::new("x", DataType::int32())],
            DataType::int32(),
        );
        let target = Value::Delegate(crate::DelegateRef::new(entry.type_hash, |args| {
            Ok(Value::Int32(args[0].as_i32().unwrap_or(0) * 2))
        }));
        let invoke = &entry.methods[0];
        assert_eq!(invoke.name, "Invoke");
        assert_eq!(
            invoke.native.call(Some(&target), &[Value::Int32(21)]).unwrap(),
            Value::Int32(42)
        );
    }
}
