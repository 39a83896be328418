use crate::{DataType, NativeFn, TypeHash, Value};

use super::Param;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Field,
    Property,
    Constant,
}

/// A field, property, constant or indexer of some type.
#[derive(Debug, Clone)]
pub struct MemberEntry {
    pub name: String,
    /// Set by [`TypeEntry`](super::TypeEntry) when the member is attached.
    pub declaring_type: TypeHash,
    pub data_type: DataType,
    pub is_static: bool,
    pub kind: MemberKind,
    /// Index parameters; non-empty only for indexers.
    pub params: Vec<Param>,
    /// Receives the instance (`None` for statics) and the index arguments.
    pub getter: NativeFn,
}

impl MemberEntry {
    fn new(name: &str, data_type: DataType, is_static: bool, kind: MemberKind, getter: NativeFn) -> Self {
        Self {
            name: name.to_string(),
            declaring_type: TypeHash::EMPTY,
            data_type,
            is_static,
            kind,
            params: Vec::new(),
            getter,
        }
    }

    pub fn property(name: &str, data_type: DataType, getter: NativeFn) -> Self {
        Self::new(name, data_type, false, MemberKind::Property, getter)
    }

    pub fn static_property(name: &str, data_type: DataType, getter: NativeFn) -> Self {
        Self::new(name, data_type, true, MemberKind::Property, getter)
    }

    pub fn field(name: &str, data_type: DataType, getter: NativeFn) -> Self {
        Self::new(name, data_type, false, MemberKind::Field, getter)
    }

    pub fn static_field(name: &str, data_type: DataType, getter: NativeFn) -> Self {
        Self::new(name, data_type, true, MemberKind::Field, getter)
    }

    /// A static constant. The declared type is taken from the value unless
    /// overridden (enum members declare the enum type).
    pub fn constant(name: &str, value: Value) -> Self {
        let data_type = value.data_type();
        Self::new(name, data_type, true, MemberKind::Constant, NativeFn::constant(value))
    }

    pub fn constant_of(name: &str, data_type: DataType, value: Value) -> Self {
        Self::new(name, data_type, true, MemberKind::Constant, NativeFn::constant(value))
    }

    /// An indexed instance property such as `String.Chars[int]`.
    pub fn indexer(name: &str, params: Vec<Param>, data_type: DataType, getter: NativeFn) -> Self {
        Self {
            params,
            ..Self::new(name, data_type, false, MemberKind::Property, getter)
        }
    }

    pub fn is_indexer(&self) -> bool {
        !self.params.is_empty()
    }

    /// Case-insensitive name comparison.
    pub fn name_matches(&self, name: &str) -> bool {
        super::eq_ignore_case(&self.name, name)
    }
}
