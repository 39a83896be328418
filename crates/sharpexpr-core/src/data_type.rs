//! DataType - a type hash plus the shape modifiers the language knows about.
//!
//! [`TypeHash`] identifies a declared type; [`DataType`] adds nullability
//! (`int?`) and array rank (`string[]`, `int[][]`). Arrays of nullable values
//! keep the nullable flag on the element.
//!
//! # Example
//!
//! ```
//! use sharpexpr_core::{DataType, primitives};
//!
//! let int_array = DataType::simple(primitives::INT32).array_of();
//! assert!(int_array.is_array());
//! assert_eq!(int_array.element_type(), Some(DataType::simple(primitives::INT32)));
//!
//! let maybe = DataType::nullable(primitives::INT32);
//! assert_eq!(maybe.underlying(), DataType::simple(primitives::INT32));
//! ```

use crate::{PrimitiveKind, TypeHash, primitives};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DataType {
    /// The declared (element) type.
    pub type_hash: TypeHash,
    /// `T?` for value types.
    pub nullable: bool,
    /// Number of array dimensions wrapped around the element type.
    pub rank: u8,
}

impl DataType {
    pub const fn simple(type_hash: TypeHash) -> Self {
        Self {
            type_hash,
            nullable: false,
            rank: 0,
        }
    }

    pub const fn nullable(type_hash: TypeHash) -> Self {
        Self {
            type_hash,
            nullable: true,
            rank: 0,
        }
    }

    pub const fn void() -> Self {
        Self::simple(primitives::VOID)
    }

    pub const fn object() -> Self {
        Self::simple(primitives::OBJECT)
    }

    pub const fn string() -> Self {
        Self::simple(primitives::STRING)
    }

    pub const fn bool() -> Self {
        Self::simple(primitives::BOOL)
    }

    pub const fn int32() -> Self {
        Self::simple(primitives::INT32)
    }

    pub const fn primitive(kind: PrimitiveKind) -> Self {
        Self::simple(kind.type_hash())
    }

    /// One more array dimension around this type.
    pub const fn array_of(self) -> Self {
        Self {
            rank: self.rank + 1,
            ..self
        }
    }

    pub const fn is_array(&self) -> bool {
        self.rank > 0
    }

    /// `true` only for `T?` itself, not for arrays of `T?`.
    pub const fn is_nullable(&self) -> bool {
        self.rank == 0 && self.nullable
    }

    pub fn element_type(&self) -> Option<DataType> {
        if self.rank == 0 {
            return None;
        }
        Some(Self {
            rank: self.rank - 1,
            ..*self
        })
    }

    /// `T` for `T?`, otherwise the type itself.
    pub const fn underlying(&self) -> DataType {
        if self.is_nullable() {
            Self::simple(self.type_hash)
        } else {
            *self
        }
    }

    /// The scalar kind, if this is a plain primitive (not nullable, not an array).
    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        if self.rank != 0 || self.nullable {
            return None;
        }
        PrimitiveKind::from_hash(self.type_hash)
    }

    pub fn is_primitive(&self, kind: PrimitiveKind) -> bool {
        self.primitive_kind() == Some(kind)
    }

    pub fn is_numeric(&self) -> bool {
        self.primitive_kind().is_some_and(PrimitiveKind::is_numeric)
    }

    pub fn is_integer(&self) -> bool {
        self.primitive_kind().is_some_and(PrimitiveKind::is_integer)
    }

    pub fn is_bool(&self) -> bool {
        *self == Self::bool()
    }

    pub fn is_string(&self) -> bool {
        *self == Self::string()
    }

    pub fn is_object(&self) -> bool {
        *self == Self::object()
    }

    pub fn is_void(&self) -> bool {
        *self == Self::void()
    }
}

impl From<PrimitiveKind> for DataType {
    fn from(kind: PrimitiveKind) -> Self {
        DataType::primitive(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jagged_array_element_types() {
        let jagged = DataType::string().array_of().array_of();
        assert_eq!(jagged.rank, 2);
        let inner = jagged.element_type().unwrap();
        assert_eq!(inner, DataType::string().array_of());
        assert_eq!(inner.element_type(), Some(DataType::string()));
        assert_eq!(DataType::string().element_type(), None);
    }

    #[test]
    fn nullable_arrays_are_not_nullable() {
        let arr = DataType::nullable(primitives::INT32).array_of();
        assert!(!arr.is_nullable());
        assert!(arr.element_type().unwrap().is_nullable());
    }

    #[test]
    fn primitive_kind_only_for_plain_scalars() {
        assert_eq!(DataType::int32().primitive_kind(), Some(PrimitiveKind::Int32));
        assert_eq!(DataType::nullable(primitives::INT32).primitive_kind(), None);
        assert_eq!(DataType::int32().array_of().primitive_kind(), None);
        assert!(DataType::simple(primitives::CHAR).is_numeric());
        assert!(!DataType::simple(primitives::CHAR).is_integer());
    }
}
