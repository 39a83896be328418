//! Primitive scalar kinds of the expression language.

use std::fmt;

use crate::{TypeHash, primitives};

/// Built-in scalar kinds.
///
/// `Decimal` is included even though it is not a machine primitive: it takes
/// part in numeric promotion and explicit numeric conversions like the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    Char,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float,
    Double,
    Decimal,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 13] = [
        PrimitiveKind::Bool,
        PrimitiveKind::Char,
        PrimitiveKind::Int8,
        PrimitiveKind::UInt8,
        PrimitiveKind::Int16,
        PrimitiveKind::UInt16,
        PrimitiveKind::Int32,
        PrimitiveKind::UInt32,
        PrimitiveKind::Int64,
        PrimitiveKind::UInt64,
        PrimitiveKind::Float,
        PrimitiveKind::Double,
        PrimitiveKind::Decimal,
    ];

    /// Get the TypeHash for this primitive type.
    pub const fn type_hash(self) -> TypeHash {
        match self {
            PrimitiveKind::Bool => primitives::BOOL,
            PrimitiveKind::Char => primitives::CHAR,
            PrimitiveKind::Int8 => primitives::INT8,
            PrimitiveKind::UInt8 => primitives::UINT8,
            PrimitiveKind::Int16 => primitives::INT16,
            PrimitiveKind::UInt16 => primitives::UINT16,
            PrimitiveKind::Int32 => primitives::INT32,
            PrimitiveKind::UInt32 => primitives::UINT32,
            PrimitiveKind::Int64 => primitives::INT64,
            PrimitiveKind::UInt64 => primitives::UINT64,
            PrimitiveKind::Float => primitives::FLOAT,
            PrimitiveKind::Double => primitives::DOUBLE,
            PrimitiveKind::Decimal => primitives::DECIMAL,
        }
    }

    /// Reverse of [`PrimitiveKind::type_hash`].
    pub fn from_hash(hash: TypeHash) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.type_hash() == hash)
    }

    /// Unqualified runtime name (`Int32`, `Single`).
    pub const fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Bool => "Boolean",
            PrimitiveKind::Char => "Char",
            PrimitiveKind::Int8 => "SByte",
            PrimitiveKind::UInt8 => "Byte",
            PrimitiveKind::Int16 => "Int16",
            PrimitiveKind::UInt16 => "UInt16",
            PrimitiveKind::Int32 => "Int32",
            PrimitiveKind::UInt32 => "UInt32",
            PrimitiveKind::Int64 => "Int64",
            PrimitiveKind::UInt64 => "UInt64",
            PrimitiveKind::Float => "Single",
            PrimitiveKind::Double => "Double",
            PrimitiveKind::Decimal => "Decimal",
        }
    }

    /// Char and decimal count as numeric; bool does not.
    pub const fn is_numeric(self) -> bool {
        !matches!(self, PrimitiveKind::Bool)
    }

    /// Integral types, excluding char.
    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            PrimitiveKind::Int8
                | PrimitiveKind::UInt8
                | PrimitiveKind::Int16
                | PrimitiveKind::UInt16
                | PrimitiveKind::Int32
                | PrimitiveKind::UInt32
                | PrimitiveKind::Int64
                | PrimitiveKind::UInt64
        )
    }

    pub const fn is_signed(self) -> bool {
        matches!(
            self,
            PrimitiveKind::Int8
                | PrimitiveKind::Int16
                | PrimitiveKind::Int32
                | PrimitiveKind::Int64
                | PrimitiveKind::Float
                | PrimitiveKind::Double
                | PrimitiveKind::Decimal
        )
    }

    pub const fn is_floating(self) -> bool {
        matches!(self, PrimitiveKind::Float | PrimitiveKind::Double)
    }

    /// Integral types narrower than 32 bits, which unary and shift operators
    /// promote to `int`.
    pub const fn is_small_integer(self) -> bool {
        matches!(
            self,
            PrimitiveKind::Int8 | PrimitiveKind::UInt8 | PrimitiveKind::Int16 | PrimitiveKind::UInt16
        )
    }

    /// Bit width of integral kinds (char counts as 16).
    pub const fn bit_width(self) -> Option<u32> {
        match self {
            PrimitiveKind::Int8 | PrimitiveKind::UInt8 => Some(8),
            PrimitiveKind::Int16 | PrimitiveKind::UInt16 | PrimitiveKind::Char => Some(16),
            PrimitiveKind::Int32 | PrimitiveKind::UInt32 => Some(32),
            PrimitiveKind::Int64 | PrimitiveKind::UInt64 => Some(64),
            _ => None,
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_round_trips_for_every_kind() {
        for kind in PrimitiveKind::ALL {
            assert_eq!(PrimitiveKind::from_hash(kind.type_hash()), Some(kind));
        }
        assert_eq!(PrimitiveKind::from_hash(primitives::STRING), None);
    }

    #[test]
    fn classification() {
        assert!(PrimitiveKind::Char.is_numeric());
        assert!(!PrimitiveKind::Char.is_integer());
        assert!(PrimitiveKind::Decimal.is_numeric());
        assert!(!PrimitiveKind::Bool.is_numeric());
        assert!(PrimitiveKind::UInt8.is_small_integer());
        assert!(!PrimitiveKind::Int32.is_small_integer());
        assert!(!PrimitiveKind::UInt64.is_signed());
    }
}
