//! Scalar widening table.
//!
//! One row per source scalar listing every type it converts to without an
//! explicit cast. The table is deliberately narrower than the full language
//! rules: there is no implicit integer to `decimal` widening, and signed
//! integers never widen to unsigned ones.

use bitflags::bitflags;
use sharpexpr_core::{DataType, PrimitiveKind};

bitflags! {
    /// A set of scalar slots. `STRING` only ever converts to itself.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PrimitiveSet: u16 {
        const BOOL = 1 << 0;
        const CHAR = 1 << 1;
        const INT8 = 1 << 2;
        const UINT8 = 1 << 3;
        const INT16 = 1 << 4;
        const UINT16 = 1 << 5;
        const INT32 = 1 << 6;
        const UINT32 = 1 << 7;
        const INT64 = 1 << 8;
        const UINT64 = 1 << 9;
        const FLOAT = 1 << 10;
        const DOUBLE = 1 << 11;
        const DECIMAL = 1 << 12;
        const STRING = 1 << 13;
    }
}

impl PrimitiveSet {
    pub const fn of(kind: PrimitiveKind) -> Self {
        match kind {
            PrimitiveKind::Bool => Self::BOOL,
            PrimitiveKind::Char => Self::CHAR,
            PrimitiveKind::Int8 => Self::INT8,
            PrimitiveKind::UInt8 => Self::UINT8,
            PrimitiveKind::Int16 => Self::INT16,
            PrimitiveKind::UInt16 => Self::UINT16,
            PrimitiveKind::Int32 => Self::INT32,
            PrimitiveKind::UInt32 => Self::UINT32,
            PrimitiveKind::Int64 => Self::INT64,
            PrimitiveKind::UInt64 => Self::UINT64,
            PrimitiveKind::Float => Self::FLOAT,
            PrimitiveKind::Double => Self::DOUBLE,
            PrimitiveKind::Decimal => Self::DECIMAL,
        }
    }

    /// Slot of a plain scalar or `string`; `None` for anything else,
    /// enums included.
    pub fn slot(data_type: &DataType) -> Option<Self> {
        if data_type.is_string() {
            return Some(Self::STRING);
        }
        data_type.primitive_kind().map(Self::of)
    }

    /// Everything `self` (a single slot) widens to, itself included.
    pub fn widening_targets(self) -> Self {
        const FLOATING: PrimitiveSet = PrimitiveSet::FLOAT.union(PrimitiveSet::DOUBLE);

        if self == Self::CHAR {
            Self::CHAR
                | Self::UINT16
                | Self::UINT32
                | Self::INT32
                | Self::UINT64
                | Self::INT64
                | FLOATING
        } else if self == Self::INT8 {
            Self::INT8 | Self::INT16 | Self::INT32 | Self::INT64 | FLOATING
        } else if self == Self::UINT8 {
            Self::UINT8
                | Self::CHAR
                | Self::UINT16
                | Self::INT16
                | Self::UINT32
                | Self::INT32
                | Self::UINT64
                | Self::INT64
                | FLOATING
        } else if self == Self::INT16 {
            Self::INT16 | Self::INT32 | Self::INT64 | FLOATING
        } else if self == Self::UINT16 {
            Self::UINT16 | Self::UINT32 | Self::INT32 | Self::UINT64 | Self::INT64 | FLOATING
        } else if self == Self::INT32 {
            Self::INT32 | Self::INT64 | FLOATING
        } else if self == Self::UINT32 {
            Self::UINT32 | Self::UINT64 | Self::INT64 | FLOATING
        } else if self == Self::INT64 || self == Self::UINT64 {
            self | FLOATING
        } else if self == Self::FLOAT {
            FLOATING
        } else {
            // bool, double, decimal and string only convert to themselves.
            self
        }
    }
}

/// Whether `source` widens to `target` through the scalar table.
pub fn can_convert_primitive(source: &DataType, target: &DataType) -> bool {
    match (PrimitiveSet::slot(source), PrimitiveSet::slot(target)) {
        (Some(from), Some(to)) => from.widening_targets().contains(to),
        _ => false,
    }
}

/// Kinds whose table row is used for parameter matching. Everything else
/// goes through reference assignability.
pub fn uses_primitive_table(data_type: &DataType) -> bool {
    data_type.primitive_kind().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use PrimitiveKind::*;

    fn widens(from: PrimitiveKind, to: PrimitiveKind) -> bool {
        can_convert_primitive(&from.into(), &to.into())
    }

    #[test]
    fn signed_integers_widen_along_signed_lattice() {
        assert!(widens(Int8, Int16));
        assert!(widens(Int8, Double));
        assert!(widens(Int32, Int64));
        assert!(!widens(Int8, UInt16));
        assert!(!widens(Int64, Int32));
    }

    #[test]
    fn unsigned_integers_widen_to_larger_signed() {
        assert!(widens(UInt8, Int16));
        assert!(widens(UInt32, Int64));
        assert!(!widens(UInt32, Int32));
        assert!(!widens(UInt64, Int64));
    }

    #[test]
    fn char_widens_to_integers_and_floats() {
        assert!(widens(Char, Int32));
        assert!(widens(Char, Double));
        assert!(!widens(Char, Int16));
        assert!(widens(UInt8, Char));
    }

    #[test]
    fn decimal_is_isolated() {
        assert!(!widens(Int32, Decimal));
        assert!(!widens(Decimal, Double));
        assert!(widens(Decimal, Decimal));
        assert!(!widens(Bool, Int32));
    }

    #[test]
    fn string_converts_only_to_itself() {
        assert!(can_convert_primitive(&DataType::string(), &DataType::string()));
        assert!(!can_convert_primitive(&DataType::string(), &DataType::object()));
        assert!(!can_convert_primitive(&DataType::object(), &DataType::int32()));
    }
}
