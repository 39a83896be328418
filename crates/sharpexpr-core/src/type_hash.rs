//! Deterministic hash-based type identity.
//!
//! Every type known to the expression language is identified by a [`TypeHash`]
//! computed from its qualified name (`System.Int32`, `MyApp.UserInfo`). Hashes
//! are computed in `const` context, so well-known types are plain constants and
//! hosts can name their own types before registering them.
//!
//! # Examples
//!
//! ```
//! use sharpexpr_core::{TypeHash, primitives};
//!
//! let int_hash = TypeHash::from_name("System.Int32");
//! assert_eq!(int_hash, primitives::INT32);
//! ```

use std::fmt;
use xxhash_rust::const_xxh64::xxh64;

/// Domain marker mixed into every type hash.
const TYPE_DOMAIN: u64 = 0x2fac10b63a6cc57c;

/// A deterministic 64-bit hash identifying a type.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeHash(pub u64);

impl TypeHash {
    /// Empty/invalid hash constant.
    pub const EMPTY: TypeHash = TypeHash(0);

    /// Create a type hash from a qualified type name.
    ///
    /// Names are hashed verbatim; case-insensitive lookup is the binder's job.
    #[inline]
    pub const fn from_name(name: &str) -> Self {
        TypeHash(TYPE_DOMAIN ^ xxh64(name.as_bytes(), 0))
    }

    /// Check if this is the empty hash.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHash({:#018x})", self.0)
    }
}

impl fmt::Display for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

/// Hashes of the types the language itself depends on.
pub mod primitives {
    use super::TypeHash;

    pub const VOID: TypeHash = TypeHash::from_name("System.Void");
    pub const BOOL: TypeHash = TypeHash::from_name("System.Boolean");
    pub const CHAR: TypeHash = TypeHash::from_name("System.Char");
    /// `sbyte`
    pub const INT8: TypeHash = TypeHash::from_name("System.SByte");
    /// `byte`
    pub const UINT8: TypeHash = TypeHash::from_name("System.Byte");
    pub const INT16: TypeHash = TypeHash::from_name("System.Int16");
    pub const UINT16: TypeHash = TypeHash::from_name("System.UInt16");
    pub const INT32: TypeHash = TypeHash::from_name("System.Int32");
    pub const UINT32: TypeHash = TypeHash::from_name("System.UInt32");
    pub const INT64: TypeHash = TypeHash::from_name("System.Int64");
    pub const UINT64: TypeHash = TypeHash::from_name("System.UInt64");
    /// `float` (32-bit IEEE)
    pub const FLOAT: TypeHash = TypeHash::from_name("System.Single");
    pub const DOUBLE: TypeHash = TypeHash::from_name("System.Double");
    pub const DECIMAL: TypeHash = TypeHash::from_name("System.Decimal");
    pub const STRING: TypeHash = TypeHash::from_name("System.String");
    /// The root of the type hierarchy.
    pub const OBJECT: TypeHash = TypeHash::from_name("System.Object");
    /// Base entry shared by every array type.
    pub const ARRAY: TypeHash = TypeHash::from_name("System.Array");
    /// Base entry shared by every `T?` type.
    pub const NULLABLE: TypeHash = TypeHash::from_name("System.Nullable");
}

/// Hashes of the built-in library types the default binder names.
pub mod library {
    use super::TypeHash;

    pub const MATH: TypeHash = TypeHash::from_name("System.Math");
    pub const MATHF: TypeHash = TypeHash::from_name("System.MathF");
    pub const CONVERT: TypeHash = TypeHash::from_name("System.Convert");
    pub const DAY_OF_WEEK: TypeHash = TypeHash::from_name("System.DayOfWeek");
    pub const STRING_COMPARISON: TypeHash = TypeHash::from_name("System.StringComparison");
    pub const STRING_SPLIT_OPTIONS: TypeHash = TypeHash::from_name("System.StringSplitOptions");
    pub const TIME_SPAN: TypeHash = TypeHash::from_name("System.TimeSpan");
    pub const DATE_TIME: TypeHash = TypeHash::from_name("System.DateTime");
    pub const DATE_TIME_KIND: TypeHash = TypeHash::from_name("System.DateTimeKind");
    pub const GUID: TypeHash = TypeHash::from_name("System.Guid");
    pub const REGEX: TypeHash = TypeHash::from_name("System.Text.RegularExpressions.Regex");
    pub const REGEX_OPTIONS: TypeHash =
        TypeHash::from_name("System.Text.RegularExpressions.RegexOptions");
}
