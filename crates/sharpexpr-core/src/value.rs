//! Runtime values.
//!
//! [`Value`] is what literals carry into the AST and what evaluation produces.
//! Scalars are stored unboxed; host objects are reference-counted and compared
//! by identity.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use rust_decimal::Decimal;

use crate::{DataType, PrimitiveKind, RuntimeError, TypeHash};

#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Char(char),
    Int8(i8),
    UInt8(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Float(f32),
    Double(f64),
    Decimal(Decimal),
    String(Arc<str>),
    /// Enum value stored as the raw bits of its underlying integer.
    Enum { type_hash: TypeHash, bits: i64 },
    Array(ArrayValue),
    Object(ObjectRef),
    Delegate(DelegateRef),
}

impl Value {
    pub fn string(s: impl Into<Arc<str>>) -> Self {
        Value::String(s.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The runtime type of this value. `null` reports `object`.
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Null => DataType::object(),
            Value::String(_) => DataType::string(),
            Value::Enum { type_hash, .. } => DataType::simple(*type_hash),
            Value::Array(array) => array.element.array_of(),
            Value::Object(obj) => DataType::simple(obj.type_hash),
            Value::Delegate(d) => DataType::simple(d.type_hash),
            other => match other.primitive_kind() {
                Some(kind) => DataType::primitive(kind),
                None => DataType::object(),
            },
        }
    }

    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        Some(match self {
            Value::Bool(_) => PrimitiveKind::Bool,
            Value::Char(_) => PrimitiveKind::Char,
            Value::Int8(_) => PrimitiveKind::Int8,
            Value::UInt8(_) => PrimitiveKind::UInt8,
            Value::Int16(_) => PrimitiveKind::Int16,
            Value::UInt16(_) => PrimitiveKind::UInt16,
            Value::Int32(_) => PrimitiveKind::Int32,
            Value::UInt32(_) => PrimitiveKind::UInt32,
            Value::Int64(_) => PrimitiveKind::Int64,
            Value::UInt64(_) => PrimitiveKind::UInt64,
            Value::Float(_) => PrimitiveKind::Float,
            Value::Double(_) => PrimitiveKind::Double,
            Value::Decimal(_) => PrimitiveKind::Decimal,
            _ => return None,
        })
    }

    /// Short description used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::String(_) => "String",
            Value::Enum { .. } => "Enum",
            Value::Array(_) => "Array",
            Value::Object(_) => "Object",
            Value::Delegate(_) => "Delegate",
            other => other.primitive_kind().map_or("Object", PrimitiveKind::name),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Int32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// Integral value widened to `i128`, including chars and enums.
    pub fn as_integer(&self) -> Option<i128> {
        Some(match self {
            Value::Char(c) => *c as u32 as i128,
            Value::Int8(v) => *v as i128,
            Value::UInt8(v) => *v as i128,
            Value::Int16(v) => *v as i128,
            Value::UInt16(v) => *v as i128,
            Value::Int32(v) => *v as i128,
            Value::UInt32(v) => *v as i128,
            Value::Int64(v) => *v as i128,
            Value::UInt64(v) => *v as i128,
            Value::Enum { bits, .. } => *bits as i128,
            _ => return None,
        })
    }

    pub fn as_array(&self) -> Option<&ArrayValue> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Int8(a), Value::Int8(b)) => a == b,
            (Value::UInt8(a), Value::UInt8(b)) => a == b,
            (Value::Int16(a), Value::Int16(b)) => a == b,
            (Value::UInt16(a), Value::UInt16(b)) => a == b,
            (Value::Int32(a), Value::Int32(b)) => a == b,
            (Value::UInt32(a), Value::UInt32(b)) => a == b,
            (Value::Int64(a), Value::Int64(b)) => a == b,
            (Value::UInt64(a), Value::UInt64(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::Decimal(a), Value::Decimal(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (
                Value::Enum { type_hash: ta, bits: a },
                Value::Enum { type_hash: tb, bits: b },
            ) => ta == tb && a == b,
            (Value::Array(a), Value::Array(b)) => Arc::ptr_eq(&a.items, &b.items),
            (Value::Object(a), Value::Object(b)) => a.value_eq(b),
            (Value::Delegate(a), Value::Delegate(b)) => Arc::ptr_eq(&a.body, &b.body),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Bool(v) => write!(f, "Bool({v})"),
            Value::Char(v) => write!(f, "Char({v:?})"),
            Value::Int8(v) => write!(f, "Int8({v})"),
            Value::UInt8(v) => write!(f, "UInt8({v})"),
            Value::Int16(v) => write!(f, "Int16({v})"),
            Value::UInt16(v) => write!(f, "UInt16({v})"),
            Value::Int32(v) => write!(f, "Int32({v})"),
            Value::UInt32(v) => write!(f, "UInt32({v})"),
            Value::Int64(v) => write!(f, "Int64({v})"),
            Value::UInt64(v) => write!(f, "UInt64({v})"),
            Value::Float(v) => write!(f, "Float({v:?})"),
            Value::Double(v) => write!(f, "Double({v:?})"),
            Value::Decimal(v) => write!(f, "Decimal({v})"),
            Value::String(v) => write!(f, "String({v:?})"),
            Value::Enum { type_hash, bits } => write!(f, "Enum({type_hash:?}, {bits})"),
            Value::Array(a) => f.debug_list().entries(a.items.iter()).finish(),
            Value::Object(o) => write!(f, "Object({:?})", o.type_hash),
            Value::Delegate(d) => write!(f, "Delegate({:?})", d.type_hash),
        }
    }
}

/// Invariant-culture text form, as produced by `ToString()`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Char(v) => write!(f, "{v}"),
            Value::Int8(v) => write!(f, "{v}"),
            Value::UInt8(v) => write!(f, "{v}"),
            Value::Int16(v) => write!(f, "{v}"),
            Value::UInt16(v) => write!(f, "{v}"),
            Value::Int32(v) => write!(f, "{v}"),
            Value::UInt32(v) => write!(f, "{v}"),
            Value::Int64(v) => write!(f, "{v}"),
            Value::UInt64(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::Decimal(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "{v}"),
            Value::Enum { bits, .. } => write!(f, "{bits}"),
            Value::Array(_) => write!(f, "System.Array"),
            Value::Object(o) => write!(f, "{o}"),
            Value::Delegate(_) => write!(f, "System.Delegate"),
        }
    }
}

// ============================================================================
// Reference payloads
// ============================================================================

/// A one-dimensional array; jagged arrays nest these.
#[derive(Clone)]
pub struct ArrayValue {
    pub element: DataType,
    pub items: Arc<[Value]>,
}

impl ArrayValue {
    pub fn new(element: DataType, items: Vec<Value>) -> Self {
        Self {
            element,
            items: items.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: i64) -> Option<&Value> {
        usize::try_from(index).ok().and_then(|i| self.items.get(i))
    }
}

type Payload = dyn Any + Send + Sync;
type FmtFn = fn(&Payload, &mut fmt::Formatter<'_>) -> fmt::Result;
type EqFn = fn(&Payload, &Payload) -> bool;

fn fmt_payload<T: Any + fmt::Display>(payload: &Payload, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match payload.downcast_ref::<T>() {
        Some(value) => value.fmt(f),
        None => Ok(()),
    }
}

fn eq_payload<T: Any + PartialEq>(a: &Payload, b: &Payload) -> bool {
    matches!((a.downcast_ref::<T>(), b.downcast_ref::<T>()), (Some(a), Some(b)) if a == b)
}

/// A host object exposed to expressions.
///
/// Objects built with [`ObjectRef::new`] compare by identity. Objects built
/// with [`ObjectRef::value`] compare and print through their payload, which
/// is how library structs like `TimeSpan` behave.
#[derive(Clone)]
pub struct ObjectRef {
    type_hash: TypeHash,
    inner: Arc<Payload>,
    fmt: Option<FmtFn>,
    eq: Option<EqFn>,
}

impl ObjectRef {
    pub fn new<T: Any + Send + Sync>(type_hash: TypeHash, value: T) -> Self {
        Self {
            type_hash,
            inner: Arc::new(value),
            fmt: None,
            eq: None,
        }
    }

    pub fn value<T>(type_hash: TypeHash, value: T) -> Self
    where
        T: Any + Send + Sync + fmt::Display + PartialEq,
    {
        Self {
            type_hash,
            inner: Arc::new(value),
            fmt: Some(fmt_payload::<T>),
            eq: Some(eq_payload::<T>),
        }
    }

    pub fn type_hash(&self) -> TypeHash {
        self.type_hash
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Payload equality for value objects, identity otherwise.
    pub fn value_eq(&self, other: &ObjectRef) -> bool {
        match self.eq {
            Some(eq) if self.type_hash == other.type_hash => eq(&*self.inner, &*other.inner),
            _ => self.ptr_eq(other),
        }
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.fmt {
            Some(fmt) => fmt(&*self.inner, f),
            None => write!(f, "System.Object"),
        }
    }
}

type DelegateBody = dyn Fn(&[Value]) -> Result<Value, RuntimeError> + Send + Sync;

/// A callable value of some delegate type.
#[derive(Clone)]
pub struct DelegateRef {
    pub type_hash: TypeHash,
    body: Arc<DelegateBody>,
}

impl DelegateRef {
    pub fn new<F>(type_hash: TypeHash, body: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, RuntimeError> + Send + Sync + 'static,
    {
        Self {
            type_hash,
            body: Arc::new(body),
        }
    }

    pub fn invoke(&self, args: &[Value]) -> Result<Value, RuntimeError> {
        (self.body)(args)
    }
}

// ============================================================================
// Conversions to and from host types
// ============================================================================

/// Extraction of a host value from a [`Value`] argument.
pub trait FromValue: Sized {
    /// Type name reported when extraction fails.
    const EXPECTED: &'static str;

    fn from_value(value: &Value) -> Option<Self>;
}

/// Extract argument `index` for a native function.
pub fn arg<T: FromValue>(args: &[Value], index: usize) -> Result<T, RuntimeError> {
    let value = args.get(index).unwrap_or(&Value::Null);
    T::from_value(value).ok_or_else(|| RuntimeError::ArgumentType {
        index,
        expected: T::EXPECTED,
        found: value.kind_name().to_string(),
    })
}

macro_rules! scalar_value {
    ($($ty:ty => $variant:ident, $name:literal;)*) => {$(
        impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::$variant(v)
            }
        }

        impl FromValue for $ty {
            const EXPECTED: &'static str = $name;

            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::$variant(v) => Some(*v),
                    _ => None,
                }
            }
        }
    )*};
}

scalar_value! {
    bool => Bool, "Boolean";
    char => Char, "Char";
    i8 => Int8, "SByte";
    u8 => UInt8, "Byte";
    i16 => Int16, "Int16";
    u16 => UInt16, "UInt16";
    i32 => Int32, "Int32";
    u32 => UInt32, "UInt32";
    i64 => Int64, "Int64";
    u64 => UInt64, "UInt64";
    f32 => Float, "Single";
    f64 => Double, "Double";
    Decimal => Decimal, "Decimal";
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.into())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v.into())
    }
}

impl From<Arc<str>> for Value {
    fn from(v: Arc<str>) -> Self {
        Value::String(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl FromValue for Arc<str> {
    const EXPECTED: &'static str = "String";

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}

/// `null` is accepted and maps to `None`.
impl<T: FromValue> FromValue for Option<T> {
    const EXPECTED: &'static str = T::EXPECTED;

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl FromValue for Value {
    const EXPECTED: &'static str = "Object";

    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromValue for ArrayValue {
    const EXPECTED: &'static str = "Array";

    fn from_value(value: &Value) -> Option<Self> {
        value.as_array().cloned()
    }
}

impl From<ArrayValue> for Value {
    fn from(v: ArrayValue) -> Self {
        Value::Array(v)
    }
}

impl From<ObjectRef> for Value {
    fn from(v: ObjectRef) -> Self {
        Value::Object(v)
    }
}
