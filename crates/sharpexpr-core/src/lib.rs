//! Core types shared by every sharpexpr crate.
//!
//! ## Modules
//!
//! - [`type_hash`]: deterministic type identity and the well-known [`primitives`]
//! - [`data_type`]: a type plus nullability and array rank
//! - [`value`]: runtime values carried by literals and produced by evaluation
//! - [`entries`]: type, member and method descriptors stored in the registry
//! - [`native_fn`]: type-erased host callables behind getters and methods
//! - [`ops`]: binary and unary operators
//! - [`error`]: bind, registration and runtime errors

pub mod data_type;
pub mod entries;
pub mod error;
pub mod native_fn;
pub mod ops;
pub mod primitive_kind;
pub mod type_hash;
pub mod value;

pub use data_type::DataType;
pub use entries::{
    MemberEntry, MemberKind, MethodEntry, Param, TypeEntry, TypeKind, eq_ignore_case,
};
pub use error::{BindError, RegistrationError, RuntimeError};
pub use native_fn::{NativeCallable, NativeFn, receiver};
pub use ops::{BinaryOp, UnaryOp};
pub use primitive_kind::PrimitiveKind;
pub use type_hash::{TypeHash, library, primitives};
pub use value::{ArrayValue, DelegateRef, FromValue, ObjectRef, Value, arg};

pub use rust_decimal::Decimal;
