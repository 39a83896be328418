//! Symbol resolution.
//!
//! A [`Binder`] maps names to types, members and best-matching methods. It is
//! the only seam through which a host exposes symbols to expressions:
//!
//! - [`DefaultBinder`] answers from a built-in name table plus host-registered
//!   types, with library-wide lookup over every static-import type.
//! - [`ContextBinder`] decorates a [`DefaultBinder`] with an implicit receiver,
//!   so bare names resolve against the receiver's members first.
//!
//! Lookups never fail on "not found"; they return `Ok(None)`. Ambiguity is the
//! only lookup error.

mod context;
mod default;

use std::sync::Arc;

use sharpexpr_core::{BindError, DataType, MemberEntry, MethodEntry};
use sharpexpr_registry::TypeRegistry;
use sharpexpr_syntax::Identifier;

use crate::typed::TypedExpr;

pub use context::ContextBinder;
pub use default::{BUILTIN_TYPES, DefaultBinder};

/// Name resolution policy used by the [`ExpressionBuilder`](crate::ExpressionBuilder).
pub trait Binder {
    /// The type universe every descriptor handed out belongs to.
    fn types(&self) -> &TypeRegistry;

    /// The implicit receiver, if any.
    fn context(&self) -> Option<&TypedExpr> {
        None
    }

    fn bind_type(&self, name: &Identifier) -> Option<DataType>;

    /// A field or property of `owner`, or a library-wide lookup when `owner`
    /// is `None`. Indexers are never returned.
    fn bind_member(
        &self,
        owner: Option<&DataType>,
        name: &Identifier,
        is_static: bool,
    ) -> Result<Option<Arc<MemberEntry>>, BindError>;

    /// The most specific overload of `name` for `arg_types`.
    fn bind_method(
        &self,
        owner: Option<&DataType>,
        name: &Identifier,
        arg_types: &[DataType],
        is_static: bool,
    ) -> Result<Option<Arc<MethodEntry>>, BindError>;
}
