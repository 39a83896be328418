//! Registry entries: the explicit descriptors that stand in for runtime
//! reflection.
//!
//! - [`TypeEntry`]: a type with its kind, base chain and members
//! - [`MemberEntry`]: a field, property, constant or indexer
//! - [`MethodEntry`]: a method overload with its parameter list
//!
//! Every member and method carries an explicit `is_static` flag and its
//! declaring type, set when it is attached to a [`TypeEntry`].

mod member;
mod method;
mod type_entry;

pub use member::{MemberEntry, MemberKind};
pub use method::{MethodEntry, Param};
pub use type_entry::{TypeEntry, TypeKind};

/// Case-insensitive comparison of member and type names.
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}
