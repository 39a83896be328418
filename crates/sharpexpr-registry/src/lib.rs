//! Type registry for sharpexpr.
//!
//! [`TypeRegistry`] holds every [`TypeEntry`](sharpexpr_core::TypeEntry) the
//! binder can see and answers structural questions about them: assignability,
//! base chains, member and method enumeration, and diagnostic names.

mod registry;

pub use registry::TypeRegistry;
