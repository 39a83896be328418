//! Syntax tree consumed by the sharpexpr binder.
//!
//! Parsing is done elsewhere; this crate only defines the tree shape a parser
//! must produce. See [`Expr`].

pub mod ast;

pub use ast::{Expr, Identifier, UnaryType};
