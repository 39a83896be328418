//! Semantic binding for the sharpexpr expression language.
//!
//! This crate turns a parsed [`Expr`](sharpexpr_syntax::Expr) into a
//! [`TypedExpr`]: every name is resolved through a [`Binder`], implicit
//! conversions and numeric promotions are made explicit, and every call is
//! pinned to a single overload.
//!
//! # Layers
//!
//! - [`conversion`] - scalar widening table, user-defined conversion operators
//! - [`overload`] - most-specific overload selection
//! - [`binder`] - the [`Binder`] seam with [`DefaultBinder`] and [`ContextBinder`]
//! - [`operators`] - validation of operator nodes after promotion
//! - [`expr`] - the [`ExpressionBuilder`]
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use sharpexpr_compiler::{DefaultBinder, ExpressionBuilder};
//! use sharpexpr_core::DataType;
//! use sharpexpr_syntax::Expr;
//!
//! let registry = Arc::new(sharpexpr_modules::standard_registry().unwrap());
//! let binder = DefaultBinder::new(registry);
//! let expr = Expr::binary("+", Expr::literal(1), Expr::literal(1.0));
//! let typed = ExpressionBuilder::new(&binder).build(&expr).unwrap();
//! assert_eq!(typed.data_type(), DataType::primitive(sharpexpr_core::PrimitiveKind::Double));
//! ```

pub mod binder;
pub mod conversion;
pub mod expr;
pub mod operators;
pub mod overload;
pub mod typed;

pub use binder::{Binder, ContextBinder, DefaultBinder};
pub use expr::ExpressionBuilder;
pub use typed::TypedExpr;
