//! sharpexpr: a semantic binder and typed expression builder for a C#-like
//! expression language.
//!
//! The pipeline has three stages:
//!
//! 1. A parser (not part of this workspace) produces an untyped
//!    [`Expr`](sharpexpr_syntax::Expr) tree.
//! 2. The [`ExpressionBuilder`] resolves every name through a [`Binder`],
//!    selects overloads and makes every conversion explicit, producing a
//!    [`TypedExpr`].
//! 3. The [`Evaluator`](eval::Evaluator) walks the typed tree.
//!
//! The functions in this module wrap those stages and report every failure,
//! including a panic from host code, as a [`Failure`].
//!
//! # Example
//!
//! ```
//! use sharpexpr::{Expr, Value, evaluate};
//!
//! let expr = Expr::method_call(
//!     Expr::reference("Math"),
//!     "Max",
//!     vec![Expr::literal(1.0), Expr::literal(15)],
//! );
//! assert_eq!(evaluate(&expr).unwrap(), Value::Double(15.0));
//! ```

pub mod eval;
mod failure;

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use lazy_static::lazy_static;
use tracing::debug;

pub use failure::{Cause, Failure};
pub use sharpexpr_compiler::{Binder, ContextBinder, DefaultBinder, ExpressionBuilder, TypedExpr};
pub use sharpexpr_core::{
    BindError, DataType, MemberEntry, MethodEntry, NativeFn, Param, PrimitiveKind,
    RegistrationError, RuntimeError, TypeEntry, TypeHash, Value,
};
pub use sharpexpr_registry::TypeRegistry;
pub use sharpexpr_syntax::{Expr, Identifier, UnaryType};

use eval::Evaluator;

/// Name of the receiver parameter created by [`evaluate_with_context`].
pub const CONTEXT_PARAMETER: &str = "it";

lazy_static! {
    static ref STANDARD_REGISTRY: Result<Arc<TypeRegistry>, RegistrationError> =
        sharpexpr_modules::standard_registry().map(Arc::new);
}

/// The built-in library registry, shared by every caller.
pub fn standard_registry() -> Result<Arc<TypeRegistry>, Failure> {
    STANDARD_REGISTRY.clone().map_err(Failure::from)
}

/// Parser output: the tree plus how much of the source text it consumed.
#[derive(Debug, Clone)]
pub struct Parsed {
    pub expr: Expr,
    pub length: usize,
}

fn guarded<T>(f: impl FnOnce() -> Result<T, Failure>) -> Result<T, Failure> {
    catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| Err(Failure::from_panic(payload)))
}

/// Bind `expr` into a typed tree.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn build(expr: &Expr, binder: &dyn Binder) -> Result<TypedExpr, Failure> {
    let result = guarded(|| Ok(ExpressionBuilder::new(binder).build(expr)?));
    match &result {
        Ok(typed) => debug!(data_type = %binder.types().type_name(&typed.data_type()), "built expression"),
        Err(failure) => debug!(error = %failure, "build failed"),
    }
    result
}

/// [`build`], recording the parser's consumed length on failure.
pub fn build_parsed(parsed: Parsed, binder: &dyn Binder) -> Result<TypedExpr, Failure> {
    build(&parsed.expr, binder).map_err(|failure| failure.with_length(parsed.length))
}

/// Build and evaluate `expr` against the standard library.
pub fn evaluate(expr: &Expr) -> Result<Value, Failure> {
    let binder = DefaultBinder::new(standard_registry()?);
    evaluate_with(expr, &binder, None)
}

/// Build `expr` with `binder` and evaluate it; `receiver` supplies the value of
/// the binder's context parameter, if it has one.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn evaluate_with(
    expr: &Expr,
    binder: &dyn Binder,
    receiver: Option<&Value>,
) -> Result<Value, Failure> {
    let typed = build(expr, binder)?;
    let result = guarded(|| {
        let mut evaluator = Evaluator::new(binder.types());
        if let Some(receiver) = receiver {
            evaluator = evaluator.with_receiver(receiver);
        }
        Ok(evaluator.eval(&typed)?)
    });
    if let Err(failure) = &result {
        debug!(error = %failure, "evaluation failed");
    }
    result
}

/// Evaluate `expr` with `context` as the implicit receiver: bare names are
/// looked up on the context's runtime type first.
pub fn evaluate_with_context(
    expr: &Expr,
    registry: Arc<TypeRegistry>,
    context: Value,
) -> Result<Value, Failure> {
    let binder = ContextBinder::with_receiver(registry, CONTEXT_PARAMETER, context.data_type())?;
    evaluate_with(expr, &binder, Some(&context))
}
