//! Operator resolution.
//!
//! Runs after the builder has applied enum unwrapping and numeric promotion,
//! so primitive operands arrive with matching types. Each operator resolves
//! to either a built-in operation with a result type or a user-defined
//! operator method.

mod binary;
mod primitive;
mod unary;

use std::sync::Arc;

use sharpexpr_core::{BindError, DataType, MethodEntry};
use sharpexpr_registry::TypeRegistry;

use crate::overload::{Resolution, resolve};

pub use binary::resolve_binary;
pub use primitive::{primitive_binary, primitive_unary};
pub use unary::resolve_unary;

/// How an operator node is evaluated.
#[derive(Debug, Clone)]
pub enum OperatorResolution {
    /// Built-in operation on primitives, strings, references or `T?`.
    Primitive { result_type: DataType },
    /// A static `op_*` method; operands are adapted to its parameters.
    Method { method: Arc<MethodEntry> },
}

impl OperatorResolution {
    pub fn result_type(&self) -> DataType {
        match self {
            OperatorResolution::Primitive { result_type } => *result_type,
            OperatorResolution::Method { method } => method.return_type,
        }
    }
}

/// Look up `name` as a static operator method on each of `owners` and pick
/// the best overload for `operands`.
fn user_operator(
    registry: &TypeRegistry,
    name: &str,
    owners: &[DataType],
    operands: &[DataType],
) -> Result<Option<OperatorResolution>, BindError> {
    let mut candidates: Vec<Arc<MethodEntry>> = Vec::new();
    for owner in owners {
        if owner.primitive_kind().is_some() {
            continue;
        }
        for method in registry.find_methods(owner, name, true) {
            let duplicate = candidates.iter().any(|c| Arc::ptr_eq(c, &method));
            if method.params.len() == operands.len() && !duplicate {
                candidates.push(method);
            }
        }
    }
    if candidates.is_empty() {
        return Ok(None);
    }

    match resolve(registry, &candidates, operands) {
        Resolution::Match { index, .. } => Ok(Some(OperatorResolution::Method {
            method: Arc::clone(&candidates[index]),
        })),
        Resolution::NoMatch => Ok(None),
        Resolution::Ambiguous(tied) => {
            let mut listed: Vec<String> = tied
                .into_iter()
                .map(|i| registry.method_candidate(&candidates[i]))
                .collect();
            listed.sort();
            Err(BindError::AmbiguousMatch { candidates: listed })
        }
    }
}
