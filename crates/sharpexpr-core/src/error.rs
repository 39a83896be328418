//! Error types for binding, registration and evaluation.
//!
//! - [`BindError`]: the closed set of semantic errors raised while building a
//!   typed expression. Every one is fatal to the build.
//! - [`RegistrationError`]: problems populating a type registry or binder.
//! - [`RuntimeError`]: failures while evaluating a typed expression, including
//!   errors raised by host native functions.

use thiserror::Error;

use crate::TypeHash;

// ============================================================================
// Bind Errors
// ============================================================================

/// Semantic errors detected while binding an expression.
///
/// Type names inside the variants are already rendered, so the errors stay
/// meaningful after the registry that produced them is gone.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("Cannot resolve symbol '{name}'.")]
    UnresolvedSymbol { name: String },

    #[error("Identifier expected (expression: {expr}).")]
    IdentifierExpected { expr: String },

    #[error("Method name expected (expression: {expr}).")]
    MethodNameExpected { expr: String },

    #[error("Non-invocable member '{expr}' cannot be used like a method.")]
    NonInvocableMember { expr: String },

    #[error("Operator '{op}' cannot be applied to operand of type '{operand}'.")]
    UnsupportedUnaryOperator { op: String, operand: String },

    #[error("Operator '{op}' cannot be applied to operands of type '{left}' and '{right}'.")]
    UnsupportedBinaryOperator {
        op: String,
        left: String,
        right: String,
    },

    #[error("Cannot implicitly convert type '{from}' to '{to}'.")]
    MissingImplicitConversion { from: String, to: String },

    #[error("Cannot apply indexing with [] to an expression of type '{type_name}'.")]
    NotIndexable { type_name: String },

    /// Each candidate is a rendered signature followed by `(in DeclaringType)`.
    #[error("Ambiguous match found:{}", format_candidates(.candidates))]
    AmbiguousMatch { candidates: Vec<String> },

    #[error("{message}")]
    Generic { message: String },
}

fn format_candidates(candidates: &[String]) -> String {
    candidates
        .iter()
        .map(|c| format!("\n    {c}"))
        .collect()
}

impl BindError {
    pub fn generic(message: impl Into<String>) -> Self {
        BindError::Generic {
            message: message.into(),
        }
    }

    pub fn unresolved(name: impl Into<String>) -> Self {
        BindError::UnresolvedSymbol { name: name.into() }
    }
}

// ============================================================================
// Registration Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("type '{name}' is already registered")]
    DuplicateType { name: String },

    #[error("type {hash} is not registered")]
    UnknownType { hash: TypeHash },

    #[error("'{member}' on type '{type_name}': {message}")]
    InvalidMember {
        type_name: String,
        member: String,
        message: String,
    },
}

// ============================================================================
// Runtime Errors
// ============================================================================

/// Errors raised while evaluating a typed expression.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Attempted to divide by zero.")]
    DivideByZero,

    #[error("Arithmetic operation resulted in an overflow.")]
    Overflow,

    #[error("Index was outside the bounds of the array.")]
    IndexOutOfRange,

    #[error("Object reference not set to an instance of an object.")]
    NullReference,

    #[error("Nullable object must have a value.")]
    NullableWithoutValue,

    #[error("Unable to cast object of type '{from}' to type '{to}'.")]
    InvalidCast { from: String, to: String },

    /// A native function received an argument of the wrong shape.
    #[error("argument {index}: expected {expected}, found {found}")]
    ArgumentType {
        index: usize,
        expected: &'static str,
        found: String,
    },

    #[error("{message}")]
    Format { message: String },

    /// Raised by the interpreter when a typed tree is internally inconsistent.
    #[error("invalid expression tree: {message}")]
    InvalidTree { message: String },

    #[error(transparent)]
    Host(#[from] anyhow::Error),
}

impl RuntimeError {
    pub fn invalid_tree(message: impl Into<String>) -> Self {
        RuntimeError::InvalidTree {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ambiguous_match_lists_every_candidate() {
        let err = BindError::AmbiguousMatch {
            candidates: vec![
                "Double PI (in System.Math)".to_string(),
                "Single PI (in System.MathF)".to_string(),
            ],
        };
        assert_eq!(
            err.to_string(),
            "Ambiguous match found:\n    Double PI (in System.Math)\n    Single PI (in System.MathF)"
        );
    }

    #[test]
    fn binary_operator_message() {
        let err = BindError::UnsupportedBinaryOperator {
            op: "??".into(),
            left: "System.Int32".into(),
            right: "System.Int32".into(),
        };
        assert_eq!(
            err.to_string(),
            "Operator '??' cannot be applied to operands of type 'System.Int32' and 'System.Int32'."
        );
    }

    #[test]
    fn host_errors_are_transparent() {
        let err = RuntimeError::from(anyhow::anyhow!("disk on fire"));
        assert_eq!(err.to_string(), "disk on fire");
    }
}
