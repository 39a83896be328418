//! The expression AST.
//!
//! A closed set of nine node kinds. Every child is owned by its parent through a
//! `Box`, so trees are immutable and acyclic once built.
//!
//! # Example
//!
//! ```
//! use sharpexpr_syntax::Expr;
//!
//! // name != lastName && name.Length > 0
//! let expr = Expr::binary(
//!     "&&",
//!     Expr::binary("!=", Expr::reference("name"), Expr::reference("lastName")),
//!     Expr::binary(
//!         ">",
//!         Expr::member(Expr::reference("name"), "Length"),
//!         Expr::literal(0),
//!     ),
//! );
//! assert_eq!(expr.to_string(), "((name != lastName) && (name.Length > 0))");
//! ```

use std::fmt;

use sharpexpr_core::{Value, eq_ignore_case};

/// A name token. Binding compares identifiers case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
    name: String,
}

impl Identifier {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lower-cased form used as a lookup key.
    pub fn normalized(&self) -> String {
        self.name.to_lowercase()
    }

    pub fn matches(&self, other: &str) -> bool {
        eq_ignore_case(&self.name, other)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<&str> for Identifier {
    fn from(name: &str) -> Self {
        Identifier::new(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryType {
    /// `(T)x`; the operator token names the target type.
    Convert,
    Negate,
    Not,
    OnesComplement,
    UnaryPlus,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Reference(Identifier),
    /// A constant already typed by the lexer.
    Literal(Value),
    Binary {
        op: Identifier,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: Identifier,
        kind: UnaryType,
        operand: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Indexer {
        target: Box<Expr>,
        args: Vec<Expr>,
    },
    MemberAccess {
        target: Box<Expr>,
        /// A well-formed tree always has a `Reference` here.
        member: Box<Expr>,
    },
    Conditional {
        test: Box<Expr>,
        if_true: Box<Expr>,
        if_false: Box<Expr>,
    },
    Parenthesized(Box<Expr>),
}

impl Expr {
    pub fn reference(name: &str) -> Self {
        Expr::Reference(Identifier::new(name))
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        Expr::Literal(value.into())
    }

    pub fn null() -> Self {
        Expr::Literal(Value::Null)
    }

    pub fn binary(op: &str, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op: Identifier::new(op),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// A unary operator; `op` is the token (`-`, `!`, `~`, `+`).
    pub fn unary(op: &str, kind: UnaryType, operand: Expr) -> Self {
        Expr::Unary {
            op: Identifier::new(op),
            kind,
            operand: Box::new(operand),
        }
    }

    pub fn negate(operand: Expr) -> Self {
        Expr::unary("-", UnaryType::Negate, operand)
    }

    pub fn not(operand: Expr) -> Self {
        Expr::unary("!", UnaryType::Not, operand)
    }

    /// `(type_name)operand`
    pub fn cast(type_name: &str, operand: Expr) -> Self {
        Expr::unary(type_name, UnaryType::Convert, operand)
    }

    pub fn call(callee: Expr, args: Vec<Expr>) -> Self {
        Expr::Call {
            callee: Box::new(callee),
            args,
        }
    }

    pub fn index(target: Expr, args: Vec<Expr>) -> Self {
        Expr::Indexer {
            target: Box::new(target),
            args,
        }
    }

    pub fn member(target: Expr, name: &str) -> Self {
        Expr::MemberAccess {
            target: Box::new(target),
            member: Box::new(Expr::reference(name)),
        }
    }

    /// `target.name(args)`
    pub fn method_call(target: Expr, name: &str, args: Vec<Expr>) -> Self {
        Expr::call(Expr::member(target, name), args)
    }

    pub fn conditional(test: Expr, if_true: Expr, if_false: Expr) -> Self {
        Expr::Conditional {
            test: Box::new(test),
            if_true: Box::new(if_true),
            if_false: Box::new(if_false),
        }
    }

    pub fn paren(inner: Expr) -> Self {
        Expr::Parenthesized(Box::new(inner))
    }
}

fn join(f: &mut fmt::Formatter<'_>, items: &[Expr]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

/// Source-like rendering used in diagnostics.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Reference(name) => write!(f, "{name}"),
            Expr::Literal(value) => match value {
                Value::Null => f.write_str("null"),
                Value::Bool(b) => write!(f, "{b}"),
                Value::String(s) => write!(f, "\"{s}\""),
                Value::Char(c) => write!(f, "'{c}'"),
                other => write!(f, "{other}"),
            },
            Expr::Binary { op, left, right } => write!(f, "({left} {op} {right})"),
            Expr::Unary { op, kind, operand } => match kind {
                UnaryType::Convert => write!(f, "{operand}:{op}"),
                _ => write!(f, "{op}({operand})"),
            },
            Expr::Call { callee, args } => {
                write!(f, "{callee}(")?;
                join(f, args)?;
                f.write_str(")")
            }
            Expr::Indexer { target, args } => {
                write!(f, "{target}[")?;
                join(f, args)?;
                f.write_str("]")
            }
            Expr::MemberAccess { target, member } => write!(f, "{target}.{member}"),
            Expr::Conditional {
                test,
                if_true,
                if_false,
            } => write!(f, "{test} ? {if_true} : {if_false}"),
            Expr::Parenthesized(inner) => write!(f, "({inner})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_match_case_insensitively() {
        let id = Identifier::new("LastName");
        assert!(id.matches("lastname"));
        assert_eq!(id.normalized(), "lastname");
        assert_eq!(id.to_string(), "LastName");
    }

    #[test]
    fn literal_rendering() {
        assert_eq!(Expr::null().to_string(), "null");
        assert_eq!(Expr::literal(true).to_string(), "true");
        assert_eq!(Expr::literal("hi").to_string(), "\"hi\"");
        assert_eq!(Expr::literal('c').to_string(), "'c'");
        assert_eq!(Expr::literal(1.5).to_string(), "1.5");
    }

    #[test]
    fn compound_rendering() {
        let call = Expr::method_call(Expr::reference("Math"), "Max", vec![Expr::literal(1), Expr::literal(2)]);
        assert_eq!(call.to_string(), "Math.Max(1, 2)");
        let cast = Expr::cast("int", Expr::reference("x"));
        assert_eq!(cast.to_string(), "x:int");
        let neg = Expr::negate(Expr::literal(3));
        assert_eq!(neg.to_string(), "-(3)");
        let cond = Expr::conditional(Expr::reference("a"), Expr::literal(1), Expr::literal(2));
        assert_eq!(cond.to_string(), "a ? 1 : 2");
        let idx = Expr::index(Expr::reference("arr"), vec![Expr::literal(0)]);
        assert_eq!(Expr::paren(idx).to_string(), "(arr[0])");
    }
}
