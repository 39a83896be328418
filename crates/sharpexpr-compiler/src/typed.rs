//! The typed expression tree.
//!
//! [`TypedExpr`] is what the builder produces: every node carries a concrete
//! [`DataType`], every call is pinned to one [`MethodEntry`], and every
//! conversion is an explicit node. The tree is ready for direct evaluation.

use std::fmt;
use std::sync::Arc;

use sharpexpr_core::{BinaryOp, BindError, DataType, MemberEntry, MethodEntry, UnaryOp, Value};
use sharpexpr_registry::TypeRegistry;

#[derive(Debug, Clone)]
pub enum TypedExpr {
    Constant {
        value: Value,
        data_type: DataType,
    },
    /// The implicit receiver of a context-bound expression.
    Parameter {
        name: String,
        data_type: DataType,
    },
    /// Field or property read; `instance` is `None` for statics.
    Member {
        instance: Option<Box<TypedExpr>>,
        member: Arc<MemberEntry>,
    },
    /// Indexed property read.
    Index {
        instance: Box<TypedExpr>,
        indexer: Arc<MemberEntry>,
        args: Vec<TypedExpr>,
    },
    /// Arguments are already adapted to the method's parameter list.
    Call {
        instance: Option<Box<TypedExpr>>,
        method: Arc<MethodEntry>,
        args: Vec<TypedExpr>,
    },
    Convert {
        operand: Box<TypedExpr>,
        target: DataType,
        /// A user-defined conversion operator, if one performs the conversion.
        method: Option<Arc<MethodEntry>>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<TypedExpr>,
        data_type: DataType,
        /// A user-defined operator method.
        method: Option<Arc<MethodEntry>>,
    },
    Binary {
        op: BinaryOp,
        left: Box<TypedExpr>,
        right: Box<TypedExpr>,
        data_type: DataType,
        method: Option<Arc<MethodEntry>>,
    },
    Coalesce {
        left: Box<TypedExpr>,
        right: Box<TypedExpr>,
    },
    Conditional {
        test: Box<TypedExpr>,
        if_true: Box<TypedExpr>,
        if_false: Box<TypedExpr>,
    },
    ArrayIndex {
        array: Box<TypedExpr>,
        index: Box<TypedExpr>,
    },
    ArrayLength {
        array: Box<TypedExpr>,
    },
    NewArray {
        element: DataType,
        items: Vec<TypedExpr>,
    },
}

impl TypedExpr {
    pub fn constant(value: Value) -> Self {
        let data_type = value.data_type();
        TypedExpr::Constant { value, data_type }
    }

    pub fn parameter(name: impl Into<String>, data_type: DataType) -> Self {
        TypedExpr::Parameter {
            name: name.into(),
            data_type,
        }
    }

    pub fn convert(operand: TypedExpr, target: DataType) -> Self {
        TypedExpr::Convert {
            operand: Box::new(operand),
            target,
            method: None,
        }
    }

    pub fn member(instance: Option<TypedExpr>, member: Arc<MemberEntry>) -> Self {
        TypedExpr::Member {
            instance: instance.map(Box::new),
            member,
        }
    }

    pub fn call(instance: Option<TypedExpr>, method: Arc<MethodEntry>, args: Vec<TypedExpr>) -> Self {
        TypedExpr::Call {
            instance: instance.map(Box::new),
            method,
            args,
        }
    }

    /// Both branches must already share one type; branches are never unified.
    pub fn conditional(
        registry: &TypeRegistry,
        test: TypedExpr,
        if_true: TypedExpr,
        if_false: TypedExpr,
    ) -> Result<Self, BindError> {
        let (a, b) = (if_true.data_type(), if_false.data_type());
        if a != b {
            return Err(BindError::generic(format!(
                "Type of conditional expression cannot be determined because there is no \
                 implicit conversion between '{}' and '{}'.",
                registry.qualified_type_name(&a),
                registry.qualified_type_name(&b)
            )));
        }
        Ok(TypedExpr::Conditional {
            test: Box::new(test),
            if_true: Box::new(if_true),
            if_false: Box::new(if_false),
        })
    }

    /// The static type this node produces.
    pub fn data_type(&self) -> DataType {
        match self {
            TypedExpr::Constant { data_type, .. }
            | TypedExpr::Parameter { data_type, .. }
            | TypedExpr::Unary { data_type, .. }
            | TypedExpr::Binary { data_type, .. } => *data_type,
            TypedExpr::Member { member, .. } => member.data_type,
            TypedExpr::Index { indexer, .. } => indexer.data_type,
            TypedExpr::Call { method, .. } => method.return_type,
            TypedExpr::Convert { target, .. } => *target,
            TypedExpr::Coalesce { left, .. } => left.data_type(),
            TypedExpr::Conditional { if_true, .. } => if_true.data_type(),
            TypedExpr::ArrayIndex { array, .. } => {
                array.data_type().element_type().unwrap_or_else(DataType::object)
            }
            TypedExpr::ArrayLength { .. } => DataType::int32(),
            TypedExpr::NewArray { element, .. } => element.array_of(),
        }
    }

    /// `true` for the `null` literal.
    pub fn is_null_constant(&self) -> bool {
        matches!(self, TypedExpr::Constant { value: Value::Null, .. })
    }

    /// Render the tree, e.g. `((u.Name != u.LastName) AndAlso (u.Name.Length > 0))`.
    pub fn display<'a>(&'a self, registry: &'a TypeRegistry) -> DisplayTyped<'a> {
        DisplayTyped {
            expr: self,
            registry,
        }
    }
}

/// Helper returned by [`TypedExpr::display`].
pub struct DisplayTyped<'a> {
    expr: &'a TypedExpr,
    registry: &'a TypeRegistry,
}

impl DisplayTyped<'_> {
    fn child<'b>(&'b self, expr: &'b TypedExpr) -> DisplayTyped<'b> {
        DisplayTyped {
            expr,
            registry: self.registry,
        }
    }

    fn list(&self, f: &mut fmt::Formatter<'_>, items: &[TypedExpr]) -> fmt::Result {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", self.child(item))?;
        }
        Ok(())
    }

    fn constant(&self, f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
        match value {
            Value::Null => f.write_str("null"),
            Value::String(s) => write!(f, "\"{s}\""),
            Value::Char(c) => write!(f, "'{c}'"),
            Value::Enum { type_hash, bits } => {
                match self.registry.get(*type_hash).and_then(|e| e.enum_name_of(*bits)) {
                    Some(name) => f.write_str(name),
                    None => write!(f, "{bits}"),
                }
            }
            other => write!(f, "{other}"),
        }
    }

    fn receiver(
        &self,
        f: &mut fmt::Formatter<'_>,
        instance: Option<&TypedExpr>,
        declaring: sharpexpr_core::TypeHash,
    ) -> fmt::Result {
        match instance {
            Some(instance) => write!(f, "{}", self.child(instance)),
            None => f.write_str(&self.registry.type_name(&DataType::simple(declaring))),
        }
    }
}

impl fmt::Display for DisplayTyped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.expr {
            TypedExpr::Constant { value, .. } => self.constant(f, value),
            TypedExpr::Parameter { name, .. } => f.write_str(name),
            TypedExpr::Member { instance, member } => {
                self.receiver(f, instance.as_deref(), member.declaring_type)?;
                write!(f, ".{}", member.name)
            }
            TypedExpr::Index { instance, args, .. } => {
                write!(f, "{}[", self.child(instance))?;
                self.list(f, args)?;
                f.write_str("]")
            }
            TypedExpr::Call {
                instance,
                method,
                args,
            } => {
                if let Some(instance) = instance {
                    write!(f, "{}.", self.child(instance))?;
                }
                write!(f, "{}(", method.name)?;
                self.list(f, args)?;
                f.write_str(")")
            }
            TypedExpr::Convert {
                operand, target, ..
            } => write!(
                f,
                "Convert({}, {})",
                self.child(operand),
                self.registry.type_name(target)
            ),
            TypedExpr::Unary { op, operand, .. } => match op {
                UnaryOp::Not => write!(f, "Not({})", self.child(operand)),
                other => write!(f, "{}{}", other, self.child(operand)),
            },
            TypedExpr::Binary {
                op, left, right, ..
            } => write!(f, "({} {} {})", self.child(left), op, self.child(right)),
            TypedExpr::Coalesce { left, right } => {
                write!(f, "({} ?? {})", self.child(left), self.child(right))
            }
            TypedExpr::Conditional {
                test,
                if_true,
                if_false,
            } => write!(
                f,
                "IIF({}, {}, {})",
                self.child(test),
                self.child(if_true),
                self.child(if_false)
            ),
            TypedExpr::ArrayIndex { array, index } => {
                write!(f, "{}[{}]", self.child(array), self.child(index))
            }
            TypedExpr::ArrayLength { array } => write!(f, "ArrayLength({})", self.child(array)),
            TypedExpr::NewArray { items, .. } => {
                f.write_str("new [] {")?;
                self.list(f, items)?;
                f.write_str("}")
            }
        }
    }
}
