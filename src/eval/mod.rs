//! A tree-walking interpreter for [`TypedExpr`].
//!
//! The builder has already made every conversion and promotion explicit, so
//! evaluation is a direct walk: operands of a built-in operator always share
//! one scalar type, and calls receive arguments in declared parameter order.

pub mod arith;
pub mod convert;

use tracing::trace;

use sharpexpr_compiler::TypedExpr;
use sharpexpr_core::{ArrayValue, BinaryOp, RuntimeError, Value};
use sharpexpr_registry::TypeRegistry;

pub use convert::convert_value;

type Result<T> = std::result::Result<T, RuntimeError>;

/// Evaluates typed trees against one registry and an optional receiver.
#[derive(Clone, Copy)]
pub struct Evaluator<'r> {
    registry: &'r TypeRegistry,
    receiver: Option<&'r Value>,
}

impl<'r> Evaluator<'r> {
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self {
            registry,
            receiver: None,
        }
    }

    /// Supply the value for [`TypedExpr::Parameter`] nodes.
    pub fn with_receiver(mut self, receiver: &'r Value) -> Self {
        self.receiver = Some(receiver);
        self
    }

    pub fn eval(&self, expr: &TypedExpr) -> Result<Value> {
        match expr {
            TypedExpr::Constant { value, .. } => Ok(value.clone()),
            TypedExpr::Parameter { name, .. } => self
                .receiver
                .cloned()
                .ok_or_else(|| RuntimeError::invalid_tree(format!("no value bound for '{name}'"))),
            TypedExpr::Member { instance, member } => {
                let this = self.eval_instance(instance.as_deref())?;
                member.getter.call(this.as_ref(), &[])
            }
            TypedExpr::Index {
                instance,
                indexer,
                args,
            } => {
                let this = self.eval_instance(Some(instance))?;
                let args = self.eval_all(args)?;
                indexer.getter.call(this.as_ref(), &args)
            }
            TypedExpr::Call {
                instance,
                method,
                args,
            } => {
                let this = self.eval_instance(instance.as_deref())?;
                let args = self.eval_all(args)?;
                trace!(method = %method.name, args = args.len(), "native call");
                method.native.call(this.as_ref(), &args)
            }
            TypedExpr::Convert {
                operand,
                target,
                method,
            } => {
                let value = self.eval(operand)?;
                match method {
                    Some(method) => method.native.call(None, &[value]),
                    None => convert_value(self.registry, value, &operand.data_type(), target),
                }
            }
            TypedExpr::Unary {
                op,
                operand,
                method,
                ..
            } => {
                let value = self.eval(operand)?;
                match method {
                    Some(method) => method.native.call(None, &[value]),
                    None if value.is_null() => Ok(Value::Null),
                    None => arith::unary(*op, &value),
                }
            }
            TypedExpr::Binary {
                op,
                left,
                right,
                method,
                ..
            } => self.binary(*op, left, right, method.as_deref()),
            TypedExpr::Coalesce { left, right } => match self.eval(left)? {
                Value::Null => self.eval(right),
                value => Ok(value),
            },
            TypedExpr::Conditional {
                test,
                if_true,
                if_false,
            } => {
                if self.eval_bool(test)? {
                    self.eval(if_true)
                } else {
                    self.eval(if_false)
                }
            }
            TypedExpr::ArrayIndex { array, index } => {
                let array = self.eval(array)?;
                let index = self.eval(index)?;
                let array = expect_array(&array)?;
                let index = index
                    .as_integer()
                    .ok_or_else(|| RuntimeError::invalid_tree("array index is not an integer"))?;
                i64::try_from(index)
                    .ok()
                    .and_then(|i| array.get(i))
                    .cloned()
                    .ok_or(RuntimeError::IndexOutOfRange)
            }
            TypedExpr::ArrayLength { array } => {
                let array = self.eval(array)?;
                Ok(Value::Int32(expect_array(&array)?.len() as i32))
            }
            TypedExpr::NewArray { element, items } => {
                let items = self.eval_all(items)?;
                Ok(Value::Array(ArrayValue::new(*element, items)))
            }
        }
    }

    fn binary(
        &self,
        op: BinaryOp,
        left: &TypedExpr,
        right: &TypedExpr,
        method: Option<&sharpexpr_core::MethodEntry>,
    ) -> Result<Value> {
        match op {
            BinaryOp::AndAlso => {
                return Ok(Value::Bool(self.eval_bool(left)? && self.eval_bool(right)?));
            }
            BinaryOp::OrElse => {
                return Ok(Value::Bool(self.eval_bool(left)? || self.eval_bool(right)?));
            }
            _ => {}
        }

        let l = self.eval(left)?;
        let r = self.eval(right)?;
        match method {
            Some(method) => method.native.call(None, &[l, r]),
            None if l.is_null() || r.is_null() => Ok(arith::binary_with_null(op, &l, &r)),
            None => arith::binary(op, &l, &r),
        }
    }

    fn eval_instance(&self, instance: Option<&TypedExpr>) -> Result<Option<Value>> {
        let Some(instance) = instance else {
            return Ok(None);
        };
        match self.eval(instance)? {
            Value::Null => Err(RuntimeError::NullReference),
            value => Ok(Some(value)),
        }
    }

    fn eval_all(&self, exprs: &[TypedExpr]) -> Result<Vec<Value>> {
        exprs.iter().map(|e| self.eval(e)).collect()
    }

    fn eval_bool(&self, expr: &TypedExpr) -> Result<bool> {
        match self.eval(expr)? {
            Value::Bool(b) => Ok(b),
            Value::Null => Err(RuntimeError::NullableWithoutValue),
            other => Err(RuntimeError::invalid_tree(format!(
                "expected Boolean, found {}",
                other.kind_name()
            ))),
        }
    }
}

fn expect_array(value: &Value) -> Result<&ArrayValue> {
    match value {
        Value::Array(array) => Ok(array),
        Value::Null => Err(RuntimeError::NullReference),
        other => Err(RuntimeError::invalid_tree(format!(
            "expected an array, found {}",
            other.kind_name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sharpexpr_compiler::{DefaultBinder, ExpressionBuilder};
    use sharpexpr_core::DataType;
    use sharpexpr_syntax::Expr;
    use std::sync::Arc;

    fn run(expr: &Expr) -> Result<Value> {
        let registry = Arc::new(sharpexpr_modules::standard_registry().unwrap());
        let binder = DefaultBinder::new(registry.clone());
        let typed = ExpressionBuilder::new(&binder).build(expr).unwrap();
        Evaluator::new(&registry).eval(&typed)
    }

    #[test]
    fn arithmetic_follows_promotion() {
        let expr = Expr::binary(
            "+",
            Expr::literal(1),
            Expr::binary("*", Expr::literal(2.5), Expr::literal(2)),
        );
        assert_eq!(run(&expr).unwrap(), Value::Double(6.0));

        let expr = Expr::binary("/", Expr::literal(7), Expr::literal(2));
        assert_eq!(run(&expr).unwrap(), Value::Int32(3));
    }

    #[test]
    fn conditional_and_logic_short_circuit() {
        let divide = Expr::binary("/", Expr::literal(1), Expr::literal(0));
        let expr = Expr::conditional(Expr::literal(true), Expr::literal(1), divide.clone());
        assert_eq!(run(&expr).unwrap(), Value::Int32(1));

        let guard = Expr::binary(
            "||",
            Expr::literal(true),
            Expr::binary("==", divide.clone(), Expr::literal(0)),
        );
        assert_eq!(run(&guard).unwrap(), Value::Bool(true));

        assert!(matches!(run(&divide), Err(RuntimeError::DivideByZero)));
    }

    #[test]
    fn coalesce_and_string_members() {
        let expr = Expr::binary("??", Expr::null(), Expr::literal("fallback"));
        assert_eq!(run(&expr).unwrap(), Value::from("fallback"));

        let expr = Expr::member(Expr::literal("hello"), "Length");
        assert_eq!(run(&expr).unwrap(), Value::Int32(5));

        let expr = Expr::index(Expr::literal("hello"), vec![Expr::literal(1)]);
        assert_eq!(run(&expr).unwrap(), Value::Char('e'));
    }

    #[test]
    fn library_calls() {
        let expr = Expr::method_call(
            Expr::reference("Math"),
            "Max",
            vec![Expr::literal(1.0), Expr::literal(15)],
        );
        assert_eq!(run(&expr).unwrap(), Value::Double(15.0));

        let concat = Expr::binary("+", Expr::literal("n"), Expr::literal(1));
        assert_eq!(run(&concat).unwrap(), Value::from("n1"));
    }

    #[test]
    fn arrays() {
        let registry = sharpexpr_modules::standard_registry().unwrap();
        let array = TypedExpr::NewArray {
            element: DataType::int32(),
            items: vec![
                TypedExpr::constant(Value::Int32(10)),
                TypedExpr::constant(Value::Int32(20)),
            ],
        };
        let index = |i: i32| TypedExpr::ArrayIndex {
            array: Box::new(array.clone()),
            index: Box::new(TypedExpr::constant(Value::Int32(i))),
        };
        let evaluator = Evaluator::new(&registry);

        assert_eq!(evaluator.eval(&index(1)).unwrap(), Value::Int32(20));
        assert!(matches!(evaluator.eval(&index(2)), Err(RuntimeError::IndexOutOfRange)));
        let length = TypedExpr::ArrayLength {
            array: Box::new(array.clone()),
        };
        assert_eq!(evaluator.eval(&length).unwrap(), Value::Int32(2));
    }

    #[test]
    fn parameter_needs_a_receiver() {
        let registry = sharpexpr_modules::standard_registry().unwrap();
        let parameter = TypedExpr::parameter("it", DataType::int32());
        assert!(Evaluator::new(&registry).eval(&parameter).is_err());

        let value = Value::Int32(4);
        let evaluator = Evaluator::new(&registry).with_receiver(&value);
        assert_eq!(evaluator.eval(&parameter).unwrap(), Value::Int32(4));
    }
}
