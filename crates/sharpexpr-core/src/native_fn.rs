//! Native function storage.
//!
//! Every member getter and method body in the registry is a [`NativeFn`]: a
//! type-erased callable receiving the receiver (`None` for statics) and the
//! already-converted argument list.

use std::fmt;
use std::sync::Arc;

use crate::value::{FromValue, arg};
use crate::{RuntimeError, Value};

/// Trait for callable native functions.
pub trait NativeCallable {
    fn call(&self, this: Option<&Value>, args: &[Value]) -> Result<Value, RuntimeError>;
}

impl<F> NativeCallable for F
where
    F: Fn(Option<&Value>, &[Value]) -> Result<Value, RuntimeError>,
{
    fn call(&self, this: Option<&Value>, args: &[Value]) -> Result<Value, RuntimeError> {
        self(this, args)
    }
}

/// Type-erased native function, cheap to clone.
#[derive(Clone)]
pub struct NativeFn {
    inner: Arc<dyn NativeCallable + Send + Sync>,
}

impl NativeFn {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Option<&Value>, &[Value]) -> Result<Value, RuntimeError> + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    /// Wrap a host type implementing [`NativeCallable`] directly.
    pub fn from_callable<C>(callable: C) -> Self
    where
        C: NativeCallable + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(callable),
        }
    }

    pub fn call(&self, this: Option<&Value>, args: &[Value]) -> Result<Value, RuntimeError> {
        self.inner.call(this, args)
    }

    /// A getter that always yields `value` (constants, enum members).
    pub fn constant(value: Value) -> Self {
        Self::new(move |_, _| Ok(value.clone()))
    }

    pub fn from_fn0<R, F>(f: F) -> Self
    where
        R: Into<Value>,
        F: Fn() -> R + Send + Sync + 'static,
    {
        Self::new(move |_, _| Ok(f().into()))
    }

    pub fn from_fn1<A, R, F>(f: F) -> Self
    where
        A: FromValue,
        R: Into<Value>,
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        Self::new(move |_, args| Ok(f(arg(args, 0)?).into()))
    }

    pub fn from_fn2<A, B, R, F>(f: F) -> Self
    where
        A: FromValue,
        B: FromValue,
        R: Into<Value>,
        F: Fn(A, B) -> R + Send + Sync + 'static,
    {
        Self::new(move |_, args| {
            Ok(f(arg(args, 0)?, arg(args, 1)?).into())
        })
    }

    pub fn from_fn3<A, B, C, R, F>(f: F) -> Self
    where
        A: FromValue,
        B: FromValue,
        C: FromValue,
        R: Into<Value>,
        F: Fn(A, B, C) -> R + Send + Sync + 'static,
    {
        Self::new(move |_, args| {
            Ok(f(arg(args, 0)?, arg(args, 1)?, arg(args, 2)?).into())
        })
    }

    /// Instance method or getter with no arguments.
    pub fn method0<T, R, F>(f: F) -> Self
    where
        T: FromValue,
        R: Into<Value>,
        F: Fn(T) -> R + Send + Sync + 'static,
    {
        Self::new(move |this, _| Ok(f(receiver(this)?).into()))
    }

    pub fn method1<T, A, R, F>(f: F) -> Self
    where
        T: FromValue,
        A: FromValue,
        R: Into<Value>,
        F: Fn(T, A) -> R + Send + Sync + 'static,
    {
        Self::new(move |this, args| {
            Ok(f(receiver(this)?, arg(args, 0)?).into())
        })
    }

    pub fn method2<T, A, B, R, F>(f: F) -> Self
    where
        T: FromValue,
        A: FromValue,
        B: FromValue,
        R: Into<Value>,
        F: Fn(T, A, B) -> R + Send + Sync + 'static,
    {
        Self::new(move |this, args| {
            Ok(f(receiver(this)?, arg(args, 0)?, arg(args, 1)?).into())
        })
    }
}

/// Extract the receiver of an instance call.
pub fn receiver<T: FromValue>(this: Option<&Value>) -> Result<T, RuntimeError> {
    match this {
        None | Some(Value::Null) => Err(RuntimeError::NullReference),
        Some(value) => T::from_value(value).ok_or_else(|| RuntimeError::ArgumentType {
            index: 0,
            expected: T::EXPECTED,
            found: value.kind_name().to_string(),
        }),
    }
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFn").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_adapters_extract_arguments() {
        let max = NativeFn::from_fn2(|a: i32, b: i32| a.max(b));
        let result = max.call(None, &[Value::Int32(3), Value::Int32(9)]).unwrap();
        assert_eq!(result, Value::Int32(9));
    }

    #[test]
    fn method_adapter_rejects_null_receiver() {
        let len = NativeFn::method0(|s: std::sync::Arc<str>| s.len() as i32);
        assert!(matches!(
            len.call(Some(&Value::Null), &[]),
            Err(RuntimeError::NullReference)
        ));
        assert_eq!(len.call(Some(&Value::from("abc")), &[]).unwrap(), Value::Int32(3));
    }

    #[test]
    fn constant_ignores_arguments() {
        let pi = NativeFn::constant(Value::Double(3.5));
        assert_eq!(pi.call(None, &[Value::Null]).unwrap(), Value::Double(3.5));
    }
}
