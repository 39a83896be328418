use crate::{DataType, NativeFn, TypeHash, Value};

/// A formal parameter of a method or indexer.
#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    /// For a variadic parameter this is the array type.
    pub data_type: DataType,
    pub default: Option<Value>,
    pub is_variadic: bool,
}

impl Param {
    pub fn new(name: &str, data_type: DataType) -> Self {
        Self {
            name: name.to_string(),
            data_type,
            default: None,
            is_variadic: false,
        }
    }

    /// A `params T[]` parameter; `element` is `T`.
    pub fn variadic(name: &str, element: DataType) -> Self {
        Self {
            is_variadic: true,
            ..Self::new(name, element.array_of())
        }
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }
}

/// One method overload.
#[derive(Debug, Clone)]
pub struct MethodEntry {
    pub name: String,
    /// Set by [`TypeEntry`](super::TypeEntry) when the method is attached.
    pub declaring_type: TypeHash,
    pub params: Vec<Param>,
    pub return_type: DataType,
    pub is_static: bool,
    pub native: NativeFn,
}

impl MethodEntry {
    pub fn instance(name: &str, params: Vec<Param>, return_type: DataType, native: NativeFn) -> Self {
        Self {
            name: name.to_string(),
            declaring_type: TypeHash::EMPTY,
            params,
            return_type,
            is_static: false,
            native,
        }
    }

    pub fn static_fn(name: &str, params: Vec<Param>, return_type: DataType, native: NativeFn) -> Self {
        Self {
            is_static: true,
            ..Self::instance(name, params, return_type, native)
        }
    }

    pub fn name_matches(&self, name: &str) -> bool {
        super::eq_ignore_case(&self.name, name)
    }

    /// Element type of the trailing `params` array, if any.
    pub fn variadic_element(&self) -> Option<DataType> {
        self.params
            .last()
            .filter(|p| p.is_variadic)
            .and_then(|p| p.data_type.element_type())
    }

    pub fn param_types(&self) -> impl Iterator<Item = DataType> + '_ {
        self.params.iter().map(|p| p.data_type)
    }
}
