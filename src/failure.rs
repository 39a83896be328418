use std::any::Any;

use sharpexpr_core::{BindError, RegistrationError, RuntimeError};

/// The originating error behind a [`Failure`].
#[derive(Debug, thiserror::Error)]
pub enum Cause {
    #[error(transparent)]
    Bind(#[from] BindError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    #[error(transparent)]
    Registration(#[from] RegistrationError),
}

/// A failed build or evaluation.
///
/// `length` is how much of the source text the parser consumed before the
/// failure; it is zero when the expression did not come from
/// [`build_parsed`](crate::build_parsed).
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct Failure {
    pub message: String,
    pub length: usize,
    #[source]
    pub cause: Option<Cause>,
}

impl Failure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            length: 0,
            cause: None,
        }
    }

    pub fn with_length(mut self, length: usize) -> Self {
        self.length = length;
        self
    }

    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = match payload.downcast::<String>() {
            Ok(message) => *message,
            Err(payload) => match payload.downcast::<&'static str>() {
                Ok(message) => (*message).to_string(),
                Err(_) => "expression evaluation panicked".to_string(),
            },
        };
        Self::new(message)
    }

    pub fn bind_error(&self) -> Option<&BindError> {
        match &self.cause {
            Some(Cause::Bind(error)) => Some(error),
            _ => None,
        }
    }

    pub fn runtime_error(&self) -> Option<&RuntimeError> {
        match &self.cause {
            Some(Cause::Runtime(error)) => Some(error),
            _ => None,
        }
    }
}

impl From<Cause> for Failure {
    fn from(cause: Cause) -> Self {
        Self {
            message: cause.to_string(),
            length: 0,
            cause: Some(cause),
        }
    }
}

macro_rules! failure_from {
    ($($error:ty),*) => {$(
        impl From<$error> for Failure {
            fn from(error: $error) -> Self {
                Cause::from(error).into()
            }
        }
    )*};
}

failure_from!(BindError, RuntimeError, RegistrationError);
