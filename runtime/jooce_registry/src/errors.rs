//! Registry and argument errors.

use jooce_ir::InjectionKey;
use thiserror::Error;

/// Error type returned by injectable bodies and provider constructors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Registry lookup failure.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// No binding for the requested key.
    #[error("no provider registered for {0}")]
    NotFound(InjectionKey),
}

/// Failure to read a typed argument inside an injectable body.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ArgumentError {
    #[error("no argument named {name:?}")]
    Missing { name: String },
    #[error("argument {name:?} is {found}, not {expected}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },
}
