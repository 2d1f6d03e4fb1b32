//! Resolution errors.

use jooce_ir::InjectionKey;
use jooce_registry::RegistryError;
use jooce_scope::ScopeError;
use thiserror::Error;

/// Error raised while resolving a dependency or invoking an injectable.
///
/// All variants describe configuration or usage mistakes; none is retried.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// No binding for the requested key.
    #[error("no provider registered for {key}")]
    NotFound { key: InjectionKey },
    /// The binding's scope has no instance in the active chain.
    #[error("{key} lives in the {required:?} scope, which is not engaged from {active:?}")]
    ScopeNotEngaged {
        key: InjectionKey,
        required: &'static str,
        active: &'static str,
    },
    /// A seeded binding was resolved in a scope instance it was never seeded into.
    #[error("{key} must be seeded into the scope as {reference}, but was not")]
    NotSeeded { key: InjectionKey, reference: String },
    /// A provider depends on itself, directly or transitively.
    #[error("circular dependency: {}", .path.join(" -> "))]
    CircularDependency { path: Vec<String> },
    /// Providers nested deeper than the configured limit.
    #[error("resolution of {reference} exceeds the maximum depth of {max_depth}")]
    DepthExceeded { reference: String, max_depth: usize },
    /// The resolved value is not of the requested type.
    #[error("{key} resolved to {found}, not {expected}")]
    TypeMismatch {
        key: InjectionKey,
        expected: &'static str,
        found: &'static str,
    },
    /// A provider's constructor failed.
    #[error("failed to construct {reference}: {message}")]
    Construction { reference: String, message: String },
    /// An invoked callable's body failed.
    #[error("{callable} failed: {message}")]
    Invocation {
        callable: &'static str,
        message: String,
    },
    /// Explicit arguments do not cover the parameters left after injection.
    #[error("{callable} called with the wrong number of arguments: missing {missing:?}, {extra} extra")]
    ArityMismatch {
        callable: &'static str,
        missing: Vec<String>,
        extra: usize,
    },
    #[error(transparent)]
    Transition(#[from] ScopeError),
}

impl ResolveError {
    /// Returns `true` if no binding existed for the requested key.
    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<RegistryError> for ResolveError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NotFound(key) => ResolveError::NotFound { key },
        }
    }
}
