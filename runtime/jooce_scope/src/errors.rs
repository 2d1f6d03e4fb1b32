//! Scope transition errors.

use jooce_ir::ScopeKind;
use thiserror::Error;

/// Error raised while entering or populating scopes.
///
/// These indicate usage or configuration errors and are never retried.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ScopeError {
    /// The target kind's parent is not the current kind.
    #[error("invalid transition from scope {from:?} to {to:?}")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
    },
    /// The target kind is not a descendant of the current kind.
    #[error("no path to transition from scope {from:?} to {to:?}")]
    NoTransitionPath {
        from: &'static str,
        to: &'static str,
    },
    /// A seeded value names a scope other than the instance it is seeded into.
    #[error("cannot seed {reference} into a {scope:?} scope")]
    SeedMismatch {
        reference: String,
        scope: &'static str,
    },
    /// A task entering a scope level was cancelled before the work completed.
    #[error("scope transition to {to:?} was aborted")]
    Aborted { to: &'static str },
}

impl ScopeError {
    pub(crate) fn invalid_transition<K: ScopeKind>(from: K, to: K) -> Self {
        ScopeError::InvalidTransition {
            from: from.name(),
            to: to.name(),
        }
    }

    pub(crate) fn no_path<K: ScopeKind>(from: K, to: K) -> Self {
        ScopeError::NoTransitionPath {
            from: from.name(),
            to: to.name(),
        }
    }
}
