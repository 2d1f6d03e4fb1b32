//! Jooce Scope - live scope instances and the transitions between them.
//!
//! A [`ScopeInstance`] is one live occurrence of a scope kind. It owns a
//! private cache of resolved values and links to the instance it was entered
//! from. Instances are passed explicitly; there is no ambient "current scope".
//!
//! # Transitions
//!
//! - [`ScopeInstance::transition`]: enter a direct child kind (one level)
//! - [`ScopeInstance::enter_chain`]: enter every level down to a distant kind
//! - [`transition_async`] / [`Transitions`]: enter each level inside its own
//!   tokio task and run a unit of work in the innermost one
//!
//! Dropping an instance tears down its cache. Ancestors are unaffected.

mod errors;
mod instance;
mod task;

pub use errors::ScopeError;
pub use instance::{CacheGuard, ScopeInstance, WeakScopeInstance};
pub use task::{transition_async, Transitions};
