//! Jooce Eval - scoped dependency resolution.
//!
//! A [`Platform`] resolves injection keys against its registry and caches
//! each constructed value in the scope instance its binding names:
//!
//! ```text
//! InjectionKey ──registry──▶ Binding(ReferenceKey, projection)
//!                                   │
//!              active.lookup(scope) ▼
//!                            ScopeInstance cache ──miss──▶ Provider
//! ```
//!
//! Every resolution takes the active [`ScopeInstance`](jooce_scope::ScopeInstance)
//! explicitly; there is no ambient "current scope".

mod errors;
mod mode;
mod platform;
mod resolution;
mod resolver;
mod stack;

pub use errors::ResolveError;
pub use mode::ResolveMode;
pub use platform::{Platform, PlatformBuilder};
pub use resolver::Wrapped;
pub use stack::ensure_sufficient_stack;
