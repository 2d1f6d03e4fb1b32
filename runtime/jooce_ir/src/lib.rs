//! Jooce IR - shared vocabulary for the jooce dependency resolver.
//!
//! This crate is intentionally small and sits below every other jooce crate:
//!
//! - [`ScopeKind`]: the closed, ordered hierarchy of lifetimes
//!   (`platform ⊑ session ⊑ request ⊑ job`, or `platform ⊑ batch ⊑ item`)
//! - [`InjectionKey`]: what a caller asks for (handle + optional tag)
//! - [`ReferenceKey`]: which provider satisfies it, and at which lifetime it is cached
//! - [`Instance`]: a type-erased, reference-counted resolved value
//! - [`InjectionMeta`] / [`MetaInterner`]: the metadata carried by a dependency declaration
//!
//! Nothing here holds runtime state; scope instances live in `jooce_scope`.

mod handle;
mod instance;
mod key;
mod metadata;
pub mod scope;

pub use handle::{Handle, Tag};
pub use instance::Instance;
pub use key::{InjectionKey, ReferenceKey};
pub use metadata::{InjectionMeta, MetaInterner, SharedMeta};
pub use scope::{is_ancestor, parent_of, path_between, BatchScope, Scope, ScopeKind, ScopePath};
