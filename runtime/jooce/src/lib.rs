//! Jooce - scoped dependency injection.
//!
//! Values are requested by [`InjectionKey`] (a type, optionally tagged) and
//! constructed lazily by providers bound in a [`Registry`]. Each binding names
//! the scope whose instances cache its values:
//!
//! ```text
//! platform ─▶ session ─▶ request ─▶ job
//! ```
//!
//! A [`Platform`] owns the registry and the root scope instance. Deeper scope
//! instances are entered per unit of work and passed explicitly to every
//! resolution:
//!
//! ```text
//! let mut registry = Registry::new();
//! registry
//!     .provides(Injectable::builder("ElectricEngine").build(|_| Ok(ElectricEngine)))
//!     .as_interface::<dyn Engine>(|e| e);
//!
//! let platform = Platform::new(registry);
//! let request = platform.enter(Scope::Request)?;
//! let engine = platform.get::<dyn Engine>(&request)?;
//! ```
//!
//! Dependencies of callables are declared with [`Injectable::builder`] and
//! filled by [`Platform::invoke`].

use std::sync::Once;

pub use jooce_eval::{
    ensure_sufficient_stack, Platform, PlatformBuilder, ResolveError, ResolveMode, Wrapped,
};
pub use jooce_ir::{
    is_ancestor, parent_of, path_between, BatchScope, Handle, InjectionKey, InjectionMeta,
    Instance, MetaInterner, ReferenceKey, Scope, ScopeKind, ScopePath, SharedMeta, Tag,
};
pub use jooce_registry::{
    ArgumentError, Arguments, Binding, BoxError, Injectable, InjectableBuilder, Param, ParamKind,
    Provider, Provision, Registry, RegistryError, SharedRegistry,
};
pub use jooce_scope::{
    transition_async, CacheGuard, ScopeError, ScopeInstance, Transitions, WeakScopeInstance,
};

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber for the resolver's logs.
///
/// Safe to call multiple times. Only active when `RUST_LOG` is set, e.g.
/// `RUST_LOG=jooce_eval=debug` for constructions or `RUST_LOG=jooce_scope=debug`
/// for scope entry and exit.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
            tracing::debug!("tracing initialized");
        }
    });
}
