//! Jooce Registry - provider bindings and injectable callables.
//!
//! The [`Registry`] maps each [`InjectionKey`](jooce_ir::InjectionKey) a caller
//! may ask for onto a [`Binding`]: the [`ReferenceKey`](jooce_ir::ReferenceKey)
//! of the provider that satisfies it, plus the projection from the provider's
//! concrete value to the requested view. Several keys may share one provider.
//!
//! Dependencies are declared explicitly with the [`Injectable`] builder; there
//! is no signature introspection. A provider is an injectable whose output is
//! cached by the resolver.

mod errors;
mod injectable;
mod provider;
mod registry;
mod shared;

pub use errors::{ArgumentError, BoxError, RegistryError};
pub use injectable::{Arguments, Injectable, InjectableBuilder, Param, ParamKind};
pub use provider::Provider;
pub use registry::{Binding, Provision, Registry};
pub use shared::SharedRegistry;
