//! Thread-safe shared registry.
//!
//! The registry is written while the application is set up and read by every
//! resolution afterwards, so it lives behind `Arc<RwLock>`. Lookups clone what
//! they need and release the lock before any provider runs, which keeps
//! recursive resolution from holding the lock across constructions.

use std::fmt;
use std::sync::Arc;

use jooce_ir::{InjectionKey, ScopeKind};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{Binding, Provider, Registry, RegistryError};

/// Shared, mutable handle to a [`Registry`].
pub struct SharedRegistry<K: ScopeKind>(Arc<RwLock<Registry<K>>>);

impl<K: ScopeKind> SharedRegistry<K> {
    pub fn new(registry: Registry<K>) -> Self {
        SharedRegistry(Arc::new(RwLock::new(registry)))
    }

    /// Get read access to the registry.
    pub fn read(&self) -> RwLockReadGuard<'_, Registry<K>> {
        self.0.read()
    }

    /// Get write access to the registry (setup only).
    pub fn write(&self) -> RwLockWriteGuard<'_, Registry<K>> {
        self.0.write()
    }

    /// Snapshot of the binding for `key` and the provider behind it.
    ///
    /// The provider is `None` for seeded bindings.
    pub fn lookup(
        &self,
        key: &InjectionKey,
    ) -> Result<(Binding<K>, Option<Provider>), RegistryError> {
        let registry = self.0.read();
        let binding = registry.resolve_binding(key)?.clone();
        let provider = registry.provider(binding.reference().handle()).cloned();
        Ok((binding, provider))
    }

    pub fn contains(&self, key: &InjectionKey) -> bool {
        self.0.read().contains(key)
    }
}

impl<K: ScopeKind> Clone for SharedRegistry<K> {
    fn clone(&self) -> Self {
        SharedRegistry(Arc::clone(&self.0))
    }
}

impl<K: ScopeKind> Default for SharedRegistry<K> {
    fn default() -> Self {
        SharedRegistry::new(Registry::new())
    }
}

impl<K: ScopeKind> fmt::Debug for SharedRegistry<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SharedRegistry({:?})", &*self.0.read())
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests {
    use super::*;
    use crate::Injectable;
    use jooce_ir::Scope;

    struct Clock;

    #[test]
    fn test_lookup_snapshots_binding_and_provider() {
        let shared: SharedRegistry<Scope> = SharedRegistry::default();
        shared
            .write()
            .provides(Injectable::builder("Clock").build(|_| Ok(Clock)));

        let (binding, provider) = shared.lookup(&InjectionKey::of::<Clock>()).unwrap();
        assert_eq!(binding.reference().scope(), Scope::Platform);
        assert!(provider.is_some());

        // The read lock is released; writing again does not deadlock.
        shared.write().provides_seeded::<u32>(Scope::Request);
        let (_, provider) = shared.lookup(&InjectionKey::of::<u32>()).unwrap();
        assert!(provider.is_none());
    }

    #[test]
    fn test_clones_share_registry() {
        let shared: SharedRegistry<Scope> = SharedRegistry::default();
        let clone = shared.clone();
        clone.write().provides_seeded::<u32>(Scope::Platform);
        assert!(shared.contains(&InjectionKey::of::<u32>()));
    }
}
