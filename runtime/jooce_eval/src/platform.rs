//! The platform: registry, root scope instance and resolution policy.
//!
//! A [`Platform`] is created once per application. It owns the only root
//! scope instance; every other instance is entered from it. Cloning a
//! platform is cheap and yields a handle to the same registry and root.
//!
//! The platform is itself resolvable: building one binds
//! `InjectionKey::of::<Platform<K>>()` at the root scope, so providers may
//! declare `gets::<Platform>`.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use jooce_ir::{
    Handle, InjectionKey, InjectionMeta, Instance, MetaInterner, ReferenceKey, Scope, ScopeKind,
    SharedMeta, Tag,
};
use jooce_registry::{Binding, Registry, SharedRegistry};
use jooce_scope::{transition_async, ScopeError, ScopeInstance, WeakScopeInstance};

use crate::ResolveMode;

/// Registry plus root scope instance.
pub struct Platform<K: ScopeKind = Scope> {
    pub(crate) registry: SharedRegistry<K>,
    pub(crate) root: ScopeInstance<K>,
    pub(crate) mode: ResolveMode,
    interner: Arc<MetaInterner>,
}

impl<K: ScopeKind> Platform<K> {
    /// Platform over `registry` in `Standard` mode.
    pub fn new(registry: Registry<K>) -> Self {
        PlatformBuilder::new().registry(registry).build()
    }

    pub fn builder() -> PlatformBuilder<K> {
        PlatformBuilder::new()
    }

    /// The shared registry. Writes are meant for setup only.
    #[inline]
    pub fn registry(&self) -> &SharedRegistry<K> {
        &self.registry
    }

    /// The root scope instance, engaged for the platform's whole lifetime.
    #[inline]
    pub fn root(&self) -> &ScopeInstance<K> {
        &self.root
    }

    #[inline]
    pub fn mode(&self) -> ResolveMode {
        self.mode
    }

    #[inline]
    pub fn interner(&self) -> &MetaInterner {
        &self.interner
    }

    /// Interned metadata requesting `T`.
    pub fn gets<T: ?Sized + 'static>(&self) -> SharedMeta {
        self.gets_keyed(InjectionKey::of::<T>())
    }

    /// Interned metadata requesting `T` under `tag`.
    pub fn gets_tagged<T: ?Sized + 'static>(&self, tag: impl Into<Tag>) -> SharedMeta {
        self.gets_keyed(InjectionKey::tagged::<T>(tag))
    }

    /// Interned metadata requesting an arbitrary key.
    pub fn gets_keyed(&self, key: InjectionKey) -> SharedMeta {
        self.interner.intern(InjectionMeta::new(key))
    }

    /// Bind the platform's own key and seed the root with a view of it.
    ///
    /// The cached view holds the root weakly. A strong handle would keep the
    /// root alive through its own cache.
    fn seed_self(&self) {
        let key = InjectionKey::of::<Platform<K>>();
        let reference = ReferenceKey::new(Handle::of::<Platform<K>>(), K::ROOT);
        let binding = Binding::mapped(reference, |instance| {
            instance
                .downcast::<PlatformSeed<K>>()
                .and_then(|seed| seed.upgrade())
                .map(Instance::from_value)
        });
        self.registry.write().register_binding(key, binding);

        let seed = PlatformSeed {
            registry: self.registry.clone(),
            root: self.root.downgrade(),
            mode: self.mode,
            interner: Arc::clone(&self.interner),
        };
        self.root
            .lock_cache()
            .insert(reference, Instance::from_value(seed));
    }

    /// Enter every scope level from the root down to `target`.
    pub fn enter(&self, target: K) -> Result<ScopeInstance<K>, ScopeError> {
        self.root.enter_chain(target)
    }

    /// Run `work` in a fresh chain from the root down to `target`, with each
    /// level entered in its own task.
    pub async fn run_in<F, Fut>(&self, target: K, work: F) -> Result<Fut::Output, ScopeError>
    where
        F: FnOnce(ScopeInstance<K>) -> Fut + Send + 'static,
        Fut: Future + Send + 'static,
        Fut::Output: Send + 'static,
    {
        transition_async(&self.root, target, work).await
    }
}

impl<K: ScopeKind> Clone for Platform<K> {
    fn clone(&self) -> Self {
        Platform {
            registry: self.registry.clone(),
            root: self.root.clone(),
            mode: self.mode,
            interner: Arc::clone(&self.interner),
        }
    }
}

impl<K: ScopeKind> fmt::Debug for Platform<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Platform")
            .field("root", &self.root)
            .field("mode", &self.mode)
            .field("bindings", &self.registry.read().len())
            .finish_non_exhaustive()
    }
}

/// What the root caches for the platform: everything but a strong root.
struct PlatformSeed<K: ScopeKind> {
    registry: SharedRegistry<K>,
    root: WeakScopeInstance<K>,
    mode: ResolveMode,
    interner: Arc<MetaInterner>,
}

impl<K: ScopeKind> PlatformSeed<K> {
    fn upgrade(&self) -> Option<Platform<K>> {
        Some(Platform {
            registry: self.registry.clone(),
            root: self.root.upgrade()?,
            mode: self.mode,
            interner: Arc::clone(&self.interner),
        })
    }
}

/// Builder for [`Platform`].
///
/// Defaults to an empty registry in `Standard` mode.
pub struct PlatformBuilder<K: ScopeKind = Scope> {
    registry: Option<SharedRegistry<K>>,
    mode: ResolveMode,
}

impl<K: ScopeKind> PlatformBuilder<K> {
    pub fn new() -> Self {
        PlatformBuilder {
            registry: None,
            mode: ResolveMode::default(),
        }
    }

    /// Resolve against `registry`.
    #[must_use]
    pub fn registry(mut self, registry: Registry<K>) -> Self {
        self.registry = Some(SharedRegistry::new(registry));
        self
    }

    /// Resolve against a registry shared with other platforms.
    #[must_use]
    pub fn shared_registry(mut self, registry: SharedRegistry<K>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Set the resolution mode.
    #[must_use]
    pub fn mode(mut self, mode: ResolveMode) -> Self {
        self.mode = mode;
        self
    }

    /// Build the platform, enter its root scope and make the platform
    /// resolvable from it.
    pub fn build(self) -> Platform<K> {
        let platform = Platform {
            registry: self.registry.unwrap_or_default(),
            root: ScopeInstance::root(),
            mode: self.mode,
            interner: Arc::new(MetaInterner::new()),
        };
        platform.seed_self();
        tracing::debug!(root = %platform.root.kind(), mode = ?platform.mode, "platform built");
        platform
    }
}

impl<K: ScopeKind> Default for PlatformBuilder<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests;
