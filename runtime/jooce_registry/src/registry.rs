//! Provider registry: injection keys to provider bindings.
//!
//! Registration is append-only during setup and re-registering a key
//! overwrites its binding ("latest provides wins"), so a provider may claim a
//! key previously bound to another one.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use jooce_ir::{Handle, InjectionKey, Instance, ReferenceKey, Scope, ScopeKind, Tag};
use rustc_hash::FxHashMap;

use crate::{Injectable, Provider, RegistryError};

type Projection = Arc<dyn Fn(&Instance) -> Option<Instance> + Send + Sync>;

/// What an injection key resolves to.
#[derive(Clone)]
pub struct Binding<K: ScopeKind = Scope> {
    reference: ReferenceKey<K>,
    /// Converts the provider's concrete value to the requested view.
    /// `None` hands the concrete value out unchanged.
    projection: Option<Projection>,
}

impl<K: ScopeKind> Binding<K> {
    /// Binding that hands out the provider's value unchanged.
    pub fn direct(reference: ReferenceKey<K>) -> Self {
        Binding {
            reference,
            projection: None,
        }
    }

    /// Binding that views a provider of `C` as `I`.
    pub fn projected<C, I>(
        reference: ReferenceKey<K>,
        cast: impl Fn(Arc<C>) -> Arc<I> + Send + Sync + 'static,
    ) -> Self
    where
        C: Send + Sync + 'static,
        I: ?Sized + Send + Sync + 'static,
    {
        let projection: Projection = Arc::new(move |instance: &Instance| {
            instance
                .downcast::<C>()
                .map(|concrete| Instance::new(cast(concrete)))
        });
        Binding {
            reference,
            projection: Some(projection),
        }
    }

    /// Binding whose view of the cached value is computed by `projection`.
    ///
    /// `projection` returns `None` when the cached value cannot be viewed as
    /// the requested type.
    pub fn mapped(
        reference: ReferenceKey<K>,
        projection: impl Fn(&Instance) -> Option<Instance> + Send + Sync + 'static,
    ) -> Self {
        Binding {
            reference,
            projection: Some(Arc::new(projection)),
        }
    }

    #[inline]
    pub fn reference(&self) -> ReferenceKey<K> {
        self.reference
    }

    /// View `instance` (the provider's cached value) as the requested type.
    ///
    /// Returns `None` if the cached value is not what the projection expects.
    pub fn project(&self, instance: Instance) -> Option<Instance> {
        match &self.projection {
            Some(projection) => projection(&instance),
            None => Some(instance),
        }
    }
}

impl<K: ScopeKind> fmt::Debug for Binding<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("reference", &self.reference)
            .field("projected", &self.projection.is_some())
            .finish()
    }
}

/// Mapping from injection keys to provider bindings, plus the providers.
pub struct Registry<K: ScopeKind = Scope> {
    bindings: FxHashMap<InjectionKey, Binding<K>>,
    providers: FxHashMap<Handle, Provider>,
}

impl<K: ScopeKind> Registry<K> {
    pub fn new() -> Self {
        Registry {
            bindings: FxHashMap::default(),
            providers: FxHashMap::default(),
        }
    }

    fn bind(&mut self, key: InjectionKey, binding: Binding<K>) -> Option<Binding<K>> {
        tracing::debug!(key = %key, reference = %binding.reference, "registered binding");
        let previous = self.bindings.insert(key.clone(), binding);
        if let Some(previous) = &previous {
            tracing::debug!(key = %key, previous = %previous.reference, "binding overwritten");
        }
        previous
    }

    /// Bind `key` to `reference`, handing out the provider's value unchanged.
    ///
    /// Returns the binding this replaced, if any.
    pub fn register(
        &mut self,
        key: InjectionKey,
        reference: ReferenceKey<K>,
    ) -> Option<Binding<K>> {
        self.bind(key, Binding::direct(reference))
    }

    /// Bind `key` to an arbitrary binding.
    ///
    /// Returns the binding this replaced, if any.
    pub fn register_binding(
        &mut self,
        key: InjectionKey,
        binding: Binding<K>,
    ) -> Option<Binding<K>> {
        self.bind(key, binding)
    }

    /// Store `provider` and bind its output type under `tag` to it at `scope`.
    ///
    /// With `tag == None` the provider satisfies untagged requests for the
    /// type it constructs.
    pub fn register_provider(
        &mut self,
        tag: Option<Tag>,
        scope: K,
        provider: Provider,
    ) -> ReferenceKey<K> {
        let output = provider.output();
        let reference = self.store_provider(scope, provider);
        self.register(InjectionKey::new(output, tag), reference);
        reference
    }

    fn store_provider(&mut self, scope: K, provider: Provider) -> ReferenceKey<K> {
        let reference = ReferenceKey::new(provider.handle(), scope);
        self.providers.insert(provider.handle(), provider);
        reference
    }

    /// Register `constructor` as a provider of `C`, cached at the root
    /// scope and bound under `C`'s own key.
    ///
    /// The returned [`Provision`] adds further keys and changes the scope.
    pub fn provides<C: Send + Sync + 'static>(
        &mut self,
        constructor: Injectable<C>,
    ) -> Provision<'_, K, C> {
        let provision = self.provides_unbound(constructor);
        let key = InjectionKey::of::<C>();
        let binding = Binding::direct(provision.reference);
        provision.bind(key, binding)
    }

    /// Register `constructor` as a provider of `C` without binding any key.
    ///
    /// Only the keys added through the returned [`Provision`] reach it, so a
    /// provider can serve an interface under a tag and nothing else.
    pub fn provides_unbound<C: Send + Sync + 'static>(
        &mut self,
        constructor: Injectable<C>,
    ) -> Provision<'_, K, C> {
        let reference = self.store_provider(K::ROOT, Provider::new(constructor));
        Provision {
            registry: self,
            reference,
            keys: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Bind `T` to values seeded into scope instances of kind `scope`.
    ///
    /// There is no provider; resolving `T` in an instance that was not seeded
    /// fails.
    pub fn provides_seeded<T: ?Sized + 'static>(&mut self, scope: K) -> ReferenceKey<K> {
        let reference = ReferenceKey::new(Handle::of::<T>(), scope);
        self.register(InjectionKey::of::<T>(), reference);
        reference
    }

    /// Binding for `key`.
    pub fn resolve_binding(&self, key: &InjectionKey) -> Result<&Binding<K>, RegistryError> {
        self.bindings
            .get(key)
            .ok_or_else(|| RegistryError::NotFound(key.clone()))
    }

    /// Provider registered under `handle`.
    pub fn provider(&self, handle: Handle) -> Option<&Provider> {
        self.providers.get(&handle)
    }

    pub fn contains(&self, key: &InjectionKey) -> bool {
        self.bindings.contains_key(key)
    }

    /// Registered injection keys, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &InjectionKey> {
        self.bindings.keys()
    }

    /// Number of bound injection keys.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl<K: ScopeKind> Default for Registry<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: ScopeKind> fmt::Debug for Registry<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("bindings", &self.bindings)
            .field("providers", &self.providers.len())
            .finish()
    }
}

/// Fluent registration of keys for one provider of `C`.
pub struct Provision<'r, K: ScopeKind, C> {
    registry: &'r mut Registry<K>,
    reference: ReferenceKey<K>,
    /// Keys bound through this provision, re-pointed by `in_scope`.
    keys: Vec<InjectionKey>,
    _marker: PhantomData<fn() -> C>,
}

impl<K: ScopeKind, C: Send + Sync + 'static> Provision<'_, K, C> {
    /// Cache this provider's values at `scope`.
    ///
    /// Applies to every key bound through this provision, before and after.
    pub fn in_scope(mut self, scope: K) -> Self {
        self.reference = self.reference.in_scope(scope);
        for key in &self.keys {
            if let Some(binding) = self.registry.bindings.get_mut(key) {
                if binding.reference.handle() == self.reference.handle() {
                    binding.reference = self.reference;
                }
            }
        }
        self
    }

    /// Also satisfy requests for `C` under `tag`.
    pub fn tagged(self, tag: impl Into<Tag>) -> Self {
        let key = InjectionKey::tagged::<C>(tag);
        let binding = Binding::direct(self.reference);
        self.bind(key, binding)
    }

    /// Also satisfy untagged requests for the interface `I`.
    pub fn as_interface<I>(self, cast: impl Fn(Arc<C>) -> Arc<I> + Send + Sync + 'static) -> Self
    where
        I: ?Sized + Send + Sync + 'static,
    {
        let binding = Binding::projected(self.reference, cast);
        self.bind(InjectionKey::of::<I>(), binding)
    }

    /// Also satisfy requests for the interface `I` under `tag`.
    pub fn as_tagged<I>(
        self,
        tag: impl Into<Tag>,
        cast: impl Fn(Arc<C>) -> Arc<I> + Send + Sync + 'static,
    ) -> Self
    where
        I: ?Sized + Send + Sync + 'static,
    {
        let binding = Binding::projected(self.reference, cast);
        self.bind(InjectionKey::tagged::<I>(tag), binding)
    }

    /// Reference key the provider's values are cached under.
    #[inline]
    pub fn reference(&self) -> ReferenceKey<K> {
        self.reference
    }

    fn bind(mut self, key: InjectionKey, binding: Binding<K>) -> Self {
        self.registry.bind(key.clone(), binding);
        self.keys.push(key);
        self
    }
}
