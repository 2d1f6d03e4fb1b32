//! Dependency resolution and invocation.
//!
//! # Resolution
//!
//! `provide(key, active)`:
//!
//! 1. Snapshot the binding for `key` (and its provider) from the registry.
//! 2. Walk up from `active` to the nearest instance of the binding's scope.
//! 3. Under that instance's cache lock, return the cached value or construct,
//!    store and return a new one.
//! 4. Project the value to the requested view.
//!
//! A provider's own dependencies are resolved from the instance that will
//! cache it, never from the caller's deeper scope. Cache locks are therefore
//! always taken from descendant to ancestor, and a long-lived value can never
//! capture a shorter-lived one.
//!
//! # Invocation
//!
//! `invoke(callable, explicit, active)` fills every declared parameter it can
//! from the registry and hands the rest, in declaration order, to `explicit`.

use std::fmt;
use std::sync::Arc;

use jooce_ir::{InjectionKey, Instance, ReferenceKey, ScopeKind, Tag};
use jooce_registry::{Arguments, Injectable, ParamKind, Provider};
use jooce_scope::ScopeInstance;

use crate::resolution::ResolutionStack;
use crate::stack::ensure_sufficient_stack;
use crate::{Platform, ResolveError};

impl<K: ScopeKind> Platform<K> {
    /// Resolve `key` with `active` as the innermost engaged scope.
    #[tracing::instrument(level = "debug", skip_all, fields(key = %key, active = %active.kind()))]
    pub fn provide(
        &self,
        key: &InjectionKey,
        active: &ScopeInstance<K>,
    ) -> Result<Instance, ResolveError> {
        let mut stack = self.resolution_stack();
        self.provide_in(key, active, &mut stack)
    }

    /// Resolve `T` under its untagged key.
    pub fn get<T: ?Sized + Send + Sync + 'static>(
        &self,
        active: &ScopeInstance<K>,
    ) -> Result<Arc<T>, ResolveError> {
        self.get_keyed(&InjectionKey::of::<T>(), active)
    }

    /// Resolve `T` under `tag`.
    pub fn get_tagged<T: ?Sized + Send + Sync + 'static>(
        &self,
        tag: impl Into<Tag>,
        active: &ScopeInstance<K>,
    ) -> Result<Arc<T>, ResolveError> {
        self.get_keyed(&InjectionKey::tagged::<T>(tag), active)
    }

    /// Resolve `key` and view the result as `T`.
    pub fn get_keyed<T: ?Sized + Send + Sync + 'static>(
        &self,
        key: &InjectionKey,
        active: &ScopeInstance<K>,
    ) -> Result<Arc<T>, ResolveError> {
        let instance = self.provide(key, active)?;
        instance
            .downcast::<T>()
            .ok_or_else(|| ResolveError::TypeMismatch {
                key: key.clone(),
                expected: std::any::type_name::<T>(),
                found: instance.type_name(),
            })
    }

    /// Call `callable`, injecting what the registry provides and passing
    /// `explicit` for the remaining parameters in declaration order.
    #[tracing::instrument(level = "debug", skip_all, fields(callable = callable.name()))]
    pub fn invoke<R>(
        &self,
        callable: &Injectable<R>,
        explicit: Vec<Instance>,
        active: &ScopeInstance<K>,
    ) -> Result<R, ResolveError> {
        let mut stack = self.resolution_stack();
        let args = self.collect_arguments(callable, explicit, active, &mut stack)?;
        callable
            .call(&args)
            .map_err(|err| ResolveError::Invocation {
                callable: callable.name(),
                message: err.to_string(),
            })
    }

    /// Bind `callable` to this platform for repeated invocation.
    pub fn wrap<R>(&self, callable: Injectable<R>) -> Wrapped<K, R> {
        Wrapped {
            platform: self.clone(),
            callable,
        }
    }

    fn resolution_stack(&self) -> ResolutionStack<K> {
        ResolutionStack::new(self.mode.max_depth())
    }

    fn provide_in(
        &self,
        key: &InjectionKey,
        active: &ScopeInstance<K>,
        stack: &mut ResolutionStack<K>,
    ) -> Result<Instance, ResolveError> {
        let (binding, provider) = self.registry.lookup(key)?;
        let reference = binding.reference();
        let owner =
            active
                .lookup(reference.scope())
                .ok_or_else(|| ResolveError::ScopeNotEngaged {
                    key: key.clone(),
                    required: reference.scope().name(),
                    active: active.kind().name(),
                })?;

        // Held through construction: concurrent resolutions in this instance
        // wait for the first one and then hit the cache.
        let cache = owner.lock_cache();
        let instance = if let Some(cached) = cache.get(&reference) {
            tracing::trace!(%reference, scope = owner.id(), "cache hit");
            cached
        } else {
            let provider = provider.ok_or_else(|| ResolveError::NotSeeded {
                key: key.clone(),
                reference: reference.to_string(),
            })?;
            stack.push(reference)?;
            let built = ensure_sufficient_stack(|| self.construct(&provider, reference, owner, stack));
            stack.pop();
            let built = built?;
            cache.insert(reference, built.clone());
            built
        };
        drop(cache);

        binding
            .project(instance.clone())
            .ok_or_else(|| ResolveError::TypeMismatch {
                key: key.clone(),
                expected: key.handle().name(),
                found: instance.type_name(),
            })
    }

    fn construct(
        &self,
        provider: &Provider,
        reference: ReferenceKey<K>,
        owner: &ScopeInstance<K>,
        stack: &mut ResolutionStack<K>,
    ) -> Result<Instance, ResolveError> {
        let constructor = provider.constructor();
        let args = self.collect_arguments(constructor, Vec::new(), owner, stack)?;
        let instance = constructor
            .call(&args)
            .map_err(|err| ResolveError::Construction {
                reference: reference.to_string(),
                message: err.to_string(),
            })?;
        tracing::debug!(
            %reference,
            scope = owner.id(),
            depth = stack.depth(),
            "constructed"
        );
        Ok(instance)
    }

    fn collect_arguments<R>(
        &self,
        callable: &Injectable<R>,
        explicit: Vec<Instance>,
        active: &ScopeInstance<K>,
        stack: &mut ResolutionStack<K>,
    ) -> Result<Arguments, ResolveError> {
        let params = callable.params();
        let mut slots: Vec<Option<Instance>> = Vec::with_capacity(params.len());
        let mut deferred = Vec::new();

        for (index, param) in params.iter().enumerate() {
            let injected = match param.kind() {
                ParamKind::Injected(meta) => match self.provide_in(meta.key(), active, stack) {
                    Ok(instance) => Some(instance),
                    Err(err) if err.is_not_found() => None,
                    Err(err) => return Err(err),
                },
                ParamKind::Typed(key) if self.registry.contains(key) => {
                    Some(self.provide_in(key, active, stack)?)
                }
                ParamKind::Typed(_) | ParamKind::Explicit => None,
            };
            if injected.is_none() {
                deferred.push(index);
            }
            slots.push(injected);
        }

        if deferred.len() != explicit.len() {
            return Err(ResolveError::ArityMismatch {
                callable: callable.name(),
                missing: deferred
                    .iter()
                    .skip(explicit.len())
                    .map(|&index| params[index].name().to_owned())
                    .collect(),
                extra: explicit.len().saturating_sub(deferred.len()),
            });
        }
        for (index, value) in deferred.into_iter().zip(explicit) {
            slots[index] = Some(value);
        }

        Ok(callable.arguments(slots.into_iter().flatten().collect()))
    }
}

/// An injectable bound to a platform: a drop-in callable that only needs
/// the explicit arguments.
pub struct Wrapped<K: ScopeKind, R> {
    platform: Platform<K>,
    callable: Injectable<R>,
}

impl<K: ScopeKind, R> Wrapped<K, R> {
    /// Invoke with `active` as the innermost engaged scope.
    pub fn call(&self, explicit: Vec<Instance>, active: &ScopeInstance<K>) -> Result<R, ResolveError> {
        self.platform.invoke(&self.callable, explicit, active)
    }

    /// Invoke with only the platform's root scope engaged.
    pub fn call_root(&self, explicit: Vec<Instance>) -> Result<R, ResolveError> {
        self.platform.invoke(&self.callable, explicit, self.platform.root())
    }

    #[inline]
    pub fn callable(&self) -> &Injectable<R> {
        &self.callable
    }
}

impl<K: ScopeKind, R> Clone for Wrapped<K, R> {
    fn clone(&self) -> Self {
        Wrapped {
            platform: self.platform.clone(),
            callable: self.callable.clone(),
        }
    }
}

impl<K: ScopeKind, R> fmt::Debug for Wrapped<K, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wrapped")
            .field("callable", &self.callable.name())
            .finish_non_exhaustive()
    }
}
