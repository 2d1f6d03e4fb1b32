//! Live scope instances.
//!
//! Follows the interpreter's parent-linked `Scope` model: each instance owns
//! its own bindings (here, a cache of resolved values) and a link to the
//! instance it was entered from. Unlike interpreter scopes, instances are
//! shared across threads, so the node lives behind an `Arc` and the cache is
//! guarded by a re-entrant lock.

use std::cell::RefCell;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use jooce_ir::{path_between, Handle, Instance, ReferenceKey, Scope, ScopeKind};
use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use rustc_hash::FxHashMap;

use crate::ScopeError;

/// Source of scope instance ids (diagnostics only).
static NEXT_SCOPE_ID: AtomicU64 = AtomicU64::new(0);

type Cache<K> = FxHashMap<ReferenceKey<K>, Instance>;

/// One live occurrence of a scope kind.
///
/// Cloning is cheap and yields a handle to the same instance. The instance is
/// torn down (its cache released) when the last handle is dropped; children
/// keep their ancestors alive, never the other way around.
pub struct ScopeInstance<K: ScopeKind = Scope>(Arc<ScopeNode<K>>);

struct ScopeNode<K: ScopeKind> {
    id: u64,
    kind: K,
    /// Instance this one was entered from (`None` at the root).
    parent: Option<ScopeInstance<K>>,
    /// Resolved values, guarded for check-construct-store sequences.
    cache: ReentrantMutex<RefCell<Cache<K>>>,
}

impl<K: ScopeKind> ScopeInstance<K> {
    /// Create a root instance of `K::ROOT`.
    pub fn root() -> Self {
        Self::create(K::ROOT, None)
    }

    fn create(kind: K, parent: Option<ScopeInstance<K>>) -> Self {
        let id = NEXT_SCOPE_ID.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            scope = %kind,
            id,
            parent = parent.as_ref().map(ScopeInstance::id),
            "entered scope"
        );
        ScopeInstance(Arc::new(ScopeNode {
            id,
            kind,
            parent,
            cache: ReentrantMutex::new(RefCell::new(FxHashMap::default())),
        }))
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.0.id
    }

    #[inline]
    pub fn kind(&self) -> K {
        self.0.kind
    }

    #[inline]
    pub fn parent(&self) -> Option<&ScopeInstance<K>> {
        self.0.parent.as_ref()
    }

    /// This instance followed by each of its ancestors, up to the root.
    pub fn ancestors(&self) -> impl Iterator<Item = &ScopeInstance<K>> {
        std::iter::successors(Some(self), |instance| instance.parent())
    }

    /// Nearest engaged instance of `kind`, starting from this one.
    ///
    /// Returns `None` if no instance of `kind` is part of the active chain.
    pub fn lookup(&self, kind: K) -> Option<&ScopeInstance<K>> {
        self.ancestors().find(|instance| instance.kind() == kind)
    }

    /// Returns `true` if both handles refer to the same instance.
    #[inline]
    pub fn ptr_eq(&self, other: &ScopeInstance<K>) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Handle that does not keep this instance alive.
    ///
    /// Values cached in an instance must refer back to it through a weak
    /// handle, or the instance is never torn down.
    pub fn downgrade(&self) -> WeakScopeInstance<K> {
        WeakScopeInstance(Arc::downgrade(&self.0))
    }

    /// Enter a direct child kind.
    ///
    /// `target`'s declared parent must be this instance's kind; transitions
    /// proceed one level at a time.
    pub fn transition(&self, target: K) -> Result<ScopeInstance<K>, ScopeError> {
        if target.parent() != Some(self.kind()) {
            return Err(ScopeError::invalid_transition(self.kind(), target));
        }
        Ok(Self::create(target, Some(self.clone())))
    }

    /// Enter every level between this instance and `target`, top-down.
    ///
    /// Returns the deepest instance; intermediate instances stay alive through
    /// its parent links. Fails with `NoTransitionPath` unless `target` is a
    /// strict descendant of this instance's kind.
    pub fn enter_chain(&self, target: K) -> Result<ScopeInstance<K>, ScopeError> {
        let path = path_between(self.kind(), target)
            .ok_or_else(|| ScopeError::no_path(self.kind(), target))?;
        path.into_iter()
            .try_fold(self.clone(), |current, kind| current.transition(kind))
    }

    /// Enter the chain down to `target`, run `work` in it, then tear it down.
    pub fn enter_chain_with<R>(
        &self,
        target: K,
        work: impl FnOnce(&ScopeInstance<K>) -> R,
    ) -> Result<R, ScopeError> {
        let deepest = self.enter_chain(target)?;
        Ok(work(&deepest))
    }

    /// Lock this instance's cache.
    ///
    /// The lock is re-entrant: the thread holding it may resolve nested
    /// dependencies cached in the same instance. Other threads block until the
    /// guard is dropped.
    pub fn lock_cache(&self) -> CacheGuard<'_, K> {
        CacheGuard {
            guard: self.0.cache.lock(),
        }
    }

    /// Cached value for `reference`, if any.
    pub fn cached(&self, reference: &ReferenceKey<K>) -> Option<Instance> {
        self.lock_cache().get(reference)
    }

    /// Number of cached values.
    pub fn cached_len(&self) -> usize {
        self.lock_cache().len()
    }

    /// Place an externally built value into this instance's cache under
    /// `ReferenceKey(T, self.kind())`.
    pub fn seed<T: ?Sized + Send + Sync + 'static>(&self, value: Arc<T>) -> Option<Instance> {
        let reference = ReferenceKey::new(Handle::of::<T>(), self.kind());
        self.lock_cache().insert(reference, Instance::new(value))
    }

    /// Place `instance` into this cache under `reference`.
    ///
    /// `reference` must be cached at this instance's kind.
    pub fn seed_instance(
        &self,
        reference: ReferenceKey<K>,
        instance: Instance,
    ) -> Result<Option<Instance>, ScopeError> {
        if reference.scope() != self.kind() {
            return Err(ScopeError::SeedMismatch {
                reference: reference.to_string(),
                scope: self.kind().name(),
            });
        }
        Ok(self.lock_cache().insert(reference, instance))
    }
}

impl<K: ScopeKind> Clone for ScopeInstance<K> {
    #[inline]
    fn clone(&self) -> Self {
        ScopeInstance(Arc::clone(&self.0))
    }
}

impl<K: ScopeKind> fmt::Debug for ScopeInstance<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeInstance")
            .field("id", &self.id())
            .field("kind", &self.kind())
            .field("parent", &self.parent().map(ScopeInstance::id))
            .finish_non_exhaustive()
    }
}

impl<K: ScopeKind> Drop for ScopeNode<K> {
    fn drop(&mut self) {
        tracing::debug!(
            scope = %self.kind,
            id = self.id,
            cached = self.cache.get_mut().get_mut().len(),
            "exited scope"
        );
    }
}

/// Non-owning handle to a [`ScopeInstance`].
pub struct WeakScopeInstance<K: ScopeKind = Scope>(Weak<ScopeNode<K>>);

impl<K: ScopeKind> WeakScopeInstance<K> {
    /// The instance, unless it has been torn down.
    pub fn upgrade(&self) -> Option<ScopeInstance<K>> {
        self.0.upgrade().map(ScopeInstance)
    }
}

impl<K: ScopeKind> Clone for WeakScopeInstance<K> {
    fn clone(&self) -> Self {
        WeakScopeInstance(Weak::clone(&self.0))
    }
}

impl<K: ScopeKind> fmt::Debug for WeakScopeInstance<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(instance) => write!(f, "WeakScopeInstance({})", instance.id()),
            None => f.write_str("WeakScopeInstance(<dropped>)"),
        }
    }
}

/// Exclusive (re-entrant) access to one instance's cache.
///
/// Borrows of the underlying map are confined to each method call, so a guard
/// may be held across nested resolutions that lock the same cache again.
pub struct CacheGuard<'a, K: ScopeKind> {
    guard: ReentrantMutexGuard<'a, RefCell<Cache<K>>>,
}

impl<K: ScopeKind> CacheGuard<'_, K> {
    pub fn get(&self, reference: &ReferenceKey<K>) -> Option<Instance> {
        self.guard.borrow().get(reference).cloned()
    }

    pub fn contains(&self, reference: &ReferenceKey<K>) -> bool {
        self.guard.borrow().contains_key(reference)
    }

    /// Store `instance`, returning the value it replaced.
    pub fn insert(&self, reference: ReferenceKey<K>, instance: Instance) -> Option<Instance> {
        self.guard.borrow_mut().insert(reference, instance)
    }

    pub fn len(&self) -> usize {
        self.guard.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.guard.borrow().is_empty()
    }
}
