//! Metadata carried by dependency declarations.
//!
//! A parameter declared with `gets(...)` carries an [`InjectionMeta`] record
//! naming the [`InjectionKey`] it requests. Records are plain hashable values;
//! the [`MetaInterner`] additionally shares one carrier between all
//! declarations with equal metadata, so equal declarations are pointer-identical.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHasher};

use crate::handle::Tag;
use crate::key::InjectionKey;

/// Number of independently locked interner shards.
const NUM_SHARDS: usize = 16;

/// Injection metadata attached to one declared parameter.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct InjectionMeta {
    key: InjectionKey,
}

impl InjectionMeta {
    pub fn new(key: InjectionKey) -> Self {
        InjectionMeta { key }
    }

    /// The key this declaration requests.
    #[inline]
    pub fn key(&self) -> &InjectionKey {
        &self.key
    }

    /// Updated copy requesting `tag` instead.
    #[must_use]
    pub fn with_tag(&self, tag: Option<Tag>) -> Self {
        InjectionMeta::new(self.key.with_tag(tag))
    }

    /// Updated copy requesting a different key.
    #[must_use]
    pub fn with_key(&self, key: InjectionKey) -> Self {
        InjectionMeta { key }
    }
}

/// A shared, immutable metadata carrier.
///
/// Compares by value; use [`SharedMeta::ptr_eq`] to observe interning.
#[derive(Clone)]
pub struct SharedMeta(Arc<InjectionMeta>);

impl SharedMeta {
    /// Wrap a record without interning it.
    pub fn new(meta: InjectionMeta) -> Self {
        SharedMeta(Arc::new(meta))
    }

    /// Returns `true` if both carriers are the same object.
    #[inline]
    pub fn ptr_eq(&self, other: &SharedMeta) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Deref for SharedMeta {
    type Target = InjectionMeta;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl PartialEq for SharedMeta {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.0 == *other.0
    }
}

impl Eq for SharedMeta {}

impl Hash for SharedMeta {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl fmt::Debug for SharedMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SharedMeta({})", self.0.key)
    }
}

/// Sharded interner for metadata carriers.
///
/// # Thread Safety
/// Uses one `RwLock` per shard. Lookups of already-interned records only take
/// a read lock.
pub struct MetaInterner {
    shards: [RwLock<FxHashMap<InjectionMeta, SharedMeta>>; NUM_SHARDS],
    /// Total count of interned records across all shards (O(1) `len()`).
    total_count: AtomicUsize,
}

impl MetaInterner {
    pub fn new() -> Self {
        MetaInterner {
            shards: std::array::from_fn(|_| RwLock::new(FxHashMap::default())),
            total_count: AtomicUsize::new(0),
        }
    }

    #[inline]
    fn shard_for(meta: &InjectionMeta) -> usize {
        let mut hasher = FxHasher::default();
        meta.hash(&mut hasher);
        usize::try_from(hasher.finish() % NUM_SHARDS as u64).unwrap_or(0)
    }

    /// Return the shared carrier for `meta`, creating it on first use.
    pub fn intern(&self, meta: InjectionMeta) -> SharedMeta {
        let shard = &self.shards[Self::shard_for(&meta)];

        // Fast path: already interned
        if let Some(shared) = shard.read().get(&meta) {
            return shared.clone();
        }

        let mut guard = shard.write();

        // Double-check after acquiring write lock
        if let Some(shared) = guard.get(&meta) {
            return shared.clone();
        }

        let shared = SharedMeta::new(meta.clone());
        guard.insert(meta, shared.clone());
        self.total_count.fetch_add(1, Ordering::Relaxed);
        shared
    }

    /// Intern the metadata requesting `key`.
    pub fn intern_key(&self, key: InjectionKey) -> SharedMeta {
        self.intern(InjectionMeta::new(key))
    }

    pub fn len(&self) -> usize {
        self.total_count.load(Ordering::Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MetaInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MetaInterner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetaInterner")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
