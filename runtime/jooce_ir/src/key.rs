//! Injection keys and reference keys.
//!
//! The two-level key scheme separates *what a caller asks for* from *which
//! provider satisfies it and at what lifetime*:
//!
//! ```text
//! InjectionKey(dyn Engine, tag=gas) ──registry──▶ ReferenceKey(GasEngine, platform)
//! InjectionKey(dyn Engine)          ──┐
//! InjectionKey(dyn Engine, electric)──┴registry──▶ ReferenceKey(ElectricEngine, platform)
//! ```

use std::fmt;

use crate::handle::{Handle, Tag};
use crate::scope::{Scope, ScopeKind};

/// Identifies a dependency request: a handle plus an optional tag.
///
/// Two keys are equal iff both components are equal.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct InjectionKey {
    handle: Handle,
    tag: Option<Tag>,
}

impl InjectionKey {
    pub fn new(handle: Handle, tag: Option<Tag>) -> Self {
        InjectionKey { handle, tag }
    }

    /// Untagged key for `T`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        InjectionKey::new(Handle::of::<T>(), None)
    }

    /// Key for `T` disambiguated by `tag`.
    pub fn tagged<T: ?Sized + 'static>(tag: impl Into<Tag>) -> Self {
        InjectionKey::new(Handle::of::<T>(), Some(tag.into()))
    }

    #[inline]
    pub fn handle(&self) -> Handle {
        self.handle
    }

    #[inline]
    pub fn tag(&self) -> Option<&Tag> {
        self.tag.as_ref()
    }

    /// Same handle, different tag.
    #[must_use]
    pub fn with_tag(&self, tag: Option<Tag>) -> Self {
        InjectionKey::new(self.handle, tag)
    }
}

impl fmt::Debug for InjectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for InjectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tag {
            Some(tag) => write!(f, "::{}/{}", self.handle, tag),
            None => write!(f, "::{}", self.handle),
        }
    }
}

/// Identifies a provider binding: the provider's handle plus the scope kind
/// its instances are cached at.
///
/// Registered providers use a minted handle; type handles name seeded values.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReferenceKey<K: ScopeKind = Scope> {
    handle: Handle,
    scope: K,
}

impl<K: ScopeKind> ReferenceKey<K> {
    pub fn new(handle: Handle, scope: K) -> Self {
        ReferenceKey { handle, scope }
    }

    /// Reference to values of type `C`, cached at the root scope.
    pub fn of<C: ?Sized + 'static>() -> Self {
        ReferenceKey::new(Handle::of::<C>(), K::ROOT)
    }

    #[inline]
    pub fn handle(&self) -> Handle {
        self.handle
    }

    #[inline]
    pub fn scope(&self) -> K {
        self.scope
    }

    /// Same provider, cached at `scope` instead.
    #[must_use]
    pub fn in_scope(self, scope: K) -> Self {
        ReferenceKey::new(self.handle, scope)
    }
}

impl<K: ScopeKind> fmt::Debug for ReferenceKey<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceKey")
            .field("handle", &self.handle)
            .field("scope", &self.scope)
            .finish()
    }
}

impl<K: ScopeKind> fmt::Display for ReferenceKey<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.handle, self.scope)
    }
}
