//! Type handles and tags.
//!
//! A [`Handle`] names a type at runtime: the requested type of a dependency
//! (possibly an interface such as `dyn Engine`), or one registered provider.
//! A [`Tag`] tells apart several providers registered under one handle.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_MINTED: AtomicU64 = AtomicU64::new(0);

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
enum HandleId {
    Type(TypeId),
    /// One provider among possibly many producing the same type.
    Minted(u64),
}

/// Runtime identity of a type or of a single provider.
///
/// Equality and hashing only look at the id; the name is kept for
/// diagnostics.
#[derive(Clone, Copy)]
pub struct Handle {
    id: HandleId,
    name: &'static str,
}

impl Handle {
    /// Handle for `T`. Unsized types are accepted, so `dyn Trait` can serve
    /// as an interface handle.
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Handle {
            id: HandleId::Type(TypeId::of::<T>()),
            name: std::any::type_name::<T>(),
        }
    }

    /// A handle distinct from every other, displayed as `T`.
    ///
    /// Each registered provider gets one, so two constructors of the same
    /// type never share a cache slot.
    pub fn minted<T: ?Sized + 'static>() -> Self {
        Handle {
            id: HandleId::Minted(NEXT_MINTED.fetch_add(1, Ordering::Relaxed)),
            name: std::any::type_name::<T>(),
        }
    }

    /// The `TypeId` this handle names; `None` for minted handles.
    #[inline]
    pub fn type_id(self) -> Option<TypeId> {
        match self.id {
            HandleId::Type(id) => Some(id),
            HandleId::Minted(_) => None,
        }
    }

    /// Fully qualified type name.
    #[inline]
    pub fn name(self) -> &'static str {
        self.name
    }

    /// Type name without its module path (`dyn app::Engine` becomes `Engine`).
    ///
    /// Generic arguments and trait-object bounds are kept as written.
    pub fn short_name(self) -> &'static str {
        let name = self.name;
        let offset = if name.starts_with("dyn ") { 4 } else { 0 };
        let path_end = name[offset..]
            .find(['<', ' '])
            .map_or(name.len(), |idx| idx + offset);
        let start = name[offset..path_end]
            .rfind("::")
            .map_or(offset, |idx| offset + idx + 2);
        &name[start..]
    }
}

impl PartialEq for Handle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Handle {}

impl Hash for Handle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            HandleId::Type(_) => write!(f, "Handle({})", self.short_name()),
            HandleId::Minted(n) => write!(f, "Handle({}#{n})", self.short_name()),
        }
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Disambiguates providers of the same handle (`gas`, `electric`, ...).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(Arc<str>);

impl Tag {
    pub fn new(tag: impl Into<Arc<str>>) -> Self {
        Tag(tag.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Tag {
    fn from(tag: &str) -> Self {
        Tag::new(tag)
    }
}

impl From<String> for Tag {
    fn from(tag: String) -> Self {
        Tag::new(tag)
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({:?})", &*self.0)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
