//! Scope kinds: the closed, ordered set of lifetimes a value can be cached at.
//!
//! Every non-root kind declares exactly one parent kind, so the kinds of a
//! hierarchy form a single chain from the root to the deepest kind:
//!
//! ```text
//! Scope:      platform ⊑ session ⊑ request ⊑ job
//! BatchScope: platform ⊑ batch ⊑ item
//! ```
//!
//! The hierarchy carries no runtime state. It is only consulted to validate
//! transitions and to compute which intermediate kinds must be entered.

use std::fmt;
use std::hash::Hash;

use smallvec::SmallVec;

/// Kinds to enter, top-down, when moving between two scope kinds.
///
/// Hierarchies are shallow, so paths stay inline.
pub type ScopePath<K> = SmallVec<[K; 4]>;

/// A closed hierarchy of lifetimes.
///
/// Implementors are plain `Copy` enums. The parent relation must be acyclic and
/// must form a single chain: `ALL` lists every kind root-first, and each entry's
/// parent is the entry before it.
pub trait ScopeKind:
    Copy + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static
{
    /// The process-wide root kind (`platform`).
    const ROOT: Self;

    /// Every kind of the hierarchy, root first.
    const ALL: &'static [Self];

    /// The declared parent kind, or `None` for the root.
    fn parent(self) -> Option<Self>;

    /// Lowercase display name (`platform`, `request`, ...).
    fn name(self) -> &'static str;

    /// Returns `true` for the root kind.
    #[inline]
    fn is_root(self) -> bool {
        self.parent().is_none()
    }

    /// Distance from the root kind (the root has depth 0).
    fn depth(self) -> usize {
        let mut depth = 0usize;
        let mut cursor = self.parent();
        while let Some(kind) = cursor {
            depth = depth.saturating_add(1);
            cursor = kind.parent();
        }
        depth
    }

    /// Returns `true` if `other` is reached from `self` by repeated `parent()`.
    ///
    /// Strict: a kind is not its own ancestor.
    fn has_ancestor(self, other: Self) -> bool {
        let mut cursor = self.parent();
        while let Some(kind) = cursor {
            if kind == other {
                return true;
            }
            cursor = kind.parent();
        }
        false
    }
}

/// Declared parent of `kind`, or `None` at the root.
#[inline]
pub fn parent_of<K: ScopeKind>(kind: K) -> Option<K> {
    kind.parent()
}

/// Holds iff `b` can be reached from `a` by repeated [`parent_of`].
#[inline]
pub fn is_ancestor<K: ScopeKind>(a: K, b: K) -> bool {
    a.has_ancestor(b)
}

/// Kinds to enter to move from `from` down to `to`.
///
/// The returned path is ordered top-down, excludes `from` and ends with `to`.
/// Returns `None` when `to` is not a strict descendant of `from` (including
/// `from == to` and moving upwards).
pub fn path_between<K: ScopeKind>(from: K, to: K) -> Option<ScopePath<K>> {
    let mut path = ScopePath::new();
    let mut cursor = Some(to);
    while let Some(kind) = cursor {
        if kind == from {
            if path.is_empty() {
                return None;
            }
            path.reverse();
            return Some(path);
        }
        path.push(kind);
        cursor = kind.parent();
    }
    None
}

/// Standard service hierarchy: `platform ⊑ session ⊑ request ⊑ job`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scope {
    /// Process-wide; one instance per platform.
    #[default]
    Platform,
    /// One per client session.
    Session,
    /// One per request inside a session.
    Request,
    /// One per background job spawned by a request.
    Job,
}

impl ScopeKind for Scope {
    const ROOT: Self = Scope::Platform;
    const ALL: &'static [Self] = &[Scope::Platform, Scope::Session, Scope::Request, Scope::Job];

    #[inline]
    fn parent(self) -> Option<Self> {
        match self {
            Scope::Platform => None,
            Scope::Session => Some(Scope::Platform),
            Scope::Request => Some(Scope::Session),
            Scope::Job => Some(Scope::Request),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Scope::Platform => "platform",
            Scope::Session => "session",
            Scope::Request => "request",
            Scope::Job => "job",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Batch processing hierarchy: `platform ⊑ batch ⊑ item`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BatchScope {
    #[default]
    Platform,
    Batch,
    Item,
}

impl ScopeKind for BatchScope {
    const ROOT: Self = BatchScope::Platform;
    const ALL: &'static [Self] = &[BatchScope::Platform, BatchScope::Batch, BatchScope::Item];

    #[inline]
    fn parent(self) -> Option<Self> {
        match self {
            BatchScope::Platform => None,
            BatchScope::Batch => Some(BatchScope::Platform),
            BatchScope::Item => Some(BatchScope::Batch),
        }
    }

    fn name(self) -> &'static str {
        match self {
            BatchScope::Platform => "platform",
            BatchScope::Batch => "batch",
            BatchScope::Item => "item",
        }
    }
}

impl fmt::Display for BatchScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
