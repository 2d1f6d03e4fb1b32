//! Resolution modes.
//!
//! A [`ResolveMode`] is the policy a [`Platform`](crate::Platform) resolves
//! under. Enum dispatch, queried through policy methods, so new limits can be
//! added without threading extra parameters through the resolver.

/// Resolution policy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ResolveMode {
    /// No depth limit; deep graphs grow the stack instead.
    #[default]
    Standard,
    /// Fail resolutions nested deeper than `max_depth` providers.
    Bounded {
        /// Maximum number of providers under construction at once.
        max_depth: usize,
    },
}

impl ResolveMode {
    /// Maximum construction depth, or `None` for unlimited.
    #[inline]
    pub fn max_depth(&self) -> Option<usize> {
        match self {
            Self::Standard => None,
            Self::Bounded { max_depth } => Some(*max_depth),
        }
    }
}
