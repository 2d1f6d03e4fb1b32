//! In-flight resolution tracking.
//!
//! A [`ResolutionStack`] records the providers currently under construction in
//! one resolution, outermost first. Pushing a provider that is already on the
//! stack means the dependency graph loops back on itself; pushing past the
//! configured limit means the graph is deeper than the mode allows.

use jooce_ir::{ReferenceKey, ScopeKind};

use crate::ResolveError;

/// Providers under construction, outermost first.
#[derive(Clone, Debug)]
pub(crate) struct ResolutionStack<K: ScopeKind> {
    frames: Vec<ReferenceKey<K>>,
    max_depth: Option<usize>,
}

impl<K: ScopeKind> ResolutionStack<K> {
    pub(crate) fn new(max_depth: Option<usize>) -> Self {
        ResolutionStack {
            frames: Vec::new(),
            max_depth,
        }
    }

    /// Push a provider about to be constructed.
    ///
    /// The frame is not pushed on error.
    pub(crate) fn push(&mut self, reference: ReferenceKey<K>) -> Result<(), ResolveError> {
        if let Some(start) = self.frames.iter().position(|frame| *frame == reference) {
            let path = self.frames[start..]
                .iter()
                .chain(std::iter::once(&reference))
                .map(ToString::to_string)
                .collect();
            return Err(ResolveError::CircularDependency { path });
        }
        if let Some(max_depth) = self.max_depth {
            if self.frames.len() >= max_depth {
                return Err(ResolveError::DepthExceeded {
                    reference: reference.to_string(),
                    max_depth,
                });
            }
        }
        self.frames.push(reference);
        Ok(())
    }

    pub(crate) fn pop(&mut self) {
        debug_assert!(
            !self.frames.is_empty(),
            "ResolutionStack::pop() called on empty stack"
        );
        self.frames.pop();
    }

    #[inline]
    pub(crate) fn depth(&self) -> usize {
        self.frames.len()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests {
    use super::*;
    use jooce_ir::{Handle, Scope};
    use pretty_assertions::assert_eq;

    #[allow(dead_code, reason = "only named as a type")]
    struct Wheel;
    #[allow(dead_code, reason = "only named as a type")]
    struct Axle;

    fn wheel() -> ReferenceKey {
        ReferenceKey::of::<Wheel>()
    }

    fn axle() -> ReferenceKey {
        ReferenceKey::new(Handle::of::<Axle>(), Scope::Request)
    }

    #[test]
    fn test_push_and_pop() {
        let mut stack = ResolutionStack::new(None);
        stack.push(wheel()).unwrap();
        stack.push(axle()).unwrap();
        assert_eq!(stack.depth(), 2);
        stack.pop();
        stack.pop();
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn test_repeated_frame_reports_loop() {
        let mut stack = ResolutionStack::new(None);
        stack.push(wheel()).unwrap();
        stack.push(axle()).unwrap();
        let err = stack.push(axle()).unwrap_err();
        assert_eq!(
            err,
            ResolveError::CircularDependency {
                path: vec!["Axle@request".to_owned(), "Axle@request".to_owned()],
            }
        );
        assert_eq!(stack.depth(), 2);
    }

    #[test]
    fn test_loop_path_starts_at_first_occurrence() {
        let mut stack = ResolutionStack::new(None);
        stack.push(wheel()).unwrap();
        stack.push(axle()).unwrap();
        let err = stack.push(wheel()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "circular dependency: Wheel@platform -> Axle@request -> Wheel@platform"
        );
    }

    #[test]
    fn test_depth_limit() {
        let mut stack = ResolutionStack::new(Some(1));
        stack.push(wheel()).unwrap();
        assert!(matches!(
            stack.push(axle()),
            Err(ResolveError::DepthExceeded { max_depth: 1, .. })
        ));
    }
}
