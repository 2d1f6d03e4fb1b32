//! Asynchronous scope transitions.
//!
//! Each level of a transition chain is entered inside its own tokio task, and
//! the unit of work runs in the innermost one:
//!
//! ```text
//! caller ── enter session ──▶ task A ── enter request ──▶ task B ── work(request)
//! ```
//!
//! Entry is strictly parent-before-child, so the work never observes a
//! partially entered chain. Sibling transitions under one parent run
//! independently and never see each other's instances.
//!
//! Every spawned task is joined through an abort-on-drop guard: cancelling
//! the outer future aborts the inner tasks, which drops the instances they
//! entered without touching ancestors.

use std::future::Future;
use std::pin::Pin;

use jooce_ir::{path_between, ScopeKind, ScopePath};
use tokio::task::JoinHandle;

use crate::{ScopeError, ScopeInstance};

type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// Run `work` with `target` and every intermediate scope engaged.
///
/// Fails with `NoTransitionPath` unless `target` is a strict descendant of
/// `current`'s kind. A panic inside `work` is resumed in the caller.
///
/// Must be called from within a tokio runtime.
pub async fn transition_async<K, F, Fut>(
    current: &ScopeInstance<K>,
    target: K,
    work: F,
) -> Result<Fut::Output, ScopeError>
where
    K: ScopeKind,
    F: FnOnce(ScopeInstance<K>) -> Fut + Send + 'static,
    Fut: Future + Send + 'static,
    Fut::Output: Send + 'static,
{
    let mut remaining = path_between(current.kind(), target)
        .ok_or_else(|| ScopeError::no_path(current.kind(), target))?;
    // Popped from the back, so store deepest-first.
    remaining.reverse();
    enter_remaining(current.clone(), remaining, work).await
}

fn enter_remaining<K, F, Fut>(
    current: ScopeInstance<K>,
    mut remaining: ScopePath<K>,
    work: F,
) -> BoxFuture<Result<Fut::Output, ScopeError>>
where
    K: ScopeKind,
    F: FnOnce(ScopeInstance<K>) -> Fut + Send + 'static,
    Fut: Future + Send + 'static,
    Fut::Output: Send + 'static,
{
    Box::pin(async move {
        let Some(next) = remaining.pop() else {
            return Ok(work(current).await);
        };
        let entered = current.transition(next)?;
        drop(current);
        let task = AbortOnDrop::new(next, tokio::spawn(enter_remaining(entered, remaining, work)));
        task.join().await?
    })
}

/// Joins a spawned task, aborting it if the join is abandoned.
struct AbortOnDrop<T> {
    target: &'static str,
    handle: JoinHandle<T>,
}

impl<T> AbortOnDrop<T> {
    fn new<K: ScopeKind>(target: K, handle: JoinHandle<T>) -> Self {
        AbortOnDrop {
            target: target.name(),
            handle,
        }
    }

    async fn join(mut self) -> Result<T, ScopeError> {
        match (&mut self.handle).await {
            Ok(value) => Ok(value),
            Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
            Err(_) => {
                tracing::debug!(scope = self.target, "scope task aborted");
                Err(ScopeError::Aborted { to: self.target })
            }
        }
    }
}

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        // No-op once the task has completed.
        self.handle.abort();
    }
}

/// Reusable wrapper that runs a unit of work inside a target scope.
///
/// Every [`Transitions::call`] enters a fresh chain from the given instance,
/// so concurrent calls under one parent get disjoint scope instances.
#[derive(Clone)]
pub struct Transitions<K: ScopeKind, F> {
    target: K,
    work: F,
}

impl<K: ScopeKind, F> Transitions<K, F> {
    pub fn new(target: K, work: F) -> Self {
        Transitions { target, work }
    }

    #[inline]
    pub fn target(&self) -> K {
        self.target
    }

    /// Enter the target scope from `current` and run the wrapped work.
    pub async fn call<Fut>(&self, current: &ScopeInstance<K>) -> Result<Fut::Output, ScopeError>
    where
        F: Fn(ScopeInstance<K>) -> Fut + Clone + Send + 'static,
        Fut: Future + Send + 'static,
        Fut::Output: Send + 'static,
    {
        transition_async(current, self.target, self.work.clone()).await
    }
}
