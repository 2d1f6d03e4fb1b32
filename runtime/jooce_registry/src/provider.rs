//! Providers: constructors whose output the resolver caches.

use std::fmt;

use jooce_ir::{Handle, Instance};

use crate::Injectable;

/// Constructor for one concrete type, with its own declared dependencies.
///
/// Every provider carries a minted handle of its own, which becomes the
/// handle of each [`ReferenceKey`](jooce_ir::ReferenceKey) bound to it. Two
/// providers of the same type therefore cache separately. Clones share the
/// handle: they are the same provider.
#[derive(Clone)]
pub struct Provider {
    handle: Handle,
    output: Handle,
    constructor: Injectable<Instance>,
}

impl Provider {
    /// Provider for `C` built by `constructor`.
    pub fn new<C: Send + Sync + 'static>(constructor: Injectable<C>) -> Self {
        Provider {
            handle: Handle::minted::<C>(),
            output: Handle::of::<C>(),
            constructor: constructor.map(Instance::from_value),
        }
    }

    /// Provider for `C` with no dependencies.
    pub fn from_fn<C, F>(f: F) -> Self
    where
        C: Send + Sync + 'static,
        F: Fn() -> C + Send + Sync + 'static,
    {
        let constructor = Injectable::builder(Handle::of::<C>().short_name()).build(move |_| Ok(f()));
        Provider::new(constructor)
    }

    /// Identity of this provider.
    #[inline]
    pub fn handle(&self) -> Handle {
        self.handle
    }

    /// Handle of the concrete type `C` the provider constructs.
    #[inline]
    pub fn output(&self) -> Handle {
        self.output
    }

    /// The constructor, producing the erased concrete value.
    #[inline]
    pub fn constructor(&self) -> &Injectable<Instance> {
        &self.constructor
    }
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("handle", &self.handle)
            .field("output", &self.output)
            .field("params", &self.constructor.params())
            .finish()
    }
}
