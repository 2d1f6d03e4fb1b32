//! Type-erased resolved values.
//!
//! Scope caches, explicit arguments and provider outputs all travel as
//! [`Instance`]. An instance always wraps an `Arc<T>`, so `T` may be unsized
//! (`Arc<dyn Engine>`), and identity is the identity of that inner allocation:
//! projecting a cached `Arc<ElectricEngine>` to `Arc<dyn Engine>` yields an
//! instance that is [`Instance::ptr_eq`] to the original.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A reference-counted value of some `T: Send + Sync + 'static`.
#[derive(Clone)]
pub struct Instance {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
    /// Address of the inner `T`, for identity comparison.
    addr: usize,
}

impl Instance {
    /// Erase a shared value.
    pub fn new<T: ?Sized + Send + Sync + 'static>(value: Arc<T>) -> Self {
        let addr = Arc::as_ptr(&value).cast::<()>() as usize;
        Instance {
            value: Arc::new(value),
            type_name: std::any::type_name::<T>(),
            addr,
        }
    }

    /// Erase an owned value.
    pub fn from_value<T: Send + Sync + 'static>(value: T) -> Self {
        Instance::new(Arc::new(value))
    }

    /// Recover the shared value if this instance holds a `T`.
    #[inline]
    pub fn downcast<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.value.downcast_ref::<Arc<T>>().cloned()
    }

    #[inline]
    pub fn is<T: ?Sized + Send + Sync + 'static>(&self) -> bool {
        self.value.is::<Arc<T>>()
    }

    /// Name of the held type, for diagnostics.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns `true` if both instances share the same underlying value.
    #[inline]
    pub fn ptr_eq(&self, other: &Instance) -> bool {
        self.addr == other.addr
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Instance({})", self.type_name)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    trait Engine: Send + Sync {
        fn fuel(&self) -> &'static str;
    }

    struct GasEngine;

    impl Engine for GasEngine {
        fn fuel(&self) -> &'static str {
            "gas"
        }
    }

    #[test]
    fn test_downcast_sized() {
        let instance = Instance::from_value(42u32);
        assert_eq!(*instance.downcast::<u32>().unwrap(), 42);
        assert!(instance.downcast::<u64>().is_none());
        assert!(instance.is::<u32>());
    }

    #[test]
    fn test_downcast_trait_object() {
        let engine: Arc<dyn Engine> = Arc::new(GasEngine);
        let instance = Instance::new(engine);
        assert_eq!(instance.downcast::<dyn Engine>().unwrap().fuel(), "gas");
        assert!(instance.downcast::<GasEngine>().is_none());
    }

    #[test]
    fn test_projection_keeps_identity() {
        let concrete = Arc::new(GasEngine);
        let original = Instance::new(Arc::clone(&concrete));
        let as_interface: Arc<dyn Engine> = concrete;
        let projected = Instance::new(as_interface);
        assert!(original.ptr_eq(&projected));

        let other = Instance::from_value(GasEngine);
        assert!(!original.ptr_eq(&other));
    }

    #[test]
    fn test_clone_shares_value() {
        let instance = Instance::from_value(String::from("shared"));
        let clone = instance.clone();
        assert!(instance.ptr_eq(&clone));
        assert!(Arc::ptr_eq(
            &instance.downcast::<String>().unwrap(),
            &clone.downcast::<String>().unwrap()
        ));
    }
}
