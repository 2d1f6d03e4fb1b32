use super::*;
use pretty_assertions::assert_eq;
use std::thread;

trait Engine {}

#[test]
fn test_equal_metadata_share_single_carrier() {
    let interner = MetaInterner::new();
    let first = interner.intern_key(InjectionKey::of::<dyn Engine>());
    let second = interner.intern_key(InjectionKey::of::<dyn Engine>());
    assert!(first.ptr_eq(&second));
    assert_eq!(interner.len(), 1);
}

#[test]
fn test_distinct_metadata_distinct_carriers() {
    let interner = MetaInterner::new();
    let plain = interner.intern_key(InjectionKey::of::<dyn Engine>());
    let gas = interner.intern_key(InjectionKey::tagged::<dyn Engine>("gas"));
    assert!(!plain.ptr_eq(&gas));
    assert_ne!(plain, gas);
    assert_eq!(interner.len(), 2);
}

#[test]
fn test_uninterned_carriers_compare_by_value() {
    let a = SharedMeta::new(InjectionMeta::new(InjectionKey::of::<u32>()));
    let b = SharedMeta::new(InjectionMeta::new(InjectionKey::of::<u32>()));
    assert!(!a.ptr_eq(&b));
    assert_eq!(a, b);
}

#[test]
fn test_with_tag_updates_key() {
    let meta = InjectionMeta::new(InjectionKey::of::<dyn Engine>());
    let gas = meta.with_tag(Some(Tag::from("gas")));
    assert_eq!(gas.key(), &InjectionKey::tagged::<dyn Engine>("gas"));
    assert_eq!(meta.key(), &InjectionKey::of::<dyn Engine>());
}

#[test]
fn test_concurrent_interning_yields_one_carrier() {
    let interner = MetaInterner::new();
    let carriers: Vec<SharedMeta> = thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| s.spawn(|| interner.intern_key(InjectionKey::tagged::<dyn Engine>("gas"))))
            .collect();
        handles
            .into_iter()
            .filter_map(|handle| handle.join().ok())
            .collect()
    });
    assert_eq!(carriers.len(), 8);
    assert!(carriers.iter().all(|c| c.ptr_eq(&carriers[0])));
    assert_eq!(interner.len(), 1);
}
