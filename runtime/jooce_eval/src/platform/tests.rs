#![allow(clippy::unwrap_used, reason = "tests use unwrap to panic on unexpected state")]

use super::*;
use jooce_ir::BatchScope;
use jooce_registry::Injectable;
use pretty_assertions::assert_eq;

struct Clock;

#[test]
fn test_builder_defaults() {
    let platform: Platform = Platform::builder().build();
    assert_eq!(platform.mode(), ResolveMode::Standard);
    assert_eq!(platform.root().kind(), Scope::Platform);
    assert_eq!(platform.registry().read().len(), 1);
    assert!(platform.registry().contains(&InjectionKey::of::<Platform>()));
}

#[test]
fn test_builder_mode_and_registry() {
    let mut registry: Registry = Registry::new();
    registry.provides(Injectable::builder("Clock").build(|_| Ok(Clock)));
    let platform = Platform::builder()
        .registry(registry)
        .mode(ResolveMode::Bounded { max_depth: 4 })
        .build();
    assert_eq!(platform.mode().max_depth(), Some(4));
    assert!(platform.registry().contains(&InjectionKey::of::<Clock>()));
}

#[test]
fn test_platforms_share_registry_not_root() {
    let shared: SharedRegistry<BatchScope> = SharedRegistry::default();
    let first = Platform::builder().shared_registry(shared.clone()).build();
    let second = Platform::builder().shared_registry(shared.clone()).build();

    shared.write().provides_seeded::<u32>(BatchScope::Item);
    assert!(first.registry().contains(&InjectionKey::of::<u32>()));
    assert!(second.registry().contains(&InjectionKey::of::<u32>()));
    assert!(!first.root().ptr_eq(second.root()));
    assert_eq!(first.root().kind(), BatchScope::Platform);
}

#[test]
fn test_clone_shares_root() {
    let platform: Platform = Platform::new(Registry::new());
    let clone = platform.clone();
    assert!(platform.root().ptr_eq(clone.root()));
}

#[test]
fn test_gets_interns_metadata() {
    let platform: Platform = Platform::new(Registry::new());
    let first = platform.gets::<Clock>();
    let second = platform.gets_keyed(InjectionKey::of::<Clock>());
    let tagged = platform.gets_tagged::<Clock>("wall");

    assert!(first.ptr_eq(&second));
    assert!(!first.ptr_eq(&tagged));
    assert_eq!(tagged.key(), &InjectionKey::tagged::<Clock>("wall"));
    assert_eq!(platform.interner().len(), 2);
}

#[test]
fn test_enter_builds_full_chain() {
    let platform: Platform = Platform::new(Registry::new());
    let job = platform.enter(Scope::Job).unwrap();
    let kinds: Vec<_> = job.ancestors().map(ScopeInstance::kind).collect();
    assert_eq!(
        kinds,
        vec![Scope::Job, Scope::Request, Scope::Session, Scope::Platform]
    );
    assert!(job.lookup(Scope::Platform).unwrap().ptr_eq(platform.root()));
}

#[test]
fn test_enter_root_kind_has_no_path() {
    let platform: Platform = Platform::new(Registry::new());
    assert_eq!(
        platform.enter(Scope::Platform).unwrap_err(),
        ScopeError::NoTransitionPath {
            from: "platform",
            to: "platform",
        }
    );
}

#[tokio::test]
async fn test_run_in_engages_target() {
    let platform: Platform = Platform::new(Registry::new());
    let kind = platform
        .run_in(Scope::Request, |request| async move { request.kind() })
        .await
        .unwrap();
    assert_eq!(kind, Scope::Request);
}

#[test]
fn test_platform_resolves_itself() {
    let platform: Platform = Platform::new(Registry::new());
    let from_root = platform.get::<Platform>(platform.root()).unwrap();
    assert!(from_root.root().ptr_eq(platform.root()));
    assert_eq!(platform.root().cached_len(), 1);

    let job = platform.enter(Scope::Job).unwrap();
    let from_job = platform.get::<Platform>(&job).unwrap();
    assert!(from_job.root().ptr_eq(platform.root()));
    assert_eq!(job.cached_len(), 0);
}

#[test]
fn test_provider_depends_on_platform() {
    let mut registry: Registry = Registry::new();
    registry
        .provides(
            Injectable::builder("root_id")
                .gets::<Platform>("platform")
                .build(|args| Ok(args.get::<Platform>("platform")?.root().id())),
        )
        .in_scope(Scope::Request);
    let platform = Platform::new(registry);

    let request = platform.enter(Scope::Request).unwrap();
    assert_eq!(*platform.get::<u64>(&request).unwrap(), platform.root().id());
}

#[test]
fn test_resolved_platform_does_not_keep_root_alive() {
    let platform: Platform = Platform::new(Registry::new());
    let root = platform.root().downgrade();
    let resolved = platform.get::<Platform>(platform.root()).unwrap();
    drop(platform);
    assert!(root.upgrade().is_some());
    drop(resolved);
    assert!(root.upgrade().is_none());
}

#[test]
fn test_shared_registry_resolves_each_platform() {
    let shared: SharedRegistry<Scope> = SharedRegistry::default();
    let first = Platform::builder().shared_registry(shared.clone()).build();
    let second = Platform::builder().shared_registry(shared).build();

    let resolved = second.get::<Platform>(second.root()).unwrap();
    assert!(resolved.root().ptr_eq(second.root()));
    let resolved = first.get::<Platform>(first.root()).unwrap();
    assert!(resolved.root().ptr_eq(first.root()));
}
