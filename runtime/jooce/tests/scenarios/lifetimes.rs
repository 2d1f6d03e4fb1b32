//! Scope engagement, transitions and per-instance caching.

use std::sync::Arc;

use jooce::{
    BatchScope, Injectable, InjectionKey, Instance, Platform, Registry, ResolveError, Scope,
    ScopeError,
};
use pretty_assertions::assert_eq;

use crate::common::{Counter, ElectricEngine, Engine};

fn request_scoped_engine(counter: &Counter) -> Registry {
    let counter = counter.clone();
    let mut registry = Registry::new();
    registry
        .provides(Injectable::builder("ElectricEngine").build(move |_| {
            Ok(ElectricEngine {
                serial: counter.bump(),
            })
        }))
        .in_scope(Scope::Request)
        .as_interface::<dyn Engine>(|e| e);
    registry
}

#[test]
fn job_dependency_with_only_platform_engaged() {
    let counter = Counter::default();
    let mut registry = Registry::new();
    registry
        .provides(Injectable::builder("ElectricEngine").build(move |_| {
            Ok(ElectricEngine {
                serial: counter.bump(),
            })
        }))
        .in_scope(Scope::Job);
    let platform = Platform::new(registry);

    assert_eq!(
        platform.get::<ElectricEngine>(platform.root()).unwrap_err(),
        ResolveError::ScopeNotEngaged {
            key: InjectionKey::of::<ElectricEngine>(),
            required: "job",
            active: "platform",
        }
    );
}

#[test]
fn platform_to_job_enters_intermediates_only_through_a_chain() {
    let platform: Platform = Platform::new(Registry::new());

    assert_eq!(
        platform.root().transition(Scope::Job).unwrap_err(),
        ScopeError::InvalidTransition {
            from: "platform",
            to: "job",
        }
    );

    let job = platform.enter(Scope::Job).unwrap();
    assert!(job.lookup(Scope::Session).is_some());
    assert!(job.lookup(Scope::Request).is_some());
    assert!(job.lookup(Scope::Platform).unwrap().ptr_eq(platform.root()));
}

#[test]
fn same_request_same_instance() {
    let counter = Counter::default();
    let platform = Platform::new(request_scoped_engine(&counter));

    let (first, second) = platform
        .root()
        .enter_chain_with(Scope::Request, |request| {
            (
                platform.get::<dyn Engine>(request).unwrap(),
                platform.get::<ElectricEngine>(request).unwrap(),
            )
        })
        .unwrap();

    assert!(std::ptr::addr_eq(Arc::as_ptr(&first), Arc::as_ptr(&second)));
    assert_eq!(counter.get(), 1);
}

#[test]
fn values_are_released_with_their_scope() {
    let counter = Counter::default();
    let platform = Platform::new(request_scoped_engine(&counter));
    let cached_at_root = platform.root().cached_len();

    let first = platform
        .root()
        .enter_chain_with(Scope::Request, |request| {
            platform.get::<ElectricEngine>(request).unwrap().serial
        })
        .unwrap();
    let second = platform
        .root()
        .enter_chain_with(Scope::Request, |request| {
            platform.get::<ElectricEngine>(request).unwrap().serial
        })
        .unwrap();

    assert_eq!((first, second), (0, 1));
    assert_eq!(platform.root().cached_len(), cached_at_root);
}

#[test]
fn job_sees_values_of_its_request() {
    let counter = Counter::default();
    let platform = Platform::new(request_scoped_engine(&counter));

    let request = platform.enter(Scope::Request).unwrap();
    let in_request = platform.get::<dyn Engine>(&request).unwrap();
    let job = request.transition(Scope::Job).unwrap();
    let in_job = platform.get::<dyn Engine>(&job).unwrap();

    assert!(Arc::ptr_eq(&in_request, &in_job));
    assert_eq!(job.cached_len(), 0);
}

struct Payload(&'static str);

#[test]
fn seeded_request_payload_is_injected() {
    let mut registry = Registry::new();
    registry.provides_seeded::<Payload>(Scope::Request);
    let platform = Platform::new(registry);

    let echo = platform.wrap(
        Injectable::builder("echo")
            .gets::<Payload>("payload")
            .arg("suffix")
            .build(|args| {
                let payload = args.get::<Payload>("payload")?;
                let suffix = args.get::<&str>("suffix")?;
                Ok(format!("{}{}", payload.0, *suffix))
            }),
    );

    let request = platform.enter(Scope::Request).unwrap();
    request.seed(Arc::new(Payload("hello")));
    assert_eq!(
        echo.call(vec![Instance::from_value("!")], &request).unwrap(),
        "hello!"
    );

    let other = platform.enter(Scope::Request).unwrap();
    assert!(matches!(
        echo.call(vec![Instance::from_value("!")], &other),
        Err(ResolveError::NotSeeded { .. })
    ));
}

#[test]
fn circular_dependency_is_reported() {
    #[derive(Debug)]
    struct Left;
    #[derive(Debug)]
    struct Right;

    let mut registry = Registry::new();
    registry
        .provides(Injectable::builder("Left").gets::<Right>("right").build(|_| Ok(Left)))
        .in_scope(Scope::Session);
    registry
        .provides(Injectable::builder("Right").gets::<Left>("left").build(|_| Ok(Right)))
        .in_scope(Scope::Session);
    let platform = Platform::new(registry);

    let session = platform.enter(Scope::Session).unwrap();
    let err = platform.get::<Right>(&session).unwrap_err();
    assert_eq!(
        err.to_string(),
        "circular dependency: Right@session -> Left@session -> Right@session"
    );
}

#[test]
fn alternative_hierarchy() {
    let counter = Counter::default();
    let mut registry: Registry<BatchScope> = Registry::new();
    registry
        .provides(Injectable::builder("ElectricEngine").build(move |_| {
            Ok(ElectricEngine {
                serial: counter.bump(),
            })
        }))
        .in_scope(BatchScope::Batch);
    let platform = Platform::new(registry);

    let item = platform.enter(BatchScope::Item).unwrap();
    let sibling = item.parent().unwrap().transition(BatchScope::Item).unwrap();
    let first = platform.get::<ElectricEngine>(&item).unwrap();
    let second = platform.get::<ElectricEngine>(&sibling).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}
