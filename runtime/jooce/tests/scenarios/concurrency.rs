//! Exactly-once construction and async sibling isolation.

use std::sync::{Arc, Barrier};
use std::time::Duration;

use jooce::{Injectable, Platform, Registry, Scope, ScopeInstance, Transitions};
use pretty_assertions::assert_eq;

use crate::common::{engine_registry, Counter, ElectricEngine, Engine};

#[test]
fn threads_share_one_construction() {
    const THREADS: usize = 16;

    let counter = Counter::default();
    let platform = Platform::new(engine_registry(&counter));
    let barrier = Barrier::new(THREADS);

    let serials: Vec<usize> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                s.spawn(|| {
                    barrier.wait();
                    platform.get::<ElectricEngine>(platform.root()).unwrap().serial
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(counter.get(), 1);
    assert!(serials.iter().all(|&serial| serial == 0));
}

fn request_platform(counter: &Counter) -> Platform {
    let counter = counter.clone();
    let mut registry = Registry::new();
    registry
        .provides(Injectable::builder("ElectricEngine").build(move |_| {
            std::thread::sleep(Duration::from_millis(5));
            Ok(ElectricEngine {
                serial: counter.bump(),
            })
        }))
        .in_scope(Scope::Request)
        .as_interface::<dyn Engine>(|e| e);
    Platform::new(registry)
}

/// Resolves the request engine twice and reports its serial.
async fn handle_request(platform: Platform, request: ScopeInstance) -> usize {
    let first = platform.get::<dyn Engine>(&request).unwrap();
    tokio::task::yield_now().await;
    let second = platform.get::<ElectricEngine>(&request).unwrap();
    assert!(std::ptr::addr_eq(Arc::as_ptr(&first), Arc::as_ptr(&second)));
    second.serial
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_have_disjoint_caches() {
    let counter = Counter::default();
    let platform = request_platform(&counter);

    let (a, b) = tokio::join!(
        platform.run_in(Scope::Request, {
            let platform = platform.clone();
            move |request| handle_request(platform, request)
        }),
        platform.run_in(Scope::Request, {
            let platform = platform.clone();
            move |request| handle_request(platform, request)
        }),
    );
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_ne!(a, b);
    assert_eq!(counter.get(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn reusable_transition_gets_fresh_chains() {
    let counter = Counter::default();
    let platform = request_platform(&counter);
    let handler = Transitions::new(Scope::Request, {
        let platform = platform.clone();
        move |request| handle_request(platform.clone(), request)
    });

    let session = platform.enter(Scope::Session).unwrap();
    let mut serials = Vec::new();
    for _ in 0..3 {
        serials.push(handler.call(&session).await.unwrap());
    }
    serials.sort_unstable();

    assert_eq!(serials, vec![0, 1, 2]);
    assert_eq!(session.cached_len(), 0);
}
