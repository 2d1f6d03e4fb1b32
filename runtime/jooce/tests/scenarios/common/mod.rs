//! Shared fixtures for scenario tests.

use std::fmt::Debug;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use jooce::{Injectable, Registry};

pub trait Engine: Debug + Send + Sync {
    fn fuel(&self) -> &'static str;
}

#[derive(Debug)]
pub struct ElectricEngine {
    pub serial: usize,
}

#[derive(Debug)]
pub struct GasEngine;

impl Engine for ElectricEngine {
    fn fuel(&self) -> &'static str {
        "electric"
    }
}

impl Engine for GasEngine {
    fn fuel(&self) -> &'static str {
        "gas"
    }
}

/// Counts constructions performed by a provider.
#[derive(Clone, Default)]
pub struct Counter(Arc<AtomicUsize>);

impl Counter {
    pub fn bump(&self) -> usize {
        self.0.fetch_add(1, Ordering::SeqCst)
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// `ElectricEngine` bound under its own type, bare `Engine` and
/// `Engine/electric`; `GasEngine` bound under `Engine/gas` only.
pub fn engine_registry(electric: &Counter) -> Registry {
    let electric = electric.clone();
    let mut registry = Registry::new();
    registry
        .provides(Injectable::builder("ElectricEngine").build(move |_| {
            Ok(ElectricEngine {
                serial: electric.bump(),
            })
        }))
        .as_interface::<dyn Engine>(|e| e)
        .as_tagged::<dyn Engine>("electric", |e| e);
    registry
        .provides_unbound(Injectable::builder("GasEngine").build(|_| Ok(GasEngine)))
        .as_tagged::<dyn Engine>("gas", |e| e);
    registry
}
