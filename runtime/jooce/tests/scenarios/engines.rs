//! Interface and tag selection through invocation.

use std::sync::Arc;

use jooce::{Injectable, Instance, Platform, Registry, ResolveError};
use pretty_assertions::assert_eq;

use crate::common::{engine_registry, Counter, ElectricEngine, Engine, GasEngine};

fn engine_of(name: &'static str) -> Injectable<Arc<dyn Engine>> {
    Injectable::builder(name)
        .gets::<dyn Engine>("engine")
        .build(|args| Ok(args.get::<dyn Engine>("engine")?))
}

#[test]
fn bare_interface_resolves_to_electric() {
    jooce::init_tracing();
    let counter = Counter::default();
    let platform = Platform::new(engine_registry(&counter));

    let engine = platform
        .invoke(&engine_of("drive"), Vec::new(), platform.root())
        .unwrap();
    assert_eq!(engine.fuel(), "electric");
}

#[test]
fn tagged_interface_resolves_to_gas() {
    let counter = Counter::default();
    let platform = Platform::new(engine_registry(&counter));

    let refuel = Injectable::builder("refuel")
        .gets_tagged::<dyn Engine>("engine", "gas")
        .build(|args| Ok(args.get::<dyn Engine>("engine")?.fuel()));
    assert_eq!(
        platform.invoke(&refuel, Vec::new(), platform.root()).unwrap(),
        "gas"
    );
    assert_eq!(counter.get(), 0);
}

#[test]
fn two_functions_share_one_engine() {
    let counter = Counter::default();
    let platform = Platform::new(engine_registry(&counter));

    let first = platform
        .invoke(&engine_of("drive"), Vec::new(), platform.root())
        .unwrap();
    let second = platform
        .invoke(&engine_of("park"), Vec::new(), platform.root())
        .unwrap();
    let tagged = platform
        .get_tagged::<dyn Engine>("electric", platform.root())
        .unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(&first, &tagged));
    assert_eq!(counter.get(), 1);
}

#[test]
fn interned_declarations_resolve_like_plain_ones() {
    let counter = Counter::default();
    let platform = Platform::new(engine_registry(&counter));

    let meta = platform.gets_tagged::<dyn Engine>("gas");
    let drive = Injectable::builder("drive")
        .declare("engine", meta.clone())
        .build(|args| Ok(args.get::<dyn Engine>("engine")?.fuel()));
    let park = Injectable::builder("park")
        .declare("engine", platform.gets_tagged::<dyn Engine>("gas"))
        .build(|args| Ok(args.get::<dyn Engine>("engine")?.fuel()));

    assert!(meta.ptr_eq(&platform.gets_tagged::<dyn Engine>("gas")));
    assert_eq!(platform.invoke(&drive, Vec::new(), platform.root()).unwrap(), "gas");
    assert_eq!(platform.invoke(&park, Vec::new(), platform.root()).unwrap(), "gas");
}

#[test]
fn arity_mismatch_names_the_uncovered_parameters() {
    let counter = Counter::default();
    let platform = Platform::new(engine_registry(&counter));

    let trip = Injectable::builder("trip")
        .gets::<dyn Engine>("engine")
        .arg("from")
        .arg("to")
        .build(|_| Ok(()));

    let err = platform
        .invoke(&trip, vec![Instance::from_value("home")], platform.root())
        .unwrap_err();
    assert_eq!(
        err,
        ResolveError::ArityMismatch {
            callable: "trip",
            missing: vec!["to".to_owned()],
            extra: 0,
        }
    );
    assert_eq!(
        err.to_string(),
        "trip called with the wrong number of arguments: missing [\"to\"], 0 extra"
    );
}

#[test]
fn tag_only_provider_is_hidden_from_other_keys() {
    let counter = Counter::default();
    let platform = Platform::new(engine_registry(&counter));

    assert!(platform
        .get::<GasEngine>(platform.root())
        .unwrap_err()
        .is_not_found());
    let gas = platform
        .get_tagged::<dyn Engine>("gas", platform.root())
        .unwrap();
    assert_eq!(gas.fuel(), "gas");
}

#[test]
fn same_type_providers_are_told_apart_by_tag() {
    let mut registry: Registry = Registry::new();
    for (tag, serial) in [("eco", 100), ("sport", 200)] {
        registry
            .provides_unbound(
                Injectable::builder("ElectricEngine").build(move |_| Ok(ElectricEngine { serial })),
            )
            .tagged(tag)
            .as_tagged::<dyn Engine>(tag, |e| e);
    }
    let platform = Platform::new(registry);
    let root = platform.root();

    let eco = platform.get_tagged::<ElectricEngine>("eco", root).unwrap();
    let sport = platform.get_tagged::<ElectricEngine>("sport", root).unwrap();
    assert_eq!((eco.serial, sport.serial), (100, 200));

    let eco_engine = platform.get_tagged::<dyn Engine>("eco", root).unwrap();
    assert!(std::ptr::addr_eq(Arc::as_ptr(&eco), Arc::as_ptr(&eco_engine)));
    assert!(platform.get::<ElectricEngine>(root).unwrap_err().is_not_found());
}
