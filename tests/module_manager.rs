//! Registry behaviour with the sample plugin registered in-process.

use std::sync::Arc;

use modreg::api::prelude::*;
use modreg::{LoadOutcome, ModuleFilter, ModuleManager, RegistryError};
use modreg_sample::{shared_sample_module, DummyInterface, SAMPLE_MODULE_NAME};

// =============================================================================
// A second plugin overlapping the sample one
// =============================================================================

#[derive(Default)]
struct ShadowA;

impl Model for ShadowA {
    const MODEL: &'static str = "dummy_a";
}

impl DummyInterface for ShadowA {
    fn name(&self) -> String {
        "ShadowA".to_string()
    }
}

#[derive(Default)]
struct ShadowC;

impl Model for ShadowC {
    const MODEL: &'static str = "dummy_c";
}

impl DummyInterface for ShadowC {
    fn name(&self) -> String {
        "ShadowC".to_string()
    }
}

trait Counter: Send + Sync {
    fn count(&self) -> u32;
}

impl Interface for dyn Counter {
    const INTERFACE: &'static str = "counter";
}

#[derive(Default)]
struct Tally;

impl Model for Tally {
    const MODEL: &'static str = "tally";
}

impl Counter for Tally {
    fn count(&self) -> u32 {
        7
    }
}

capability_table! {
    static SHADOW_TABLE = {
        dyn DummyInterface => [ShadowA, ShadowC],
        dyn Counter => [Tally],
    };
}

fn shadow_module() -> ModuleRef {
    Arc::new(TableModule::new("ShadowModule", &SHADOW_TABLE))
}

fn sample_registry() -> ModuleManager {
    let mut registry = ModuleManager::new();
    assert_eq!(
        registry.load_module(shared_sample_module()),
        LoadOutcome::Loaded
    );
    registry
}

// =============================================================================
// Tests
// =============================================================================

#[test]
fn test_sample_round_trip() {
    let registry = sample_registry();

    assert!(registry
        .loaded_module_names()
        .contains(&SAMPLE_MODULE_NAME.to_string()));
    assert_eq!(
        registry.loaded_models("dummy_interface"),
        ["dummy_a", "dummy_b"]
    );
    assert!(registry.has("dummy_interface", "dummy_a", ""));
    assert!(!registry.has("dummy_interface", "nonexistent_model", ""));

    let dummy = registry
        .get::<dyn DummyInterface>("dummy_a", ModuleFilter::Any)
        .unwrap();
    assert_eq!(dummy.name(), "DummyA");
}

#[test]
fn test_reload_is_idempotent() {
    let mut registry = sample_registry();
    for _ in 0..3 {
        assert_eq!(
            registry.load_module(shared_sample_module()),
            LoadOutcome::AlreadyLoaded
        );
    }
    assert_eq!(registry.loaded_module_names(), [SAMPLE_MODULE_NAME]);
}

#[test]
fn test_first_loaded_wins_and_filter_selects() {
    let mut registry = sample_registry();
    registry.load_module(shadow_module());

    let unfiltered = registry
        .get::<dyn DummyInterface>("dummy_a", "")
        .unwrap();
    assert_eq!(unfiltered.name(), "DummyA");

    for filter in ["ShadowModule", "shadow", "SHADOWMODULE"] {
        let shadowed = registry
            .get::<dyn DummyInterface>("dummy_a", filter)
            .unwrap();
        assert_eq!(shadowed.name(), "ShadowA", "filter {filter}");
    }

    // Filter by exact name and by name without the suffix agree.
    let exact = registry.get::<dyn DummyInterface>("dummy_b", "SampleModule").unwrap();
    let short = registry.get::<dyn DummyInterface>("dummy_b", "sample").unwrap();
    assert_eq!(exact.name(), short.name());
}

#[test]
fn test_filter_never_falls_back() {
    let mut registry = sample_registry();
    registry.load_module(shadow_module());

    let err = registry
        .get::<dyn DummyInterface>("dummy_c", "sample")
        .err()
        .unwrap();
    assert!(err.is_not_implemented());

    let err = registry
        .get::<dyn DummyInterface>("dummy_a", "Unknown")
        .err()
        .unwrap();
    assert!(matches!(err, RegistryError::NotImplemented { .. }));
}

#[test]
fn test_interfaces_and_models_across_modules() {
    let mut registry = sample_registry();
    registry.load_module(shadow_module());

    assert_eq!(
        registry.loaded_interfaces(),
        ["counter", "dummy_interface"]
    );
    assert_eq!(
        registry.loaded_models_of::<dyn DummyInterface>(),
        ["dummy_a", "dummy_b", "dummy_a", "dummy_c"]
    );
    assert_eq!(registry.get::<dyn Counter>("TALLY", "").unwrap().count(), 7);
}

#[test]
fn test_predicate_selection() {
    let mut registry = sample_registry();
    registry.load_module(shadow_module());

    let c = registry
        .get_where::<dyn DummyInterface>(|dummy| dummy.name().ends_with('C'), "")
        .unwrap();
    assert_eq!(c.name(), "ShadowC");

    // Only the first module passing the filter is considered.
    let err = registry
        .get_where::<dyn DummyInterface>(|dummy| dummy.name() == "ShadowC", "sample")
        .err()
        .unwrap();
    assert!(matches!(err, RegistryError::NoMatch(_)));

    let err = registry
        .get_where::<dyn Counter>(|_| true, "sample")
        .err()
        .unwrap();
    assert!(matches!(err, RegistryError::NoModelsLoaded(_)));
}

#[test]
fn test_get_all_erased_keeps_identities() {
    let registry = sample_registry();
    let instances = registry.get_all_erased("DUMMY_INTERFACE", "").unwrap();
    let models: Vec<_> = instances.iter().map(Instance::model).collect();
    assert_eq!(models, ["dummy_a", "dummy_b"]);
    assert!(instances.iter().all(Instance::is::<dyn DummyInterface>));
}
