//! The process-wide registry.

use modreg::{LoadOutcome, ModuleManager};
use modreg_sample::{shared_sample_module, DummyInterface, SAMPLE_MODULE_NAME};
use serial_test::serial;

#[test]
#[serial]
fn test_global_is_shared() {
    let first = ModuleManager::global() as *const _;
    let second = ModuleManager::global() as *const _;
    assert_eq!(first, second);
}

#[test]
#[serial]
fn test_global_registration_is_visible_everywhere() {
    let outcome = ModuleManager::global()
        .write()
        .load_module(shared_sample_module());
    assert!(matches!(
        outcome,
        LoadOutcome::Loaded | LoadOutcome::AlreadyLoaded
    ));

    let handle = std::thread::spawn(|| {
        let registry = ModuleManager::global().read();
        assert!(registry.module_loaded(SAMPLE_MODULE_NAME));
        registry
            .get::<dyn DummyInterface>("dummy_b", "sample")
            .map(|dummy| dummy.name())
    });
    assert_eq!(handle.join().unwrap().unwrap(), "DummyB");

    assert_eq!(
        ModuleManager::global()
            .write()
            .load_module(shared_sample_module()),
        LoadOutcome::AlreadyLoaded
    );
}
