//! Sample plugin demonstrating the modreg-api.
//!
//! This library provides one module, `SampleModule`, offering two models of
//! the `dummy_interface` interface. Built as a `cdylib` and renamed to match
//! the host's naming pattern (e.g. `sample.module.so`), it is picked up by
//! registry discovery; as an `rlib` it can be registered in-process.

use modreg_api::prelude::*;

// =============================================================================
// Plugin Entry Point
// =============================================================================

modreg_api::export_modules!(sample_module());

/// Name the sample module reports to the registry.
pub const SAMPLE_MODULE_NAME: &str = "SampleModule";

// =============================================================================
// Interface
// =============================================================================

/// A minimal interface whose models only report their own name.
pub trait DummyInterface: Send + Sync {
    /// Human-readable name of the model.
    fn name(&self) -> String;
}

impl Interface for dyn DummyInterface {
    const INTERFACE: &'static str = "dummy_interface";
}

// =============================================================================
// Models
// =============================================================================

/// First dummy model.
#[derive(Debug, Default)]
pub struct DummyModelA;

impl Model for DummyModelA {
    const MODEL: &'static str = "dummy_a";
}

impl DummyInterface for DummyModelA {
    fn name(&self) -> String {
        "DummyA".to_string()
    }
}

/// Second dummy model.
#[derive(Debug, Default)]
pub struct DummyModelB;

impl Model for DummyModelB {
    const MODEL: &'static str = "dummy_b";
}

impl DummyInterface for DummyModelB {
    fn name(&self) -> String {
        "DummyB".to_string()
    }
}

// =============================================================================
// Module
// =============================================================================

capability_table! {
    /// Interfaces and models provided by the sample module.
    pub static SAMPLE_TABLE = {
        dyn DummyInterface => [DummyModelA, DummyModelB],
    };
}

/// The sample module: a [`TableModule`] over [`SAMPLE_TABLE`].
pub fn sample_module() -> TableModule {
    TableModule::new(SAMPLE_MODULE_NAME, &SAMPLE_TABLE)
}

/// The sample module as a shared handle, ready for in-process registration.
pub fn shared_sample_module() -> ModuleRef {
    Arc::new(sample_module())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_exports_sample_module() {
        let modules = modreg_module_factory();
        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].name(), SAMPLE_MODULE_NAME);
    }

    #[test]
    fn test_sample_module_announces_models_in_order() {
        let module = sample_module();
        assert_eq!(module.announce_interfaces(), vec!["dummy_interface"]);
        assert_eq!(
            module.announce_models("dummy_interface"),
            vec!["dummy_a", "dummy_b"]
        );
    }

    #[test]
    fn test_models_report_their_names() {
        let module = shared_sample_module();
        for (model, expected) in [("dummy_a", "DummyA"), ("dummy_b", "DummyB")] {
            assert!(module.has("dummy_interface", model));
            let dummy = module
                .get("dummy_interface", model)
                .unwrap()
                .downcast::<dyn DummyInterface>()
                .unwrap();
            assert_eq!(dummy.name(), expected);
        }
        assert!(!module.has("dummy_interface", "nonexistent_model"));
    }
}
