//! The module protocol shared by every plugin.
//!
//! The registry treats all modules alike: it only passes interface and model
//! identity strings in and gets booleans, identity lists, or type-erased
//! [`Instance`]s out. A module never needs to know which concrete types the
//! caller expects.

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::capability::CapabilityTable;
use crate::error::ModuleError;
use crate::instance::Instance;
use crate::resolve;

/// A named provider of interface models.
///
/// # Lifecycle
///
/// Modules are produced by a library's factory entry point (or registered
/// in-process) and live as long as the registry holding them. Instances
/// returned by [`Module::get`] may reference the module's library code, which
/// is why the registry never unloads a library.
pub trait Module: Send + Sync {
    /// Self-reported module name, used as the registry's dedup and filter key.
    fn name(&self) -> &str;

    /// Whether this module can construct `model` of `interface`.
    fn has(&self, interface: &str, model: &str) -> bool;

    /// Construct `model` of `interface`.
    ///
    /// Fails with [`ModuleError::NotImplemented`] if the module does not
    /// provide that model.
    fn get(&self, interface: &str, model: &str) -> Result<Instance, ModuleError>;

    /// Every interface this module has at least one model of.
    fn announce_interfaces(&self) -> Vec<String>;

    /// Model identities of `interface`, empty if the module has none.
    fn announce_models(&self, interface: &str) -> Vec<String>;
}

/// Shared handle to a module, as stored by the registry.
pub type ModuleRef = Arc<dyn Module>;

/// A [`Module`] backed by a static [`CapabilityTable`].
///
/// Holds nothing but its name and table; every query runs the resolution
/// engine against the table.
#[derive(Clone, Copy)]
pub struct TableModule {
    name: &'static str,
    table: &'static CapabilityTable,
}

impl TableModule {
    /// Create a module over `table`.
    ///
    /// Tables from [`capability_table!`](crate::capability_table) are checked
    /// at compile time. Hand-built tables are checked here.
    ///
    /// # Panics
    ///
    /// Panics if `table` has an empty model list or a repeated model identity.
    /// Use [`TableModule::try_new`] to get the error instead.
    pub fn new(name: &'static str, table: &'static CapabilityTable) -> Self {
        let validation = table.validate();
        assert!(
            validation.is_ok(),
            "module {name} has an invalid capability table: {validation:?}"
        );
        Self { name, table }
    }

    /// Create a module over `table`, rejecting tables that break the
    /// capability table invariants with [`ModuleError::InvalidTable`].
    pub fn try_new(name: &'static str, table: &'static CapabilityTable) -> Result<Self, ModuleError> {
        table.validate()?;
        Ok(Self { name, table })
    }

    /// The table this module answers from.
    pub fn table(&self) -> &'static CapabilityTable {
        self.table
    }
}

impl fmt::Debug for TableModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableModule")
            .field("name", &self.name)
            .field("interfaces", &resolve::list_interface_ids(self.table))
            .finish()
    }
}

impl Module for TableModule {
    fn name(&self) -> &str {
        self.name
    }

    fn has(&self, interface: &str, model: &str) -> bool {
        resolve::exists(self.table, interface, model)
    }

    fn get(&self, interface: &str, model: &str) -> Result<Instance, ModuleError> {
        trace!(module = self.name, interface, model, "resolving model");
        resolve::resolve(self.table, interface, model)
            .ok_or_else(|| ModuleError::not_implemented(interface, model))
    }

    fn announce_interfaces(&self) -> Vec<String> {
        resolve::list_interface_ids(self.table)
    }

    fn announce_models(&self, interface: &str) -> Vec<String> {
        resolve::list_model_ids(self.table, interface)
    }
}
