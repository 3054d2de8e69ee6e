//! The module registry.
//!
//! `ModuleManager` holds every [`LoadedSource`] in load order and fans queries
//! out across their modules. Single-result queries are answered by the first
//! module (in load order) that has the requested model; list queries
//! concatenate or merge across modules.
//!
//! # Module Lifecycle
//!
//! ```text
//! discover / load_* ──► LoadedSource ──► name collision? ──yes──► AlreadyLoaded
//!                                              │
//!                                              no
//!                                              ▼
//!                                     appended (Loaded), queried until exit
//! ```
//!
//! Sources are never removed. Libraries stay mapped even if a manager is
//! dropped, so instances handed out earlier remain valid.
//!
//! # Process-wide registry
//!
//! [`ModuleManager::global`] returns a lazily created registry shared by the
//! whole process. Discovery runs exactly once, on first access. Loads take the
//! write lock, queries the read lock:
//!
//! ```rust,ignore
//! use modreg::ModuleManager;
//!
//! let calculator = ModuleManager::global()
//!     .read()
//!     .get::<dyn Calculator>("dft", "any")?;
//! ```

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use libloading::Library;
use modreg_api::{resolve, Instance, Interface, ModuleRef};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::config::RegistryConfig;
use crate::discovery;
use crate::error::{RegistryError, RegistryResult};
use crate::filter::ModuleFilter;
use crate::source::LoadedSource;

static GLOBAL: Lazy<RwLock<ModuleManager>> = Lazy::new(|| {
    let manager = ModuleManager::from_environment().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load registry configuration, using defaults");
        ModuleManager::with_discovery(&RegistryConfig::default())
    });
    RwLock::new(manager)
});

/// Result of a load call that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The source's modules were added.
    Loaded,
    /// A module of the same name was already present; nothing changed.
    AlreadyLoaded,
}

impl LoadOutcome {
    /// Whether the load added modules.
    pub fn is_loaded(self) -> bool {
        matches!(self, LoadOutcome::Loaded)
    }
}

/// Registry of loaded modules.
#[derive(Debug, Default)]
pub struct ModuleManager {
    sources: Vec<LoadedSource>,
}

impl ModuleManager {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry and load every module library found in the
    /// configured search locations.
    pub fn with_discovery(config: &RegistryConfig) -> Self {
        let mut manager = Self::new();
        let dirs = discovery::search_directories(config);
        manager.discover(config, &dirs);
        manager
    }

    /// Load the configuration from its default sources, then run discovery.
    pub fn from_environment() -> RegistryResult<Self> {
        let config = RegistryConfig::load()?;
        Ok(Self::with_discovery(&config))
    }

    /// The process-wide registry, created with discovery on first access.
    pub fn global() -> &'static RwLock<ModuleManager> {
        &GLOBAL
    }

    /// Load every module library in `dirs`, skipping the ones that fail.
    ///
    /// Returns how many libraries added modules.
    pub fn discover(&mut self, config: &RegistryConfig, dirs: &[PathBuf]) -> usize {
        let mut loaded = 0;

        for path in discovery::discover_libraries(config, dirs) {
            match self.load_path(&path) {
                Ok(LoadOutcome::Loaded) => loaded += 1,
                Ok(LoadOutcome::AlreadyLoaded) => {}
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping module library"),
            }
        }

        debug!(loaded, modules = self.module_count(), "module discovery finished");
        loaded
    }

    /// Load the module library at `path`.
    pub fn load_path(&mut self, path: impl AsRef<Path>) -> RegistryResult<LoadOutcome> {
        let source = LoadedSource::open(path)?;
        Ok(self.load_source(source))
    }

    /// Load the modules of an already opened library.
    pub fn load_library(&mut self, library: Library) -> RegistryResult<LoadOutcome> {
        let source = LoadedSource::from_library(library)?;
        Ok(self.load_source(source))
    }

    /// Register a module that lives in this process.
    pub fn load_module(&mut self, module: ModuleRef) -> LoadOutcome {
        self.load_source(LoadedSource::from_module(module))
    }

    /// Add a source unless one of its module names is already registered.
    pub fn load_source(&mut self, source: LoadedSource) -> LoadOutcome {
        if let Some(name) = source.module_names().find(|name| self.module_loaded(name)) {
            debug!(module = name, origin = %source.origin(), "module already loaded");
            return LoadOutcome::AlreadyLoaded;
        }

        for name in source.module_names() {
            info!(module = name, origin = %source.origin(), "Loaded module");
        }
        self.sources.push(source);
        LoadOutcome::Loaded
    }

    /// All modules in load order.
    pub fn modules(&self) -> impl Iterator<Item = &ModuleRef> + '_ {
        self.sources.iter().flat_map(LoadedSource::modules)
    }

    /// Loaded sources in load order.
    pub fn sources(&self) -> &[LoadedSource] {
        &self.sources
    }

    /// Number of loaded modules across all sources.
    pub fn module_count(&self) -> usize {
        self.modules().count()
    }

    fn filtered<'a>(&'a self, filter: &'a ModuleFilter) -> impl Iterator<Item = &'a ModuleRef> + 'a {
        self.modules().filter(move |module| filter.matches(module.name()))
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Whether a module with exactly this name is loaded.
    pub fn module_loaded(&self, name: &str) -> bool {
        self.modules().any(|module| module.name() == name)
    }

    /// Names of all loaded modules, in load order.
    pub fn loaded_module_names(&self) -> Vec<String> {
        self.modules().map(|module| module.name().to_string()).collect()
    }

    /// Every interface announced by any module, sorted and without duplicates.
    pub fn loaded_interfaces(&self) -> Vec<String> {
        self.modules()
            .flat_map(|module| module.announce_interfaces())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Models of `interface` across all modules, in load order.
    ///
    /// A model provided by several modules appears once per module.
    pub fn loaded_models(&self, interface: &str) -> Vec<String> {
        self.modules()
            .flat_map(|module| module.announce_models(interface))
            .collect()
    }

    /// Whether any module passing `filter` has `model` of `interface`.
    pub fn has(&self, interface: &str, model: &str, filter: impl Into<ModuleFilter>) -> bool {
        let filter = filter.into();
        self.modules()
            .any(|module| filter.matches(module.name()) && module.has(interface, model))
    }

    /// Construct `model` of `interface` from the first module passing
    /// `filter` that has it.
    pub fn get_erased(
        &self,
        interface: &str,
        model: &str,
        filter: impl Into<ModuleFilter>,
    ) -> RegistryResult<Instance> {
        let filter = filter.into();
        resolve::scan(
            self.filtered(&filter),
            |module| module.has(interface, model),
            |module| module.get(interface, model),
        )
        .ok_or_else(|| RegistryError::NotImplemented {
            interface: interface.to_string(),
            model: model.to_string(),
            module: filter.name().map(str::to_string),
        })?
        .map_err(RegistryError::from)
    }

    /// Construct every model of `interface`.
    ///
    /// Unfiltered, this visits every module in load order. With a module
    /// name, only the first module passing the filter is used; if none does,
    /// the result is empty.
    pub fn get_all_erased(
        &self,
        interface: &str,
        filter: impl Into<ModuleFilter>,
    ) -> RegistryResult<Vec<Instance>> {
        let filter = filter.into();
        let single = !filter.is_any();
        let mut instances = Vec::new();

        for module in self.filtered(&filter) {
            for model in module.announce_models(interface) {
                instances.push(module.get(interface, &model)?);
            }
            if single {
                break;
            }
        }

        Ok(instances)
    }

    // =========================================================================
    // Typed helpers
    // =========================================================================

    /// Whether `model` of interface `I` is available.
    pub fn has_model<I>(&self, model: &str, filter: impl Into<ModuleFilter>) -> bool
    where
        I: Interface + ?Sized,
    {
        self.has(I::INTERFACE, model, filter)
    }

    /// Construct `model` of interface `I`.
    pub fn get<I>(&self, model: &str, filter: impl Into<ModuleFilter>) -> RegistryResult<Arc<I>>
    where
        I: Interface + ?Sized,
    {
        Ok(self.get_erased(I::INTERFACE, model, filter)?.downcast::<I>()?)
    }

    /// Construct every model of interface `I`, see [`get_all_erased`](Self::get_all_erased).
    pub fn get_all<I>(&self, filter: impl Into<ModuleFilter>) -> RegistryResult<Vec<Arc<I>>>
    where
        I: Interface + ?Sized,
    {
        self.get_all_erased(I::INTERFACE, filter)?
            .into_iter()
            .map(|instance| instance.downcast::<I>().map_err(RegistryError::from))
            .collect()
    }

    /// Construct every model of `I` and return the first that satisfies
    /// `predicate`.
    ///
    /// Fails with [`RegistryError::NoModelsLoaded`] when there is nothing to
    /// test, and [`RegistryError::NoMatch`] when nothing passes.
    pub fn get_where<I>(
        &self,
        mut predicate: impl FnMut(&I) -> bool,
        filter: impl Into<ModuleFilter>,
    ) -> RegistryResult<Arc<I>>
    where
        I: Interface + ?Sized,
    {
        let candidates = self.get_all::<I>(filter)?;
        if candidates.is_empty() {
            return Err(RegistryError::NoModelsLoaded(I::INTERFACE.to_string()));
        }

        candidates
            .into_iter()
            .find(|candidate| predicate(&**candidate))
            .ok_or_else(|| RegistryError::NoMatch(I::INTERFACE.to_string()))
    }

    /// Models of interface `I` across all modules.
    pub fn loaded_models_of<I>(&self) -> Vec<String>
    where
        I: Interface + ?Sized,
    {
        self.loaded_models(I::INTERFACE)
    }
}
