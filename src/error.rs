//! Custom error types for the registry.
//!
//! This module defines the primary error type, `RegistryError`, for the host side
//! of the module system. Using the `thiserror` crate, it provides a consistent way
//! to report everything that can go wrong between "find a library" and "hand the
//! caller a typed instance".
//!
//! ## Error Hierarchy
//!
//! `RegistryError` consolidates the following sources:
//!
//! - **`LibraryNotFound`**, **`LibraryLoad`**, **`MissingEntryPoint`**: an explicit
//!   load could not produce a Loaded Source. During automatic discovery these are
//!   logged and skipped instead of being returned.
//! - **`NotImplemented`**: no loaded module (or no module passing the name filter)
//!   provides the requested interface model.
//! - **`NoModelsLoaded`** / **`NoMatch`**: predicate-based selection found no
//!   candidates at all, or found candidates but none satisfied the predicate.
//! - **`Module`**: a module itself reported a failure, including an instance that
//!   does not downcast to the requested interface.
//! - **`Config`**: the registry configuration could not be loaded or is invalid.
//!
//! Loading a module whose name is already registered is not an error; see
//! [`LoadOutcome`](crate::manager::LoadOutcome).

use std::path::PathBuf;

use modreg_api::ModuleError;
use thiserror::Error;

use crate::config::ConfigError;

/// Convenience alias for results using the registry error type.
pub type RegistryResult<T> = std::result::Result<T, RegistryError>;

/// Errors returned by the host-side registry.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// No file exists at the path or at any of its decorated variants.
    #[error("Module library not found: {0}")]
    LibraryNotFound(PathBuf),

    /// The dynamic loader rejected the file.
    #[error("Failed to load module library {path}: {source}")]
    LibraryLoad {
        /// The file that was opened.
        path: PathBuf,
        /// Loader error.
        #[source]
        source: libloading::Error,
    },

    /// The library loaded but exports no module factory.
    #[error("{origin} does not export the module factory entry point: {source}")]
    MissingEntryPoint {
        /// Library the symbol was looked up in.
        origin: String,
        /// Loader error.
        #[source]
        source: libloading::Error,
    },

    /// No module passing the filter provides the interface model.
    #[error("No model '{model}' of interface '{interface}' is implemented{}", describe_filter(.module))]
    NotImplemented {
        /// Requested interface identity.
        interface: String,
        /// Requested model identity.
        model: String,
        /// Module name filter, if one was given.
        module: Option<String>,
    },

    /// Predicate selection had no candidates.
    #[error("There are no models of interface '{0}' loaded")]
    NoModelsLoaded(String),

    /// Predicate selection rejected every candidate.
    #[error("No model of interface '{0}' matches the supplied predicate")]
    NoMatch(String),

    /// A module reported a failure.
    #[error("Module error: {0}")]
    Module(#[from] ModuleError),

    /// Configuration could not be loaded or failed validation.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

fn describe_filter(module: &Option<String>) -> String {
    match module {
        Some(name) => format!(" by module '{name}'"),
        None => String::new(),
    }
}

impl RegistryError {
    /// Whether this is a "model not implemented" condition, from the registry
    /// or from a module.
    pub fn is_not_implemented(&self) -> bool {
        matches!(
            self,
            RegistryError::NotImplemented { .. }
                | RegistryError::Module(ModuleError::NotImplemented { .. })
        )
    }
}
