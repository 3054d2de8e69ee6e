//! Plugin-facing API for the modreg module registry.
//!
//! A plugin crate provides *models* (concrete types) of *interfaces* (named
//! capability traits) and bundles them into one or more [`Module`]s. The host
//! registry never sees the concrete types: it only asks modules whether they
//! have a model and gets back a type-erased [`Instance`], which the caller
//! downcasts to the interface it asked for.
//!
//! # Architecture
//!
//! ```text
//! Interface (dyn Trait + identity string)
//! └── Model (concrete type + identity string)
//!     └── CapabilityTable (interface -> [model], declared once per module)
//!         └── TableModule (Module façade, resolution engine underneath)
//!             └── modreg_module_factory (exported entry point, one per library)
//! ```
//!
//! # Writing a plugin
//!
//! ```rust
//! use modreg_api::prelude::*;
//!
//! pub trait Greeter: Send + Sync {
//!     fn greet(&self) -> String;
//! }
//!
//! impl Interface for dyn Greeter {
//!     const INTERFACE: &'static str = "greeter";
//! }
//!
//! #[derive(Default)]
//! pub struct Polite;
//!
//! impl Model for Polite {
//!     const MODEL: &'static str = "polite";
//! }
//!
//! impl Greeter for Polite {
//!     fn greet(&self) -> String {
//!         "Good day".to_string()
//!     }
//! }
//!
//! capability_table! {
//!     static GREETERS = {
//!         dyn Greeter => [Polite],
//!     };
//! }
//!
//! let module = TableModule::new("GreeterModule", &GREETERS);
//! assert!(module.has("Greeter", "POLITE"));
//!
//! let greeter = module.get("greeter", "polite").unwrap().downcast::<dyn Greeter>().unwrap();
//! assert_eq!(greeter.greet(), "Good day");
//! ```
//!
//! A cdylib plugin then exports its modules with [`export_modules!`].

pub mod capability;
pub mod entry;
pub mod error;
pub mod identity;
pub mod instance;
pub mod module;
pub mod prelude;
pub mod resolve;

pub use capability::{CapabilityTable, InterfaceEntry, ModelEntry};
pub use entry::{ModuleFactory, FACTORY_SYMBOL};
pub use error::{ModuleError, TableError};
pub use identity::{Interface, Model};
pub use instance::Instance;
pub use module::{Module, ModuleRef, TableModule};
