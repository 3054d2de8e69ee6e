//! Host side of the modreg module registry.
//!
//! Plugin libraries built against [`modreg_api`] export modules; this crate
//! finds those libraries on disk, loads them, and answers `(interface, model)`
//! requests with typed instances. It is used by the `modreg` command-line tool
//! and by any application that wants plugins.
//!
//! ```rust,ignore
//! use modreg::ModuleManager;
//!
//! let registry = ModuleManager::global().read();
//! for interface in registry.loaded_interfaces() {
//!     println!("{interface}: {:?}", registry.loaded_models(&interface));
//! }
//! ```

pub mod config;
pub mod discovery;
pub mod error;
pub mod filter;
pub mod manager;
pub mod source;

pub use modreg_api as api;

pub use config::{ConfigError, RegistryConfig, SearchConfig};
pub use error::{RegistryError, RegistryResult};
pub use filter::ModuleFilter;
pub use manager::{LoadOutcome, ModuleManager};
pub use modreg_api::{Instance, Interface, Model, Module, ModuleRef};
pub use source::{LoadedSource, SourceOrigin};
