//! Everything a plugin crate usually needs.
//!
//! ```rust
//! use modreg_api::prelude::*;
//! ```

pub use crate::capability::{CapabilityTable, InterfaceEntry, ModelEntry};
pub use crate::entry::{ModuleFactory, FACTORY_SYMBOL};
pub use crate::error::{ModuleError, TableError};
pub use crate::identity::{Interface, Model};
pub use crate::instance::Instance;
pub use crate::module::{Module, ModuleRef, TableModule};
pub use crate::{capability_table, export_modules};

pub use std::sync::Arc;
