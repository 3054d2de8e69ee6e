//! Library entry point convention.
//!
//! Every plugin library exports exactly one function named
//! [`FACTORY_SYMBOL`] with the [`ModuleFactory`] signature. The host looks it
//! up after mapping the library and calls it once to obtain the library's
//! modules.
//!
//! The function uses the Rust ABI. Host and plugins must therefore be built by
//! the same compiler against the same version of this crate; there is no
//! further version negotiation.

use crate::module::ModuleRef;

/// Name of the exported factory function.
pub const FACTORY_SYMBOL: &str = "modreg_module_factory";

/// Signature of the exported factory function.
pub type ModuleFactory = fn() -> Vec<ModuleRef>;

/// Export the modules of a plugin library.
///
/// Expands to the `modreg_module_factory` entry point returning one
/// [`ModuleRef`] per expression, in order:
///
/// ```rust,ignore
/// modreg_api::export_modules!(TableModule::new("SampleModule", &SAMPLE_TABLE));
/// ```
///
/// Use it once per library crate, at the crate root.
#[macro_export]
macro_rules! export_modules {
    ($($module:expr),+ $(,)?) => {
        /// Module factory entry point looked up by the modreg host.
        #[allow(unsafe_code)]
        #[no_mangle]
        pub fn modreg_module_factory() -> ::std::vec::Vec<$crate::ModuleRef> {
            ::std::vec![$( ::std::sync::Arc::new($module) as $crate::ModuleRef ),+]
        }
    };
}
