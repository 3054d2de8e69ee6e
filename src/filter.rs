//! Module name filters.
//!
//! A filter restricts a registry query to one module. The empty string and
//! `any` (in any case) mean "no restriction". Any other name matches a module
//! whose name equals it, or equals it followed by `module`, ignoring case, so
//! `sample` selects `SampleModule`.

use std::fmt;

const MODULE_SUFFIX: &str = "module";

/// Restriction on which loaded modules a query consults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum ModuleFilter {
    /// Every module, in load order.
    #[default]
    Any,
    /// Only the module with this name (stored lowercased).
    Named(String),
}

impl ModuleFilter {
    /// Interpret a user-supplied module name.
    pub fn parse(name: &str) -> Self {
        if name.is_empty() || name.eq_ignore_ascii_case("any") {
            ModuleFilter::Any
        } else {
            ModuleFilter::Named(name.to_ascii_lowercase())
        }
    }

    /// Whether every module passes.
    pub fn is_any(&self) -> bool {
        matches!(self, ModuleFilter::Any)
    }

    /// Whether a module named `module_name` passes this filter.
    pub fn matches(&self, module_name: &str) -> bool {
        match self {
            ModuleFilter::Any => true,
            ModuleFilter::Named(wanted) => {
                let name = module_name.to_ascii_lowercase();
                name == *wanted
                    || name
                        .strip_prefix(wanted.as_str())
                        .is_some_and(|rest| rest == MODULE_SUFFIX)
            }
        }
    }

    /// The requested name, if the filter restricts anything.
    pub fn name(&self) -> Option<&str> {
        match self {
            ModuleFilter::Any => None,
            ModuleFilter::Named(name) => Some(name),
        }
    }
}

impl From<&str> for ModuleFilter {
    fn from(name: &str) -> Self {
        ModuleFilter::parse(name)
    }
}

impl From<Option<&str>> for ModuleFilter {
    fn from(name: Option<&str>) -> Self {
        name.map(ModuleFilter::parse).unwrap_or_default()
    }
}

impl fmt::Display for ModuleFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleFilter::Any => f.write_str("any"),
            ModuleFilter::Named(name) => f.write_str(name),
        }
    }
}
