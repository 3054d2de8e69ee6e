//! Error types raised across the module boundary.

use thiserror::Error;

/// Invariant violations in a capability table.
///
/// These are defects in the module author's table, not runtime conditions.
/// Tables declared with [`capability_table!`](crate::capability_table) are
/// rejected at compile time instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// An interface entry lists no models.
    #[error("Interface '{0}' has an empty model list")]
    EmptyModelList(String),

    /// A model identity repeats within one interface, compared ignoring ASCII case.
    #[error("Interface '{interface}' lists model '{model}' more than once")]
    DuplicateModel {
        /// Interface whose model list repeats.
        interface: String,
        /// The repeated model identity.
        model: String,
    },
}

/// Errors returned by [`Module`](crate::Module) operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModuleError {
    /// The module does not provide this interface model.
    #[error("No model '{model}' of interface '{interface}' is implemented")]
    NotImplemented {
        /// Requested interface identity.
        interface: String,
        /// Requested model identity.
        model: String,
    },

    /// The instance holds a different interface than the one requested.
    ///
    /// Indicates a bug in the module or the caller, never a missing plugin.
    #[error("Requested interface '{requested}' but model '{model}' was built as '{interface}'")]
    InterfaceMismatch {
        /// Interface the caller asked for.
        requested: String,
        /// Interface the instance was built as.
        interface: String,
        /// Model the instance was built from.
        model: String,
    },

    /// A module was built over a table that breaks its invariants.
    #[error("Invalid capability table: {0}")]
    InvalidTable(#[from] TableError),
}

impl ModuleError {
    pub(crate) fn not_implemented(interface: &str, model: &str) -> Self {
        Self::NotImplemented {
            interface: interface.to_string(),
            model: model.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ModuleError::not_implemented("calculator", "dft");
        assert_eq!(
            err.to_string(),
            "No model 'dft' of interface 'calculator' is implemented"
        );
    }

    #[test]
    fn test_table_error_conversion() {
        let err: ModuleError = TableError::EmptyModelList("calculator".into()).into();
        assert!(matches!(err, ModuleError::InvalidTable(_)));
        assert!(err.to_string().contains("empty model list"));
    }
}
