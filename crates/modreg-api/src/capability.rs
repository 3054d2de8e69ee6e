//! Capability tables: the interface -> model association of a module.
//!
//! A table is an ordered list of interfaces, each with an ordered, non-empty
//! list of models. Tables are plain static data built once by the module
//! author, normally with [`capability_table!`](crate::capability_table):
//!
//! ```rust
//! # use modreg_api::prelude::*;
//! # pub trait Calculator: Send + Sync {}
//! # impl Interface for dyn Calculator { const INTERFACE: &'static str = "calculator"; }
//! # #[derive(Default)] pub struct Dft;
//! # impl Model for Dft { const MODEL: &'static str = "dft"; }
//! # impl Calculator for Dft {}
//! # #[derive(Default)] pub struct Pm6;
//! # impl Model for Pm6 { const MODEL: &'static str = "pm6"; }
//! # impl Calculator for Pm6 {}
//! capability_table! {
//!     pub static CALCULATORS = {
//!         dyn Calculator => [Dft, Pm6],
//!     };
//! }
//!
//! assert!(CALCULATORS.validate().is_ok());
//! assert_eq!(CALCULATORS.entries()[0].model_ids().collect::<Vec<_>>(), ["dft", "pm6"]);
//! ```
//!
//! The macro checks at compile time that no model list is empty and that no
//! two models of one interface share an identity (ignoring ASCII case).

use std::fmt;

use crate::error::TableError;
use crate::instance::Instance;

/// One model of an interface and how to construct it.
#[derive(Clone, Copy)]
pub struct ModelEntry {
    model: &'static str,
    construct: fn() -> Instance,
}

impl ModelEntry {
    /// Pair a model identity with its constructor.
    pub const fn new(model: &'static str, construct: fn() -> Instance) -> Self {
        Self { model, construct }
    }

    /// The model identity.
    pub fn model(&self) -> &'static str {
        self.model
    }

    /// Build a fresh instance of this model.
    pub fn construct(&self) -> Instance {
        (self.construct)()
    }
}

impl fmt::Debug for ModelEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelEntry")
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

/// An interface and the models of it a table provides.
#[derive(Debug, Clone, Copy)]
pub struct InterfaceEntry {
    interface: &'static str,
    models: &'static [ModelEntry],
}

impl InterfaceEntry {
    /// List `models` under `interface`.
    pub const fn new(interface: &'static str, models: &'static [ModelEntry]) -> Self {
        Self { interface, models }
    }

    /// The interface identity.
    pub fn interface(&self) -> &'static str {
        self.interface
    }

    /// Models in declaration order.
    pub fn models(&self) -> &'static [ModelEntry] {
        self.models
    }

    /// Model identities in declaration order.
    pub fn model_ids(&self) -> impl Iterator<Item = &'static str> {
        self.models.iter().map(ModelEntry::model)
    }
}

/// Ordered interface -> model mapping of one module.
#[derive(Debug, Clone, Copy)]
pub struct CapabilityTable {
    entries: &'static [InterfaceEntry],
}

impl CapabilityTable {
    /// Wrap entries without checking them. See [`CapabilityTable::validate`].
    pub const fn from_static(entries: &'static [InterfaceEntry]) -> Self {
        Self { entries }
    }

    /// Interface entries in declaration order.
    pub fn entries(&self) -> &'static [InterfaceEntry] {
        self.entries
    }

    /// Whether the table lists no interfaces.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check the table invariants.
    ///
    /// Every interface needs at least one model, and model identities must be
    /// unique within an interface ignoring ASCII case.
    pub fn validate(&self) -> Result<(), TableError> {
        for entry in self.entries {
            if entry.models.is_empty() {
                return Err(TableError::EmptyModelList(entry.interface.to_string()));
            }

            for (index, model) in entry.models.iter().enumerate() {
                let repeated = entry.models[index + 1..]
                    .iter()
                    .any(|other| other.model.eq_ignore_ascii_case(model.model));
                if repeated {
                    return Err(TableError::DuplicateModel {
                        interface: entry.interface.to_string(),
                        model: model.model.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// ASCII case-insensitive string equality usable in constant evaluation.
pub const fn eq_ignore_case(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }

    let mut i = 0;
    while i < a.len() {
        if a[i].to_ascii_lowercase() != b[i].to_ascii_lowercase() {
            return false;
        }
        i += 1;
    }
    true
}

/// Compile-time form of [`CapabilityTable::validate`] for one model list.
///
/// Called from [`capability_table!`](crate::capability_table) inside a
/// `const` item, so a violation fails the build.
#[doc(hidden)]
pub const fn assert_models_valid(models: &[&str]) {
    if models.is_empty() {
        panic!("capability table: model list may not be empty");
    }

    let mut i = 0;
    while i < models.len() {
        let mut j = i + 1;
        while j < models.len() {
            if eq_ignore_case(models[i], models[j]) {
                panic!("capability table: model identifiers must be unique within an interface");
            }
            j += 1;
        }
        i += 1;
    }
}

/// Declare a static [`CapabilityTable`].
///
/// Each line maps an interface trait object type to the model types that
/// implement it, in the order they are announced and searched:
///
/// ```rust,ignore
/// capability_table! {
///     pub static SAMPLE_TABLE = {
///         dyn DummyInterface => [DummyModelA, DummyModelB],
///         dyn OtherInterface => [OtherModel],
///     };
/// }
/// ```
///
/// The interface types must implement [`Interface`](crate::Interface), the
/// model types [`Model`](crate::Model) and the interface trait.
#[macro_export]
macro_rules! capability_table {
    (
        $(#[$meta:meta])*
        $vis:vis static $name:ident = {
            $( $iface:ty => [ $( $model:ty ),+ $(,)? ] ),+ $(,)?
        };
    ) => {
        $(#[$meta])*
        $vis static $name: $crate::CapabilityTable = $crate::CapabilityTable::from_static({
            const ENTRIES: &[$crate::InterfaceEntry] = &[
                $({
                    const _: () = $crate::capability::assert_models_valid(&[
                        $( <$model as $crate::Model>::MODEL ),+
                    ]);
                    const MODELS: &[$crate::ModelEntry] = &[
                        $(
                            $crate::ModelEntry::new(<$model as $crate::Model>::MODEL, || {
                                let model: ::std::sync::Arc<$iface> = ::std::sync::Arc::new(
                                    <$model as ::core::default::Default>::default(),
                                );
                                $crate::Instance::new::<$iface>(<$model as $crate::Model>::MODEL, model)
                            })
                        ),+
                    ];
                    $crate::InterfaceEntry::new(<$iface as $crate::Interface>::INTERFACE, MODELS)
                }),+
            ];
            ENTRIES
        });
    };
}
