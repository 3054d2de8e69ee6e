//! Identity traits naming interfaces and models.

/// Identity of an abstract capability.
///
/// Implement this on the trait object type of the capability trait, not on a
/// concrete type:
///
/// ```rust
/// # use modreg_api::Interface;
/// pub trait Calculator: Send + Sync {
///     fn name(&self) -> String;
/// }
///
/// impl Interface for dyn Calculator {
///     const INTERFACE: &'static str = "calculator";
/// }
/// ```
///
/// Identities are compared case-insensitively. Two unrelated interfaces must
/// not share an identity; nothing enforces this.
pub trait Interface: Send + Sync + 'static {
    /// Stable identity string of the interface.
    const INTERFACE: &'static str;
}

/// Identity of one concrete implementation of an interface.
///
/// Models are constructed with [`Default`] whenever a module resolves them.
/// The identity must be unique (case-insensitively) among the models listed
/// for the same interface in one capability table.
pub trait Model: Default + Send + Sync + 'static {
    /// Identity string of the model.
    const MODEL: &'static str;
}
