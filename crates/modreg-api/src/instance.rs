//! Type-erased model instances.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::ModuleError;
use crate::identity::Interface;

/// A freshly constructed model, erased behind its interface.
///
/// Internally this is an `Arc<dyn I>` stored as `dyn Any`, so only code that
/// names the interface type `I` can get the model back out. The registry passes
/// instances through without looking inside and never keeps them.
pub struct Instance {
    interface: &'static str,
    model: &'static str,
    value: Box<dyn Any + Send + Sync>,
}

impl Instance {
    /// Wrap an interface pointer produced by `model`.
    pub fn new<I>(model: &'static str, value: Arc<I>) -> Self
    where
        I: Interface + ?Sized,
    {
        Self {
            interface: I::INTERFACE,
            model,
            value: Box::new(value),
        }
    }

    /// Identity of the interface the model was built as.
    pub fn interface(&self) -> &'static str {
        self.interface
    }

    /// Identity of the model that was constructed.
    pub fn model(&self) -> &'static str {
        self.model
    }

    /// Check whether this instance holds an `Arc<I>`.
    pub fn is<I>(&self) -> bool
    where
        I: Interface + ?Sized,
    {
        self.value.is::<Arc<I>>()
    }

    /// Borrow the interface pointer without consuming the instance.
    pub fn downcast_ref<I>(&self) -> Option<&Arc<I>>
    where
        I: Interface + ?Sized,
    {
        self.value.downcast_ref::<Arc<I>>()
    }

    /// Recover the interface pointer.
    ///
    /// Fails with [`ModuleError::InterfaceMismatch`] if the instance was built
    /// as a different interface.
    pub fn downcast<I>(self) -> Result<Arc<I>, ModuleError>
    where
        I: Interface + ?Sized,
    {
        let Self {
            interface,
            model,
            value,
        } = self;

        value
            .downcast::<Arc<I>>()
            .map(|boxed| *boxed)
            .map_err(|_| ModuleError::InterfaceMismatch {
                requested: I::INTERFACE.to_string(),
                interface: interface.to_string(),
                model: model.to_string(),
            })
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("interface", &self.interface)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Shape: Send + Sync {
        fn corners(&self) -> u32;
    }

    impl Interface for dyn Shape {
        const INTERFACE: &'static str = "shape";
    }

    trait Colour: Send + Sync {}

    impl Interface for dyn Colour {
        const INTERFACE: &'static str = "colour";
    }

    struct Square;

    impl Shape for Square {
        fn corners(&self) -> u32 {
            4
        }
    }

    #[test]
    fn test_downcast_to_requested_interface() {
        let instance = Instance::new::<dyn Shape>("square", Arc::new(Square));
        assert_eq!(instance.interface(), "shape");
        assert_eq!(instance.model(), "square");
        assert!(instance.is::<dyn Shape>());

        let shape = instance.downcast::<dyn Shape>().unwrap();
        assert_eq!(shape.corners(), 4);
    }

    #[test]
    fn test_downcast_mismatch_is_reported() {
        let instance = Instance::new::<dyn Shape>("square", Arc::new(Square));
        assert!(!instance.is::<dyn Colour>());
        assert!(instance.downcast_ref::<dyn Colour>().is_none());

        let err = instance.downcast::<dyn Colour>().err().unwrap();
        assert_eq!(
            err,
            ModuleError::InterfaceMismatch {
                requested: "colour".into(),
                interface: "shape".into(),
                model: "square".into(),
            }
        );
    }

    #[test]
    fn test_debug_hides_value() {
        let instance = Instance::new::<dyn Shape>("square", Arc::new(Square));
        let rendered = format!("{instance:?}");
        assert!(rendered.contains("shape"));
        assert!(rendered.contains("square"));
    }
}
