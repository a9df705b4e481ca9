//! The scene-object side of the component contract.

use crate::component::{Component, ComponentTypeId};
use crate::error::ComponentError;
use crate::object::SceneObject;

/// Lookups a scene registry offers to the components it owns.
///
/// Delegated component queries ([`ComponentBase::transform`] and
/// [`ComponentBase::component`]) resolve the owner first and then call
/// through this trait.
///
/// [`ComponentBase::transform`]: crate::ComponentBase::transform
/// [`ComponentBase::component`]: crate::ComponentBase::component
pub trait SceneGraph {
    /// The transform type every scene object carries.
    type Transform;

    /// Returns the transform of `object`.
    ///
    /// # Errors
    ///
    /// [`ComponentError::UnknownObject`] if `object` is not live, or
    /// [`ComponentError::MissingTransform`] if it has no transform.
    fn transform(&self, object: SceneObject) -> Result<&Self::Transform, ComponentError>;

    /// Returns the component of `object` with the given type id, if any.
    ///
    /// # Errors
    ///
    /// [`ComponentError::UnknownObject`] if `object` is not live.
    fn component(
        &self,
        object: SceneObject,
        type_id: ComponentTypeId,
    ) -> Result<Option<&dyn Component>, ComponentError>;
}
