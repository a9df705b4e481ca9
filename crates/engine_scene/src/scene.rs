//! Scene object registry.
//!
//! The [`Scene`] owns scene objects and their components. Each object holds at
//! most one component per [`ComponentTypeId`] and always starts with a
//! [`Transform`]. Components only keep a [`SceneObject`] handle back to their
//! owner, so removing an object leaves any outstanding handles dangling; the
//! scene reports those as unknown objects.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use engine_component::{
    Component, ComponentError, ComponentTypeId, NativeTypeRegistry, SceneGraph, SceneObject,
    SceneObjectAllocator,
};
use engine_math::Transform;
use tracing::debug;

use crate::config::SceneConfig;
use crate::error::{AttachError, SceneError};

/// A scene object and its components, keyed by type id.
#[derive(Debug)]
struct SceneNode {
    name: String,
    components: BTreeMap<ComponentTypeId, Box<dyn Component>>,
}

/// Registry of scene objects and their attached components.
#[derive(Debug)]
pub struct Scene {
    config: SceneConfig,
    native: Arc<NativeTypeRegistry>,
    allocator: SceneObjectAllocator,
    objects: HashMap<SceneObject, SceneNode>,
}

impl Scene {
    /// Create an empty scene whose components mirror their types into `native`.
    #[must_use]
    pub fn new(config: SceneConfig, native: Arc<NativeTypeRegistry>) -> Self {
        Self {
            config,
            native,
            allocator: SceneObjectAllocator::new(),
            objects: HashMap::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// The native registry components of this scene should be allocated from.
    #[must_use]
    pub fn native(&self) -> &Arc<NativeTypeRegistry> {
        &self.native
    }

    /// Create a scene object with an identity [`Transform`] attached.
    pub fn create_object(&mut self, name: impl Into<String>) -> SceneObject {
        let object = self.allocator.allocate();
        let mut transform = Transform::new(self.native.allocate());
        transform.set_owner(object);

        let mut components: BTreeMap<ComponentTypeId, Box<dyn Component>> = BTreeMap::new();
        components.insert(Transform::component_type_id(), Box::new(transform));

        let name = name.into();
        debug!(scene = %self.config.name, %object, name = %name, "scene object created");
        self.objects.insert(object, SceneNode { name, components });
        object
    }

    /// Remove a scene object, returning its components with their owners
    /// cleared.
    ///
    /// # Errors
    ///
    /// [`SceneError::UnknownObject`] if `object` does not exist.
    pub fn remove_object(
        &mut self,
        object: SceneObject,
    ) -> Result<Vec<Box<dyn Component>>, SceneError> {
        let node = self
            .objects
            .remove(&object)
            .ok_or(SceneError::UnknownObject(object))?;
        debug!(scene = %self.config.name, %object, name = %node.name, "scene object removed");
        Ok(node
            .components
            .into_values()
            .map(|mut component| {
                component.clear_owner();
                component
            })
            .collect())
    }

    #[must_use]
    pub fn contains(&self, object: SceneObject) -> bool {
        self.objects.contains_key(&object)
    }

    #[must_use]
    pub fn name(&self, object: SceneObject) -> Option<&str> {
        self.objects.get(&object).map(|node| node.name.as_str())
    }

    #[must_use]
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// All live scene objects, in no particular order.
    pub fn objects(&self) -> impl Iterator<Item = SceneObject> + '_ {
        self.objects.keys().copied()
    }

    /// Attach `component` to `object` and point its owner back-reference at
    /// `object`.
    ///
    /// A component already owned by `object` (for example one constructed
    /// with an owner) is accepted. If the object already has a component of
    /// the same type, the call fails unless [`SceneConfig::replace_existing`]
    /// is set, in which case the previous component is returned detached.
    ///
    /// # Errors
    ///
    /// Returns an [`AttachError`] holding the rejected component and one of:
    ///
    /// - [`SceneError::UnknownObject`] if `object` does not exist.
    /// - [`SceneError::AlreadyOwned`] if the component names another owner.
    /// - [`SceneError::DuplicateComponent`] on a type clash without replacement.
    /// - [`SceneError::Component`] if the component's type cannot be read back.
    pub fn attach(
        &mut self,
        object: SceneObject,
        mut component: Box<dyn Component>,
    ) -> Result<Option<Box<dyn Component>>, AttachError> {
        let Some(node) = self.objects.get_mut(&object) else {
            return Err(AttachError::new(SceneError::UnknownObject(object), component));
        };

        let type_name = component.base().type_name();
        if let Ok(owner) = component.owner()
            && owner != object
        {
            let reason = SceneError::AlreadyOwned {
                component: type_name,
                owner,
            };
            return Err(AttachError::new(reason, component));
        }

        let type_id = match component.component_type() {
            Ok(type_id) => type_id,
            Err(err) => return Err(AttachError::new(err.into(), component)),
        };
        if node.components.contains_key(&type_id) && !self.config.replace_existing {
            debug!(scene = %self.config.name, %object, component = type_name, "duplicate component rejected");
            let reason = SceneError::DuplicateComponent {
                object,
                component: type_name,
                type_id,
            };
            return Err(AttachError::new(reason, component));
        }

        component.set_owner(object);
        debug!(scene = %self.config.name, %object, component = type_name, "component attached");
        Ok(node
            .components
            .insert(type_id, component)
            .map(|mut previous| {
                previous.clear_owner();
                previous
            }))
    }

    /// Typed form of [`Scene::attach`].
    ///
    /// # Errors
    ///
    /// Same as [`Scene::attach`].
    pub fn attach_component<T: Component>(
        &mut self,
        object: SceneObject,
        component: T,
    ) -> Result<Option<Box<dyn Component>>, AttachError> {
        self.attach(object, Box::new(component))
    }

    /// Remove the component of the given type from `object`, clearing its
    /// owner.
    ///
    /// # Errors
    ///
    /// [`SceneError::UnknownObject`] if `object` does not exist.
    pub fn detach(
        &mut self,
        object: SceneObject,
        type_id: ComponentTypeId,
    ) -> Result<Option<Box<dyn Component>>, SceneError> {
        let node = self
            .objects
            .get_mut(&object)
            .ok_or(SceneError::UnknownObject(object))?;
        let detached = node.components.remove(&type_id).map(|mut component| {
            component.clear_owner();
            component
        });
        if let Some(component) = &detached {
            debug!(
                scene = %self.config.name,
                %object,
                component = component.base().type_name(),
                "component detached"
            );
        }
        Ok(detached)
    }

    /// The component of type `T` on `object`, if both exist.
    #[must_use]
    pub fn get_component<T: Component>(&self, object: SceneObject) -> Option<&T> {
        self.objects
            .get(&object)?
            .components
            .get(&T::component_type_id())?
            .as_ref()
            .downcast_ref::<T>()
    }

    #[must_use]
    pub fn get_component_mut<T: Component>(&mut self, object: SceneObject) -> Option<&mut T> {
        self.objects
            .get_mut(&object)?
            .components
            .get_mut(&T::component_type_id())?
            .as_mut()
            .downcast_mut::<T>()
    }

    /// Untyped lookup by type id.
    ///
    /// # Errors
    ///
    /// [`ComponentError::UnknownObject`] if `object` does not exist.
    pub fn component_by_type(
        &self,
        object: SceneObject,
        type_id: ComponentTypeId,
    ) -> Result<Option<&dyn Component>, ComponentError> {
        Ok(self
            .node(object)?
            .components
            .get(&type_id)
            .map(|component| component.as_ref()))
    }

    /// The transform of `object`.
    ///
    /// # Errors
    ///
    /// [`ComponentError::UnknownObject`] if `object` does not exist, or
    /// [`ComponentError::MissingTransform`] if its transform was detached.
    pub fn transform(&self, object: SceneObject) -> Result<&Transform, ComponentError> {
        self.node(object)?
            .components
            .get(&Transform::component_type_id())
            .and_then(|component| component.as_ref().downcast_ref::<Transform>())
            .ok_or(ComponentError::MissingTransform(object))
    }

    /// Mutable form of [`Scene::transform`].
    ///
    /// # Errors
    ///
    /// Same as [`Scene::transform`].
    pub fn transform_mut(&mut self, object: SceneObject) -> Result<&mut Transform, ComponentError> {
        self.objects
            .get_mut(&object)
            .ok_or(ComponentError::UnknownObject(object))?
            .components
            .get_mut(&Transform::component_type_id())
            .and_then(|component| component.as_mut().downcast_mut::<Transform>())
            .ok_or(ComponentError::MissingTransform(object))
    }

    /// Every component of `object`, in type id order.
    ///
    /// # Errors
    ///
    /// [`SceneError::UnknownObject`] if `object` does not exist.
    pub fn components(
        &self,
        object: SceneObject,
    ) -> Result<impl Iterator<Item = &dyn Component> + '_, SceneError> {
        let node = self
            .objects
            .get(&object)
            .ok_or(SceneError::UnknownObject(object))?;
        Ok(node.components.values().map(|component| component.as_ref()))
    }

    /// The components of `object` that update passes should visit: disabled
    /// ones are skipped.
    ///
    /// # Errors
    ///
    /// [`SceneError::UnknownObject`] if `object` does not exist.
    pub fn enabled_components(
        &self,
        object: SceneObject,
    ) -> Result<impl Iterator<Item = &dyn Component> + '_, SceneError> {
        Ok(self
            .components(object)?
            .filter(|component| component.is_enabled()))
    }

    /// Every component in the scene with the given type id, paired with its
    /// owner.
    pub fn components_of_type(
        &self,
        type_id: ComponentTypeId,
    ) -> impl Iterator<Item = (SceneObject, &dyn Component)> + '_ {
        self.objects.iter().filter_map(move |(&object, node)| {
            node.components
                .get(&type_id)
                .map(|component| (object, component.as_ref()))
        })
    }

    fn node(&self, object: SceneObject) -> Result<&SceneNode, ComponentError> {
        self.objects
            .get(&object)
            .ok_or(ComponentError::UnknownObject(object))
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(SceneConfig::default(), Arc::new(NativeTypeRegistry::new()))
    }
}

impl SceneGraph for Scene {
    type Transform = Transform;

    fn transform(&self, object: SceneObject) -> Result<&Transform, ComponentError> {
        Scene::transform(self, object)
    }

    fn component(
        &self,
        object: SceneObject,
        type_id: ComponentTypeId,
    ) -> Result<Option<&dyn Component>, ComponentError> {
        self.component_by_type(object, type_id)
    }
}
