//! Core [`Component`] trait, its shared [`ComponentBase`] state, and the
//! type identifier scheme.
//!
//! ## Type Identity
//!
//! [`ComponentTypeId`] is derived from the component's **simple** type name
//! (no module path, no generic arguments) with a base-31 polynomial hash over
//! the name's UTF-16 code units, seeded with [`ComponentTypeId::SEED`]. Native
//! code computes the same value for the same name, which lets it classify
//! components it cannot otherwise inspect.
//!
//! Two variants in different modules that share a simple name get the same
//! id. Scene registries key components by id, so such variants cannot both be
//! attached to one scene object.

use std::any::Any;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::ComponentError;
use crate::graph::SceneGraph;
use crate::native::{CleanupHandler, NativeHandle, NativeObject};
use crate::object::SceneObject;

/// Identifier of a component variant, derived from its simple type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct ComponentTypeId(pub u64);

impl ComponentTypeId {
    /// Starting value of the hash. An empty name hashes to exactly this.
    pub const SEED: u64 = 98_764_321_261;

    const BASE: u64 = 31;

    /// Compute the id for a variant name.
    ///
    /// ```text
    /// hash = SEED
    /// for each UTF-16 code unit u in name:
    ///     hash = 31 * hash + u        (wrapping, 64-bit)
    /// ```
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        let hash = name.encode_utf16().fold(Self::SEED, |hash, unit| {
            hash.wrapping_mul(Self::BASE).wrapping_add(u64::from(unit))
        });
        Self(hash)
    }

    /// Compute the id for component type `T` from [`Component::type_name`].
    #[must_use]
    pub fn of<T: Component>() -> Self {
        Self::from_name(T::type_name())
    }
}

impl std::fmt::Display for ComponentTypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

/// Strip the module path and generic arguments from a Rust type path.
///
/// `engine::render::Light<engine::Hdr>` becomes `Light`.
#[must_use]
pub fn simple_type_name(full: &'static str) -> &'static str {
    let path = full.split('<').next().unwrap_or(full);
    path.rsplit("::").next().unwrap_or(path)
}

/// Upcast to [`Any`] for downcasting trait objects.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A unit of behaviour that can be attached to one scene object at a time.
///
/// Implementors embed a [`ComponentBase`] and expose it through
/// [`Component::base`] / [`Component::base_mut`]; everything else is provided.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use engine_component::{Component, ComponentBase, NativeTypeRegistry};
///
/// struct Light {
///     base: ComponentBase,
///     intensity: f32,
/// }
///
/// impl Component for Light {
///     fn base(&self) -> &ComponentBase { &self.base }
///     fn base_mut(&mut self) -> &mut ComponentBase { &mut self.base }
/// }
///
/// let native = Arc::new(NativeTypeRegistry::new());
/// let light = Light { base: ComponentBase::new::<Light>(native.allocate()), intensity: 1.0 };
/// assert!(light.is_enabled());
/// assert!(!light.has_owner());
/// ```
pub trait Component: AsAny + Send + Sync + 'static {
    /// Simple name of this variant. Defaults to the unqualified Rust type name.
    fn type_name() -> &'static str
    where
        Self: Sized,
    {
        simple_type_name(std::any::type_name::<Self>())
    }

    /// The [`ComponentTypeId`] of this variant.
    fn component_type_id() -> ComponentTypeId
    where
        Self: Sized,
    {
        ComponentTypeId::from_name(Self::type_name())
    }

    fn base(&self) -> &ComponentBase;

    fn base_mut(&mut self) -> &mut ComponentBase;

    /// The type id as mirrored on the native side.
    ///
    /// # Errors
    ///
    /// [`ComponentError::UnmirroredType`] if the native side lost the value.
    fn component_type(&self) -> Result<ComponentTypeId, ComponentError> {
        self.base().component_type()
    }

    fn is_enabled(&self) -> bool {
        self.base().is_enabled()
    }

    fn enable(&mut self) {
        self.base_mut().enable();
    }

    fn disable(&mut self) {
        self.base_mut().disable();
    }

    fn has_owner(&self) -> bool {
        self.base().has_owner()
    }

    /// # Errors
    ///
    /// [`ComponentError::NoOwner`] if the component is not attached.
    fn owner(&self) -> Result<SceneObject, ComponentError> {
        self.base().owner()
    }

    fn set_owner(&mut self, owner: SceneObject) {
        self.base_mut().set_owner(owner);
    }

    fn clear_owner(&mut self) -> Option<SceneObject> {
        self.base_mut().clear_owner()
    }
}

impl dyn Component {
    /// Returns `true` if the concrete type is `T`.
    pub fn is<T: Component>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Component>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    /// See [`ComponentBase::transform`].
    ///
    /// # Errors
    ///
    /// [`ComponentError::NoOwner`] if the component is not attached, or the
    /// graph's lookup error.
    pub fn transform<'g, G: SceneGraph>(
        &self,
        graph: &'g G,
    ) -> Result<&'g G::Transform, ComponentError> {
        self.base().transform(graph)
    }

    /// See [`ComponentBase::component`].
    ///
    /// # Errors
    ///
    /// [`ComponentError::NoOwner`] if the component is not attached, or the
    /// graph's lookup error.
    pub fn component<'g, G: SceneGraph>(
        &self,
        graph: &'g G,
        type_id: ComponentTypeId,
    ) -> Result<Option<&'g dyn Component>, ComponentError> {
        self.base().component(graph, type_id)
    }
}

impl std::fmt::Debug for dyn Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let base = self.base();
        f.debug_struct(base.type_name())
            .field("handle", &base.native_handle())
            .field("enabled", &base.is_enabled())
            .field("owner", &base.owner)
            .finish()
    }
}

/// State shared by every component: the native counterpart, the enabled
/// flag, and the non-owning back-reference to the owning scene object.
#[derive(Debug)]
pub struct ComponentBase {
    native: NativeObject,
    type_name: &'static str,
    owner: Option<SceneObject>,
    enabled: bool,
}

impl ComponentBase {
    /// Construct the base for variant `T`, mirroring its type id into `native`.
    #[must_use]
    pub fn new<T: Component>(native: NativeObject) -> Self {
        Self::named(T::type_name(), native)
    }

    /// Construct the base for variant `T` already attached to `owner`.
    #[must_use]
    pub fn with_owner<T: Component>(native: NativeObject, owner: SceneObject) -> Self {
        let mut base = Self::new::<T>(native);
        base.set_owner(owner);
        base
    }

    /// Construct the base for variant `T`, registering extra teardown for
    /// variants that must unregister their native counterpart on drop.
    #[must_use]
    pub fn with_cleanup_handlers<T: Component>(
        mut native: NativeObject,
        cleanup_handlers: Vec<Arc<dyn CleanupHandler>>,
    ) -> Self {
        native.register_cleanup_handlers(cleanup_handlers);
        Self::new::<T>(native)
    }

    /// Construct the base for a variant identified only by name.
    #[must_use]
    pub fn named(type_name: &'static str, native: NativeObject) -> Self {
        let type_id = ComponentTypeId::from_name(type_name);
        native.bridge().set_type(native.handle(), type_id);
        trace!(component = type_name, handle = %native.handle(), %type_id, "component created");
        Self {
            native,
            type_name,
            owner: None,
            enabled: true,
        }
    }

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    #[must_use]
    pub fn native(&self) -> &NativeObject {
        &self.native
    }

    #[must_use]
    pub fn native_handle(&self) -> NativeHandle {
        self.native.handle()
    }

    /// Reads the type id back from the native counterpart.
    ///
    /// # Errors
    ///
    /// [`ComponentError::UnmirroredType`] if the bridge has no value for the
    /// handle.
    pub fn component_type(&self) -> Result<ComponentTypeId, ComponentError> {
        let handle = self.native.handle();
        self.native
            .bridge()
            .get_type(handle)
            .ok_or(ComponentError::UnmirroredType(handle))
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn enable(&mut self) {
        if !self.enabled {
            trace!(component = self.type_name, "enabled");
        }
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        if self.enabled {
            trace!(component = self.type_name, "disabled");
        }
        self.enabled = false;
    }

    #[must_use]
    pub fn has_owner(&self) -> bool {
        self.owner.is_some()
    }

    /// The scene object this component is attached to.
    ///
    /// # Errors
    ///
    /// [`ComponentError::NoOwner`] if the component is not attached.
    pub fn owner(&self) -> Result<SceneObject, ComponentError> {
        self.owner.ok_or(ComponentError::NoOwner {
            component: self.type_name,
        })
    }

    /// Replace the owner back-reference. The previous owner is not notified.
    pub fn set_owner(&mut self, owner: SceneObject) {
        if let Some(previous) = self.owner.replace(owner)
            && previous != owner
        {
            trace!(component = self.type_name, %previous, %owner, "owner rebound");
        }
    }

    /// Drop the owner back-reference, returning the previous owner.
    pub fn clear_owner(&mut self) -> Option<SceneObject> {
        self.owner.take()
    }

    /// The transform of the owning scene object.
    ///
    /// # Errors
    ///
    /// [`ComponentError::NoOwner`] if the component is not attached, otherwise
    /// whatever [`SceneGraph::transform`] reports.
    pub fn transform<'g, G: SceneGraph>(
        &self,
        graph: &'g G,
    ) -> Result<&'g G::Transform, ComponentError> {
        graph.transform(self.owner()?)
    }

    /// The owning scene object's component with the given type id.
    ///
    /// # Errors
    ///
    /// [`ComponentError::NoOwner`] if the component is not attached, otherwise
    /// whatever [`SceneGraph::component`] reports.
    pub fn component<'g, G: SceneGraph>(
        &self,
        graph: &'g G,
        type_id: ComponentTypeId,
    ) -> Result<Option<&'g dyn Component>, ComponentError> {
        graph.component(self.owner()?, type_id)
    }

    /// Typed form of [`ComponentBase::component`].
    ///
    /// # Errors
    ///
    /// Same as [`ComponentBase::component`].
    pub fn get_component<'g, T: Component, G: SceneGraph>(
        &self,
        graph: &'g G,
    ) -> Result<Option<&'g T>, ComponentError> {
        Ok(self
            .component(graph, T::component_type_id())?
            .and_then(|c| c.downcast_ref::<T>()))
    }
}

#[cfg(test)]
mod tests {
    use crate::native::{NativeBridge, NativeTypeRegistry};

    use super::*;

    struct Light {
        base: ComponentBase,
    }

    impl Light {
        fn new(native: &Arc<NativeTypeRegistry>) -> Self {
            Self {
                base: ComponentBase::new::<Light>(native.allocate()),
            }
        }
    }

    impl Component for Light {
        fn base(&self) -> &ComponentBase {
            &self.base
        }
        fn base_mut(&mut self) -> &mut ComponentBase {
            &mut self.base
        }
    }

    struct Camera {
        base: ComponentBase,
    }

    impl Component for Camera {
        fn type_name() -> &'static str {
            "Camera"
        }
        fn base(&self) -> &ComponentBase {
            &self.base
        }
        fn base_mut(&mut self) -> &mut ComponentBase {
            &mut self.base
        }
    }

    /// A single-object graph whose transform is just a label.
    struct FixedGraph {
        object: SceneObject,
        transform: String,
        components: Vec<Box<dyn Component>>,
    }

    impl SceneGraph for FixedGraph {
        type Transform = String;

        fn transform(&self, object: SceneObject) -> Result<&String, ComponentError> {
            if object == self.object {
                Ok(&self.transform)
            } else {
                Err(ComponentError::UnknownObject(object))
            }
        }

        fn component(
            &self,
            object: SceneObject,
            type_id: ComponentTypeId,
        ) -> Result<Option<&dyn Component>, ComponentError> {
            if object != self.object {
                return Err(ComponentError::UnknownObject(object));
            }
            for component in &self.components {
                if component.component_type() == Ok(type_id) {
                    return Ok(Some(component.as_ref()));
                }
            }
            Ok(None)
        }
    }

    fn registry() -> Arc<NativeTypeRegistry> {
        Arc::new(NativeTypeRegistry::new())
    }

    #[test]
    fn test_empty_name_is_seed() {
        assert_eq!(ComponentTypeId::from_name(""), ComponentTypeId(ComponentTypeId::SEED));
        assert_eq!(ComponentTypeId::SEED, 98_764_321_261);
    }

    #[test]
    fn test_light_known_value() {
        let mut expected = ComponentTypeId::SEED;
        for c in "Light".chars() {
            expected = 31 * expected + c as u64;
        }
        assert_eq!(ComponentTypeId::from_name("Light"), ComponentTypeId(expected));
        assert_eq!(ComponentTypeId::from_name("Light").0, 2_827_538_666_867_097_385);
    }

    #[test]
    fn test_long_names_wrap() {
        // Overflows 64 bits; must match two's-complement wrapping.
        assert_eq!(
            ComponentTypeId::from_name("Camera").0,
            13_866_722_377_776_937_842
        );
    }

    #[test]
    fn test_hash_uses_utf16_code_units() {
        // U+1D538 is the surrogate pair D835 DD38.
        let expected = ComponentTypeId::SEED
            .wrapping_mul(31)
            .wrapping_add(0xD835)
            .wrapping_mul(31)
            .wrapping_add(0xDD38);
        assert_eq!(ComponentTypeId::from_name("\u{1D538}"), ComponentTypeId(expected));
    }

    #[test]
    fn test_from_name_is_deterministic() {
        for name in ["Light", "Camera", "Transform", "MeshCollider", "x"] {
            let id = ComponentTypeId::from_name(name);
            assert_eq!(id, ComponentTypeId::from_name(name));
            assert_ne!(id, ComponentTypeId(ComponentTypeId::SEED));
        }
        assert_ne!(
            ComponentTypeId::from_name("Light"),
            ComponentTypeId::from_name("Camera")
        );
    }

    #[test]
    fn test_type_id_survives_msgpack() {
        // The id crosses process boundaries; the encoded value must be the raw hash.
        let id = ComponentTypeId::from_name("Camera");
        let bytes = rmp_serde::to_vec(&id).unwrap();
        let restored: ComponentTypeId = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(id, restored);
        let raw: u64 = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(raw, 13_866_722_377_776_937_842);
    }

    #[test]
    fn test_simple_type_name() {
        assert_eq!(simple_type_name("a::b::Light"), "Light");
        assert_eq!(simple_type_name("Light"), "Light");
        assert_eq!(simple_type_name("a::Light<b::Hdr, c::D<e::F>>"), "Light");
        assert_eq!(Light::type_name(), "Light");
        assert_eq!(Camera::type_name(), "Camera");
    }

    #[test]
    fn test_simple_name_collision_is_preserved() {
        // Known limitation: only the simple name is hashed.
        mod physics {
            pub struct Collider;
        }
        mod audio {
            pub struct Collider;
        }
        let a = simple_type_name(std::any::type_name::<physics::Collider>());
        let b = simple_type_name(std::any::type_name::<audio::Collider>());
        assert_ne!(
            std::any::type_name::<physics::Collider>(),
            std::any::type_name::<audio::Collider>()
        );
        assert_eq!(ComponentTypeId::from_name(a), ComponentTypeId::from_name(b));
    }

    #[test]
    fn test_type_is_mirrored_at_construction() {
        let native = registry();
        let light = Light::new(&native);
        assert_eq!(
            native.get_type(light.base.native_handle()),
            Some(ComponentTypeId::of::<Light>())
        );
        assert_eq!(light.component_type(), Ok(ComponentTypeId::from_name("Light")));
    }

    #[test]
    fn test_same_variant_same_type() {
        let native = registry();
        let a = Light::new(&native);
        let b = Light::new(&native);
        assert_ne!(a.base.native_handle(), b.base.native_handle());
        assert_eq!(a.component_type(), b.component_type());
    }

    #[test]
    fn test_unmirrored_type_is_reported() {
        let native = registry();
        let light = Light::new(&native);
        let handle = light.base.native_handle();
        native.forget(handle);
        assert_eq!(light.component_type(), Err(ComponentError::UnmirroredType(handle)));
    }

    #[test]
    fn test_enabled_after_every_construction_path() {
        let native = registry();
        let bare = ComponentBase::new::<Light>(native.allocate());
        let owned = ComponentBase::with_owner::<Light>(native.allocate(), SceneObject(1));
        let cleanup = ComponentBase::with_cleanup_handlers::<Light>(native.allocate(), Vec::new());
        assert!(bare.is_enabled());
        assert!(owned.is_enabled());
        assert!(cleanup.is_enabled());
        assert_eq!(owned.owner(), Ok(SceneObject(1)));
    }

    #[test]
    fn test_cleanup_handlers_are_added_to_native_object() {
        let native = registry();
        let extra: Arc<dyn CleanupHandler> = native.clone();
        let base = ComponentBase::with_cleanup_handlers::<Light>(native.allocate(), vec![extra]);
        assert_eq!(base.native().cleanup_handler_count(), 2);
        assert_eq!(native.len(), 1);
        drop(base);
        assert!(native.is_empty());
    }

    #[test]
    fn test_enable_disable_idempotent() {
        let native = registry();
        let mut light = Light::new(&native);
        light.enable();
        light.enable();
        assert!(light.is_enabled());
        light.disable();
        light.disable();
        assert!(!light.is_enabled());
        light.enable();
        assert!(light.is_enabled());
    }

    #[test]
    fn test_enabled_independent_of_owner() {
        let native = registry();
        let mut light = Light::new(&native);
        light.disable();
        light.set_owner(SceneObject(4));
        assert!(!light.is_enabled());
        light.clear_owner();
        light.enable();
        assert!(light.is_enabled());
        assert!(!light.has_owner());
    }

    #[test]
    fn test_unowned_access_faults() {
        let native = registry();
        let light = Light::new(&native);
        let graph = FixedGraph {
            object: SceneObject(1),
            transform: "origin".to_string(),
            components: Vec::new(),
        };
        let fault = ComponentError::NoOwner { component: "Light" };

        assert!(!light.has_owner());
        assert_eq!(light.owner(), Err(fault.clone()));
        assert_eq!(light.base.transform(&graph), Err(fault.clone()));
        assert!(matches!(
            light.base.component(&graph, ComponentTypeId::of::<Camera>()),
            Err(ComponentError::NoOwner { component: "Light" })
        ));

        let dynamic: &dyn Component = &light;
        assert_eq!(dynamic.transform(&graph), Err(fault));
    }

    #[test]
    fn test_set_owner_then_query() {
        let native = registry();
        let mut light = Light::new(&native);
        light.set_owner(SceneObject(1));
        assert!(light.has_owner());
        assert_eq!(light.owner(), Ok(SceneObject(1)));
    }

    #[test]
    fn test_rebind_replaces_owner() {
        let native = registry();
        let mut light = Light::new(&native);
        light.set_owner(SceneObject(1));
        light.set_owner(SceneObject(2));
        assert_eq!(light.owner(), Ok(SceneObject(2)));
        assert_eq!(light.clear_owner(), Some(SceneObject(2)));
        assert_eq!(light.clear_owner(), None);
    }

    #[test]
    fn test_delegated_queries_go_through_owner() {
        let native = registry();
        let camera = Camera {
            base: ComponentBase::with_owner::<Camera>(native.allocate(), SceneObject(1)),
        };
        let graph = FixedGraph {
            object: SceneObject(1),
            transform: "origin".to_string(),
            components: vec![Box::new(camera)],
        };

        let mut light = Light::new(&native);
        light.set_owner(SceneObject(1));
        assert_eq!(light.base.transform(&graph).map(String::as_str), Ok("origin"));

        let found = light.base.get_component::<Camera, _>(&graph).unwrap();
        assert!(found.is_some());
        assert!(light.base.get_component::<Light, _>(&graph).unwrap().is_none());

        light.set_owner(SceneObject(9));
        assert_eq!(
            light.base.transform(&graph),
            Err(ComponentError::UnknownObject(SceneObject(9)))
        );
    }

    #[test]
    fn test_downcast() {
        let native = registry();
        let boxed: Box<dyn Component> = Box::new(Light::new(&native));
        assert!(boxed.is::<Light>());
        assert!(!boxed.is::<Camera>());
        assert!(boxed.downcast_ref::<Light>().is_some());
        assert!(boxed.downcast_ref::<Camera>().is_none());
    }

    #[test]
    fn test_debug_names_variant() {
        let native = registry();
        let boxed: Box<dyn Component> = Box::new(Light::new(&native));
        let text = format!("{:?}", boxed.as_ref());
        assert!(text.starts_with("Light"));
        assert!(text.contains("enabled: true"));
    }
}
