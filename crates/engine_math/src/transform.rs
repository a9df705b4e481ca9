//! Transform component.
//!
//! Every scene object carries exactly one [`Transform`]; components reach it
//! through their owner with `ComponentBase::transform`.

use engine_component::{Component, ComponentBase, NativeObject};
use glam::{Mat4, Quat, Vec3};

/// Local position, rotation, and scale of a scene object.
#[derive(Debug)]
pub struct Transform {
    base: ComponentBase,
    position: Vec3,
    rotation: Quat,
    scale: Vec3,
}

impl Transform {
    /// A transform at the origin with no rotation and unit scale.
    #[must_use]
    pub fn new(native: NativeObject) -> Self {
        Self {
            base: ComponentBase::new::<Self>(native),
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[must_use]
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    #[must_use]
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation.normalize();
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
    }

    /// Move by `offset` in parent space.
    pub fn translate(&mut self, offset: Vec3) {
        self.position += offset;
    }

    /// Apply `rotation` after the current rotation.
    pub fn rotate(&mut self, rotation: Quat) {
        self.rotation = (rotation * self.rotation).normalize();
    }

    /// Reset to the identity transform.
    pub fn reset(&mut self) {
        self.position = Vec3::ZERO;
        self.rotation = Quat::IDENTITY;
        self.scale = Vec3::ONE;
    }

    /// The 4×4 local model matrix.
    #[must_use]
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

impl Component for Transform {
    fn type_name() -> &'static str {
        "Transform"
    }

    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }
}
