//! Sample components used by the demo scene.

use std::sync::Arc;

use dashmap::DashSet;
use engine_component::{CleanupHandler, Component, ComponentBase, NativeHandle};
use engine_math::Vec3;
use engine_scene::Scene;
use tracing::info;

/// A point light.
#[derive(Debug)]
pub struct Light {
    base: ComponentBase,
    pub color: Vec3,
    pub intensity: f32,
}

impl Light {
    pub fn new(scene: &Scene, color: Vec3, intensity: f32) -> Self {
        Self {
            base: ComponentBase::new::<Self>(scene.native().allocate()),
            color,
            intensity,
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

/// Viewports held open by live cameras, keyed by the camera's native handle.
#[derive(Debug, Default)]
pub struct Viewports {
    open: DashSet<NativeHandle>,
}

impl Viewports {
    fn open(&self, handle: NativeHandle) {
        self.open.insert(handle);
    }

    #[must_use]
    pub fn is_open(&self, handle: NativeHandle) -> bool {
        self.open.contains(&handle)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.open.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }
}

impl CleanupHandler for Viewports {
    fn release(&self, handle: NativeHandle) {
        if self.open.remove(&handle).is_some() {
            info!(%handle, "viewport released");
        }
    }
}

/// A perspective camera. It opens a viewport when created and registers
/// `viewports` as a cleanup handler, which closes it when the camera drops.
#[derive(Debug)]
pub struct Camera {
    base: ComponentBase,
    pub fov_degrees: f32,
}

impl Camera {
    pub fn new(scene: &Scene, viewports: &Arc<Viewports>, fov_degrees: f32) -> Self {
        let native = scene.native().allocate();
        viewports.open(native.handle());
        let release: Arc<dyn CleanupHandler> = viewports.clone();
        Self {
            base: ComponentBase::with_cleanup_handlers::<Self>(native, vec![release]),
            fov_degrees,
        }
    }
}

impl Component for Camera {
    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }
}
