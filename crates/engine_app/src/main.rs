//! # engine_app — demo scene
//!
//! Builds a two-object scene, attaches sample components, and walks through
//! the component contract: owner queries, enable/disable, and teardown.
//!
//! Log output is controlled with `RUST_LOG` (default `engine_app=info`).

mod components;

use std::sync::Arc;

use anyhow::{Context, Result};
use engine_component::{Component, NativeTypeRegistry};
use engine_math::Vec3;
use engine_scene::{Scene, SceneConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use components::{Camera, Light, Viewports};

fn main() -> Result<()> {
    // Initialise structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("engine_app=info".parse()?))
        .init();

    info!("building demo scene");

    let native = Arc::new(NativeTypeRegistry::new());
    let mut scene = Scene::new(SceneConfig::new("demo"), native.clone());

    let rig = scene.create_object("camera_rig");
    let lamp = scene.create_object("lamp");
    scene
        .transform_mut(rig)?
        .set_position(Vec3::new(0.0, 1.8, 5.0));

    let viewports = Arc::new(Viewports::default());
    let camera = Camera::new(&scene, &viewports, 60.0);
    scene.attach_component(rig, camera)?;
    let light = Light::new(&scene, Vec3::new(1.0, 0.9, 0.8), 800.0);
    scene.attach_component(lamp, light)?;

    // Unattached components have no owner to delegate to.
    let spare = Light::new(&scene, Vec3::ONE, 100.0);
    if !spare.has_owner() {
        info!(component = spare.base().type_name(), "spare light is not attached");
    }
    if let Err(err) = spare.base().transform(&scene) {
        warn!(%err, "owner query on unattached component");
    }

    let camera = scene
        .get_component::<Camera>(rig)
        .context("camera rig has no camera")?;
    let eye = camera.base().transform(&scene)?.position();
    let viewport = camera.base().native_handle();
    info!(?eye, fov = camera.fov_degrees, %viewport, "camera ready");

    let light = scene
        .get_component_mut::<Light>(lamp)
        .context("lamp has no light")?;
    info!(color = ?light.color, intensity = light.intensity, "dimming lamp");
    light.disable();

    for object in [rig, lamp] {
        let active: Vec<&str> = scene
            .enabled_components(object)?
            .map(|component| component.base().type_name())
            .collect();
        info!(%object, name = ?scene.name(object), ?active, "enabled components");
    }

    info!(
        objects = scene.object_count(),
        lights = scene.components_of_type(Light::component_type_id()).count(),
        mirrored = native.len(),
        viewports = viewports.len(),
        "scene summary"
    );

    let removed = scene.remove_object(rig)?;
    info!(components = removed.len(), "camera rig removed");
    drop(removed);
    if !viewports.is_open(viewport) {
        info!(%viewport, "camera viewport closed");
    }
    drop(spare);

    info!(
        mirrored = native.len(),
        viewports_closed = viewports.is_empty(),
        "demo finished"
    );
    Ok(())
}
