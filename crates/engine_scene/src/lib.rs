//! # engine_scene
//!
//! A registry of scene objects and the components attached to them.
//!
//! - [`Scene`] — creates and removes scene objects, attaches components with
//!   one instance per type per object, and answers the owner lookups
//!   components delegate to through [`SceneGraph`](engine_component::SceneGraph).
//! - [`SceneConfig`] — attachment policy.
//! - [`SceneError`] — registry errors.

pub mod config;
pub mod error;
pub mod scene;

pub use config::SceneConfig;
pub use error::{AttachError, SceneError};
pub use scene::Scene;
