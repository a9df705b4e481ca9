//! # engine_component
//!
//! The shared contract of every component attached to a scene object.
//!
//! This crate provides:
//!
//! - [`Component`] trait and [`ComponentBase`] — enabled flag, owner
//!   back-reference, and delegated owner queries.
//! - [`ComponentTypeId`] — the name-derived 64-bit type identifier.
//! - [`native`] — the boundary that mirrors type ids to native counterparts.
//! - [`SceneObject`] — non-owning scene object handles.
//! - [`SceneGraph`] — the lookups a scene registry offers its components.

pub mod component;
pub mod error;
pub mod graph;
pub mod native;
pub mod object;

pub use component::{AsAny, Component, ComponentBase, ComponentTypeId, simple_type_name};
pub use error::ComponentError;
pub use graph::SceneGraph;
pub use native::{CleanupHandler, NativeBridge, NativeHandle, NativeObject, NativeTypeRegistry};
pub use object::{SceneObject, SceneObjectAllocator};
