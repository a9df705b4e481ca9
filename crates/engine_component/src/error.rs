//! Component-layer error types.

use crate::native::NativeHandle;
use crate::object::SceneObject;

/// Errors raised by component queries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComponentError {
    /// An owner-dependent query was made on a component that has no owner.
    ///
    /// This is a runtime assertion: correct callers check
    /// [`Component::has_owner`](crate::Component::has_owner) first.
    #[error("runtime assertion failed: no owner: {component}")]
    NoOwner {
        /// Simple type name of the component that was queried.
        component: &'static str,
    },

    /// The owner handle no longer refers to a live scene object.
    #[error("unknown scene object: {0}")]
    UnknownObject(SceneObject),

    /// The scene object has no transform attached.
    #[error("scene object {0} has no transform")]
    MissingTransform(SceneObject),

    /// The native side holds no type for this handle.
    #[error("no type mirrored for native handle {0}")]
    UnmirroredType(NativeHandle),
}

impl ComponentError {
    /// Returns `true` for faults that signal a violated caller precondition
    /// rather than a condition the caller can expect to recover from.
    #[must_use]
    pub fn is_precondition_violation(&self) -> bool {
        matches!(self, Self::NoOwner { .. })
    }
}
