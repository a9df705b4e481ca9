//! Scene-registry error types.

use engine_component::{Component, ComponentError, ComponentTypeId, SceneObject};

/// Errors that can occur while mutating a [`Scene`](crate::Scene).
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    /// The scene object does not exist (never created, or removed).
    #[error("unknown scene object: {0}")]
    UnknownObject(SceneObject),

    /// The component is already attached to another scene object.
    #[error("{component} is already owned by {owner}")]
    AlreadyOwned {
        component: &'static str,
        owner: SceneObject,
    },

    /// The object already has a component of this type.
    #[error("{object} already has a {component} component ({type_id})")]
    DuplicateComponent {
        object: SceneObject,
        component: &'static str,
        type_id: ComponentTypeId,
    },

    /// A component query failed.
    #[error(transparent)]
    Component(#[from] ComponentError),
}

/// A failed [`Scene::attach`](crate::Scene::attach). The rejected component is
/// handed back untouched so the caller keeps it and its native counterpart.
#[derive(Debug, thiserror::Error)]
#[error("{reason}")]
pub struct AttachError {
    reason: SceneError,
    component: Box<dyn Component>,
}

impl AttachError {
    pub(crate) fn new(reason: SceneError, component: Box<dyn Component>) -> Self {
        Self { reason, component }
    }

    /// Why the attach was refused.
    #[must_use]
    pub fn reason(&self) -> &SceneError {
        &self.reason
    }

    #[must_use]
    pub fn component(&self) -> &dyn Component {
        self.component.as_ref()
    }

    /// Take the rejected component back.
    #[must_use]
    pub fn into_component(self) -> Box<dyn Component> {
        self.component
    }

    #[must_use]
    pub fn into_parts(self) -> (SceneError, Box<dyn Component>) {
        (self.reason, self.component)
    }
}
