//! Scene object handles.
//!
//! A [`SceneObject`] is a plain `u64` handle into a scene registry. Components
//! hold it as a back-reference to their owner; holding a handle never keeps
//! the object alive.

use serde::{Deserialize, Serialize};

/// A non-owning handle to a node of the scene graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SceneObject(pub u64);

impl std::fmt::Display for SceneObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SceneObject({})", self.0)
    }
}

/// Hands out scene object handles starting at 1. Ids are never reused, so a
/// handle to a removed object cannot alias a newer one.
#[derive(Debug)]
pub struct SceneObjectAllocator {
    next_id: u64,
}

impl SceneObjectAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self { next_id: 1 }
    }

    pub fn allocate(&mut self) -> SceneObject {
        let object = SceneObject(self.next_id);
        self.next_id += 1;
        object
    }
}

impl Default for SceneObjectAllocator {
    fn default() -> Self {
        Self::new()
    }
}
