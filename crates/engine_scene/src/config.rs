//! Scene configuration.

/// Configuration for a [`Scene`](crate::Scene).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneConfig {
    /// Human-readable scene name, used in log output.
    pub name: String,
    /// When `true`, attaching a component whose type is already present on
    /// the object replaces the old one instead of failing.
    pub replace_existing: bool,
}

impl SceneConfig {
    /// Create a config with the given name and the default attach policy.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            replace_existing: false,
        }
    }

    /// Set the duplicate-type attach policy.
    #[must_use]
    pub fn with_replace_existing(mut self, replace: bool) -> Self {
        self.replace_existing = replace;
        self
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self::new("scene")
    }
}
