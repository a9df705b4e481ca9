//! Native mirroring boundary.
//!
//! Every component is paired with a native-side counterpart identified by an
//! opaque [`NativeHandle`]. The component's type id is written to that
//! counterpart once, at construction, so native code can classify components
//! without calling back into this crate.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::component::ComponentTypeId;

/// Opaque id correlating a component with its native counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NativeHandle(pub u64);

impl NativeHandle {
    /// Handle value never produced by an allocator.
    pub const INVALID: NativeHandle = NativeHandle(0);
}

impl std::fmt::Display for NativeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// The two primitive calls the component core makes across the native boundary.
///
/// Once `set_type` has been called for a handle, `get_type` must return that
/// value for the lifetime of the handle.
pub trait NativeBridge: Send + Sync {
    /// Mirror a component type id into the native counterpart.
    fn set_type(&self, handle: NativeHandle, type_id: ComponentTypeId);

    /// Read back the mirrored type id, if any.
    fn get_type(&self, handle: NativeHandle) -> Option<ComponentTypeId>;
}

/// Teardown hook run when a [`NativeObject`] is dropped.
pub trait CleanupHandler: Send + Sync {
    /// Release whatever the handler holds for `handle`.
    fn release(&self, handle: NativeHandle);
}

/// A native handle together with the bridge it lives behind and the cleanup
/// handlers registered for it.
pub struct NativeObject {
    handle: NativeHandle,
    bridge: Arc<dyn NativeBridge>,
    cleanup_handlers: Vec<Arc<dyn CleanupHandler>>,
}

impl NativeObject {
    /// Wrap an existing handle.
    #[must_use]
    pub fn new(bridge: Arc<dyn NativeBridge>, handle: NativeHandle) -> Self {
        Self {
            handle,
            bridge,
            cleanup_handlers: Vec::new(),
        }
    }

    /// Wrap an existing handle, registering handlers to run on drop.
    ///
    /// Handlers run once each, in the order given.
    #[must_use]
    pub fn with_cleanup_handlers(
        bridge: Arc<dyn NativeBridge>,
        handle: NativeHandle,
        cleanup_handlers: Vec<Arc<dyn CleanupHandler>>,
    ) -> Self {
        Self {
            handle,
            bridge,
            cleanup_handlers,
        }
    }

    #[must_use]
    pub fn handle(&self) -> NativeHandle {
        self.handle
    }

    #[must_use]
    pub fn bridge(&self) -> &Arc<dyn NativeBridge> {
        &self.bridge
    }

    /// Adds handlers to those already registered.
    pub(crate) fn register_cleanup_handlers(
        &mut self,
        handlers: impl IntoIterator<Item = Arc<dyn CleanupHandler>>,
    ) {
        self.cleanup_handlers.extend(handlers);
    }

    #[must_use]
    pub fn cleanup_handler_count(&self) -> usize {
        self.cleanup_handlers.len()
    }
}

impl std::fmt::Debug for NativeObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeObject")
            .field("handle", &self.handle)
            .field("cleanup_handlers", &self.cleanup_handlers.len())
            .finish_non_exhaustive()
    }
}

impl Drop for NativeObject {
    fn drop(&mut self) {
        for handler in self.cleanup_handlers.drain(..) {
            handler.release(self.handle);
        }
    }
}

/// In-process [`NativeBridge`] that records mirrored types in a concurrent map.
///
/// It is also a [`CleanupHandler`]: releasing a handle forgets its type.
#[derive(Debug)]
pub struct NativeTypeRegistry {
    next_handle: AtomicU64,
    types: DashMap<NativeHandle, ComponentTypeId>,
}

impl NativeTypeRegistry {
    /// Create an empty registry. Handles start at 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_handle: AtomicU64::new(1),
            types: DashMap::new(),
        }
    }

    /// Allocate a fresh handle wrapped in a [`NativeObject`] bound to this
    /// registry. The registry itself is registered as the cleanup handler so
    /// the mirrored type is forgotten when the object is dropped.
    #[must_use]
    pub fn allocate(self: &Arc<Self>) -> NativeObject {
        let handle = NativeHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));
        let bridge: Arc<dyn NativeBridge> = self.clone();
        let cleanup: Arc<dyn CleanupHandler> = self.clone();
        NativeObject::with_cleanup_handlers(bridge, handle, vec![cleanup])
    }

    /// Remove the mirrored type for `handle`.
    pub fn forget(&self, handle: NativeHandle) -> Option<ComponentTypeId> {
        self.types.remove(&handle).map(|(_, ty)| ty)
    }

    /// Number of handles with a mirrored type.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Default for NativeTypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl NativeBridge for NativeTypeRegistry {
    fn set_type(&self, handle: NativeHandle, type_id: ComponentTypeId) {
        let existing = *self.types.entry(handle).or_insert(type_id);
        if existing != type_id {
            warn!(%handle, ?existing, ?type_id, "native type already set, ignoring rewrite");
        } else {
            trace!(%handle, ?type_id, "mirrored component type");
        }
    }

    fn get_type(&self, handle: NativeHandle) -> Option<ComponentTypeId> {
        self.types.get(&handle).map(|ty| *ty)
    }
}

impl CleanupHandler for NativeTypeRegistry {
    fn release(&self, handle: NativeHandle) {
        self.forget(handle);
    }
}
