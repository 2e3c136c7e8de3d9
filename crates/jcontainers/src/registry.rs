//! Handle registry: integer handles for containers held by outside callers.
//!
//! Callers that cannot hold an [`Object`] directly (script bindings, save
//! files) refer to containers by a [`Handle`]. The registry keeps one strong
//! reference per registered container plus a retain count; the container is
//! dropped from the registry when the count returns to zero.
//!
//! A handle can also be queued for a deferred release with
//! [`Registry::autorelease`]; the queue is drained by
//! [`Registry::drain_autoreleased`], typically once per host tick.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError};

use dashmap::DashMap;
use tracing::{debug, trace};

use crate::object::{Object, ObjectKind};

/// Opaque integer naming a registered container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(pub u32);

impl Handle {
    /// Handle that never names a container.
    pub const NULL: Handle = Handle(0);
}

#[derive(Debug)]
struct Entry {
    object: Object,
    retains: u32,
}

/// Concurrent map from handles to containers.
///
/// # Example
///
/// ```
/// use jcontainers::{Object, Registry};
///
/// let registry = Registry::new();
/// let handle = registry.register(&Object::map());
///
/// assert!(registry.get(handle).is_some());
/// assert!(registry.release(handle));
/// assert!(registry.get(handle).is_none());
/// ```
#[derive(Debug)]
pub struct Registry {
    entries: DashMap<Handle, Entry>,
    by_object: DashMap<usize, Handle>,
    next: AtomicU32,
    autoreleased: Mutex<Vec<Handle>>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            by_object: DashMap::new(),
            next: AtomicU32::new(1),
            autoreleased: Mutex::new(Vec::new()),
        }
    }

    /// Register a container with a retain count of one.
    ///
    /// Registering an already registered container returns its existing
    /// handle and retains it again. The lookup and the retain happen under
    /// the container's reverse-lookup entry, so a concurrent [`release`]
    /// cannot unregister the handle in between.
    ///
    /// [`release`]: Registry::release
    pub fn register(&self, object: &Object) -> Handle {
        let mut slot = self.by_object.entry(object.id()).or_insert(Handle::NULL);

        if let Some(mut entry) = self.entries.get_mut(&*slot) {
            entry.retains += 1;
            return *slot;
        }

        let handle = Handle(self.next.fetch_add(1, Ordering::Relaxed));
        self.entries.insert(
            handle,
            Entry {
                object: object.clone(),
                retains: 1,
            },
        );
        *slot = handle;
        handle
    }

    /// Look up a container.
    pub fn get(&self, handle: Handle) -> Option<Object> {
        self.entries.get(&handle).map(|e| e.object.clone())
    }

    /// Look up a container of a specific kind.
    pub fn get_as(&self, handle: Handle, kind: ObjectKind) -> Option<Object> {
        self.get(handle).filter(|obj| obj.kind() == kind)
    }

    /// Increase the retain count. Returns `None` for unknown handles.
    pub fn retain(&self, handle: Handle) -> Option<Handle> {
        let mut entry = self.entries.get_mut(&handle)?;
        entry.retains += 1;
        Some(handle)
    }

    /// Decrease the retain count, unregistering at zero.
    ///
    /// Returns `false` for unknown handles.
    pub fn release(&self, handle: Handle) -> bool {
        self.release_one(handle).is_some()
    }

    /// Decrease the retain count. `Some(true)` when the handle was
    /// unregistered, `None` when it was unknown.
    fn release_one(&self, handle: Handle) -> Option<bool> {
        let removed = self.entries.remove_if_mut(&handle, |_, entry| {
            entry.retains = entry.retains.saturating_sub(1);
            entry.retains == 0
        });

        match removed {
            Some((_, entry)) => {
                // The container may already be registered again under a new handle
                self.by_object
                    .remove_if(&entry.object.id(), |_, current| *current == handle);
                trace!(handle = handle.0, "released container");
                Some(true)
            }
            None => self.entries.contains_key(&handle).then_some(false),
        }
    }

    /// Queue one deferred release of `handle`.
    ///
    /// Returns `false` for unknown handles.
    pub fn autorelease(&self, handle: Handle) -> bool {
        if !self.entries.contains_key(&handle) {
            return false;
        }
        self.autoreleased
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(handle);
        true
    }

    /// Perform every queued release. Returns the number of containers
    /// that were unregistered as a result.
    pub fn drain_autoreleased(&self) -> usize {
        let queued = std::mem::take(
            &mut *self
                .autoreleased
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );

        let freed = queued
            .iter()
            .filter(|handle| self.release_one(**handle) == Some(true))
            .count();
        debug!(queued = queued.len(), freed, "drained autorelease queue");
        freed
    }

    /// Current retain count of a handle.
    pub fn retain_count(&self, handle: Handle) -> u32 {
        self.entries.get(&handle).map_or(0, |e| e.retains)
    }

    /// Number of registered containers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
