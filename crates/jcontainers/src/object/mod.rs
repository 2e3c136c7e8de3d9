//! Container nodes: arrays, string-keyed maps and form-keyed maps
//!
//! An [`Object`] is a shared handle to a node. Cloning it bumps the node's
//! atomic reference count; the node is freed when the last handle is dropped.
//! The node's contents sit behind a per-node mutex, taken through
//! [`Object::lock`] or by the single-operation helpers below, which hold the
//! lock only for the duration of the call.
//!
//! Handles may form cycles (a map holding itself, two arrays holding each
//! other). Nothing collects such cycles: they live until a caller breaks one
//! of the edges.
//!
//! Freeing a node releases its children iteratively, so dropping the last
//! handle to an arbitrarily deep chain does not grow the stack.

mod lock;

pub use lock::ObjectLock;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use indexmap::IndexMap;

use crate::form::FormId;
use crate::value::Item;

/// The variant of a container. Fixed for the container's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// Ordered list of items
    Array,
    /// Insertion-ordered string-keyed map
    Map,
    /// Form-keyed map
    FormMap,
}

impl ObjectKind {
    /// Human-readable name of the kind
    pub fn name(self) -> &'static str {
        match self {
            ObjectKind::Array => "array",
            ObjectKind::Map => "map",
            ObjectKind::FormMap => "form map",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where an item lives inside its container.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// Position in an array
    Index(usize),
    /// Key of a string map
    Str(String),
    /// Key of a form map
    Form(FormId),
}

/// Storage of a container, one alternative per [`ObjectKind`].
#[derive(Debug)]
pub enum Storage {
    /// Array items in order
    Array(Vec<Item>),
    /// Map entries in insertion order
    Map(IndexMap<String, Item>),
    /// Form map entries ordered by id
    FormMap(BTreeMap<FormId, Item>),
}

impl Storage {
    fn empty(kind: ObjectKind) -> Self {
        match kind {
            ObjectKind::Array => Storage::Array(Vec::new()),
            ObjectKind::Map => Storage::Map(IndexMap::new()),
            ObjectKind::FormMap => Storage::FormMap(BTreeMap::new()),
        }
    }

    /// Kind of container this storage belongs to
    pub fn kind(&self) -> ObjectKind {
        match self {
            Storage::Array(_) => ObjectKind::Array,
            Storage::Map(_) => ObjectKind::Map,
            Storage::FormMap(_) => ObjectKind::FormMap,
        }
    }

    /// Number of items or entries
    pub fn len(&self) -> usize {
        match self {
            Storage::Array(items) => items.len(),
            Storage::Map(entries) => entries.len(),
            Storage::FormMap(entries) => entries.len(),
        }
    }

    /// Check for an empty container
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up an item by key; `None` if the key kind does not match the storage.
    pub fn get(&self, key: &Key) -> Option<&Item> {
        match (self, key) {
            (Storage::Array(items), Key::Index(idx)) => items.get(*idx),
            (Storage::Map(entries), Key::Str(k)) => entries.get(k),
            (Storage::FormMap(entries), Key::Form(id)) => entries.get(id),
            _ => None,
        }
    }

    /// Empty the storage, moving any child containers into `out`.
    fn drain_children(&mut self, out: &mut Vec<Object>) {
        match self {
            Storage::Array(items) => out.extend(items.drain(..).filter_map(Item::into_object)),
            Storage::Map(entries) => {
                out.extend(entries.drain(..).filter_map(|(_, item)| item.into_object()))
            }
            Storage::FormMap(entries) => out.extend(
                std::mem::take(entries)
                    .into_values()
                    .filter_map(Item::into_object),
            ),
        }
    }
}

struct ObjectData {
    kind: ObjectKind,
    storage: Mutex<Storage>,
}

// Children whose last handle lives here are unwound on an explicit stack,
// so freeing a long chain does not recurse once per level.
impl Drop for ObjectData {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.storage
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .drain_children(&mut pending);

        while let Some(child) = pending.pop() {
            if let Ok(mut data) = Arc::try_unwrap(child.0) {
                data.storage
                    .get_mut()
                    .unwrap_or_else(PoisonError::into_inner)
                    .drain_children(&mut pending);
            }
        }
    }
}

/// Shared, lockable handle to a container node.
///
/// # Example
///
/// ```
/// use jcontainers::{Item, Object};
///
/// let root = Object::map();
/// let list = Object::array_with([1, 2, 3]);
///
/// root.set_value_for_key("list", &list);
/// assert_eq!(list.len(), 3);
/// assert_eq!(root.value_for_key("list"), Some(Item::from(&list)));
/// ```
#[derive(Clone)]
pub struct Object(Arc<ObjectData>);

impl Object {
    // ═══════════════════════════════════════════════════════════════════
    // Construction
    // ═══════════════════════════════════════════════════════════════════

    /// Create an empty container of the given kind.
    pub fn new(kind: ObjectKind) -> Self {
        Object(Arc::new(ObjectData {
            kind,
            storage: Mutex::new(Storage::empty(kind)),
        }))
    }

    /// Create an empty array.
    pub fn array() -> Self {
        Self::new(ObjectKind::Array)
    }

    /// Create an empty string-keyed map.
    pub fn map() -> Self {
        Self::new(ObjectKind::Map)
    }

    /// Create an empty form-keyed map.
    pub fn form_map() -> Self {
        Self::new(ObjectKind::FormMap)
    }

    /// Create an array holding the given values.
    pub fn array_with<I, T>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Item>,
    {
        let items = values.into_iter().map(Into::into).collect();
        Object(Arc::new(ObjectData {
            kind: ObjectKind::Array,
            storage: Mutex::new(Storage::Array(items)),
        }))
    }

    // ═══════════════════════════════════════════════════════════════════
    // Identity
    // ═══════════════════════════════════════════════════════════════════

    /// Kind of this container
    pub fn kind(&self) -> ObjectKind {
        self.0.kind
    }

    /// Check if this is an array
    pub fn is_array(&self) -> bool {
        self.kind() == ObjectKind::Array
    }

    /// Check if this is a string-keyed map
    pub fn is_map(&self) -> bool {
        self.kind() == ObjectKind::Map
    }

    /// Check if this is a form-keyed map
    pub fn is_form_map(&self) -> bool {
        self.kind() == ObjectKind::FormMap
    }

    /// Check whether two handles point at the same node
    pub fn ptr_eq(&self, other: &Object) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Address-based identity, stable while any handle is alive
    pub fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }

    /// Number of live handles to this node
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.0)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Locking
    // ═══════════════════════════════════════════════════════════════════

    /// Lock the node's contents.
    ///
    /// Holding two locks at once is the caller's responsibility; nothing in
    /// this crate does so. A poisoned lock is recovered, since every mutation
    /// leaves the storage well-formed.
    pub fn lock(&self) -> ObjectLock<'_> {
        ObjectLock::new(
            self.0
                .storage
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }

    /// Number of items or entries
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check for an empty container
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every item or entry
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Read a copy of the item at `key`.
    pub fn get(&self, key: &Key) -> Option<Item> {
        self.lock().get(key).cloned()
    }

    /// Store `value` at `key`.
    ///
    /// Array positions must already exist; map keys are inserted or replaced.
    /// Returns `false` when the key kind does not match the container.
    pub fn set(&self, key: &Key, value: impl Into<Item>) -> bool {
        let mut guard = self.lock();
        match guard.slot_mut(key, true) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Array Operations
    // ═══════════════════════════════════════════════════════════════════

    /// Append to an array. Returns `false` for other kinds.
    pub fn push(&self, value: impl Into<Item>) -> bool {
        match self.lock().as_array_mut() {
            Some(items) => {
                items.push(value.into());
                true
            }
            None => false,
        }
    }

    /// Read a copy of the array item at `index`.
    pub fn item_at(&self, index: usize) -> Option<Item> {
        self.get(&Key::Index(index))
    }

    /// Replace an existing array item. Out-of-range indices are ignored.
    pub fn set_item_at(&self, index: usize, value: impl Into<Item>) -> bool {
        self.set(&Key::Index(index), value)
    }

    /// Remove the array item at `index`, shifting the rest down.
    pub fn erase_at(&self, index: usize) -> bool {
        match self.lock().as_array_mut() {
            Some(items) if index < items.len() => {
                items.remove(index);
                true
            }
            _ => false,
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Map Operations
    // ═══════════════════════════════════════════════════════════════════

    /// Read a copy of the map value for `key`.
    pub fn value_for_key(&self, key: &str) -> Option<Item> {
        self.lock().as_map().and_then(|m| m.get(key)).cloned()
    }

    /// Insert or replace a map entry. Returns `false` for other kinds.
    pub fn set_value_for_key(&self, key: impl Into<String>, value: impl Into<Item>) -> bool {
        match self.lock().as_map_mut() {
            Some(entries) => {
                entries.insert(key.into(), value.into());
                true
            }
            None => false,
        }
    }

    /// Check whether a map has an entry for `key`.
    pub fn has_key(&self, key: &str) -> bool {
        self.lock().as_map().is_some_and(|m| m.contains_key(key))
    }

    /// Remove a map entry, keeping the order of the rest. Returns whether it existed.
    pub fn remove_key(&self, key: &str) -> bool {
        self.lock()
            .as_map_mut()
            .is_some_and(|m| m.shift_remove(key).is_some())
    }

    /// Map keys in insertion order.
    pub fn keys(&self) -> Vec<String> {
        self.lock()
            .as_map()
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default()
    }

    // ═══════════════════════════════════════════════════════════════════
    // Form Map Operations
    // ═══════════════════════════════════════════════════════════════════

    /// Read a copy of the form map value for `form`.
    pub fn value_for_form(&self, form: FormId) -> Option<Item> {
        self.get(&Key::Form(form))
    }

    /// Insert or replace a form map entry. The null form is not a valid key.
    pub fn set_value_for_form(&self, form: FormId, value: impl Into<Item>) -> bool {
        if form.is_zero() {
            return false;
        }
        self.set(&Key::Form(form), value)
    }

    /// Check whether a form map has an entry for `form`.
    pub fn has_form(&self, form: FormId) -> bool {
        self.lock()
            .as_form_map()
            .is_some_and(|m| m.contains_key(&form))
    }

    /// Remove a form map entry. Returns whether it existed.
    pub fn remove_form(&self, form: FormId) -> bool {
        self.lock()
            .as_form_map_mut()
            .is_some_and(|m| m.remove(&form).is_some())
    }

    /// Form map keys in id order.
    pub fn forms(&self) -> Vec<FormId> {
        self.lock()
            .as_form_map()
            .map(|m| m.keys().copied().collect())
            .unwrap_or_default()
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:#x}", self.kind(), self.id())
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Object {}
