//! RAII guard over a container's contents

use std::collections::BTreeMap;
use std::sync::MutexGuard;

use indexmap::IndexMap;

use super::{Key, Storage};
use crate::form::FormId;
use crate::value::Item;

/// Exclusive access to one container's storage, released on drop.
///
/// Reads go through `Deref<Target = Storage>`. Writes go through the typed
/// `as_*_mut` accessors, which hand out the inner collection but never the
/// [`Storage`] enum itself, so the container kind cannot be swapped while
/// locked.
///
/// # Example
///
/// ```
/// use jcontainers::{Item, Object};
///
/// let arr = Object::array();
/// {
///     let mut guard = arr.lock();
///     let items = guard.as_array_mut().unwrap();
///     items.push(Item::Int(1));
///     items.push(Item::Int(2));
/// }
/// // guard dropped, lock released
/// assert_eq!(arr.len(), 2);
/// ```
pub struct ObjectLock<'a> {
    guard: MutexGuard<'a, Storage>,
}

impl<'a> ObjectLock<'a> {
    pub(super) fn new(guard: MutexGuard<'a, Storage>) -> Self {
        Self { guard }
    }

    /// Array items, if this is an array
    pub fn as_array(&self) -> Option<&Vec<Item>> {
        match &*self.guard {
            Storage::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Mutable array items, if this is an array
    pub fn as_array_mut(&mut self) -> Option<&mut Vec<Item>> {
        match &mut *self.guard {
            Storage::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Map entries, if this is a string-keyed map
    pub fn as_map(&self) -> Option<&IndexMap<String, Item>> {
        match &*self.guard {
            Storage::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Mutable map entries, if this is a string-keyed map
    pub fn as_map_mut(&mut self) -> Option<&mut IndexMap<String, Item>> {
        match &mut *self.guard {
            Storage::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Form map entries, if this is a form map
    pub fn as_form_map(&self) -> Option<&BTreeMap<FormId, Item>> {
        match &*self.guard {
            Storage::FormMap(entries) => Some(entries),
            _ => None,
        }
    }

    /// Mutable form map entries, if this is a form map
    pub fn as_form_map_mut(&mut self) -> Option<&mut BTreeMap<FormId, Item>> {
        match &mut *self.guard {
            Storage::FormMap(entries) => Some(entries),
            _ => None,
        }
    }

    /// Mutable slot at `key`.
    ///
    /// With `create`, a missing map or form map entry is inserted empty.
    /// Array slots are never created: the index must be in range.
    pub fn slot_mut(&mut self, key: &Key, create: bool) -> Option<&mut Item> {
        match (&mut *self.guard, key) {
            (Storage::Array(items), Key::Index(idx)) => items.get_mut(*idx),
            (Storage::Map(entries), Key::Str(k)) => {
                if create {
                    Some(entries.entry(k.clone()).or_default())
                } else {
                    entries.get_mut(k)
                }
            }
            (Storage::FormMap(entries), Key::Form(id)) => {
                if create {
                    Some(entries.entry(*id).or_default())
                } else {
                    entries.get_mut(id)
                }
            }
            _ => None,
        }
    }

    /// Remove every item or entry
    pub fn clear(&mut self) {
        match &mut *self.guard {
            Storage::Array(items) => items.clear(),
            Storage::Map(entries) => entries.clear(),
            Storage::FormMap(entries) => entries.clear(),
        }
    }
}

impl<'a> std::ops::Deref for ObjectLock<'a> {
    type Target = Storage;

    fn deref(&self) -> &Self::Target {
        &self.guard
    }
}

#[cfg(test)]
mod tests {
    use crate::form::FormId;
    use crate::object::{Key, Object, ObjectKind};
    use crate::value::Item;

    #[test]
    fn test_typed_access_matches_kind() {
        let map = Object::map();
        let mut guard = map.lock();
        assert_eq!(guard.kind(), ObjectKind::Map);
        assert!(guard.as_array().is_none());
        assert!(guard.as_form_map_mut().is_none());
        assert!(guard.as_map_mut().is_some());
    }

    #[test]
    fn test_slot_mut_creates_map_entries_only() {
        let map = Object::map();
        {
            let mut guard = map.lock();
            assert!(guard.slot_mut(&Key::Str("a".into()), false).is_none());
            *guard.slot_mut(&Key::Str("a".into()), true).unwrap() = Item::Int(1);
        }
        assert_eq!(map.value_for_key("a"), Some(Item::Int(1)));

        let arr = Object::array();
        assert!(arr.lock().slot_mut(&Key::Index(0), true).is_none());
    }

    #[test]
    fn test_slot_mut_form_map() {
        let forms = Object::form_map();
        let key = Key::Form(FormId(0x14));
        {
            let mut guard = forms.lock();
            assert!(guard.slot_mut(&key, false).is_none());
            *guard.slot_mut(&key, true).unwrap() = Item::Bool(true);
            *guard.slot_mut(&key, false).unwrap() = Item::Int(3);
        }
        assert_eq!(forms.value_for_form(FormId(0x14)), Some(Item::Int(3)));
    }

    #[test]
    fn test_key_kind_mismatch() {
        let arr = Object::array_with([1]);
        let mut guard = arr.lock();
        assert!(guard.slot_mut(&Key::Str("0".into()), true).is_none());
        assert_eq!(guard.get(&Key::Index(0)), Some(&Item::Int(1)));
        assert_eq!(guard.get(&Key::Str("0".into())), None);
    }

    #[test]
    fn test_lock_released_on_drop() {
        let arr = Object::array();
        {
            let _guard = arr.lock();
        }
        // Would deadlock if the first guard were still held
        assert!(arr.push(1));
    }
}
