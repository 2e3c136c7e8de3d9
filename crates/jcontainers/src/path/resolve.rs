//! Path resolution against a live container graph
//!
//! Each step locks only the container it looks into, and releases it before
//! moving to the child. A path is therefore not read atomically: another
//! thread may change an earlier container while a later one is being read.

use crate::context::JsonContext;
use crate::object::{Key, Object};
use crate::value::Item;

use super::{parse, PathStep};

/// Resolve `path` against `root` and pass the addressed slot to `f`.
///
/// `f` receives `None` when the path is malformed, a step does not match the
/// container kind, or a key or index is missing. It runs while the lock of
/// the last container on the path is held, so it must not lock that
/// container again.
///
/// With `create_missing`, absent string-map keys along the path are created:
/// intermediate steps get a fresh map, the final step an empty slot. Array
/// positions and form map entries are never created.
///
/// The empty path hands `f` a temporary slot holding `root`; writing to it
/// has no effect on the graph.
pub fn resolve_with<R>(
    ctx: &JsonContext,
    root: &Object,
    path: &str,
    create_missing: bool,
    f: impl FnOnce(Option<&mut Item>) -> R,
) -> R {
    let Some(steps) = parse(path) else {
        return f(None);
    };

    let Some((last, intermediate)) = steps.split_last() else {
        let mut item = Item::Object(root.clone());
        return f(Some(&mut item));
    };

    let mut current = root.clone();
    for step in intermediate {
        match descend(ctx, &current, *step, create_missing) {
            Some(next) => current = next,
            None => return f(None),
        }
    }

    let key = last.to_key(current.kind(), ctx.codec());
    let mut guard = current.lock();
    let slot = match &key {
        Some(key) => guard.slot_mut(key, create_missing && matches!(key, Key::Str(_))),
        None => None,
    };
    f(slot)
}

/// Read a copy of the item at `path`.
///
/// # Example
///
/// ```
/// use jcontainers::{path, Item, JsonContext, Object};
///
/// let ctx = JsonContext::default();
/// let root = Object::map();
/// root.set_value_for_key("list", Object::array_with([1, 2]));
///
/// assert_eq!(path::resolve(&ctx, &root, ".list[1]"), Some(Item::Int(2)));
/// assert_eq!(path::resolve(&ctx, &root, ".list[2]"), None);
/// assert_eq!(path::resolve(&ctx, &root, "[0]"), None);
/// ```
pub fn resolve(ctx: &JsonContext, root: &Object, path: &str) -> Option<Item> {
    resolve_with(ctx, root, path, false, |item| item.cloned())
}

/// Check whether `path` addresses an existing slot.
pub fn has_path(ctx: &JsonContext, root: &Object, path: &str) -> bool {
    resolve_with(ctx, root, path, false, |item| item.is_some())
}

/// Store `value` at `path`. Returns whether the slot was found (or created).
///
/// The root itself cannot be replaced, so the empty path always fails.
pub fn assign(
    ctx: &JsonContext,
    root: &Object,
    path: &str,
    value: impl Into<Item>,
    create_missing: bool,
) -> bool {
    if path.is_empty() {
        return false;
    }

    resolve_with(ctx, root, path, create_missing, |slot| match slot {
        Some(slot) => {
            *slot = value.into();
            true
        }
        None => false,
    })
}

/// Step from `current` into the child container addressed by `step`.
fn descend(
    ctx: &JsonContext,
    current: &Object,
    step: PathStep<'_>,
    create_missing: bool,
) -> Option<Object> {
    let key = step.to_key(current.kind(), ctx.codec())?;
    let mut guard = current.lock();

    match guard.slot_mut(&key, false) {
        Some(Item::Object(child)) => return Some(child.clone()),
        Some(Item::None) | None if create_missing && matches!(key, Key::Str(_)) => {}
        _ => return None,
    }

    let child = Object::map();
    *guard.slot_mut(&key, true)? = Item::from(&child);
    Some(child)
}
