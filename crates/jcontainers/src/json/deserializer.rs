//! Generic JSON tree to live container graph.
//!
//! Loading runs in two phases. The first walks the tree breadth-first,
//! creating one container per array/object and filling it; reference strings
//! are not followed yet but recorded by path, and their slots are left empty.
//! The second phase resolves each recorded path against the finished graph
//! and stores the target in every waiting slot. Running it last is what lets
//! a reference point forward in document order, at the root, or around a
//! cycle.

use std::collections::{BTreeMap, VecDeque};

use serde_json::{Number, Value};
use tracing::{debug, trace};

use super::reference::{self, StringKind};
use crate::context::JsonContext;
use crate::form::FORM_DATA;
use crate::object::{Key, Object};
use crate::path;
use crate::value::Item;

pub(crate) struct Deserializer<'c, 'v> {
    ctx: &'c JsonContext,

    /// Containers created but not yet filled, with their source fragment
    to_fill: VecDeque<(Object, &'v Value)>,

    /// Reference path -> slots waiting for its target
    to_resolve: BTreeMap<&'v str, Vec<(Object, Key)>>,

    /// Number of containers created
    created: usize,
}

impl<'c, 'v> Deserializer<'c, 'v> {
    /// Build the graph for `value`, or `None` if its root is not an array or object.
    pub(crate) fn read(ctx: &'c JsonContext, value: &'v Value) -> Option<Object> {
        let mut de = Deserializer {
            ctx,
            to_fill: VecDeque::new(),
            to_resolve: BTreeMap::new(),
            created: 0,
        };

        let root = de.placeholder(value)?;
        while let Some((object, fragment)) = de.to_fill.pop_front() {
            de.fill(&object, fragment);
        }

        de.resolve_references(&root);
        Some(root)
    }

    /// Create an empty container shaped like `value` and queue it for filling.
    fn placeholder(&mut self, value: &'v Value) -> Option<Object> {
        let object = match value {
            Value::Array(_) => Object::array(),
            Value::Object(entries) if entries.contains_key(FORM_DATA) => Object::form_map(),
            Value::Object(_) => Object::map(),
            _ => return None,
        };

        self.created += 1;
        self.to_fill.push_back((object.clone(), value));
        Some(object)
    }

    fn fill(&mut self, object: &Object, fragment: &'v Value) {
        let ctx = self.ctx;
        let mut guard = object.lock();

        if let (Some(items), Value::Array(values)) = (guard.as_array_mut(), fragment) {
            items.reserve(values.len());
            for (idx, value) in values.iter().enumerate() {
                let item = self.make_item(value, object, || Key::Index(idx));
                items.push(item);
            }
            return;
        }

        let Value::Object(entries) = fragment else {
            return;
        };

        if let Some(map) = guard.as_map_mut() {
            for (key, value) in entries {
                let item = self.make_item(value, object, || Key::Str(key.clone()));
                map.insert(key.clone(), item);
            }
        } else if let Some(forms) = guard.as_form_map_mut() {
            for (key, value) in entries {
                if key == FORM_DATA {
                    continue;
                }
                match ctx.codec().from_text(key) {
                    Some(form) => {
                        let item = self.make_item(value, object, || Key::Form(form));
                        forms.insert(form, item);
                    }
                    None => trace!(key = %key, "skipping form map entry with unknown key"),
                }
            }
        }
    }

    fn make_item(
        &mut self,
        value: &'v Value,
        container: &Object,
        key: impl FnOnce() -> Key,
    ) -> Item {
        match value {
            Value::Array(_) | Value::Object(_) => self.placeholder(value).into(),
            Value::String(text) => match reference::classify(self.ctx.codec(), text) {
                StringKind::Literal => Item::from(text.as_str()),
                StringKind::Form(form) => Item::Form(form),
                StringKind::Reference(path) => {
                    self.to_resolve
                        .entry(path)
                        .or_default()
                        .push((container.clone(), key()));
                    Item::None
                }
            },
            other => scalar_item(self.ctx, other).unwrap_or_default(),
        }
    }

    fn resolve_references(&mut self, root: &Object) {
        let mut resolved = 0usize;
        let mut dropped = 0usize;

        for (target_path, waiting) in std::mem::take(&mut self.to_resolve) {
            let target = path::resolve(self.ctx, root, target_path).and_then(Item::into_object);

            let Some(target) = target else {
                trace!(path = %target_path, slots = waiting.len(), "dropping unresolvable reference");
                dropped += waiting.len();
                continue;
            };

            for (object, key) in waiting {
                object.set(&key, &target);
                resolved += 1;
            }
        }

        debug!(
            containers = self.created,
            resolved, dropped, "deserialized container graph"
        );
    }
}

/// Item for a non-container JSON value.
///
/// Strings are classified as form text or plain text; reference strings are
/// kept as text, since only a whole-document load can resolve them. Returns
/// `None` for arrays and objects.
pub(crate) fn scalar_item(ctx: &JsonContext, value: &Value) -> Option<Item> {
    match value {
        Value::Null => Some(Item::None),
        Value::Bool(b) => Some(Item::Bool(*b)),
        Value::Number(n) => Some(number_item(n)),
        Value::String(text) => Some(match reference::classify(ctx.codec(), text) {
            StringKind::Form(form) => Item::Form(form),
            _ => Item::from(text.as_str()),
        }),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Integers that fit 32 bits stay integers; anything wider is read as a real.
fn number_item(n: &Number) -> Item {
    match n.as_i64() {
        Some(i) => i32::try_from(i).map_or(Item::Real(i as f64), Item::Int),
        None => Item::Real(n.as_f64().unwrap_or_default()),
    }
}
