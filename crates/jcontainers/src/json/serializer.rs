//! Live container graph to generic JSON tree.
//!
//! Containers are visited breadth-first from the root. The first time a
//! container is met it gets a placeholder and is queued for filling; every
//! later encounter is written as a reference string pointing at the path of
//! that first occurrence. Each container is locked once, while its items are
//! copied into the placeholder, and no two locks are ever held together.
//!
//! Because containers are read one at a time, a graph that other threads
//! mutate during the walk yields a well-formed document that may mix states
//! from different moments.

use std::collections::{HashMap, HashSet, VecDeque};

use serde_json::{Map, Number, Value};
use tracing::debug;

use super::reference;
use crate::context::JsonContext;
use crate::form::FORM_DATA;
use crate::object::{Key, Object, Storage};
use crate::path::push_step;
use crate::value::Item;

/// A child position of a placeholder.
enum Slot {
    /// Finished JSON value
    Leaf(Value),
    /// Placeholder index of an embedded container
    Node(usize),
}

/// Contents copied out of one container.
enum Shape {
    Array(Vec<Slot>),
    Object(Vec<(String, Slot)>),
}

struct Placeholder {
    /// Held so the container's address stays unique for the whole walk
    object: Object,
    shape: Shape,
}

pub(crate) struct Serializer<'c> {
    ctx: &'c JsonContext,
    root: usize,

    /// Placeholders in discovery order; children always follow their parent
    placeholders: Vec<Placeholder>,

    /// Ids of containers that already have a placeholder
    placed: HashSet<usize>,

    /// First edge leading to each container: child id -> (parent id, key)
    parents: HashMap<usize, (usize, Key)>,

    queue: VecDeque<usize>,
}

impl<'c> Serializer<'c> {
    /// Serialize the graph reachable from `root`.
    pub(crate) fn write(ctx: &'c JsonContext, root: &Object) -> Value {
        let mut ser = Serializer {
            ctx,
            root: root.id(),
            placeholders: Vec::new(),
            placed: HashSet::new(),
            parents: HashMap::new(),
            queue: VecDeque::new(),
        };

        ser.place(root);
        while let Some(idx) = ser.queue.pop_front() {
            ser.fill(idx);
        }

        debug!(
            containers = ser.placeholders.len(),
            "serialized container graph"
        );
        ser.assemble()
    }

    fn place(&mut self, object: &Object) -> usize {
        let shape = if object.is_array() {
            Shape::Array(Vec::new())
        } else {
            Shape::Object(Vec::new())
        };

        let idx = self.placeholders.len();
        self.placeholders.push(Placeholder {
            object: object.clone(),
            shape,
        });
        self.placed.insert(object.id());
        self.queue.push_back(idx);
        idx
    }

    fn fill(&mut self, idx: usize) {
        let ctx = self.ctx;
        let object = self.placeholders[idx].object.clone();
        let parent = object.id();
        let guard = object.lock();

        let shape = match &*guard {
            Storage::Array(items) => {
                let mut slots = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    self.note_parent(item, parent, || Key::Index(i));
                    slots.push(self.slot(item));
                }
                Shape::Array(slots)
            }
            Storage::Map(entries) => {
                let mut slots = Vec::with_capacity(entries.len());
                for (key, item) in entries {
                    self.note_parent(item, parent, || Key::Str(key.clone()));
                    slots.push((key.clone(), self.slot(item)));
                }
                Shape::Object(slots)
            }
            Storage::FormMap(entries) => {
                let mut slots = Vec::with_capacity(entries.len() + 1);
                // Type tag telling the reader this object is a form map
                slots.push((FORM_DATA.to_owned(), Slot::Leaf(Value::Null)));
                for (form, item) in entries {
                    // Entries whose key has no text form cannot be written
                    let Some(key) = ctx.codec().to_text(*form) else {
                        continue;
                    };
                    self.note_parent(item, parent, || Key::Form(*form));
                    slots.push((key, self.slot(item)));
                }
                Shape::Object(slots)
            }
        };
        drop(guard);

        self.placeholders[idx].shape = shape;
    }

    fn note_parent(&mut self, item: &Item, parent: usize, key: impl FnOnce() -> Key) {
        if let Item::Object(child) = item {
            self.parents
                .entry(child.id())
                .or_insert_with(|| (parent, key()));
        }
    }

    fn slot(&mut self, item: &Item) -> Slot {
        match item {
            Item::Object(child) if self.placed.contains(&child.id()) => {
                Slot::Leaf(Value::String(reference::encode(&self.path_to(child.id()))))
            }
            Item::Object(child) => Slot::Node(self.place(child)),
            leaf => Slot::Leaf(leaf_value(self.ctx, leaf)),
        }
    }

    /// Root-relative path of the first occurrence of a placed container.
    fn path_to(&self, id: usize) -> String {
        let mut keys = Vec::new();
        let mut current = id;

        // Every recorded parent was placed before its child, so this walk
        // always reaches the root.
        while current != self.root {
            match self.parents.get(&current) {
                Some((parent, key)) => {
                    keys.push(key);
                    current = *parent;
                }
                None => break,
            }
        }

        let mut path = String::new();
        for key in keys.into_iter().rev() {
            // Form keys were encodable when recorded
            push_step(&mut path, key, self.ctx.codec());
        }
        path
    }

    /// Build the final tree bottom-up, so no recursion is needed.
    fn assemble(self) -> Value {
        let mut built: Vec<Option<Value>> = Vec::new();
        built.resize_with(self.placeholders.len(), || None);

        for (idx, placeholder) in self.placeholders.into_iter().enumerate().rev() {
            let value = match placeholder.shape {
                Shape::Array(slots) => Value::Array(
                    slots
                        .into_iter()
                        .map(|slot| take_slot(&mut built, slot))
                        .collect(),
                ),
                Shape::Object(slots) => Value::Object(
                    slots
                        .into_iter()
                        .map(|(key, slot)| (key, take_slot(&mut built, slot)))
                        .collect::<Map<String, Value>>(),
                ),
            };
            built[idx] = Some(value);
        }

        built.into_iter().next().flatten().unwrap_or(Value::Null)
    }
}

fn take_slot(built: &mut [Option<Value>], slot: Slot) -> Value {
    match slot {
        Slot::Leaf(value) => value,
        Slot::Node(idx) => built[idx].take().unwrap_or(Value::Null),
    }
}

/// JSON value of a non-container item.
///
/// Reals without a JSON representation (NaN, infinities) and forms the codec
/// cannot encode become `null`.
pub(crate) fn leaf_value(ctx: &JsonContext, item: &Item) -> Value {
    match item {
        Item::None => Value::Null,
        Item::Bool(b) => Value::Bool(*b),
        Item::Int(n) => Value::from(*n),
        Item::Real(n) => Number::from_f64(*n).map_or(Value::Null, Value::Number),
        Item::String(s) => Value::String(s.as_ref().clone()),
        Item::Form(id) => ctx.codec().to_text(*id).map_or(Value::Null, Value::String),
        // Containers are placed by the serializer, never written as leaves
        Item::Object(_) => Value::Null,
    }
}
