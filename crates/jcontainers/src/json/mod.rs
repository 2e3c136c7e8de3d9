//! JSON documents: loading and storing container graphs.
//!
//! | Container | JSON |
//! |-----------|------|
//! | array | array, in order |
//! | map | object |
//! | form map | object with an extra `"__formData": null` entry, keys as form text |
//! | already written container | `"__reference|<path>"` string |
//!
//! Forms are written as form text, or `null` when the codec cannot encode
//! them. See [`reference`] for how shared and cyclic containers survive the
//! round trip.

mod deserializer;
pub mod reference;
mod serializer;

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use tracing::warn;

use crate::context::JsonContext;
use crate::error::{json_type_name, JcError, Result};
use crate::object::Object;
use crate::value::Item;

use deserializer::Deserializer;
use serializer::Serializer;

// ═══════════════════════════════════════════════════════════════════════
// Graph → JSON
// ═══════════════════════════════════════════════════════════════════════

/// Serialize the graph reachable from `root` into a generic JSON tree.
pub fn to_value(ctx: &JsonContext, root: &Object) -> Value {
    Serializer::write(ctx, root)
}

/// JSON for a single item. A container item is serialized as its own root.
pub fn item_to_value(ctx: &JsonContext, item: &Item) -> Value {
    match item {
        Item::Object(obj) => to_value(ctx, obj),
        leaf => serializer::leaf_value(ctx, leaf),
    }
}

/// Print a generic JSON tree with the context's indentation.
///
/// Nesting depth is unbounded; the stack grows on the heap as needed.
pub fn print(ctx: &JsonContext, value: &Value) -> Result<String> {
    let indent = vec![b' '; ctx.indent];
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(&indent));
    value.serialize(serde_stacker::Serializer::new(&mut ser))?;
    String::from_utf8(buf).map_err(|e| JcError::Encoding(e.to_string()))
}

/// Serialize the graph reachable from `root` to JSON text.
///
/// # Example
///
/// ```
/// use jcontainers::{json, JsonContext, Object};
///
/// let root = Object::map();
/// let shared = Object::array_with([1]);
/// root.set_value_for_key("a", &shared);
/// root.set_value_for_key("b", &shared);
///
/// let text = json::to_string(&JsonContext::default(), &root).unwrap();
/// assert_eq!(text, "{\n  \"a\": [\n    1\n  ],\n  \"b\": \"__reference|.a\"\n}");
/// ```
pub fn to_string(ctx: &JsonContext, root: &Object) -> Result<String> {
    let value = to_value(ctx, root);
    let text = print(ctx, &value);
    release(value);
    text
}

/// Serialize the graph reachable from `root` into a file.
pub fn to_file(ctx: &JsonContext, root: &Object, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let text = to_string(ctx, root)?;
    fs::write(path, text).map_err(|source| JcError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ═══════════════════════════════════════════════════════════════════════
// JSON → Graph
// ═══════════════════════════════════════════════════════════════════════

/// Build a container graph from a generic JSON tree.
///
/// Returns `None` if the root is a scalar. References that cannot be
/// resolved leave their slot empty; they never fail the load.
pub fn from_value(ctx: &JsonContext, value: &Value) -> Option<Object> {
    Deserializer::read(ctx, value)
}

/// Item for a scalar JSON value, or `None` for arrays and objects.
///
/// Form text becomes a form; reference strings are kept as plain text.
pub fn scalar_item(ctx: &JsonContext, value: &Value) -> Option<Item> {
    deserializer::scalar_item(ctx, value)
}

/// Parse JSON text into a container graph.
///
/// # Example
///
/// ```
/// use jcontainers::{json, path, JsonContext};
///
/// let ctx = JsonContext::default();
/// let root = json::from_str(&ctx, r#"{"a": {"k": "__reference|.b"}, "b": [1]}"#).unwrap();
///
/// let a_k = path::resolve(&ctx, &root, ".a.k").unwrap();
/// let b = path::resolve(&ctx, &root, ".b").unwrap();
/// assert_eq!(a_k, b);
/// ```
pub fn from_str(ctx: &JsonContext, text: &str) -> Result<Object> {
    let value = parse(text)?;
    let root = from_value(ctx, &value).ok_or_else(|| {
        let kind = json_type_name(&value);
        warn!(root = kind, "document root is not a container");
        JcError::NotAContainer(kind)
    });
    release(value);
    root
}

/// Parse JSON text without serde_json's nesting limit, so any document
/// [`to_string`] writes can be read back.
fn parse(text: &str) -> Result<Value> {
    let mut de = serde_json::Deserializer::from_str(text);
    de.disable_recursion_limit();
    let value = Value::deserialize(serde_stacker::Deserializer::new(&mut de))?;
    de.end()?;
    Ok(value)
}

/// Drop a JSON tree without recursing once per nesting level.
fn release(value: Value) {
    let mut pending = vec![value];
    while let Some(value) = pending.pop() {
        match value {
            Value::Array(items) => pending.extend(items),
            Value::Object(entries) => pending.extend(entries.into_iter().map(|(_, v)| v)),
            _ => {}
        }
    }
}

/// Read a file and parse it into a container graph.
pub fn from_file(ctx: &JsonContext, path: impl AsRef<Path>) -> Result<Object> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| {
        warn!(path = %path.display(), error = %source, "failed to read document");
        JcError::Io {
            path: path.to_path_buf(),
            source,
        }
    })?;
    from_str(ctx, &text)
}
