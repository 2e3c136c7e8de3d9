//! Process-wide storage rooted at a single string-keyed map

use std::path::Path;
use std::sync::{PoisonError, RwLock};

use tracing::debug;

use crate::context::JsonContext;
use crate::error::{JcError, Result};
use crate::json;
use crate::object::{Object, ObjectKind};
use crate::path;
use crate::value::Item;

/// A root map addressed by paths, persisted as one JSON document.
///
/// # Example
///
/// ```
/// use jcontainers::{Database, Item};
///
/// let db = Database::default();
/// assert!(db.solve_set(".mods.frostfall.exposure", 42, true));
/// assert_eq!(db.solve(".mods.frostfall.exposure"), Some(Item::Int(42)));
/// ```
#[derive(Debug)]
pub struct Database {
    root: RwLock<Object>,
    ctx: JsonContext,
}

impl Default for Database {
    fn default() -> Self {
        Self::new(JsonContext::default())
    }
}

impl Database {
    /// Create an empty database.
    pub fn new(ctx: JsonContext) -> Self {
        Self {
            root: RwLock::new(Object::map()),
            ctx,
        }
    }

    /// The current root map.
    pub fn root(&self) -> Object {
        self.root
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the root. Only maps are accepted.
    pub fn set_root(&self, root: Object) -> Result<()> {
        if !root.is_map() {
            return Err(JcError::UnexpectedKind {
                expected: ObjectKind::Map,
                got: root.kind(),
            });
        }
        *self.root.write().unwrap_or_else(PoisonError::into_inner) = root;
        Ok(())
    }

    /// Read a copy of the item at `path`.
    pub fn solve(&self, path: &str) -> Option<Item> {
        path::resolve(&self.ctx, &self.root(), path)
    }

    /// Check whether `path` exists.
    pub fn has_path(&self, path: &str) -> bool {
        path::has_path(&self.ctx, &self.root(), path)
    }

    /// Store a value at `path`, optionally creating missing map keys.
    pub fn solve_set(&self, path: &str, value: impl Into<Item>, create_missing: bool) -> bool {
        path::assign(&self.ctx, &self.root(), path, value, create_missing)
    }

    /// Store a container under a top-level key, or remove the key for `None`.
    pub fn set_object(&self, key: &str, object: Option<Object>) {
        let root = self.root();
        match object {
            Some(obj) => {
                root.set_value_for_key(key, obj);
            }
            None => {
                root.remove_key(key);
            }
        }
    }

    /// Replace the contents with a document read from a file.
    pub fn read_from_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let root = json::from_file(&self.ctx, path.as_ref())?;
        self.set_root(root)?;
        debug!(path = %path.as_ref().display(), "loaded database");
        Ok(())
    }

    /// Write the contents to a file.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        json::to_file(&self.ctx, &self.root(), path)
    }
}
