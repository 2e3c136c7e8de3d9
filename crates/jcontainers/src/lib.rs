//! # jcontainers
//!
//! Reference-counted containers (arrays, string-keyed maps and form-keyed
//! maps) that can be addressed by path and converted to and from JSON
//! without losing shared or cyclic references.
//!
//! ## Architecture
//!
//! - **Items**: tagged value cells holding a primitive, a form id or a container
//! - **Objects**: lockable, shared container nodes
//! - **Paths**: `.key`, `[index]` and `[form]` steps resolved against a root
//! - **JSON**: breadth-first serializer and two-phase deserializer; containers
//!   met more than once are written as `"__reference|<path>"` strings
//! - **Registry / Database**: integer handles and a path-addressed root map
//!
//! ## Example
//!
//! ```
//! use jcontainers::{json, path, JsonContext, Object};
//!
//! let ctx = JsonContext::default();
//! let root = Object::map();
//! root.set_value_for_key("me", &root);
//!
//! let text = json::to_string(&ctx, &root).unwrap();
//! let loaded = json::from_str(&ctx, &text).unwrap();
//!
//! let me = path::resolve(&ctx, &loaded, ".me").unwrap();
//! assert!(me.as_object().unwrap().ptr_eq(&loaded));
//! # root.clear();
//! # loaded.clear();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod context;
pub mod database;
pub mod error;
pub mod form;
pub mod json;
pub mod object;
pub mod path;
pub mod registry;
pub mod value;

// Re-export main types
pub use context::JsonContext;
pub use database::Database;
pub use error::{JcError, Result};
pub use form::{FormCodec, FormId, PluginTable};
pub use object::{Key, Object, ObjectKind, ObjectLock, Storage};
pub use registry::{Handle, Registry};
pub use value::Item;

/// jcontainers version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }
}
